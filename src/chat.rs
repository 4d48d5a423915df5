//! Terminal chat loop over one page runtime

use karir_agent::{AgentEvent, AgentRuntime, Page, SessionKey, UNABLE_TO_PROCESS};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

const EXIT_WORDS: &[&str] = &["exit", "quit", "keluar"];

pub async fn run(runtime: &AgentRuntime, page: Page, session: SessionKey) -> anyhow::Result<()> {
    println!("== {} ==", page.title());
    println!("{}\n", page.greeting());
    println!("(ketik /reset untuk mulai ulang, exit untuk keluar)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }
        if message == "/reset" {
            runtime.sessions().remove(&session);
            println!("(percakapan dimulai ulang)\n{}\n", page.greeting());
            continue;
        }
        turn(runtime, &session, message).await?;
    }
    Ok(())
}

/// One turn, streaming text to stdout as it arrives.
pub async fn turn(runtime: &AgentRuntime, session: &SessionKey, message: &str) -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::channel::<AgentEvent>(256);
    let printer = tokio::spawn(async move {
        let mut printed = false;
        let mut stdout = std::io::stdout();
        while let Some(event) = rx.recv().await {
            match event {
                AgentEvent::Text(t) => {
                    if !printed {
                        let _ = write!(stdout, "\nassistant> ");
                        printed = true;
                    }
                    let _ = write!(stdout, "{}", t);
                    let _ = stdout.flush();
                }
                AgentEvent::ToolExecuting { name, .. } => tracing::info!("[{}]", name),
                AgentEvent::Error(e) => warn!("{}", e),
                _ => {}
            }
        }
        printed
    });

    let outcome = runtime.run_turn(session, message, tx).await;
    let printed = printer.await.unwrap_or(false);
    if let Err(e) = outcome {
        warn!("Turn failed: {}", e);
        println!("\nassistant> {}", UNABLE_TO_PROCESS);
    } else if !printed {
        println!("\nassistant> {}", UNABLE_TO_PROCESS);
    }
    println!("\n");
    Ok(())
}
