//! karir - RIASEC career assistant
//!
//! Usage:
//!   karir assess                    → terminal questionnaire, writes the scores CSV
//!   karir result                    → show the stored result
//!   karir chat --page career        → chat page (assessment, career, vacancies, jobs)
//!   karir match --prefer design     → ranked vacancies for the result and preferences
//!   karir learn                     → educational content for the result
//!   karir rate "data analyst"       → rank the job catalog against a keyword
//!   karir slugs                     → export every vacancy slug
//!   karir docs add guide.md         → add reference documents for the chat pages
//!   karir serve                     → APIJobs fetch service

use anyhow::Context;
use clap::{Parser, Subcommand};
use karir::{assess, chat, App};
use karir_agent::{Page, SessionKey};
use karir_core::{KarirConfig, PreferenceSet, Questionnaire, TypeScores};
use karir_jobs::{catalog, JobCatalog, MatchOutcome};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on listing pages walked by `slugs`.
const MAX_EXPORT_PAGES: u32 = 200;

#[derive(Parser)]
#[command(
    name = "karir",
    about = "RIASEC career assistant: assessment, career chat, vacancies and learning content",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (TOML)
    #[arg(long, global = true, env = "KARIR_CONFIG", default_value = "karir.toml")]
    config: PathBuf,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take the RIASEC questionnaire in the terminal
    Assess {
        /// Questionnaire CSV (default: paths.questions)
        #[arg(short, long)]
        questions: Option<PathBuf>,
    },
    /// Show the stored assessment result
    Result,
    /// Chat with one of the assistant pages
    Chat {
        /// assessment, career, vacancies or jobs
        #[arg(short, long, default_value = "career")]
        page: Page,
        /// Session name
        #[arg(short, long, default_value = "main")]
        session: String,
    },
    /// Rank vacancies against the result and preferences
    Match {
        /// Preference keyword (repeatable)
        #[arg(long = "prefer")]
        prefer: Vec<String>,
    },
    /// Find educational content for the result
    Learn {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage the reference documents retrieved into chat pages
    Docs {
        #[command(subcommand)]
        action: DocsAction,
    },
    /// Rank the job catalog against a keyword
    Rate {
        keyword: String,
        /// Catalog CSV (default: paths.catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Export every vacancy slug to CSV
    Slugs {
        /// Output CSV (default: paths.slugs)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write a Position,Link catalog
        #[arg(long)]
        catalog_out: Option<PathBuf>,
    },
    /// Run the APIJobs fetch service
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let _guard = init_tracing(cli.log_file.as_deref())?;

    let config = KarirConfig::load(&cli.config);
    let app = App::new(config);

    match cli.command {
        Commands::Assess { questions } => {
            let path = questions.unwrap_or_else(|| app.config.paths.questions.clone());
            let questionnaire = Questionnaire::from_csv_path(&path)
                .with_context(|| format!("loading questionnaire {}", path.display()))?;

            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let scores = assess::run(&questionnaire, stdin.lock(), &mut stdout)?;

            let answers = &app.config.paths.answers;
            ensure_parent(answers)?;
            scores.write_csv(answers)?;
            println!("\nJawaban anda telah disimpan! ({})", answers.display());
            assess::report(&scores, Some(&questionnaire), &mut stdout)?;
        }

        Commands::Result => {
            let path = &app.config.paths.answers;
            let scores = TypeScores::read_csv(path)
                .with_context(|| format!("no result at {} (run `karir assess` first)", path.display()))?;
            let questionnaire = Questionnaire::from_csv_path(&app.config.paths.questions).ok();
            assess::report(&scores, questionnaire.as_ref(), &mut std::io::stdout())?;
        }

        Commands::Chat { page, session } => {
            let runtime = app.chat_runtime(page).await?;
            let key = SessionKey::scoped(page.slug(), &session);
            chat::run(&runtime, page, key).await?;
        }

        Commands::Match { prefer } => {
            let top3 = app.top3()?;
            let mut preferences = PreferenceSet::new();
            for keyword in &prefer {
                preferences.record(keyword);
            }
            match app.matcher()?.run(&top3, &preferences).await? {
                MatchOutcome::Ranked { keywords, text, .. } => {
                    println!("Keywords: {}\n", keywords);
                    println!("{}", text);
                }
                MatchOutcome::Fallback { keyword, text } => {
                    println!("No alumni vacancies, APIJobs results for '{}':\n", keyword);
                    println!("{}", text);
                }
            }
        }

        Commands::Learn { json } => {
            let top3 = app.top3()?;
            let report = app.education().run(&top3).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Topic: {}\n", report.topic);
                println!("{}", report.summary);
            }
        }

        Commands::Docs { action } => run_docs(&app, action).await?,

        Commands::Rate { keyword, catalog } => {
            let catalog = match catalog {
                Some(path) => JobCatalog::from_csv_path(&path)
                    .with_context(|| format!("reading catalog {}", path.display()))?,
                None => app.catalog()?.context("no catalog given (use --catalog or set paths.catalog)")?,
            };
            for (i, (entry, rating)) in app.rate_catalog(&keyword, &catalog).await?.iter().enumerate() {
                let score = rating.score.map(|s| s.to_string()).unwrap_or_else(|| "-".into());
                println!("{:>3}. [{:>3}] {} {}", i + 1, score, entry.position, entry.link);
            }
        }

        Commands::Slugs { out, catalog_out } => {
            let listings = app.collect_listings(MAX_EXPORT_PAGES).await?;
            let slugs: Vec<&str> = listings.iter().map(|v| v.slug.as_str()).collect();

            let out = out.unwrap_or_else(|| app.config.paths.slugs.clone());
            ensure_parent(&out)?;
            catalog::write_slugs(File::create(&out)?, &slugs)?;
            println!("Wrote {} slugs to {}", slugs.len(), out.display());

            if let Some(path) = catalog_out {
                let alumni = app.alumni();
                let catalog = JobCatalog::from_vacancies(&listings, |slug| alumni.vacancy_link(slug));
                ensure_parent(&path)?;
                catalog.write_csv(File::create(&path)?)?;
                println!("Wrote {} catalog entries to {}", catalog.len(), path.display());
            }
        }

        Commands::Serve { port } => {
            let mut config = app.config.clone();
            if let Some(port) = port {
                config.gateway.port = port;
            }
            karir_gateway::start_fetch_service(&config).await?;
        }
    }

    Ok(())
}

#[derive(Subcommand)]
enum DocsAction {
    /// Copy files (.md, .txt, .csv) into the document folder
    Add {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List stored documents
    List,
    /// Delete a stored document
    Remove { name: String },
    /// Show the chunks a message would retrieve
    Search {
        query: String,
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },
}

async fn run_docs(app: &App, action: DocsAction) -> anyhow::Result<()> {
    match action {
        DocsAction::Add { files } => {
            let added = app.add_documents(&files)?;
            if added.is_empty() {
                println!("Nothing uploaded");
            } else {
                println!("Successfully uploaded {}", added.join(", "));
            }
        }
        DocsAction::List => {
            let store = app.doc_store()?;
            let files = store.list()?;
            if files.is_empty() {
                println!("No documents in {}", store.dir().display());
            }
            for file in files {
                println!("{:<50} {:>8.2} MB", file.name, file.size_mb());
            }
        }
        DocsAction::Remove { name } => {
            app.doc_store()?.remove(&name)?;
            println!("Successfully deleted {}", name);
        }
        DocsAction::Search { query, top_k } => {
            let Some(mut retriever) = app.retriever().await? else {
                println!("No documents in {}", app.config.docs.dir.display());
                return Ok(());
            };
            if let Some(k) = top_k {
                retriever = retriever.with_top_k(k);
            }
            let hits = retriever.retrieve(&query).await;
            if hits.is_empty() {
                println!("No matching chunks");
            }
            for (i, hit) in hits.iter().enumerate() {
                println!("{}. [{}] score {:.4}\n{}\n", i + 1, hit.source, hit.score, hit.text.trim());
            }
        }
    }
    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "karir=info,tower_http=info".into());

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path.file_name().context("--log-file needs a file name")?;
            std::fs::create_dir_all(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
            Ok(None)
        }
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    Ok(())
}
