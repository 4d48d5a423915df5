//! Tests for karir-agent: Session, SessionRegistry, ContextManager, pages and
//! the AgentRuntime loop against a scripted model

use karir_agent::*;
use karir_llm::{ContentBlock, LlmContent, LlmMessage, ScriptedProvider, ScriptedReply};
use karir_tools::{Tool, ToolRegistry, ToolResult};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

struct EchoTool {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str { "echo" }
    fn description(&self) -> &str { "Echo the text back" }
    fn prompt(&self) -> &str { "Use echo to repeat things." }
    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": { "text": { "type": "string" } }, "required": ["text"] })
    }
    async fn execute(&self, args: Value) -> ToolResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match args.get("text").and_then(|v| v.as_str()) {
            Some(t) => ToolResult::text(format!("echo: {}", t)),
            None => ToolResult::error("Missing required parameter: text"),
        }
    }
}

fn runtime(provider: Arc<ScriptedProvider>, calls: Arc<AtomicUsize>, config: AgentConfig) -> AgentRuntime {
    let mut tools = ToolRegistry::new();
    tools.register(EchoTool { calls });
    AgentRuntime::new(provider, tools, config)
}

async fn collect(rx: &mut mpsc::Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut events = Vec::new();
    while let Some(e) = rx.recv().await {
        events.push(e);
    }
    events
}

// ===========================================================================
// ContextManager
// ===========================================================================

#[test]
fn context_manager_message_tokens() {
    let msg = LlmMessage::user("hello world"); // 3 tokens + 10 overhead
    assert_eq!(ContextManager::message_tokens(&msg), 13);
}

#[test]
fn context_manager_set_system_adds_tokens() {
    let mut cm = ContextManager::new(100_000);
    assert_eq!(cm.calculate_total(&[]), 0);
    cm.set_system("You are a helpful assistant.");
    assert_eq!(cm.calculate_total(&[]), 7);
}

#[test]
fn context_manager_leaves_small_histories_alone() {
    let cm = ContextManager::new(1_000);
    let mut messages = vec![LlmMessage::user("hi"), LlmMessage::assistant("hello")];
    assert_eq!(cm.compact(&mut messages), 0);
    assert_eq!(messages.len(), 2);
}

// ===========================================================================
// Session
// ===========================================================================

#[tokio::test]
async fn session_forgets_oldest_turns_past_budget() {
    let session = Session::new(SessionKey::new("s"), None, 60);
    for i in 0..6 {
        session.add_user_message(&format!("question {} {}", i, "x".repeat(40))).await;
        session.add_assistant_text(&"y".repeat(40)).await;
    }
    assert!(session.token_count().await <= 60);
    let messages = session.get_messages().await;
    assert_eq!(messages[0].role, "user");
    match &messages[0].content {
        LlmContent::Text(t) => assert!(t.starts_with("question 5")),
        other => panic!("unexpected content {:?}", other),
    }
}

#[tokio::test]
async fn tool_results_share_one_user_message() {
    let session = Session::new(SessionKey::new("s"), Some("sys"), 10_000);
    session.add_user_message("hi").await;
    session
        .add_assistant_with_tools(
            Some(""),
            vec![
                ContentBlock::ToolUse { id: "a".into(), name: "echo".into(), input: json!({}) },
                ContentBlock::ToolUse { id: "b".into(), name: "echo".into(), input: json!({}) },
            ],
        )
        .await;
    session.add_tool_result("a", "one", false).await;
    session.add_tool_result("b", "two", true).await;

    let messages = session.get_messages().await;
    assert_eq!(messages.len(), 3);
    match &messages[1].content {
        LlmContent::Blocks(blocks) => assert_eq!(blocks.len(), 2),
        other => panic!("unexpected content {:?}", other),
    }
    match &messages[2].content {
        LlmContent::Blocks(blocks) => {
            assert_eq!(blocks.len(), 2);
            assert!(matches!(&blocks[1], ContentBlock::ToolResult { is_error: Some(true), .. }));
        }
        other => panic!("unexpected content {:?}", other),
    }
}

#[test]
fn registry_reuses_sessions() {
    let registry = SessionRegistry::new();
    let key = SessionKey::new("cli");
    let a = registry.get_or_create(&key, Some("sys"), 100);
    let b = registry.get_or_create(&key, None, 5);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(registry.list(), vec![key.clone()]);
    assert!(registry.remove(&key).is_some());
    assert!(registry.get(&key).is_none());
}

// ===========================================================================
// AgentRuntime
// ===========================================================================

#[tokio::test]
async fn runtime_runs_tools_then_answers() {
    let provider = Arc::new(ScriptedProvider::sequence(vec![
        ScriptedReply::tool("echo", json!({"text": "halo"})),
        ScriptedReply::text("Done: halo"),
    ]));
    let calls = Arc::new(AtomicUsize::new(0));
    let rt = runtime(provider.clone(), calls.clone(), AgentConfig::default());
    let key = SessionKey::new("t1");

    let (tx, mut rx) = mpsc::channel(64);
    rt.run_turn(&key, "say halo", tx).await.unwrap();
    let events = collect(&mut rx).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(events.iter().any(|e| matches!(e, AgentEvent::ToolResult { result, is_error: false, .. } if result == "echo: halo")));
    assert!(matches!(events.last(), Some(AgentEvent::Done { .. })));

    let session = rt.sessions().get(&key).unwrap();
    assert_eq!(session.message_count().await, 4);

    let requests = provider.requests().await;
    assert_eq!(requests.len(), 2);
    let system = requests[0].system.clone().unwrap_or_default();
    assert!(system.contains("Use echo to repeat things."));
    assert_eq!(requests[0].tools.as_ref().map(|t| t.len()), Some(1));
}

#[tokio::test]
async fn runtime_stops_after_max_iterations() {
    let provider = Arc::new(ScriptedProvider::constant(ScriptedReply::tool("echo", json!({"text": "again"}))));
    let calls = Arc::new(AtomicUsize::new(0));
    let config = AgentConfig { max_tool_iterations: 3, ..Default::default() };
    let rt = runtime(provider, calls.clone(), config);

    let (tx, mut rx) = mpsc::channel(256);
    rt.run_turn(&SessionKey::new("loop"), "go", tx).await.unwrap();
    let events = collect(&mut rx).await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(matches!(events.last(), Some(AgentEvent::Error(e)) if e == "Max tool iterations exceeded"));
}

#[tokio::test]
async fn unknown_tools_are_reported_to_the_model() {
    let provider = Arc::new(ScriptedProvider::sequence(vec![
        ScriptedReply::tool("teleport", json!({})),
        ScriptedReply::text("Sorry"),
    ]));
    let rt = runtime(provider, Arc::new(AtomicUsize::new(0)), AgentConfig::default());

    let (tx, mut rx) = mpsc::channel(64);
    rt.run_turn(&SessionKey::new("u"), "go", tx).await.unwrap();
    let events = collect(&mut rx).await;
    assert!(events.iter().any(|e| matches!(
        e,
        AgentEvent::ToolResult { result, is_error: true, .. } if result == "Error: Tool not found: teleport"
    )));
}

#[tokio::test]
async fn respond_collects_text_and_apologises_on_failure() {
    let ok = runtime(
        Arc::new(ScriptedProvider::constant(ScriptedReply::text("Here are your jobs"))),
        Arc::new(AtomicUsize::new(0)),
        AgentConfig::default(),
    );
    assert_eq!(ok.respond(&SessionKey::new("a"), "jobs?").await, "Here are your jobs");

    let failing = runtime(
        Arc::new(ScriptedProvider::constant(ScriptedReply::Error("model offline".into()))),
        Arc::new(AtomicUsize::new(0)),
        AgentConfig::default(),
    );
    assert_eq!(failing.respond(&SessionKey::new("b"), "jobs?").await, UNABLE_TO_PROCESS);
}

#[tokio::test]
async fn cancelled_turn_ends_quietly() {
    let provider = Arc::new(ScriptedProvider::constant(ScriptedReply::text("late")));
    let rt = runtime(provider.clone(), Arc::new(AtomicUsize::new(0)), AgentConfig::default());
    let cancel = tokio_util::sync::CancellationToken::new();
    cancel.cancel();

    let (tx, mut rx) = mpsc::channel(8);
    rt.run_turn_cancellable(&SessionKey::new("c"), "hi", tx, cancel).await.unwrap();
    let events = collect(&mut rx).await;
    assert!(matches!(events.as_slice(), [AgentEvent::Done { stop_reason }] if stop_reason == "cancelled"));
    assert_eq!(provider.call_count().await, 0);
}

#[tokio::test]
async fn retrieved_chunks_join_the_system_prompt() {
    let docs = vec![
        karir_docs::Document {
            source: "holland/social.md".into(),
            text: "Social orang suka mengajar dan membantu orang lain.".into(),
        },
        karir_docs::Document {
            source: "holland/realistic.md".into(),
            text: "Realistic orang suka memperbaiki mesin.".into(),
        },
    ];
    let docs_config = karir_core::config::DocsConfig { top_k: 1, ..Default::default() };
    let retriever = Arc::new(karir_docs::Retriever::keyword_only(docs, &docs_config));

    let provider = Arc::new(ScriptedProvider::sequence(vec![
        ScriptedReply::text("Apakah Anda suka memperbaiki mesin?"),
        ScriptedReply::text("Baik, dicatat."),
    ]));
    let config = AgentConfig { system_prompt: Some("Kamu asesor RIASEC.".into()), ..Default::default() };
    let rt = AgentRuntime::new(provider.clone(), ToolRegistry::new(), config).with_retriever(retriever);
    let key = SessionKey::new("docs");

    rt.respond(&key, "siapa yang suka mengajar?").await;
    // a bare "ya" is searched together with the question it answers
    rt.respond(&key, "ya").await;

    let requests = provider.requests().await;
    let first = requests[0].system.clone().unwrap_or_default();
    assert!(first.starts_with("Kamu asesor RIASEC.\n\nIni adalah dokumen yang mungkin relevan"));
    assert!(first.contains("[holland/social.md]\nSocial orang suka mengajar"));
    assert!(!first.contains("realistic.md"));

    let second = requests[1].system.clone().unwrap_or_default();
    assert!(second.contains("[holland/realistic.md]"));
    // the stored session prompt stays clean
    assert_eq!(rt.sessions().get_or_create(&key, None, 0).system_prompt(), Some("Kamu asesor RIASEC."));
}

// ===========================================================================
// Pages
// ===========================================================================

#[test]
fn career_page_names_only_the_top_three() {
    let scores = karir_core::TypeScores::new(vec![
        karir_core::TypeScore { kind: karir_core::RiasecType::Social, total: 30 },
        karir_core::TypeScore { kind: karir_core::RiasecType::Artistic, total: 25 },
        karir_core::TypeScore { kind: karir_core::RiasecType::Investigative, total: 20 },
        karir_core::TypeScore { kind: karir_core::RiasecType::Realistic, total: 5 },
    ]);
    let top3 = scores.top3().unwrap();
    let prompt = Page::CareerRecommendation.system_prompt(Some(&top3));
    assert!(prompt.contains("Social (30), Artistic (25), Investigative (20)"));

    let llm = karir_core::config::LlmConfig::default();
    let config = Page::VacancySearch.agent_config(&llm, 32_768, None);
    assert_eq!(config.memory_tokens, 32_768);
    assert_eq!(config.default_model, llm.model);
    assert_eq!(Page::Assessment.memory_tokens(32_768), 50_384);
}
