//! Tests for the career tools against local fake vacancy / search servers

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use karir_core::{KarirConfig, RiasecType, TypeScore, TypeScores};
use karir_jobs::{
    AlumniClient, ApiJobsClient, CatalogEntry, CompatibilityRater, EducationPipeline, JobCatalog, JobMatcher,
    WebSearch,
};
use karir_llm::{LlmProvider, ScriptedProvider, ScriptedReply};
use karir_tools::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn vacancy(slug: &str, position: &str) -> Value {
    json!({
        "slug": slug,
        "position_name": position,
        "type": "fulltime",
        "system": "remote",
        "level_education": "sarjana",
        "salary_start": 5000000,
        "salary_end": 9000000,
        "expired_date": "2026-11-30",
        "description": "<p>Build things</p>",
        "requirement": "<p>S1 Informatika</p>",
        "mh_company": {"name": "PT Maju"},
        "mh_city": {"name": "Kota Surabaya"}
    })
}

async fn search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let data = match params.get("keyword").map(String::as_str) {
        Some("developer") => vec![vacancy("backend-developer-1", "Backend Developer")],
        Some("Social") | Some("teacher") => vec![vacancy("guru-sd-2", "Guru SD")],
        _ => vec![],
    };
    let province = params.get("id_mh_province").cloned().unwrap_or_default();
    let salary = params.get("salary_range").cloned().unwrap_or_default();
    Json(json!({ "vacancies": { "data": data }, "echo": { "province": province, "salary": salary } }))
}

async fn detail(Path(slug): Path<String>) -> impl IntoResponse {
    match slug.as_str() {
        "backend-developer-1" => (StatusCode::OK, Json(json!({ "vacancy": vacancy(&slug, "Backend Developer") }))),
        "guru-sd-2" => (StatusCode::OK, Json(json!({ "vacancy": vacancy(&slug, "Guru SD") }))),
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn spawn_fakes() -> (AlumniClient, ApiJobsClient, WebSearch) {
    let app = Router::new()
        .route("/api/vacancy", get(search))
        .route("/api/vacancy/:slug", get(detail))
        .route(
            "/api/province",
            get(|| async { Json(json!({ "provinces": [{"id": 35, "name": "Jawa Timur"}] })) }),
        )
        .route(
            "/v1/job/search",
            post(|Json(body): Json<Value>| async move {
                let q = body["q"].as_str().unwrap_or_default().to_string();
                Json(json!({ "hits": [{ "title": format!("{} Lead", q), "url": "https://jobs.example/9" }] }))
            }),
        )
        .route(
            "/html/",
            post(|| async {
                r#"<a class="result__a" href="https://learn.example/ux">UX Basics</a>
                   <a class="result__snippet" href="https://learn.example/ux">Start with research.</a>"#
            }),
        );
    let base = spawn_server(app).await;
    (
        AlumniClient::new(format!("{}/api", base), "https://alumni.test"),
        ApiJobsClient::direct(format!("{}/v1/job/search", base), None),
        WebSearch::new(format!("{}/html/", base)),
    )
}

fn write_scores(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("answers").join("scores.csv");
    TypeScores::new(vec![
        TypeScore { kind: RiasecType::Realistic, total: 9 },
        TypeScore { kind: RiasecType::Investigative, total: 28 },
        TypeScore { kind: RiasecType::Artistic, total: 14 },
        TypeScore { kind: RiasecType::Social, total: 31 },
        TypeScore { kind: RiasecType::Enterprising, total: 22 },
        TypeScore { kind: RiasecType::Conventional, total: 11 },
    ])
    .write_csv(&path)
    .unwrap();
    path
}

async fn context(provider: Arc<dyn LlmProvider>, answers: std::path::PathBuf) -> Arc<CareerContext> {
    let (alumni, apijobs, search) = spawn_fakes().await;
    let mut config = KarirConfig::default();
    config.paths.answers = answers;
    config.matcher.generate_keywords = false;

    let matcher = JobMatcher::new(
        alumni.clone(),
        apijobs.clone(),
        CompatibilityRater::new(provider.clone(), "rater"),
        config.matcher.clone(),
    );
    let education = EducationPipeline::new(provider, search, "chat");
    Arc::new(CareerContext::new(&config, alumni, apijobs, matcher, education))
}

fn text(result: ToolResult) -> String {
    assert!(!result.is_error(), "unexpected error: {}", result.to_content_string());
    result.to_content_string()
}

// ===========================================================================
// Registry
// ===========================================================================

#[tokio::test]
async fn career_registry_has_every_tool() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);
    assert_eq!(registry.len(), ALL_TOOLS.len());
    for name in ALL_TOOLS {
        assert!(registry.get(name).is_some(), "{} missing", name);
    }
    assert_eq!(registry.definitions().len(), ALL_TOOLS.len());
}

#[tokio::test]
async fn page_registry_only_holds_named_tools() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_page_registry(ctx, &["search_job_vacancy", "get_province_id", "no_such_tool"]);
    assert_eq!(registry.list(), vec!["get_province_id", "search_job_vacancy"]);

    let result = registry.execute("recommend_jobs", json!({})).await;
    assert!(result.is_error());
    assert_eq!(result.to_content_string(), "Error: Tool not found: recommend_jobs");
}

// ===========================================================================
// Vacancy tools
// ===========================================================================

#[tokio::test]
async fn search_vacancy_lists_with_links() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);

    let out = text(registry.execute("search_job_vacancy", json!({"keyword": "developer", "id_mh_province": 35})).await);
    assert!(out.starts_with("# Job results for 'developer'"));
    assert!(out.contains("1. Backend Developer at PT Maju"));
    assert!(out.contains("Range Gaji: 5000000 - 9000000"));
    assert!(out.contains("Link: https://alumni.test/vacancy/backend-developer-1"));
    assert!(!out.contains("Deskripsi"));
}

#[tokio::test]
async fn search_vacancy_without_hits_says_so() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);

    let out = text(registry.execute("search_job_vacancy", json!({"keyword": "astronaut"})).await);
    assert_eq!(out, "No jobs available for your query.");

    let missing = registry.execute("search_job_vacancy", json!({})).await;
    assert_eq!(missing.to_content_string(), "Error: Missing required parameter: keyword");
}

#[tokio::test]
async fn vacancy_detail_accepts_links_and_reports_missing() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);

    let out = text(
        registry
            .execute("get_job_vacancy_detail", json!({"slug": "https://alumni.test/vacancy/guru-sd-2"}))
            .await,
    );
    assert!(out.starts_with("Pekerjaan ini adalah sebagai Guru SD di PT Maju"));
    assert!(out.contains("Deskripsi: Build things"));

    let out = text(registry.execute("get_job_vacancy_detail", json!({"slug": "gone-3"})).await);
    assert_eq!(out, "Failed to fetch details for job ID: gone-3");
}

#[tokio::test]
async fn province_lookup_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);

    assert_eq!(text(registry.execute("get_province_id", json!({"province": "jawa timur"})).await), "35");
    let out = text(registry.execute("get_province_id", json!({"province": "Bali"})).await);
    assert!(out.starts_with("No province named 'Bali'"));
}

#[tokio::test]
async fn apijobs_results_keep_urls() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);

    let out = text(registry.execute("search_apijobs", json!({"keyword": "nurse"})).await);
    assert!(out.contains("1. nurse Lead at N/A"));
    assert!(out.contains("Website URL: https://jobs.example/9"));
    assert!(out.contains("ALWAYS SHOW the WEBSITE URL"));
}

// ===========================================================================
// Preferences and RIASEC result
// ===========================================================================

#[tokio::test]
async fn preferences_are_shared_with_the_context() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx.clone());

    for preference in ["remote work", "Remote Work", "my riasec result"] {
        let out = text(registry.execute("record_new_preference", json!({"preference": preference})).await);
        assert_eq!(out, "User preference is stored");
    }
    assert_eq!(ctx.preferences.snapshot().keywords(), ["remote work".to_string()]);
}

#[tokio::test]
async fn riasec_result_reads_the_scores_file() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), write_scores(&dir)).await;
    let registry = create_career_registry(ctx);

    let out = text(registry.execute("get_riasec_result", json!({})).await);
    assert!(out.starts_with("RIASEC code SIE"));
    assert!(out.contains("Social (31)"));
}

#[tokio::test]
async fn tools_needing_a_result_ask_for_the_assessment() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(Arc::new(ScriptedProvider::constant(ScriptedReply::text("50"))), dir.path().join("none.csv")).await;
    let registry = create_career_registry(ctx);

    for name in ["get_riasec_result", "recommend_jobs", "provide_educational_topic"] {
        let out = text(registry.execute(name, json!({})).await);
        assert!(out.contains("has not completed the RIASEC assessment"), "{}: {}", name, out);
    }
}

// ===========================================================================
// Recommendation and education
// ===========================================================================

#[tokio::test]
async fn recommend_ranks_vacancies_with_preferences() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::responder(|req| {
        if req.last_user_text().unwrap_or_default().contains("Backend Developer") {
            ScriptedReply::text("90")
        } else {
            ScriptedReply::text("40")
        }
    }));
    let ctx = context(provider.clone(), write_scores(&dir)).await;
    let registry = create_career_registry(ctx);

    registry.execute("record_new_preference", json!({"preference": "developer"})).await;
    let out = text(registry.execute("recommend_jobs", json!({})).await);

    let backend = out.find("Backend Developer").unwrap();
    let guru = out.find("Guru SD").unwrap();
    assert!(backend < guru);
    assert!(out.contains("Compatibility: 90/100"));
    assert!(out.contains("(why Backend Developer matches Social, Investigative, Enterprising, developer)"));
    assert!(out.contains("Link: https://alumni.test/vacancy/backend-developer-1 [ALWAYS SHOW THIS TO USER]"));
    // one reason slot per entry
    assert_eq!(out.matches("<A reason why this job matches").count(), 2);
    assert!(out.ends_with("DON'T call other tools again."));
    assert_eq!(provider.call_count().await, 2);
}

#[tokio::test]
async fn recommend_reports_a_failed_rating() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::sequence(vec![
        ScriptedReply::text("80"),
        ScriptedReply::Error("rater offline".into()),
    ]));
    let ctx = context(provider.clone(), write_scores(&dir)).await;
    let registry = create_career_registry(ctx);

    registry.execute("record_new_preference", json!({"preference": "developer"})).await;
    let out = text(registry.execute("recommend_jobs", json!({})).await);
    assert!(out.starts_with("Error fetching jobs:"), "{}", out);
    assert!(out.contains("rater offline"));
    assert_eq!(provider.call_count().await, 2);
}

#[tokio::test]
async fn recommend_without_rankable_jobs_has_no_directive() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = KarirConfig::default();
    config.paths.answers = write_scores(&dir);
    config.matcher.generate_keywords = false;

    // unreachable vacancy API; the catalog row has no detail to show
    let alumni = AlumniClient::new("http://127.0.0.1:1/api", "https://alumni.test");
    let apijobs = ApiJobsClient::direct("http://127.0.0.1:1/v1/job/search", None);
    let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::constant(ScriptedReply::text("50")));
    let catalog = JobCatalog::new(vec![CatalogEntry {
        position: "Guru SD".into(),
        link: "https://alumni.test/vacancy/guru-sd-404".into(),
    }]);
    let matcher = JobMatcher::new(
        alumni.clone(),
        apijobs.clone(),
        CompatibilityRater::new(provider.clone(), "rater"),
        config.matcher.clone(),
    )
    .with_catalog(catalog);
    let education = EducationPipeline::new(provider, WebSearch::new("http://127.0.0.1:1/html/"), "chat");
    let ctx = Arc::new(CareerContext::new(&config, alumni, apijobs, matcher, education));

    let out = text(create_career_registry(ctx).execute("recommend_jobs", json!({})).await);
    assert_eq!(out, "No jobs available for your query.");
}

#[tokio::test]
async fn educational_topic_and_search() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(ScriptedProvider::constant(ScriptedReply::text("User research for helpers")));
    let ctx = context(provider, write_scores(&dir)).await;
    let registry = create_career_registry(ctx);

    let topic = text(registry.execute("provide_educational_topic", json!({})).await);
    assert_eq!(topic, "User research for helpers");

    let out = text(registry.execute("search_educational_content", json!({"topic": topic})).await);
    assert!(out.starts_with("Title: UX Basics\nURL: https://learn.example/ux\nSummary: Start with research."));
    assert!(out.contains("(Social, Investigative, Enterprising)"));
}
