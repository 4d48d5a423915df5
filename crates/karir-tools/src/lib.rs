//! Karir Tools - what the career assistant can do
//!
//! Tools are registered per page: each chat page hands the model only the
//! tools it needs.

pub mod context;
pub mod registry;
pub mod tools;

pub use context::CareerContext;
pub use registry::{Tool, ToolRegistry, ToolResult};

use std::sync::Arc;

/// Every tool name in registration order.
pub const ALL_TOOLS: &[&str] = &[
    "search_job_vacancy",
    "get_job_vacancy_detail",
    "get_province_id",
    "search_apijobs",
    "record_new_preference",
    "get_riasec_result",
    "recommend_jobs",
    "provide_educational_topic",
    "search_educational_content",
];

/// Registry with all career tools.
pub fn create_career_registry(ctx: Arc<CareerContext>) -> ToolRegistry {
    create_page_registry(ctx, ALL_TOOLS)
}

/// Registry with only the named tools. Unknown names are logged and skipped.
pub fn create_page_registry(ctx: Arc<CareerContext>, names: &[&str]) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for name in names {
        match *name {
            "search_job_vacancy" => registry.register(tools::SearchVacancyTool::new(ctx.clone())),
            "get_job_vacancy_detail" => registry.register(tools::VacancyDetailTool::new(ctx.clone())),
            "get_province_id" => registry.register(tools::ProvinceIdTool::new(ctx.clone())),
            "search_apijobs" => registry.register(tools::SearchApiJobsTool::new(ctx.clone())),
            "record_new_preference" => registry.register(tools::RecordPreferenceTool::new(ctx.clone())),
            "get_riasec_result" => registry.register(tools::RiasecResultTool::new(ctx.clone())),
            "recommend_jobs" => registry.register(tools::RecommendJobsTool::new(ctx.clone())),
            "provide_educational_topic" => registry.register(tools::EducationalTopicTool::new(ctx.clone())),
            "search_educational_content" => {
                registry.register(tools::SearchEducationalContentTool::new(ctx.clone()))
            }
            other => tracing::warn!("Unknown tool in page registry: {}", other),
        }
    }
    registry
}
