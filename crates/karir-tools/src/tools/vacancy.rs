//! Vacancy tools - keyword search and single-vacancy detail from the alumni site

use crate::context::CareerContext;
use crate::registry::{Tool, ToolResult};
use crate::tools::{id_arg, str_arg, u64_arg};
use karir_jobs::format::{self, Detail};
use karir_jobs::VacancyQuery;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

const SHOW_LISTING: &str = "\n\nShow this result to user directly with no summarization, and format it nicely. \
Always show the link of every vacancy.";

const EXPLAIN_DETAIL: &str = "\n\nProvide a reason why this job matches the user's RIASEC result and preference.";

pub struct SearchVacancyTool {
    ctx: Arc<CareerContext>,
}

impl SearchVacancyTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for SearchVacancyTool {
    fn name(&self) -> &str { "search_job_vacancy" }

    fn description(&self) -> &str {
        "Searches the Petra alumni database for a list of job vacancies. The keyword must be one job name or \
         position. If the user names a province, call get_province_id first and pass the id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keyword": { "type": "string", "description": "Job name or position to search for" },
                "start_salary": { "type": "integer", "description": "Lowest monthly salary in rupiah" },
                "end_salary": { "type": "integer", "description": "Highest monthly salary in rupiah" },
                "id_mh_province": { "type": "string", "description": "Province id from get_province_id" }
            },
            "required": ["keyword"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let keyword = match str_arg(&args, "keyword") {
            Some(k) => k,
            None => return ToolResult::error("Missing required parameter: keyword"),
        };
        let (min, max) = self.ctx.salary_range;
        let start = u64_arg(&args, "start_salary").unwrap_or(min);
        let end = u64_arg(&args, "end_salary").unwrap_or(max).max(start);

        let mut query = VacancyQuery::keyword(keyword)
            .salary(start, end)
            .per_page(self.ctx.page_size);
        if let Some(province) = id_arg(&args, "id_mh_province") {
            query = query.province(province);
        }

        match self.ctx.alumni.search(&query).await {
            Ok(vacancies) if vacancies.is_empty() => ToolResult::text(format::NO_VACANCIES),
            Ok(vacancies) => {
                let listing = format::render_listing(keyword, &vacancies, Detail::Brief, |slug| {
                    self.ctx.alumni.vacancy_link(slug)
                });
                ToolResult::text(format!("{}{}", listing, SHOW_LISTING))
            }
            Err(e) => {
                warn!("Vacancy search for '{}' failed: {}", keyword, e);
                ToolResult::text(format::NO_VACANCIES)
            }
        }
    }
}

pub struct VacancyDetailTool {
    ctx: Arc<CareerContext>,
}

impl VacancyDetailTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for VacancyDetailTool {
    fn name(&self) -> &str { "get_job_vacancy_detail" }

    fn description(&self) -> &str {
        "Provides detailed information about one vacancy. The slug must be a specific vacancy slug taken from a \
         previous search result link."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "slug": { "type": "string", "description": "Vacancy slug, the last part of the vacancy link" }
            },
            "required": ["slug"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let slug = match str_arg(&args, "slug") {
            Some(s) => s.rsplit('/').next().unwrap_or(s),
            None => return ToolResult::error("Missing required parameter: slug"),
        };

        match self.ctx.alumni.detail(slug).await {
            Ok(Some(vacancy)) => {
                let link = self.ctx.alumni.vacancy_link(slug);
                let block = format::render_vacancy(1, &vacancy, Detail::Full, Some(&link));
                ToolResult::text(format!(
                    "{}\n{}{}",
                    format::render_detail_sentence(&vacancy),
                    block,
                    EXPLAIN_DETAIL
                ))
            }
            Ok(None) => ToolResult::text(format!("Failed to fetch details for job ID: {}", slug)),
            Err(e) => ToolResult::text(format!("Error fetching job details: {}", e)),
        }
    }
}
