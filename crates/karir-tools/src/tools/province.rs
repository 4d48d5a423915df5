//! Province tool - resolve a province name to the alumni API id

use crate::context::CareerContext;
use crate::registry::{Tool, ToolResult};
use crate::tools::str_arg;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct ProvinceIdTool {
    ctx: Arc<CareerContext>,
}

impl ProvinceIdTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for ProvinceIdTool {
    fn name(&self) -> &str { "get_province_id" }

    fn description(&self) -> &str {
        "Use this tool if the user specifies a province, NOT a city. Returns the province id used as \
         id_mh_province by search_job_vacancy."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "province": { "type": "string", "description": "Province name, e.g. Jawa Timur" }
            },
            "required": ["province"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let province = match str_arg(&args, "province") {
            Some(p) => p,
            None => return ToolResult::error("Missing required parameter: province"),
        };
        match self.ctx.alumni.province_id(province).await {
            Ok(Some(id)) => ToolResult::text(id),
            Ok(None) => ToolResult::text(format!(
                "No province named '{}'. Search without a province filter.",
                province
            )),
            Err(e) => ToolResult::error(format!("Province lookup failed: {}", e)),
        }
    }
}
