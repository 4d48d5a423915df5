//! Preference tool - remember career interests the user mentions

use crate::context::CareerContext;
use crate::registry::{Tool, ToolResult};
use crate::tools::str_arg;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

pub const STORED: &str = "User preference is stored";

pub struct RecordPreferenceTool {
    ctx: Arc<CareerContext>,
}

impl RecordPreferenceTool {
    pub fn new(ctx: Arc<CareerContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for RecordPreferenceTool {
    fn name(&self) -> &str { "record_new_preference" }

    fn description(&self) -> &str {
        "Records a job preference whenever the user mentions a career interest, e.g. remote work, \
         full-stack development, data analysis. Stored preferences refine later job matching."
    }

    fn prompt(&self) -> &str {
        "Use record_new_preference every time the user states a job preference, before using any other tool."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "preference": { "type": "string", "description": "Short keyword or phrase for the interest" }
            },
            "required": ["preference"]
        })
    }

    async fn execute(&self, args: Value) -> ToolResult {
        let preference = match str_arg(&args, "preference") {
            Some(p) => p,
            None => return ToolResult::error("Missing required parameter: preference"),
        };
        if self.ctx.preferences.record(preference) {
            info!("Recorded preference '{}'", preference);
        } else {
            debug!("Preference '{}' skipped", preference);
        }
        ToolResult::text(STORED)
    }
}
