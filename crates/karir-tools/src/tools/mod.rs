//! Career tools - each file is one capability the assistant can call.

pub mod apijobs;
pub mod education;
pub mod preference;
pub mod province;
pub mod recommend;
pub mod riasec;
pub mod vacancy;

pub use apijobs::SearchApiJobsTool;
pub use education::{EducationalTopicTool, SearchEducationalContentTool};
pub use preference::RecordPreferenceTool;
pub use province::ProvinceIdTool;
pub use recommend::RecommendJobsTool;
pub use riasec::RiasecResultTool;
pub use vacancy::{SearchVacancyTool, VacancyDetailTool};

use serde_json::Value;

pub(crate) fn str_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str()).map(str::trim).filter(|s| !s.is_empty())
}

/// Models send numbers both as JSON numbers and as strings.
pub(crate) fn u64_arg(args: &Value, key: &str) -> Option<u64> {
    match args.get(key)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Id as text, whether sent as a number or a string.
pub(crate) fn id_arg(args: &Value, key: &str) -> Option<String> {
    match args.get(key)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}
