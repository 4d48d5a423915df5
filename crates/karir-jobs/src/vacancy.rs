//! Vacancy records as returned by the alumni API
//!
//! The API omits or nulls fields freely and sends salaries as either
//! numbers or strings, so every field decodes leniently to a string.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(default, deserialize_with = "lenient_string")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub position_name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub job_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub system: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub level_education: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary_start: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub salary_end: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub expired_date: String,
    /// HTML
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    /// HTML
    #[serde(default, deserialize_with = "lenient_string")]
    pub requirement: String,
    #[serde(default, rename = "mh_company", deserialize_with = "null_as_default")]
    pub company: Named,
    #[serde(default, rename = "mh_city", deserialize_with = "null_as_default")]
    pub city: Named,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Named {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl Vacancy {
    pub fn company_name(&self) -> &str {
        &self.company.name
    }

    pub fn city_name(&self) -> &str {
        &self.city.name
    }
}

/// `null`, missing, numbers and booleans all become strings.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}
