//! Alumni vacancy API client

use crate::error::{JobsError, JobsResult};
use crate::vacancy::{lenient_string, Vacancy};
use karir_core::config::AlumniConfig;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

const DEFAULT_TYPES: &str = "freelance,fulltime,parttime,internship";
const DEFAULT_SYSTEMS: &str = "onsite,remote,hybrid";
const EDUCATION_LEVELS: &str = "diploma,sarjana,magister,doktor";

/// Query parameters for `GET /vacancy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacancyQuery {
    pub keyword: String,
    pub salary_range: Option<(u64, u64)>,
    pub province_id: Option<String>,
    pub city_id: Option<String>,
    pub page: u32,
    pub per_page: u32,
    pub types: String,
    pub systems: String,
}

impl Default for VacancyQuery {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            salary_range: None,
            province_id: None,
            city_id: None,
            page: 1,
            per_page: 20,
            types: DEFAULT_TYPES.into(),
            systems: DEFAULT_SYSTEMS.into(),
        }
    }
}

impl VacancyQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self { keyword: keyword.into(), ..Default::default() }
    }

    pub fn salary(mut self, start: u64, end: u64) -> Self {
        self.salary_range = Some((start, end));
        self
    }

    pub fn province(mut self, id: impl Into<String>) -> Self {
        self.province_id = Some(id.into());
        self
    }

    pub fn city(mut self, id: impl Into<String>) -> Self {
        self.city_id = Some(id.into());
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let salary = self
            .salary_range
            .map(|(start, end)| format!("{}, {}", start, end))
            .unwrap_or_default();
        vec![
            ("page", self.page.to_string()),
            ("type", self.types.clone()),
            ("system", self.systems.clone()),
            ("level_education", EDUCATION_LEVELS.to_string()),
            ("keyword", self.keyword.clone()),
            ("salary_range", salary),
            ("id_mh_province", self.province_id.clone().unwrap_or_default()),
            ("id_mh_city", self.city_id.clone().unwrap_or_default()),
            ("perPage", self.per_page.to_string()),
            ("orderBy", "updated_at".to_string()),
            ("order", "DESC".to_string()),
            ("skills", String::new()),
            ("prody", String::new()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Province {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

#[derive(Deserialize)]
struct VacancyPage {
    vacancies: VacancyList,
}

#[derive(Deserialize)]
struct VacancyList {
    #[serde(default)]
    data: Vec<Vacancy>,
}

#[derive(Deserialize)]
struct VacancyDetail {
    vacancy: Vacancy,
}

#[derive(Deserialize)]
struct ProvinceList {
    #[serde(default)]
    provinces: Vec<Province>,
}

#[derive(Clone)]
pub struct AlumniClient {
    client: Client,
    api_url: String,
    site_url: String,
}

impl AlumniClient {
    pub fn new(api_url: impl Into<String>, site_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            site_url: site_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AlumniConfig) -> Self {
        Self::new(&config.api_url, &config.site_url)
    }

    /// Public page of a vacancy.
    pub fn vacancy_link(&self, slug: &str) -> String {
        format!("{}/vacancy/{}", self.site_url, slug)
    }

    pub async fn search(&self, query: &VacancyQuery) -> JobsResult<Vec<Vacancy>> {
        let url = format!("{}/vacancy", self.api_url);
        debug!("Vacancy search: keyword='{}' per_page={}", query.keyword, query.per_page);

        let response = self.client.get(&url).query(&query.to_params()).send().await?;
        if !response.status().is_success() {
            return Err(JobsError::status(response.status(), url));
        }
        let page: VacancyPage = response.json().await?;
        info!("Vacancy search '{}' returned {} results", query.keyword, page.vacancies.data.len());
        Ok(page.vacancies.data)
    }

    /// Full record for one slug. Non-success statuses yield `None`.
    pub async fn detail(&self, slug: &str) -> JobsResult<Option<Vacancy>> {
        let url = format!("{}/vacancy/{}", self.api_url, slug);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        debug!("{} for {}", status, url);
        if !status.is_success() {
            return Ok(None);
        }
        let detail: VacancyDetail = response.json().await?;
        Ok(Some(detail.vacancy))
    }

    pub async fn provinces(&self) -> JobsResult<Vec<Province>> {
        let url = format!("{}/province", self.api_url);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(JobsError::status(response.status(), url));
        }
        let list: ProvinceList = response.json().await?;
        Ok(list.provinces)
    }

    /// Case-insensitive exact match on the province name.
    pub async fn province_id(&self, name: &str) -> JobsResult<Option<String>> {
        let wanted = name.trim();
        Ok(self
            .provinces()
            .await?
            .into_iter()
            .find(|p| !p.id.is_empty() && p.name.trim().eq_ignore_ascii_case(wanted))
            .map(|p| p.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_carry_fixed_filters() {
        let params = VacancyQuery::keyword("finance").salary(5000, 100000).province("35").to_params();
        let get = |k: &str| params.iter().find(|(name, _)| *name == k).map(|(_, v)| v.as_str());
        assert_eq!(get("salary_range"), Some("5000, 100000"));
        assert_eq!(get("id_mh_province"), Some("35"));
        assert_eq!(get("id_mh_city"), Some(""));
        assert_eq!(get("level_education"), Some("diploma,sarjana,magister,doktor"));
        assert_eq!(get("order"), Some("DESC"));
    }

    #[test]
    fn links_point_at_public_site() {
        let client = AlumniClient::new("https://panel.example/api/", "https://alumni.example/");
        assert_eq!(client.vacancy_link("abc"), "https://alumni.example/vacancy/abc");
    }
}
