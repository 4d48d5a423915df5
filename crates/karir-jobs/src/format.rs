//! Text blocks shown to the user and fed back to the model

use crate::html;
use crate::vacancy::Vacancy;

pub const NO_VACANCIES: &str = "No jobs available for your query.";
pub const NO_SALARY: &str = "Tidak ada informasi";

/// How much of a vacancy to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// Header, location, terms, salary, deadline
    Brief,
    /// Brief plus description and requirements
    Full,
}

pub fn salary_info(start: &str, end: &str) -> String {
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() && end.is_empty() {
        NO_SALARY.to_string()
    } else {
        format!("{} - {}", start, end)
    }
}

/// One numbered vacancy block.
pub fn render_vacancy(idx: usize, vacancy: &Vacancy, detail: Detail, link: Option<&str>) -> String {
    let mut out = format!(
        "{}. {} at {}\nLokasi: {}\nTipe: {}\nSistem: {}\nLevel Pendidikan: {}\nRange Gaji: {}\nBatas Apply: {}\n",
        idx,
        vacancy.position_name,
        vacancy.company_name(),
        vacancy.city_name(),
        vacancy.job_type,
        vacancy.system,
        vacancy.level_education,
        salary_info(&vacancy.salary_start, &vacancy.salary_end),
        vacancy.expired_date,
    );
    if detail == Detail::Full {
        out.push_str(&format!("Deskripsi: {}\n", html::to_text(&vacancy.description)));
        out.push_str(&format!("Job Requirements: {}\n", html::to_text(&vacancy.requirement)));
    }
    if let Some(link) = link {
        out.push_str(&format!("Link: {}\n", link));
    }
    out
}

/// Numbered listing of search results.
pub fn render_listing<F>(keyword: &str, vacancies: &[Vacancy], detail: Detail, link_for: F) -> String
where
    F: Fn(&str) -> String,
{
    if vacancies.is_empty() {
        return NO_VACANCIES.to_string();
    }
    let mut out = format!("# Job results for '{}'\n", keyword);
    for (i, vacancy) in vacancies.iter().enumerate() {
        let link = link_for(&vacancy.slug);
        out.push('\n');
        out.push_str(&render_vacancy(i + 1, vacancy, detail, Some(&link)));
    }
    out
}

/// Narrative paragraph used when the user asks about one vacancy.
pub fn render_detail_sentence(vacancy: &Vacancy) -> String {
    format!(
        "Pekerjaan ini adalah sebagai {} di {} di kota {} dengan sistem {} dan tipe {} dengan range gaji {}. \
         Untuk apply, anda harus memiliki level pendidikan {}. \
         Di dalam pekerjaan ini user akan mengerjakan beberapa job description, yaitu: {}. \
         Untuk mendaftar ke pekerjaan ini, user harus memiliki requirements sebagai berikut: {}. \
         Batas apply ke pekerjaan ini adalah {}",
        vacancy.position_name,
        vacancy.company_name(),
        vacancy.city_name(),
        vacancy.system,
        vacancy.job_type,
        salary_info(&vacancy.salary_start, &vacancy.salary_end),
        vacancy.level_education,
        html::to_text(&vacancy.description),
        html::to_text(&vacancy.requirement),
        vacancy.expired_date,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vacancy::Named;

    fn vacancy() -> Vacancy {
        Vacancy {
            slug: "account-finance-manager-x1".into(),
            position_name: "Account Finance Manager".into(),
            job_type: "fulltime".into(),
            system: "onsite".into(),
            level_education: "sarjana".into(),
            salary_start: "8000000".into(),
            expired_date: "2026-12-31".into(),
            description: "<p>Kelola laporan</p>".into(),
            requirement: "<p>S1 Akuntansi</p>".into(),
            company: Named { name: "PT Sinar".into() },
            city: Named { name: "Kota Surabaya".into() },
            ..Default::default()
        }
    }

    #[test]
    fn salary_with_one_side_known() {
        assert_eq!(salary_info("5000", ""), "5000 - ");
        assert_eq!(salary_info("", ""), NO_SALARY);
    }

    #[test]
    fn brief_block_skips_description() {
        let text = render_vacancy(2, &vacancy(), Detail::Brief, None);
        assert!(text.starts_with("2. Account Finance Manager at PT Sinar\n"));
        assert!(text.contains("Lokasi: Kota Surabaya"));
        assert!(text.contains("Range Gaji: 8000000 - "));
        assert!(!text.contains("Deskripsi"));
        assert!(!text.contains("Link:"));
    }

    #[test]
    fn full_block_has_text_and_link() {
        let text = render_vacancy(1, &vacancy(), Detail::Full, Some("https://alumni.example/vacancy/x"));
        assert!(text.contains("Deskripsi: Kelola laporan"));
        assert!(text.contains("Job Requirements: S1 Akuntansi"));
        assert!(text.ends_with("Link: https://alumni.example/vacancy/x\n"));
    }

    #[test]
    fn empty_listing_degrades() {
        assert_eq!(render_listing("finance", &[], Detail::Brief, |s| s.to_string()), NO_VACANCIES);
    }

    #[test]
    fn detail_sentence_names_city() {
        assert!(render_detail_sentence(&vacancy()).contains("di kota Kota Surabaya"));
    }
}
