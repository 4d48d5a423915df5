//! Chat pages: each has its own persona, greeting, tool set and memory budget

use crate::runtime::AgentConfig;
use karir_core::config::LlmConfig;
use karir_core::{RiasecType, TopThree};
use std::fmt;
use std::str::FromStr;

const ADVISOR_PREAMBLE: &str = "You are a multi-lingual career advisor expert who has knowledge based on \
real-time data. You will always try to be helpful and try to help them answering their question. \
If you don't know the answer, say that you DON'T KNOW.";

const VACANCY_FORMAT: &str = "When displaying jobs, include all details retrieved from the tools without \
summarizing them. Always use a numbered list. Each job must show:
1. Position name and type (e.g. full-time, part-time)
2. Location
3. System (onsite, hybrid, remote)
4. Minimum degree to apply
5. Salary range
6. Application deadline
7. Description
8. Requirements
9. Link to the vacancy";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Conversational RIASEC assessor.
    Assessment,
    /// Career analysis from the top-3 result.
    CareerRecommendation,
    /// Keyword vacancy search on the alumni site, APIJobs as fallback.
    VacancySearch,
    /// Ranked vacancies plus educational content from result and preferences.
    JobsAndLearning,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Assessment,
        Page::CareerRecommendation,
        Page::VacancySearch,
        Page::JobsAndLearning,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Assessment => "assessment",
            Page::CareerRecommendation => "career",
            Page::VacancySearch => "vacancies",
            Page::JobsAndLearning => "jobs",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Assessment => "Asesmen RIASEC",
            Page::CareerRecommendation => "Rekomendasi Karir Berdasarkan Hasil Tes RIASEC",
            Page::VacancySearch => "Search for Jobs On Alumni Website",
            Page::JobsAndLearning => "Search for Jobs On Alumni Website or Educational Content",
        }
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            Page::Assessment => "Halo, apakah Anda siap untuk melakukan tes RIASEC?",
            Page::CareerRecommendation => "Halo, apakah anda siap untuk mendapatkan rekomendasi karir?",
            Page::VacancySearch => "Halo! What job do you want to search for? 😊",
            Page::JobsAndLearning => {
                "Hello! I can provide you with jobs or educational content based on your RIASEC result! 😊"
            }
        }
    }

    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            Page::Assessment => &[],
            Page::CareerRecommendation => &["get_riasec_result"],
            Page::VacancySearch => &[
                "search_job_vacancy",
                "get_province_id",
                "get_job_vacancy_detail",
                "search_apijobs",
                "get_riasec_result",
                "search_educational_content",
            ],
            Page::JobsAndLearning => &[
                "record_new_preference",
                "recommend_jobs",
                "get_job_vacancy_detail",
                "provide_educational_topic",
                "search_educational_content",
            ],
        }
    }

    /// Whether the page cannot work without an assessment result.
    pub fn needs_result(&self) -> bool {
        matches!(self, Page::CareerRecommendation | Page::JobsAndLearning)
    }

    /// Whether turns on this page get chunks from the document folder.
    pub fn uses_documents(&self) -> bool {
        !matches!(self, Page::VacancySearch)
    }

    /// Memory budget in tokens; tool pages use the configured chat budget.
    pub fn memory_tokens(&self, chat_budget: usize) -> usize {
        match self {
            Page::Assessment | Page::CareerRecommendation => 50_384,
            Page::VacancySearch | Page::JobsAndLearning => chat_budget,
        }
    }

    pub fn system_prompt(&self, top3: Option<&TopThree>) -> String {
        match self {
            Page::Assessment => format!(
                "You are a multi-lingual expert system. Jawablah semua dalam Bahasa Indonesia.\n\
                 Anda adalah petugas tes asesmen holland personality test. Berikan pertanyaan asesmen satu per \
                 satu dengan bahasa yang FRIENDLY dan SINGKAT. Jika jawaban pengguna belum cukup jelas, JANGAN \
                 LANJUT ke pertanyaan berikutnya: jelaskan pertanyaan yang sedang ditanyakan lalu minta pengguna \
                 menjawab kembali. Tanyakan juga apakah pengguna sedang berkuliah atau bersekolah, jurusan dan \
                 konsentrasinya. Bantu pengguna menemukan 3 holland personality teratas mereka.\n\n\
                 Referensi RIASEC:\n{}",
                reference()
            ),
            Page::CareerRecommendation => {
                let aspects = top3.map(|t| t.to_string()).unwrap_or_else(|| "(belum ada hasil)".into());
                format!(
                    "{}\nJawablah semua dalam Bahasa Indonesia.\n\
                     Anda adalah asesor yang membantu pengguna mencari karir berdasarkan aspek teratas holland \
                     personality pengguna. Aspek teratas yang dimiliki user adalah {}. JANGAN SEBUTKAN ASPEK LAIN \
                     SELAIN TIGA ASPEK TERSEBUT. Berikan analisis serta 5 pekerjaan yang cocok untuk user.\n\n\
                     Referensi RIASEC:\n{}",
                    ADVISOR_PREAMBLE, aspects, reference()
                )
            }
            Page::VacancySearch => format!(
                "{}\nYour primary job is to help people find jobs from the Petra Alumni database. Turn the \
                 user's request or RIASEC result into job keywords and search for them. Display all the jobs \
                 retrieved from the tools and explain WHY they match the user's personality result.\n\
                 Use search_job_vacancy first. Only if it returns no results use search_apijobs. If results \
                 come from search_job_vacancy say you found them on the Petra alumni website.\n\n{}",
                ADVISOR_PREAMBLE, VACANCY_FORMAT
            ),
            Page::JobsAndLearning => {
                let result = top3
                    .map(|t| format!("The user's RIASEC result is {}.", t))
                    .unwrap_or_default();
                format!(
                    "{}\n{}\nYour responsibilities:\n\
                     1. Detect and record the user's job preferences whenever they mention career interests.\n\
                     2. Use preferences and the RIASEC result to find matching vacancies with recommend_jobs.\n\
                     3. Recommend educational content with provide_educational_topic then \
                     search_educational_content.\n\
                     Only search for vacancies if the user wants to explore options; if they only want to \
                     talk, answer directly.\n\n{}\nExplain how each listed job aligns with the RIASEC result.",
                    ADVISOR_PREAMBLE, result, VACANCY_FORMAT
                )
            }
        }
    }

    pub fn agent_config(&self, llm: &LlmConfig, chat_budget: usize, top3: Option<&TopThree>) -> AgentConfig {
        AgentConfig {
            default_model: llm.model.clone(),
            max_tool_iterations: llm.max_tool_iterations,
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            system_prompt: Some(self.system_prompt(top3)),
            memory_tokens: self.memory_tokens(chat_budget),
        }
    }
}

/// Built-in RIASEC summary. Chunks from the document folder are added per turn.
fn reference() -> String {
    RiasecType::ALL
        .iter()
        .map(|t| format!("- {} ({}): {} Example careers: {}.", t.label(), t.letter(), t.description(), t.careers().join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Page::ALL
            .into_iter()
            .find(|p| p.slug() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Page::ALL.iter().map(|p| p.slug()).collect();
                format!("unknown page '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_round_trip() {
        for page in Page::ALL {
            assert_eq!(page.slug().parse::<Page>().unwrap(), page);
        }
        assert!("lobby".parse::<Page>().is_err());
    }

    #[test]
    fn tool_pages_list_known_tools() {
        for page in Page::ALL {
            for name in page.tool_names() {
                assert!(karir_tools::ALL_TOOLS.contains(name), "{} on {}", name, page);
            }
        }
    }
}
