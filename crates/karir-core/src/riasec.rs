//! RIASEC (Holland Code) questionnaire, scoring, and top-3 selection

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Legend shown next to every questionnaire prompt.
pub const LIKERT_LEGEND: &str =
    "1 = Sangat Tidak Yakin, 2 = Tidak Yakin, 3 = Netral, 4 = Yakin, 5 = Sangat Yakin";

const QUESTION_COLUMN: &str = "Question";
const TYPE_COLUMN: &str = "Type";
const SCORE_COLUMN: &str = "Total Score";

/// The six Holland interest categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiasecType {
    Realistic,
    Investigative,
    Artistic,
    Social,
    Enterprising,
    Conventional,
}

impl RiasecType {
    pub const ALL: [RiasecType; 6] = [
        RiasecType::Realistic,
        RiasecType::Investigative,
        RiasecType::Artistic,
        RiasecType::Social,
        RiasecType::Enterprising,
        RiasecType::Conventional,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiasecType::Realistic => "Realistic",
            RiasecType::Investigative => "Investigative",
            RiasecType::Artistic => "Artistic",
            RiasecType::Social => "Social",
            RiasecType::Enterprising => "Enterprising",
            RiasecType::Conventional => "Conventional",
        }
    }

    pub fn letter(&self) -> char {
        match self {
            RiasecType::Realistic => 'R',
            RiasecType::Investigative => 'I',
            RiasecType::Artistic => 'A',
            RiasecType::Social => 'S',
            RiasecType::Enterprising => 'E',
            RiasecType::Conventional => 'C',
        }
    }

    /// Short profile used as grounding context in prompts.
    pub fn description(&self) -> &'static str {
        match self {
            RiasecType::Realistic => {
                "Doers: practical, hands-on people who like working with tools, machines, plants or animals."
            }
            RiasecType::Investigative => {
                "Thinkers: analytical, curious people who like observing, researching and solving problems."
            }
            RiasecType::Artistic => {
                "Creators: expressive, original people who like unstructured work with ideas, design and art."
            }
            RiasecType::Social => {
                "Helpers: cooperative people who like teaching, caring for and working with others."
            }
            RiasecType::Enterprising => {
                "Persuaders: energetic, ambitious people who like leading, selling and influencing."
            }
            RiasecType::Conventional => {
                "Organizers: careful, orderly people who like working with data, records and clear procedures."
            }
        }
    }

    pub fn careers(&self) -> &'static [&'static str] {
        match self {
            RiasecType::Realistic => &["Civil Engineer", "Electrician", "Mechanic", "Chef", "Surveyor"],
            RiasecType::Investigative => {
                &["Data Scientist", "Software Engineer", "Research Analyst", "Pharmacist", "Biologist"]
            }
            RiasecType::Artistic => {
                &["Graphic Designer", "Copywriter", "Architect", "UI/UX Designer", "Photographer"]
            }
            RiasecType::Social => &["Teacher", "Counselor", "Nurse", "HR Officer", "Social Worker"],
            RiasecType::Enterprising => {
                &["Marketing Manager", "Sales Executive", "Entrepreneur", "Lawyer", "Business Development"]
            }
            RiasecType::Conventional => {
                &["Accountant", "Auditor", "Administrative Staff", "Tax Consultant", "Data Entry Specialist"]
            }
        }
    }

    /// Parse a full type name or its letter, ignoring case.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|t| {
                t.label().eq_ignore_ascii_case(trimmed)
                    || (trimmed.len() == 1 && trimmed.eq_ignore_ascii_case(&t.letter().to_string()))
            })
            .ok_or_else(|| Error::UnknownType(trimmed.to_string()))
    }
}

impl FromStr for RiasecType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RiasecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single questionnaire row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub index: usize,
    pub text: String,
    pub kind: RiasecType,
}

/// The fixed set of questions, in file order.
#[derive(Debug, Clone, Default)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        Self::from_reader(file)
    }

    /// Read a CSV with `Question` and `Type` columns. Other columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let question_col = column_index(&headers, QUESTION_COLUMN)?;
        let type_col = column_index(&headers, TYPE_COLUMN)?;

        let mut questions = Vec::new();
        for (index, record) in rdr.records().enumerate() {
            let record = record?;
            let text = record.get(question_col).unwrap_or_default().to_string();
            let kind = RiasecType::parse(record.get(type_col).unwrap_or_default())?;
            questions.push(Question { index, text, kind });
        }
        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Types in order of first appearance.
    pub fn types(&self) -> Vec<RiasecType> {
        let mut seen = Vec::new();
        for q in &self.questions {
            if !seen.contains(&q.kind) {
                seen.push(q.kind);
            }
        }
        seen
    }

    pub fn count_of(&self, kind: RiasecType) -> usize {
        self.questions.iter().filter(|q| q.kind == kind).count()
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| Error::parse(format!("missing column '{}'", name)))
}

/// A validated answer on the 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Likert(u8);

impl Likert {
    pub fn new(value: u8) -> Result<Self> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidLikert(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

/// One answer per question index.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: BTreeMap<usize, Likert>,
}

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any earlier answer to the same question.
    pub fn record(&mut self, index: usize, likert: Likert) -> Option<Likert> {
        self.answers.insert(index, likert)
    }

    pub fn get(&self, index: usize) -> Option<Likert> {
        self.answers.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// Sum Likert answers per type.
pub fn score(questionnaire: &Questionnaire, answers: &AnswerSheet) -> Result<TypeScores> {
    if let Some(&extra) = answers.answers.keys().find(|&&i| i >= questionnaire.len()) {
        return Err(Error::UnknownQuestion(extra));
    }

    let mut entries: Vec<TypeScore> = questionnaire
        .types()
        .into_iter()
        .map(|kind| TypeScore { kind, total: 0 })
        .collect();

    for q in questionnaire.questions() {
        let likert = answers.get(q.index).ok_or(Error::IncompleteAnswers(q.index))?;
        if let Some(entry) = entries.iter_mut().find(|e| e.kind == q.kind) {
            entry.total += u32::from(likert.value());
        }
    }

    Ok(TypeScores { entries })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeScore {
    pub kind: RiasecType,
    pub total: u32,
}

/// Aggregate score per type, in questionnaire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeScores {
    entries: Vec<TypeScore>,
}

impl TypeScores {
    pub fn new(entries: Vec<TypeScore>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TypeScore] {
        &self.entries
    }

    pub fn get(&self, kind: RiasecType) -> Option<u32> {
        self.entries.iter().find(|e| e.kind == kind).map(|e| e.total)
    }

    /// Mean Likert answer for a type.
    pub fn average(&self, kind: RiasecType, questionnaire: &Questionnaire) -> Option<f64> {
        let count = questionnaire.count_of(kind);
        if count == 0 {
            return None;
        }
        self.get(kind).map(|total| f64::from(total) / count as f64)
    }

    /// Three highest totals; equal totals keep questionnaire order.
    pub fn top3(&self) -> Result<TopThree> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.total.cmp(&a.total));
        match sorted.as_slice() {
            [a, b, c, ..] => Ok(TopThree([*a, *b, *c])),
            _ => Err(Error::parse(format!(
                "need at least three types to rank, found {}",
                sorted.len()
            ))),
        }
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.to_writer(file)?;
        tracing::info!("Saved RIASEC scores to {}", path.display());
        Ok(())
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([TYPE_COLUMN, SCORE_COLUMN])?;
        for entry in &self.entries {
            wtr.write_record([entry.kind.label().to_string(), entry.total.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::not_found(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let type_col = column_index(&headers, TYPE_COLUMN)?;
        let score_col = column_index(&headers, SCORE_COLUMN)?;

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let kind = RiasecType::parse(record.get(type_col).unwrap_or_default())?;
            let raw = record.get(score_col).unwrap_or_default();
            let total = raw
                .parse::<u32>()
                .map_err(|_| Error::parse(format!("invalid score '{}' for {}", raw, kind)))?;
            entries.push(TypeScore { kind, total });
        }
        Ok(Self { entries })
    }
}

/// The user's three dominant types, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopThree([TypeScore; 3]);

impl TopThree {
    pub fn entries(&self) -> &[TypeScore; 3] {
        &self.0
    }

    pub fn primary(&self) -> RiasecType {
        self.0[0].kind
    }

    pub fn types(&self) -> [RiasecType; 3] {
        [self.0[0].kind, self.0[1].kind, self.0[2].kind]
    }

    /// `"Social, Artistic, Investigative"`
    pub fn labels(&self) -> String {
        self.0.iter().map(|e| e.kind.label()).collect::<Vec<_>>().join(", ")
    }

    /// Three letter Holland code, e.g. `SAI`.
    pub fn code(&self) -> String {
        self.0.iter().map(|e| e.kind.letter()).collect()
    }

    /// One line per type with its profile and example careers.
    pub fn describe(&self) -> String {
        self.0
            .iter()
            .map(|e| {
                format!(
                    "{} ({}): {} Example careers: {}.",
                    e.kind.label(),
                    e.total,
                    e.kind.description(),
                    e.kind.careers().join(", ")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for TopThree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> =
            self.0.iter().map(|e| format!("{} ({})", e.kind.label(), e.total)).collect();
        f.write_str(&parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_and_names() {
        assert_eq!(RiasecType::parse("s").unwrap(), RiasecType::Social);
        assert_eq!(RiasecType::parse(" enterprising ").unwrap(), RiasecType::Enterprising);
        assert!(RiasecType::parse("Sporty").is_err());
    }

    #[test]
    fn likert_bounds() {
        assert!(Likert::new(0).is_err());
        assert!(Likert::new(6).is_err());
        assert_eq!(Likert::new(5).unwrap().value(), 5);
    }

    #[test]
    fn code_is_letters_in_rank_order() {
        let scores = TypeScores::new(vec![
            TypeScore { kind: RiasecType::Realistic, total: 3 },
            TypeScore { kind: RiasecType::Social, total: 9 },
            TypeScore { kind: RiasecType::Artistic, total: 7 },
        ]);
        assert_eq!(scores.top3().unwrap().code(), "SAR");
    }
}
