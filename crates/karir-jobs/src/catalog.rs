//! Offline job catalog (`Position`, `Link`) and slug export

use crate::error::{JobsError, JobsResult};
use crate::vacancy::Vacancy;
use std::io::{Read, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub position: String,
    pub link: String,
}

impl CatalogEntry {
    /// Final path segment of the vacancy link.
    pub fn slug(&self) -> &str {
        self.link.trim_end_matches('/').rsplit('/').next().unwrap_or_default()
    }

    pub fn to_vacancy(&self) -> Vacancy {
        Vacancy {
            slug: self.slug().to_string(),
            position_name: self.position.clone(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    entries: Vec<CatalogEntry>,
}

impl JobCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn from_csv_path(path: &Path) -> JobsResult<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> JobsResult<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or_else(|| JobsError::InvalidResponse(format!("catalog is missing column '{}'", name)))
        };
        let position_col = find("Position")?;
        let link_col = find("Link")?;

        let mut entries = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let position = record.get(position_col).unwrap_or_default();
            let link = record.get(link_col).unwrap_or_default();
            if position.is_empty() || link.is_empty() {
                continue;
            }
            entries.push(CatalogEntry { position: position.to_string(), link: link.to_string() });
        }
        Ok(Self { entries })
    }

    pub fn from_vacancies<F>(vacancies: &[Vacancy], link_for: F) -> Self
    where
        F: Fn(&str) -> String,
    {
        let entries = vacancies
            .iter()
            .filter(|v| !v.slug.is_empty())
            .map(|v| CatalogEntry { position: v.position_name.clone(), link: link_for(&v.slug) })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> JobsResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["Position", "Link"])?;
        for entry in &self.entries {
            wtr.write_record([&entry.position, &entry.link])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Single-column `slug` CSV.
pub fn write_slugs<W: Write, S: AsRef<str>>(writer: W, slugs: &[S]) -> JobsResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["slug"])?;
    for slug in slugs {
        wtr.write_record([slug.as_ref()])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn slug_is_last_segment() {
        let entry = CatalogEntry {
            position: "Staff Finance".into(),
            link: "https://alumni.petra.ac.id/vacancy/staff-finance-123/".into(),
        };
        assert_eq!(entry.slug(), "staff-finance-123");
        assert_eq!(entry.to_vacancy().position_name, "Staff Finance");
    }

    #[test]
    fn reads_catalog_and_skips_blank_rows() {
        let csv = "Position,Link\nTeacher,https://a/vacancy/teacher-1\n,\nNurse,https://a/vacancy/nurse-2\n";
        let catalog = JobCatalog::from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[1].slug(), "nurse-2");
    }

    #[test]
    fn slug_export_has_header() {
        let mut out = Vec::new();
        write_slugs(&mut out, &["a", "b"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "slug\na\nb\n");
    }
}
