//! Document folder: upload, list, delete and load for indexing
//!
//! Documents are plain files under one directory, read recursively.
//! Markdown and text files become one document each; every CSV row becomes
//! its own document. Hidden entries are ignored.

use crate::error::{DocsError, DocsResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const ALLOWED_EXTENSIONS: &[&str] = &["md", "txt", "csv"];

/// A unit of loaded text with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the store root, `/`-separated; CSV rows add `#row`.
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

impl StoredFile {
    pub fn size_mb(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Clone)]
pub struct DocStore {
    dir: PathBuf,
    max_file_bytes: u64,
}

impl DocStore {
    /// Open (creating if needed) the folder.
    pub fn open(dir: impl Into<PathBuf>) -> DocsResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, max_file_bytes: 2_000_000 })
    }

    pub fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = max_file_bytes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `path` into the store under its file name. An existing file of
    /// the same name is never replaced.
    pub fn add_file(&self, path: &Path) -> DocsResult<String> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DocsError::InvalidName(path.display().to_string()))?
            .to_string();
        let bytes = fs::read(path)?;
        self.add_bytes(&name, &bytes)?;
        Ok(name)
    }

    pub fn add_bytes(&self, name: &str, bytes: &[u8]) -> DocsResult<()> {
        let target = self.resolve(name)?;
        if !is_supported(&target) {
            return Err(DocsError::Unsupported(name.to_string()));
        }
        if target.exists() {
            return Err(DocsError::AlreadyExists(name.to_string()));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, bytes)?;
        info!("Stored {} ({} bytes) in {}", name, bytes.len(), self.dir.display());
        Ok(())
    }

    pub fn remove(&self, name: &str) -> DocsResult<()> {
        let target = self.resolve(name)?;
        if !target.is_file() {
            return Err(DocsError::NotFound(name.to_string()));
        }
        fs::remove_file(&target)?;
        info!("Removed {}", name);
        Ok(())
    }

    /// Every visible file, sorted by name.
    pub fn list(&self) -> DocsResult<Vec<StoredFile>> {
        let mut files = Vec::new();
        for path in self.walk()? {
            let size = fs::metadata(&path)?.len();
            files.push(StoredFile { name: self.relative(&path), size });
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    /// Read every supported file into documents. Unreadable or oversized
    /// files are skipped with a warning.
    pub fn load(&self) -> DocsResult<Vec<Document>> {
        let mut documents = Vec::new();
        let mut paths = self.walk()?;
        paths.sort();

        for path in paths {
            if !is_supported(&path) {
                debug!("Skipping {}", path.display());
                continue;
            }
            let size = fs::metadata(&path)?.len();
            if size > self.max_file_bytes {
                warn!("Skipping {}: {} bytes exceeds {}", path.display(), size, self.max_file_bytes);
                continue;
            }
            let source = self.relative(&path);
            let loaded = match extension(&path).as_deref() {
                Some("csv") => csv_rows(&path, &source),
                _ => fs::read_to_string(&path)
                    .map(|text| vec![Document { source: source.clone(), text }])
                    .map_err(DocsError::from),
            };
            match loaded {
                Ok(docs) => documents.extend(docs.into_iter().filter(|d| !d.text.trim().is_empty())),
                Err(e) => warn!("Skipping {}: {}", source, e),
            }
        }
        info!("Loaded {} documents from {}", documents.len(), self.dir.display());
        Ok(documents)
    }

    /// Store path for a relative name; absolute paths and `..` are refused.
    fn resolve(&self, name: &str) -> DocsResult<PathBuf> {
        let relative = Path::new(name);
        let safe = !name.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, std::path::Component::Normal(_)));
        if !safe {
            return Err(DocsError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(relative))
    }

    fn relative(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.dir).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn walk(&self) -> DocsResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![self.dir.clone()];
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                let path = entry.path();
                let kind = entry.file_type()?;
                if kind.is_dir() {
                    pending.push(path);
                } else if kind.is_file() {
                    files.push(path);
                }
            }
        }
        Ok(files)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().and_then(|e| e.to_str()).map(str::to_lowercase)
}

fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
}

/// One document per data row, fields joined with `, `.
fn csv_rows(path: &Path, source: &str) -> DocsResult<Vec<Document>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let text = record.iter().map(str::trim).filter(|f| !f.is_empty()).collect::<Vec<_>>().join(", ");
        rows.push(Document { source: format!("{}#{}", source, i + 1), text });
    }
    Ok(rows)
}
