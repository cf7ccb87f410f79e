// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::extractors::ScrapeReport;
use crate::models::{CompanyProfile, Profile};
use crate::utils::error::StorageError;

pub const PERSON_SCHEMA: &str = "profile_extractor.person.v1";
pub const COMPANY_SCHEMA: &str = "profile_extractor.company.v1";

/// One exported document: the record plus how it was obtained.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a, T> {
    pub schema: &'static str,
    pub source_url: &'a str,
    pub extracted_at: String,
    #[serde(flatten)]
    pub report: &'a ScrapeReport,
    pub record: &'a T,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Directory for annotated debug snapshots.
    pub fn debug_dir(&self) -> PathBuf {
        self.base_dir.join("debug")
    }

    /// Writes `<base>/person/<slug>.json`.
    pub fn save_person(&self, profile: &Profile, report: &ScrapeReport) -> Result<PathBuf, StorageError> {
        self.save("person", PERSON_SCHEMA, &profile.linkedin_url, profile, report)
    }

    /// Writes `<base>/company/<slug>.json`.
    pub fn save_company(&self, company: &CompanyProfile, report: &ScrapeReport) -> Result<PathBuf, StorageError> {
        self.save("company", COMPANY_SCHEMA, &company.linkedin_url, company, report)
    }

    fn save<T: Serialize>(
        &self,
        kind: &str,
        schema: &'static str,
        source_url: &str,
        record: &T,
        report: &ScrapeReport,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(kind);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let document = ExportDocument {
            schema,
            source_url,
            extracted_at: chrono::Utc::now().to_rfc3339(),
            report,
            record,
        };
        let json = serde_json::to_string_pretty(&document)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let file_path = target_dir.join(format!("{}.json", slug(source_url)));
        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        file.write_all(json.as_bytes()).map_err(StorageError::IoError)?;

        tracing::info!("Saved {} record to {}", kind, file_path.display());
        Ok(file_path)
    }
}

/// Last non-empty path segment of `url`, reduced to filename-safe characters.
pub fn slug(url: &str) -> String {
    let path = url::Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string());
    let segment = path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or("");
    let slug: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if slug.is_empty() {
        "index".to_string()
    } else {
        slug
    }
}
