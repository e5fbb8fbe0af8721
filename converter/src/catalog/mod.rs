//! Reference language catalog (Glottolog `languages.csv`).
//!
//! The catalog is read-only and identical for every language of a run, so
//! [`LanguageCatalog::shared`] fetches it once per process and keeps it.
//! Lookups are exact, case-sensitive `Name` matches.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::error::{CatalogError, CatalogResult};
use crate::logs::{log_info, log_success};

/// Glottolog's CLDF language table.
pub const GLOTTOLOG_LANGUAGES_URL: &str =
    "https://raw.githubusercontent.com/glottolog/glottolog-cldf/master/cldf/languages.csv";

/// Column matched by [`CatalogLookup::lookup`].
pub const NAME_COLUMN: &str = "Name";

/// One catalog row, aligned with the catalog's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

impl LanguageRecord {
    /// Value of a column, if the catalog has it.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }
}

/// Name-based access to language metadata.
pub trait CatalogLookup {
    /// Catalog columns, in source order.
    fn columns(&self) -> &[String];

    /// Record whose `Name` is exactly `name`.
    fn lookup(&self, name: &str) -> Option<LanguageRecord>;
}

/// Where to read the catalog from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Url(String),
    File(PathBuf),
}

impl CatalogSource {
    /// `http(s)://` locations are URLs, anything else a file path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            CatalogSource::Url(location.to_string())
        } else {
            CatalogSource::File(PathBuf::from(location))
        }
    }
}

impl Default for CatalogSource {
    fn default() -> Self {
        CatalogSource::Url(GLOTTOLOG_LANGUAGES_URL.to_string())
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogSource::Url(url) => write!(f, "{}", url),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

static SHARED_CATALOG: OnceCell<LanguageCatalog> = OnceCell::const_new();

/// In-memory language table.
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Name -> first row carrying it
    by_name: HashMap<String, usize>,
}

impl LanguageCatalog {
    /// Parse catalog CSV text.
    pub fn from_csv_str(content: &str) -> CatalogResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let name_idx = columns
            .iter()
            .position(|c| c == NAME_COLUMN)
            .ok_or_else(|| CatalogError::MissingColumn(NAME_COLUMN.to_string()))?;

        let mut rows = Vec::new();
        let mut by_name = HashMap::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(columns.len(), String::new());

            by_name.entry(row[name_idx].clone()).or_insert(rows.len());
            rows.push(row);
        }

        Ok(Self {
            columns,
            rows,
            by_name,
        })
    }

    /// Fetch and parse a catalog.
    pub async fn load(source: &CatalogSource) -> CatalogResult<Self> {
        log_info(format!("Loading language catalog from {}", source));

        let content = match source {
            CatalogSource::Url(url) => {
                let response = reqwest::get(url).await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(CatalogError::Status {
                        status: status.as_u16(),
                        url: url.clone(),
                    });
                }
                response.text().await?
            }
            CatalogSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogError::Io {
                    path: path.clone(),
                    source,
                })?,
        };

        let catalog = Self::from_csv_str(&content)?;
        log_success(format!("Catalog has {} languages", catalog.len()));
        Ok(catalog)
    }

    /// Process-wide catalog, loaded on first call.
    ///
    /// Later calls return the cached catalog whatever `source` they pass.
    pub async fn shared(source: &CatalogSource) -> CatalogResult<&'static LanguageCatalog> {
        SHARED_CATALOG.get_or_try_init(|| Self::load(source)).await
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CatalogLookup for LanguageCatalog {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn lookup(&self, name: &str) -> Option<LanguageRecord> {
        self.by_name.get(name).map(|&idx| LanguageRecord {
            columns: self.columns.clone(),
            values: self.rows[idx].clone(),
        })
    }
}
