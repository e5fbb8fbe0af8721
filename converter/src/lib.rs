//! # Borrowings - English loanword lists to CLDF datasets
//!
//! Turns per-language borrowing lists (one CSV per recipient language) into
//! CLDF Wordlist datasets: a forms table, a borrowings table, a languages
//! table, a metadata descriptor and, for valid datasets, a rendered report.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ <lang>.csv  │────▶│   Parser    │────▶│  Transform  │────▶│ forms.csv   │
//! │ (raw2,raw1) │     │  (auto-enc) │     │ (forms+links)│    │ borrowings  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!        ┌──────────────┐   ┌──────────────┐   ┌──────────────┐      │
//!        │  readme.md   │◀──│  Validation  │◀──│ metadata.json│◀─────┘
//!        │  or cldf.log │   │ (cldf/builtin)│  │ languages.csv│◀── Catalog
//!        └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use borrowings::{BatchDriver, Config, DatasetBuilder, DiagnosticLog,
//!     LanguageCatalog, MetadataTemplate, Reporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let template = MetadataTemplate::load(&config.template)?;
//!     let catalog = LanguageCatalog::shared(&config.catalog_source()).await?;
//!     let validator = config.build_validator();
//!     let log = DiagnosticLog::new(&config.log_file);
//!
//!     let reporter = Reporter::new(&validator, &log).with_badge(config.badge());
//!     let builder = DatasetBuilder::new(&template, catalog, reporter);
//!     let driver = BatchDriver::new(builder, config.input_dirs.clone(), &config.output_dir, &log);
//!     let summary = driver.run()?;
//!     println!("{} datasets converted", summary.converted());
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Console log broadcaster and the diagnostic log file
//! - [`config`] - Defaults, environment and `.env` configuration
//! - [`models`] - Source rows and table rows (Form, Borrowing)
//! - [`parser`] - Source CSV parsing with auto-detection
//! - [`transform`] - Form extraction and borrowing links
//! - [`catalog`] - Reference language catalog (Glottolog)
//! - [`languages`] - Languages table
//! - [`metadata`] - Metadata template and per-language descriptors
//! - [`output`] - Table writers and dataset file names
//! - [`validation`] - Validators and the report writer
//! - [`dataset`] - One-language conversion
//! - [`batch`] - Batch conversion over source collections

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Reference data
pub mod catalog;
pub mod languages;
pub mod metadata;

// Output
pub mod output;

// Validation
pub mod validation;

// Orchestration
pub mod batch;
pub mod dataset;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CatalogError,
    ConfigError,
    ConvertError,
    ConvertResult,
    MetadataError,
    SourceError,
    ValidatorError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Borrowing, Form, FormOrigin, SourceRow, TableRow};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_source_bytes,
    read_source_file,
    SourceFile,
};

// =============================================================================
// Re-exports - Transformation
// =============================================================================

pub use transform::{extract_forms, link_borrowings, DonorFields, DonorLink, FormTable};

// =============================================================================
// Re-exports - Catalog, languages and metadata
// =============================================================================

pub use catalog::{CatalogLookup, CatalogSource, LanguageCatalog, LanguageRecord};
pub use languages::{build_language_table, LanguageTable};
pub use metadata::{MetadataDescriptor, MetadataTemplate};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    Badge,
    BuiltinValidator,
    CldfCommand,
    ReportOutcome,
    Reporter,
    Validator,
    Verdict,
};

// =============================================================================
// Re-exports - Orchestration
// =============================================================================

pub use batch::{BatchDriver, BatchSummary, LanguageOutcome, LanguageResult};
pub use config::{Config, ValidatorKind};
pub use dataset::{language_name, Conversion, DatasetBuilder};
pub use logs::DiagnosticLog;
