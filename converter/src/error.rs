//! Error types for the CLDF conversion pipeline.
//!
//! One error enum per stage, all funnelled into [`ConvertError`]:
//!
//! - [`SourceError`] - reading a per-language borrowing list
//! - [`CatalogError`] - fetching or querying the reference language catalog
//! - [`MetadataError`] - loading the metadata template (always fatal)
//! - [`ValidatorError`] - the validator itself could not run
//! - [`ConfigError`] - bad configuration values
//! - [`ConvertError`] - top-level, per-language conversion errors
//!
//! An *invalid dataset* is not an error: it is a
//! [`Verdict::Invalid`](crate::validation::Verdict::Invalid) and gets logged.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Source CSV Errors
// =============================================================================

/// Errors while reading a per-language source CSV.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read the file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes could not be decoded.
    #[error("Failed to decode source as {0}")]
    Encoding(String),

    /// Malformed CSV.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// No header line at all.
    #[error("Source file has no header")]
    NoHeader,
}

// =============================================================================
// Catalog Errors
// =============================================================================

/// Errors from the reference language catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("Catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Catalog server answered with a non-success status.
    #[error("Catalog server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Local catalog file could not be read.
    #[error("Failed to read catalog '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed catalog CSV.
    #[error("Invalid catalog CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Catalog lacks the column used for lookups.
    #[error("Catalog has no '{0}' column")]
    MissingColumn(String),

    /// The donor language has no catalog entry.
    #[error("Donor language '{0}' not found in catalog")]
    DonorNotFound(String),
}

// =============================================================================
// Metadata Errors
// =============================================================================

/// Errors loading or writing the metadata descriptor.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Template (or output) file IO failed.
    #[error("Metadata IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template is not valid JSON.
    #[error("Malformed metadata template: {0}")]
    Json(#[from] serde_json::Error),

    /// Template parses but lacks a required field.
    #[error("Invalid metadata template: {0}")]
    InvalidTemplate(String),
}

// =============================================================================
// Validator Errors
// =============================================================================

/// The validator could not produce a verdict.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// External validator process could not be started.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor or table could not be read.
    #[error("Validator IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Embedded schema failed to compile.
    #[error("Invalid embedded schema: {0}")]
    Schema(String),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Unknown validator kind.
    #[error("Unknown validator '{0}' (expected 'cldf' or 'builtin')")]
    UnknownValidator(String),

    /// A boolean setting could not be parsed.
    #[error("Invalid boolean for {key}: '{value}'")]
    InvalidBool { key: String, value: String },
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Per-language conversion errors.
///
/// Returned by [`crate::dataset::DatasetBuilder::convert`]; the batch driver
/// turns them into [`crate::batch::LanguageOutcome::Failed`].
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source CSV error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Catalog error.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Metadata error.
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Validator error.
    #[error("Validator error: {0}")]
    Validator(#[from] ValidatorError),

    /// Writing an output table failed.
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing an output table failed.
    #[error("Failed to write table: {0}")]
    Csv(#[from] csv::Error),

    /// Source file name yields no language name.
    #[error("Cannot derive a language name from '{0}'")]
    NoLanguageName(PathBuf),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source reading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Result type for validator runs.
pub type ValidatorResult<T> = Result<T, ValidatorError>;

/// Result type for per-language conversion.
pub type ConvertResult<T> = Result<T, ConvertError>;
