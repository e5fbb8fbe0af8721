//! Run configuration.
//!
//! Resolved in layers: built-in defaults, then environment variables (a
//! `.env` file is honoured), then command-line flags applied by the binary.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::catalog::{CatalogSource, GLOTTOLOG_LANGUAGES_URL};
use crate::error::ConfigError;
use crate::languages::DEFAULT_DONOR;
use crate::metadata::DEFAULT_TEMPLATE_FILE;
use crate::transform::DonorFields;
use crate::validation::cldf::DEFAULT_PROGRAM;
use crate::validation::report::{DEFAULT_BADGE_IMAGE, DEFAULT_BADGE_LINK};
use crate::validation::{Badge, BuiltinValidator, CldfCommand, Validator};

pub const ENV_INPUT_DIRS: &str = "BORROWINGS_INPUT_DIRS";
pub const ENV_OUTPUT_DIR: &str = "BORROWINGS_OUTPUT_DIR";
pub const ENV_TEMPLATE: &str = "BORROWINGS_TEMPLATE";
pub const ENV_CATALOG: &str = "BORROWINGS_CATALOG";
pub const ENV_LOG_FILE: &str = "BORROWINGS_LOG_FILE";
pub const ENV_VALIDATOR: &str = "BORROWINGS_VALIDATOR";
pub const ENV_CLDF_PROGRAM: &str = "BORROWINGS_CLDF_PROGRAM";
pub const ENV_DONOR: &str = "BORROWINGS_DONOR";
pub const ENV_BLANK_DONOR_FIELDS: &str = "BORROWINGS_BLANK_DONOR_FIELDS";
pub const ENV_BADGE_IMAGE: &str = "BORROWINGS_BADGE_IMAGE";
pub const ENV_BADGE_LINK: &str = "BORROWINGS_BADGE_LINK";

/// Which validator judges the datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ValidatorKind {
    /// The external `cldf` tool.
    #[default]
    Cldf,
    /// The offline schema and table checks.
    Builtin,
}

impl FromStr for ValidatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cldf" => Ok(ValidatorKind::Cldf),
            "builtin" => Ok(ValidatorKind::Builtin),
            other => Err(ConfigError::UnknownValidator(other.to_string())),
        }
    }
}

/// Everything a batch run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Source collections, processed in this order.
    pub input_dirs: Vec<PathBuf>,
    /// Parent of the per-language dataset folders.
    pub output_dir: PathBuf,
    /// Metadata template.
    pub template: PathBuf,
    /// Catalog URL or file path.
    pub catalog: String,
    /// Shared diagnostic log.
    pub log_file: PathBuf,
    pub validator: ValidatorKind,
    /// Command line of the external validator.
    pub cldf_program: String,
    /// Donor language name as listed in the catalog.
    pub donor: String,
    /// Leave donor IPA and gloss cells empty.
    pub blank_donor_fields: bool,
    pub badge_image: String,
    pub badge_link: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dirs: vec![PathBuf::from("../raw2"), PathBuf::from("../raw1")],
            output_dir: PathBuf::from("."),
            template: PathBuf::from(DEFAULT_TEMPLATE_FILE),
            catalog: GLOTTOLOG_LANGUAGES_URL.to_string(),
            log_file: PathBuf::from("cldf.log"),
            validator: ValidatorKind::default(),
            cldf_program: DEFAULT_PROGRAM.to_string(),
            donor: DEFAULT_DONOR.to_string(),
            blank_donor_fields: false,
            badge_image: DEFAULT_BADGE_IMAGE.to_string(),
            badge_link: DEFAULT_BADGE_LINK.to_string(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

impl Config {
    /// Defaults overridden by the process environment and `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `var` returns.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(dirs) = var(ENV_INPUT_DIRS) {
            config.input_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(dir) = var(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(template) = var(ENV_TEMPLATE) {
            config.template = PathBuf::from(template);
        }
        if let Some(catalog) = var(ENV_CATALOG) {
            config.catalog = catalog;
        }
        if let Some(log_file) = var(ENV_LOG_FILE) {
            config.log_file = PathBuf::from(log_file);
        }
        if let Some(kind) = var(ENV_VALIDATOR) {
            config.validator = kind.parse()?;
        }
        if let Some(program) = var(ENV_CLDF_PROGRAM) {
            config.cldf_program = program;
        }
        if let Some(donor) = var(ENV_DONOR) {
            config.donor = donor;
        }
        if let Some(blank) = var(ENV_BLANK_DONOR_FIELDS) {
            config.blank_donor_fields = parse_bool(ENV_BLANK_DONOR_FIELDS, &blank)?;
        }
        if let Some(image) = var(ENV_BADGE_IMAGE) {
            config.badge_image = image;
        }
        if let Some(link) = var(ENV_BADGE_LINK) {
            config.badge_link = link;
        }

        Ok(config)
    }

    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::parse(&self.catalog)
    }

    pub fn donor_fields(&self) -> DonorFields {
        if self.blank_donor_fields {
            DonorFields::Blank
        } else {
            DonorFields::Etymon
        }
    }

    pub fn badge(&self) -> Badge {
        Badge::new(&self.badge_image, &self.badge_link)
    }

    pub fn build_validator(&self) -> Box<dyn Validator> {
        match self.validator {
            ValidatorKind::Cldf => Box::new(CldfCommand::from_command_line(&self.cldf_program)),
            ValidatorKind::Builtin => Box::new(BuiltinValidator::new()),
        }
    }
}
