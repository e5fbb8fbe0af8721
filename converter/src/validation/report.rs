//! Report writing for validated datasets.

use std::path::{Path, PathBuf};

use super::{Validator, Verdict};
use crate::error::{ConvertError, ConvertResult};
use crate::logs::{log_error, log_success, DiagnosticLog};
use crate::output::{METADATA_FILE, REPORT_FILE};

/// Badge image shown at the top of every report.
pub const DEFAULT_BADGE_IMAGE: &str =
    "https://raw.githubusercontent.com/martino-vic/en_borrowings/master/cldf/badge.svg";

/// Where the badge links to.
pub const DEFAULT_BADGE_LINK: &str =
    "https://github.com/martino-vic/en_borrowings/blob/master/cldf/dfs2cldf.py#L53";

/// Validation badge and provenance link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub image: String,
    pub link: String,
}

impl Badge {
    pub fn new(image: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            link: link.into(),
        }
    }

    /// Markdown header placed above the rendered metadata.
    pub fn render(&self) -> String {
        format!("[![CLDF validation]({})]({})\n\n", self.image, self.link)
    }
}

impl Default for Badge {
    fn default() -> Self {
        Self::new(DEFAULT_BADGE_IMAGE, DEFAULT_BADGE_LINK)
    }
}

/// What the reporter did with a verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Dataset valid, report written here.
    Written(PathBuf),
    /// Dataset invalid, diagnostic appended to the log.
    Logged { diagnostic: String },
}

impl ReportOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ReportOutcome::Written(_))
    }
}

/// Validates a dataset folder and writes its report or logs the failure.
pub struct Reporter<'a> {
    validator: &'a dyn Validator,
    log: &'a DiagnosticLog,
    badge: Badge,
}

impl<'a> Reporter<'a> {
    pub fn new(validator: &'a dyn Validator, log: &'a DiagnosticLog) -> Self {
        Self {
            validator,
            log,
            badge: Badge::default(),
        }
    }

    pub fn with_badge(mut self, badge: Badge) -> Self {
        self.badge = badge;
        self
    }

    /// Validate `dataset_dir/metadata.json` and act on the verdict.
    ///
    /// An invalid dataset is not an error: any stale report is removed and the
    /// diagnostic goes to the shared log.
    pub fn report(&self, dataset_dir: &Path) -> ConvertResult<ReportOutcome> {
        let metadata = dataset_dir.join(METADATA_FILE);
        let report_path = dataset_dir.join(REPORT_FILE);

        match self.validator.validate(&metadata)? {
            Verdict::Valid { rendered } => {
                let content = format!("{}{}", self.badge.render(), rendered);
                std::fs::write(&report_path, content).map_err(|source| ConvertError::Write {
                    path: report_path.clone(),
                    source,
                })?;
                log_success(format!("Valid CLDF, report written to {}", report_path.display()));
                Ok(ReportOutcome::Written(report_path))
            }
            Verdict::Invalid { diagnostic } => {
                if report_path.exists() {
                    std::fs::remove_file(&report_path).map_err(|source| ConvertError::Write {
                        path: report_path.clone(),
                        source,
                    })?;
                }
                self.log.append(&diagnostic).map_err(|source| ConvertError::Write {
                    path: self.log.path().to_path_buf(),
                    source,
                })?;
                log_error(format!(
                    "{} rejected {}, see {}",
                    self.validator.name(),
                    dataset_dir.display(),
                    self.log.path().display()
                ));
                Ok(ReportOutcome::Logged { diagnostic })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidatorResult;
    use tempfile::tempdir;

    struct FixedVerdict(Verdict);

    impl Validator for FixedVerdict {
        fn name(&self) -> &str {
            "fixed"
        }

        fn validate(&self, _metadata: &Path) -> ValidatorResult<Verdict> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_valid_writes_badge_and_rendering() {
        let dir = tempdir().unwrap();
        let log = DiagnosticLog::new(dir.path().join("cldf.log"));
        let validator = FixedVerdict(Verdict::Valid { rendered: "# Hungarian\n".into() });

        let outcome = Reporter::new(&validator, &log).report(dir.path()).unwrap();

        let report = dir.path().join(REPORT_FILE);
        assert_eq!(outcome, ReportOutcome::Written(report.clone()));
        let content = std::fs::read_to_string(report).unwrap();
        assert!(content.starts_with("[![CLDF validation]("));
        assert!(content.ends_with(")\n\n# Hungarian\n"));
        assert!(!log.path().exists());
    }

    #[test]
    fn test_invalid_logs_and_writes_no_report() {
        let dir = tempdir().unwrap();
        let log = DiagnosticLog::new(dir.path().join("cldf.log"));
        let validator = FixedVerdict(Verdict::Invalid { diagnostic: "forms.csv:2 bad".into() });

        let outcome = Reporter::new(&validator, &log).report(dir.path()).unwrap();

        assert!(!outcome.is_valid());
        assert!(!dir.path().join(REPORT_FILE).exists());
        let logged = std::fs::read_to_string(log.path()).unwrap();
        assert!(logged.starts_with("forms.csv:2 bad "));
    }

    #[test]
    fn test_invalid_removes_stale_report() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(REPORT_FILE), "old").unwrap();
        let log = DiagnosticLog::new(dir.path().join("cldf.log"));
        let validator = FixedVerdict(Verdict::Invalid { diagnostic: "bad".into() });

        Reporter::new(&validator, &log).report(dir.path()).unwrap();
        assert!(!dir.path().join(REPORT_FILE).exists());
    }

    #[test]
    fn test_custom_badge() {
        let badge = Badge::new("img.svg", "https://example.org");
        assert_eq!(badge.render(), "[![CLDF validation](img.svg)](https://example.org)\n\n");
    }
}
