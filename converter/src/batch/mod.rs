//! Batch conversion over source collections.
//!
//! Collections are walked in the configured order; inside a collection the
//! `*.csv` files are taken in name order. A language whose output folder
//! already exists is skipped, so the first collection that lists a language
//! wins and reruns are incremental. One language failing never stops the
//! batch.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::dataset::{language_name, Conversion, DatasetBuilder};
use crate::error::{ConvertError, ConvertResult};
use crate::logs::{log_error, log_info, log_success, log_warning, DiagnosticLog};
use crate::validation::ReportOutcome;

/// What happened to one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageOutcome {
    /// Output folder existed before this run; nothing was touched.
    AlreadyDone,
    /// Dataset written (valid or not, see [`Conversion::report`]).
    Converted(Conversion),
    /// Conversion aborted with this error.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageResult {
    pub language: String,
    pub source: PathBuf,
    pub outcome: LanguageOutcome,
}

/// Per-language results of a batch run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub results: Vec<LanguageResult>,
}

impl BatchSummary {
    fn count(&self, pred: impl Fn(&LanguageOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, LanguageOutcome::AlreadyDone))
    }

    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, LanguageOutcome::Converted(_)))
    }

    pub fn valid(&self) -> usize {
        self.count(|o| matches!(o, LanguageOutcome::Converted(c) if c.report.is_valid()))
    }

    pub fn invalid(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                LanguageOutcome::Converted(c) if matches!(c.report, ReportOutcome::Logged { .. })
            )
        })
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, LanguageOutcome::Failed(_)))
    }

    /// Result for `language`, if it was seen.
    pub fn get(&self, language: &str) -> Option<&LanguageResult> {
        self.results.iter().find(|r| r.language == language)
    }
}

/// Runs a [`DatasetBuilder`] over every source file of the collections.
pub struct BatchDriver<'a> {
    builder: DatasetBuilder<'a>,
    collections: Vec<PathBuf>,
    output_root: PathBuf,
    log: &'a DiagnosticLog,
}

impl<'a> BatchDriver<'a> {
    pub fn new(
        builder: DatasetBuilder<'a>,
        collections: Vec<PathBuf>,
        output_root: impl Into<PathBuf>,
        log: &'a DiagnosticLog,
    ) -> Self {
        Self {
            builder,
            collections,
            output_root: output_root.into(),
            log,
        }
    }

    /// Source files in processing order.
    ///
    /// Missing or unreadable collections are reported and skipped.
    pub fn source_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for collection in &self.collections {
            let entries = match fs::read_dir(collection) {
                Ok(entries) => entries,
                Err(e) => {
                    log_warning(format!("Skipping collection {}: {}", collection.display(), e));
                    continue;
                }
            };

            let mut csvs: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_csv(path))
                .collect();
            csvs.sort();
            files.extend(csvs);
        }
        files
    }

    /// Convert one source file unless its language is already done.
    pub fn process(&self, source: &Path) -> LanguageResult {
        match language_name(source) {
            Some(language) => self.process_as(source, &language),
            None => {
                let err = ConvertError::NoLanguageName(source.to_path_buf());
                self.failed(String::new(), source, err)
            }
        }
    }

    /// Like [`process`](Self::process) with an explicit language name.
    pub fn process_as(&self, source: &Path, language: &str) -> LanguageResult {
        let language = language.to_string();
        let output_dir = self.output_root.join(&language);
        match fs::create_dir(&output_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log_warning(format!("folder {} already exists", language));
                return LanguageResult {
                    language,
                    source: source.to_path_buf(),
                    outcome: LanguageOutcome::AlreadyDone,
                };
            }
            Err(source_err) => {
                let err = ConvertError::Write {
                    path: output_dir,
                    source: source_err,
                };
                return self.failed(language, source, err);
            }
        }

        log_info(format!("🔄 Converting {}", language));
        match self.builder.convert(source, &language, &output_dir) {
            Ok(conversion) => LanguageResult {
                language,
                source: source.to_path_buf(),
                outcome: LanguageOutcome::Converted(conversion),
            },
            Err(err) => self.failed(language, source, err),
        }
    }

    /// Process every source file of every collection.
    ///
    /// Only failing to create the output root aborts the run.
    pub fn run(&self) -> ConvertResult<BatchSummary> {
        fs::create_dir_all(&self.output_root).map_err(|source| ConvertError::Write {
            path: self.output_root.clone(),
            source,
        })?;

        let mut summary = BatchSummary::default();
        for source in self.source_files() {
            summary.results.push(self.process(&source));
        }

        log_success(format!(
            "Batch done: {} converted ({} valid, {} invalid), {} already present, {} failed",
            summary.converted(),
            summary.valid(),
            summary.invalid(),
            summary.skipped(),
            summary.failed()
        ));
        Ok(summary)
    }

    fn failed(&self, language: String, source: &Path, err: ConvertError) -> LanguageResult {
        let message = format!("{}: {}", source.display(), err);
        log_error(format!("Failed to convert {}", message));
        if let Err(e) = self.log.append(&message) {
            log_warning(format!("Could not write {}: {}", self.log.path().display(), e));
        }
        LanguageResult {
            language,
            source: source.to_path_buf(),
            outcome: LanguageOutcome::Failed(err.to_string()),
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LanguageCatalog;
    use crate::error::ValidatorResult;
    use crate::metadata::MetadataTemplate;
    use crate::output::{FORMS_FILE, REPORT_FILE};
    use crate::validation::{Reporter, Validator, Verdict};
    use std::cell::Cell;
    use tempfile::{tempdir, TempDir};

    const TEMPLATE: &str = include_str!("../../metadata_template.json");
    const CATALOG: &str = "\
ID,Name,Macroarea,Glottocode,ISO639P3code
stan1293,English,Eurasia,stan1293,eng
hung1274,Hungarian,Eurasia,hung1274,hun
finn1318,Finnish,Eurasia,finn1318,fin
";
    const SOURCE: &str =
        "L2_orth,L2_ipa,L2_gloss,L2_etym\nbusz,/bus/,bus,bus\nház,/haːz/,house,\n";

    /// Counts calls; rejects datasets whose folder name is listed.
    struct CountingValidator {
        calls: Cell<usize>,
        reject: Vec<&'static str>,
    }

    impl CountingValidator {
        fn new(reject: Vec<&'static str>) -> Self {
            Self { calls: Cell::new(0), reject }
        }
    }

    impl Validator for CountingValidator {
        fn name(&self) -> &str {
            "counting"
        }

        fn validate(&self, metadata: &Path) -> ValidatorResult<Verdict> {
            self.calls.set(self.calls.get() + 1);
            let folder = metadata
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if self.reject.contains(&folder) {
                Ok(Verdict::Invalid {
                    diagnostic: format!("{} is broken", folder),
                })
            } else {
                Ok(Verdict::Valid { rendered: format!("# {}\n", folder) })
            }
        }
    }

    struct Fixture {
        dir: TempDir,
        template: MetadataTemplate,
        catalog: LanguageCatalog,
        log: DiagnosticLog,
    }

    impl Fixture {
        fn new(files: &[(&str, &str, &str)]) -> Self {
            let dir = tempdir().unwrap();
            for (collection, name, content) in files {
                let folder = dir.path().join(collection);
                fs::create_dir_all(&folder).unwrap();
                fs::write(folder.join(name), content).unwrap();
            }
            let log = DiagnosticLog::new(dir.path().join("cldf.log"));
            Self {
                template: MetadataTemplate::parse(TEMPLATE).unwrap(),
                catalog: LanguageCatalog::from_csv_str(CATALOG).unwrap(),
                log,
                dir,
            }
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("cldf")
        }

        fn run(&self, validator: &CountingValidator) -> BatchSummary {
            let reporter = Reporter::new(validator, &self.log);
            let builder = DatasetBuilder::new(&self.template, &self.catalog, reporter);
            let collections = vec![self.dir.path().join("raw2"), self.dir.path().join("raw1")];
            BatchDriver::new(builder, collections, self.out(), &self.log)
                .run()
                .unwrap()
        }
    }

    #[test]
    fn test_collection_order_and_duplicates() {
        let fixture = Fixture::new(&[
            ("raw1", "Hungarian.csv", "L2_orth,L2_ipa,L2_gloss,L2_etym\nold,/old/,old,old\n"),
            ("raw1", "Finnish.csv", SOURCE),
            ("raw2", "Hungarian.csv", SOURCE),
        ]);
        let validator = CountingValidator::new(vec![]);
        let summary = fixture.run(&validator);

        let order: Vec<&str> = summary.results.iter().map(|r| r.language.as_str()).collect();
        assert_eq!(order, vec!["Hungarian", "Finnish", "Hungarian"]);
        assert!(matches!(summary.results[0].outcome, LanguageOutcome::Converted(_)));
        assert_eq!(summary.results[2].outcome, LanguageOutcome::AlreadyDone);
        assert_eq!(summary.converted(), 2);
        assert_eq!(summary.skipped(), 1);

        let forms = fs::read_to_string(fixture.out().join("Hungarian").join(FORMS_FILE)).unwrap();
        assert!(forms.contains("busz"));
        assert!(!forms.contains("old"));
    }

    #[test]
    fn test_rerun_is_noop() {
        let fixture = Fixture::new(&[("raw1", "Hungarian.csv", SOURCE)]);
        let first = CountingValidator::new(vec![]);
        fixture.run(&first);
        assert_eq!(first.calls.get(), 1);

        let forms_path = fixture.out().join("Hungarian").join(FORMS_FILE);
        let before = fs::read_to_string(&forms_path).unwrap();

        let second = CountingValidator::new(vec![]);
        let summary = fixture.run(&second);
        assert_eq!(second.calls.get(), 0);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.converted(), 0);
        assert_eq!(fs::read_to_string(&forms_path).unwrap(), before);
    }

    #[test]
    fn test_invalid_dataset_is_logged_and_batch_continues() {
        let fixture = Fixture::new(&[
            ("raw1", "Finnish.csv", SOURCE),
            ("raw1", "Hungarian.csv", SOURCE),
        ]);
        let validator = CountingValidator::new(vec!["Finnish"]);
        let summary = fixture.run(&validator);

        assert_eq!(summary.invalid(), 1);
        assert_eq!(summary.valid(), 1);
        assert!(!fixture.out().join("Finnish").join(REPORT_FILE).exists());
        assert!(fixture.out().join("Hungarian").join(REPORT_FILE).exists());

        let log = fs::read_to_string(fixture.log.path()).unwrap();
        assert!(log.contains("Finnish is broken"));
    }

    #[test]
    fn test_failed_source_does_not_stop_batch() {
        let fixture = Fixture::new(&[
            ("raw1", "Finnish.csv", "orth,ipa\nx,y\n"),
            ("raw1", "Hungarian.csv", SOURCE),
        ]);
        let validator = CountingValidator::new(vec![]);
        let summary = fixture.run(&validator);

        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.converted(), 1);
        match &summary.get("Finnish").unwrap().outcome {
            LanguageOutcome::Failed(msg) => assert!(msg.contains("L2_")),
            other => panic!("expected failure, got {:?}", other),
        }

        let log = fs::read_to_string(fixture.log.path()).unwrap();
        assert!(log.contains("Finnish.csv"));
    }

    #[test]
    fn test_unlisted_language_converts() {
        let fixture = Fixture::new(&[("raw1", "northsami.csv", SOURCE)]);
        let validator = CountingValidator::new(vec![]);
        let summary = fixture.run(&validator);

        match &summary.get("northsami").unwrap().outcome {
            LanguageOutcome::Converted(conversion) => assert!(!conversion.recipient_listed),
            other => panic!("expected conversion, got {:?}", other),
        }
    }

    #[test]
    fn test_source_files_filtering() {
        let fixture = Fixture::new(&[
            ("raw1", "b.csv", SOURCE),
            ("raw1", "a.CSV", SOURCE),
            ("raw1", "notes.txt", "ignore me"),
        ]);
        let validator = CountingValidator::new(vec![]);
        let reporter = Reporter::new(&validator, &fixture.log);
        let builder = DatasetBuilder::new(&fixture.template, &fixture.catalog, reporter);
        let collections = vec![fixture.dir.path().join("raw2"), fixture.dir.path().join("raw1")];
        let driver = BatchDriver::new(builder, collections, fixture.out(), &fixture.log);

        let names: Vec<String> = driver
            .source_files()
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);
    }
}
