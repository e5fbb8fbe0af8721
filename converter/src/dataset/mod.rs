//! Per-language conversion.
//!
//! ```text
//! <lang>.csv ─▶ forms ─▶ borrowings ─▶ forms.csv, borrowings.csv
//!                                  └─▶ metadata.json (extents)
//!          catalog ─▶ languages.csv
//!          validator ─▶ readme.md | diagnostic log
//! ```
//!
//! Every artifact lands in the same output folder. A failure halfway leaves
//! whatever was already written; nothing is rolled back.

use std::path::{Path, PathBuf};

use crate::catalog::CatalogLookup;
use crate::error::ConvertResult;
use crate::languages::{build_language_table, DEFAULT_DONOR};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::metadata::MetadataTemplate;
use crate::output::{
    write_table, BORROWINGS_FILE, FORMS_FILE, LANGUAGES_FILE, METADATA_FILE, REPORT_FILE,
};
use crate::parser::read_source_file;
use crate::transform::{extract_forms, link_borrowings, DonorFields};
use crate::validation::{ReportOutcome, Reporter};

/// Language name of a source file: its file name without extension.
pub fn language_name(source: &Path) -> Option<String> {
    source
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Result of converting one language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub language: String,
    pub output_dir: PathBuf,
    pub form_count: usize,
    pub borrowing_count: usize,
    /// Whether the catalog listed the recipient language.
    pub recipient_listed: bool,
    pub report: ReportOutcome,
}

impl Conversion {
    /// Files written for this language.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        let mut files = vec![
            self.output_dir.join(FORMS_FILE),
            self.output_dir.join(BORROWINGS_FILE),
            self.output_dir.join(METADATA_FILE),
            self.output_dir.join(LANGUAGES_FILE),
        ];
        if self.report.is_valid() {
            files.push(self.output_dir.join(REPORT_FILE));
        }
        files
    }
}

/// Converts one source file into a CLDF dataset folder.
pub struct DatasetBuilder<'a> {
    template: &'a MetadataTemplate,
    catalog: &'a dyn CatalogLookup,
    reporter: Reporter<'a>,
    donor: String,
    donor_fields: DonorFields,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(
        template: &'a MetadataTemplate,
        catalog: &'a dyn CatalogLookup,
        reporter: Reporter<'a>,
    ) -> Self {
        Self {
            template,
            catalog,
            reporter,
            donor: DEFAULT_DONOR.to_string(),
            donor_fields: DonorFields::default(),
        }
    }

    pub fn with_donor(mut self, donor: impl Into<String>) -> Self {
        self.donor = donor.into();
        self
    }

    pub fn with_donor_fields(mut self, donor_fields: DonorFields) -> Self {
        self.donor_fields = donor_fields;
        self
    }

    /// Convert `source` for `language`, writing into `output_dir`.
    ///
    /// `output_dir` must exist. An invalid dataset still returns `Ok`; see
    /// [`Conversion::report`].
    pub fn convert(
        &self,
        source: &Path,
        language: &str,
        output_dir: &Path,
    ) -> ConvertResult<Conversion> {
        log_info(format!("📖 Reading {}", source.display()));
        let source_file = read_source_file(source)?;
        log_info_indent(
            format!(
                "{} rows, {} with an English etymon (encoding {}, delimiter '{}')",
                source_file.rows.len(),
                source_file.borrowing_count(),
                source_file.encoding,
                source_file.delimiter.escape_default()
            ),
            1,
        );

        let forms = extract_forms(&source_file.rows, self.donor_fields);
        let borrowings = link_borrowings(&forms);
        write_table(&output_dir.join(FORMS_FILE), &forms.forms)?;
        write_table(&output_dir.join(BORROWINGS_FILE), &borrowings)?;
        log_success(format!("{} forms, {} borrowings", forms.len(), borrowings.len()));

        let descriptor = self.template.for_language(language, forms.len(), borrowings.len());
        descriptor.write(output_dir.join(METADATA_FILE))?;

        let languages = build_language_table(self.catalog, &self.donor, language)?;
        languages.write_csv(&output_dir.join(LANGUAGES_FILE))?;
        if !languages.recipient_listed {
            log_warning(format!("'{}' is not in the catalog, using a placeholder row", language));
        }

        let report = self.reporter.report(output_dir)?;

        Ok(Conversion {
            language: language.to_string(),
            output_dir: output_dir.to_path_buf(),
            form_count: forms.len(),
            borrowing_count: borrowings.len(),
            recipient_listed: languages.recipient_listed,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LanguageCatalog;
    use crate::error::{ConvertError, ValidatorResult};
    use crate::logs::DiagnosticLog;
    use crate::metadata::{MetadataDescriptor, BORROWINGS_TABLE, FORMS_TABLE};
    use crate::output::count_rows;
    use crate::validation::{Validator, Verdict};
    use std::fs;
    use tempfile::tempdir;

    const TEMPLATE: &str = include_str!("../../metadata_template.json");
    const CATALOG: &str = "\
ID,Name,Macroarea,Glottocode,ISO639P3code,Language_ID
stan1293,English,Eurasia,stan1293,eng,
hung1274,Hungarian,Eurasia,hung1274,hun,
";

    struct AlwaysValid;

    impl Validator for AlwaysValid {
        fn name(&self) -> &str {
            "always-valid"
        }

        fn validate(&self, _metadata: &Path) -> ValidatorResult<Verdict> {
            Ok(Verdict::Valid { rendered: "# dataset\n".into() })
        }
    }

    fn convert(
        source_csv: &str,
        language: &str,
        donor_fields: DonorFields,
    ) -> (tempfile::TempDir, ConvertResult<Conversion>) {
        let dir = tempdir().unwrap();
        let source = dir.path().join(format!("{}.csv", language));
        fs::write(&source, source_csv).unwrap();
        let output = dir.path().join(language);
        fs::create_dir(&output).unwrap();

        let template = MetadataTemplate::parse(TEMPLATE).unwrap();
        let catalog = LanguageCatalog::from_csv_str(CATALOG).unwrap();
        let log = DiagnosticLog::new(dir.path().join("cldf.log"));
        let builder = DatasetBuilder::new(&template, &catalog, Reporter::new(&AlwaysValid, &log))
            .with_donor_fields(donor_fields);

        let result = builder.convert(&source, language, &output);
        (dir, result)
    }

    #[test]
    fn test_single_row_scenario() {
        let (dir, result) = convert(
            "L2_orth,L2_ipa,L2_gloss,L2_etym\ncasa,/kasa/,house,house\n",
            "Hungarian",
            DonorFields::Etymon,
        );
        let conversion = result.unwrap();
        let out = dir.path().join("Hungarian");

        assert_eq!(
            fs::read_to_string(out.join(FORMS_FILE)).unwrap(),
            "ID,Form,IPA,Gloss,Language_ID\n0,casa,/kasa/,house,0\n1,house,house,house,1\n"
        );
        assert_eq!(
            fs::read_to_string(out.join(BORROWINGS_FILE)).unwrap(),
            "ID,Target_Form_ID,Source_Form_ID\n0,0,1\n"
        );
        assert_eq!(conversion.form_count, 2);
        assert_eq!(conversion.borrowing_count, 1);
        assert!(conversion.recipient_listed);
        assert!(conversion.artifacts().iter().all(|p| p.exists()));
    }

    #[test]
    fn test_extents_match_tables() {
        let (dir, result) = convert(
            "L2_orth,L2_ipa,L2_gloss,L2_etym\n\
             kutya,/kuca/,dog,\n\
             lift,/lift/,elevator,lift\n\
             busz,/bus/,bus,bus\n",
            "Hungarian",
            DonorFields::Etymon,
        );
        result.unwrap();
        let out = dir.path().join("Hungarian");

        let descriptor = MetadataDescriptor::read(out.join(METADATA_FILE)).unwrap();
        let forms = count_rows(&out.join(FORMS_FILE)).unwrap();
        let borrowings = count_rows(&out.join(BORROWINGS_FILE)).unwrap();
        assert_eq!(forms, 5);
        assert_eq!(borrowings, 2);
        assert_eq!(descriptor.extent(FORMS_TABLE), Some(forms as u64));
        assert_eq!(descriptor.extent(BORROWINGS_TABLE), Some(borrowings as u64));
        assert_eq!(descriptor.title(), Some("English loanwords in Hungarian"));
        assert_eq!(descriptor.identifier(), Some("enborrowingsHungarian"));
    }

    #[test]
    fn test_unlisted_language_placeholder() {
        let (dir, result) = convert(
            "L2_orth,L2_ipa,L2_gloss,L2_etym\nbussi,/bussi/,bus,bus\n",
            "northsami",
            DonorFields::Etymon,
        );
        let conversion = result.unwrap();
        assert!(!conversion.recipient_listed);

        let languages_path = dir.path().join("northsami").join(LANGUAGES_FILE);
        let languages = fs::read_to_string(languages_path).unwrap();
        let lines: Vec<&str> = languages.lines().collect();
        assert_eq!(lines[1], "stan1293,English,Eurasia,stan1293,eng,0");
        assert_eq!(lines[2], ",Northsami,,,,1");
    }

    #[test]
    fn test_empty_row_keeps_form_ids_aligned() {
        let (dir, result) = convert(
            "L2_orth,L2_ipa,L2_gloss,L2_etym\nkutya,/kuca/,dog,\n,,,\nlift,/lift/,elevator,lift\n",
            "Hungarian",
            DonorFields::Etymon,
        );
        let conversion = result.unwrap();
        let out = dir.path().join("Hungarian");

        assert_eq!(conversion.form_count, 4);
        assert_eq!(
            fs::read_to_string(out.join(FORMS_FILE)).unwrap(),
            "ID,Form,IPA,Gloss,Language_ID\n\
             0,kutya,/kuca/,dog,0\n\
             1,,,,0\n\
             2,lift,/lift/,elevator,0\n\
             3,lift,lift,lift,1\n"
        );
        assert_eq!(
            fs::read_to_string(out.join(BORROWINGS_FILE)).unwrap(),
            "ID,Target_Form_ID,Source_Form_ID\n0,2,3\n"
        );
    }

    #[test]
    fn test_blank_donor_fields() {
        let (dir, result) = convert(
            "L2_orth,L2_ipa,L2_gloss,L2_etym\ncasa,/kasa/,house,house\n",
            "Hungarian",
            DonorFields::Blank,
        );
        result.unwrap();
        let forms = fs::read_to_string(dir.path().join("Hungarian").join(FORMS_FILE)).unwrap();
        assert!(forms.ends_with("1,house,,,1\n"));
    }

    #[test]
    fn test_bad_source_fails() {
        let (_dir, result) = convert("orth,ipa\na,b\n", "Hungarian", DonorFields::Etymon);
        assert!(matches!(result, Err(ConvertError::Source(_))));
    }

    #[test]
    fn test_language_name() {
        let name = |p: &str| language_name(Path::new(p));
        assert_eq!(name("raw1/Hungarian.csv").as_deref(), Some("Hungarian"));
        assert_eq!(name("raw2/modern greek.csv").as_deref(), Some("modern greek"));
        assert_eq!(language_name(Path::new("/")), None);
    }
}
