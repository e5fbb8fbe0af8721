//! CLDF metadata descriptors.
//!
//! A [`MetadataTemplate`] is loaded once and never modified. Each language
//! gets its own [`MetadataDescriptor`] from
//! [`MetadataTemplate::for_language`]:
//!
//! - `dc:title`  = template title + capitalized language name
//! - `rdf:ID`    = template id + language name
//! - `tables[0].dc:extent` = number of forms
//! - `tables[2].dc:extent` = number of borrowings
//!
//! The languages table (`tables[1]`) keeps whatever the template says.

use serde_json::{json, Value};
use std::path::Path;

use crate::error::{MetadataError, MetadataResult};
use crate::languages::capitalize;

/// Template loaded when no other path is configured.
pub const DEFAULT_TEMPLATE_FILE: &str = "metadata_template.json";

pub const TITLE_KEY: &str = "dc:title";
pub const ID_KEY: &str = "rdf:ID";
pub const TABLES_KEY: &str = "tables";
pub const EXTENT_KEY: &str = "dc:extent";
pub const URL_KEY: &str = "url";

/// Position of the forms table in `tables`.
pub const FORMS_TABLE: usize = 0;
/// Position of the languages table in `tables`.
pub const LANGUAGES_TABLE: usize = 1;
/// Position of the borrowings table in `tables`.
pub const BORROWINGS_TABLE: usize = 2;

/// Checked, immutable metadata template.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTemplate {
    document: Value,
}

impl MetadataTemplate {
    /// Read and check a template file.
    ///
    /// A missing or malformed template is fatal for every conversion.
    pub fn load(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and check template JSON.
    pub fn parse(content: &str) -> MetadataResult<Self> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// Check the template structure.
    pub fn from_value(document: Value) -> MetadataResult<Self> {
        let invalid = |msg: &str| MetadataError::InvalidTemplate(msg.to_string());

        let object = document
            .as_object()
            .ok_or_else(|| invalid("top level must be an object"))?;

        for key in [TITLE_KEY, ID_KEY] {
            if !object.get(key).is_some_and(Value::is_string) {
                return Err(MetadataError::InvalidTemplate(format!(
                    "'{}' must be a string",
                    key
                )));
            }
        }

        let tables = object
            .get(TABLES_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| invalid("'tables' must be an array"))?;

        if tables.len() <= BORROWINGS_TABLE {
            return Err(MetadataError::InvalidTemplate(format!(
                "expected forms, languages and borrowings tables, found {}",
                tables.len()
            )));
        }
        if !tables.iter().all(Value::is_object) {
            return Err(invalid("every table must be an object"));
        }

        Ok(Self { document })
    }

    pub fn title(&self) -> &str {
        self.document[TITLE_KEY].as_str().unwrap_or_default()
    }

    pub fn identifier(&self) -> &str {
        self.document[ID_KEY].as_str().unwrap_or_default()
    }

    /// Descriptor for one language. The template itself is left untouched.
    pub fn for_language(
        &self,
        language: &str,
        form_count: usize,
        borrowing_count: usize,
    ) -> MetadataDescriptor {
        let mut document = self.document.clone();
        let title = format!("{}{}", self.title(), capitalize(language));
        let identifier = format!("{}{}", self.identifier(), language);

        if let Some(object) = document.as_object_mut() {
            object.insert(TITLE_KEY.to_string(), Value::String(title));
            object.insert(ID_KEY.to_string(), Value::String(identifier));
        }
        set_extent(&mut document, FORMS_TABLE, form_count);
        set_extent(&mut document, BORROWINGS_TABLE, borrowing_count);

        MetadataDescriptor { document }
    }
}

fn set_extent(document: &mut Value, table: usize, extent: usize) {
    if let Some(table) = document
        .get_mut(TABLES_KEY)
        .and_then(|tables| tables.get_mut(table))
        .and_then(Value::as_object_mut)
    {
        table.insert(EXTENT_KEY.to_string(), json!(extent));
    }
}

/// Metadata of one language's dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataDescriptor {
    document: Value,
}

impl MetadataDescriptor {
    /// Read a persisted descriptor.
    pub fn read(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            document: serde_json::from_str(&content)?,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.document.get(TITLE_KEY).and_then(Value::as_str)
    }

    pub fn identifier(&self) -> Option<&str> {
        self.document.get(ID_KEY).and_then(Value::as_str)
    }

    /// `dc:extent` of the table at `table`.
    pub fn extent(&self, table: usize) -> Option<u64> {
        self.table(table)?.get(EXTENT_KEY).and_then(Value::as_u64)
    }

    /// File name of the table at `table`.
    pub fn table_url(&self, table: usize) -> Option<&str> {
        self.table(table)?.get(URL_KEY).and_then(Value::as_str)
    }

    pub fn tables(&self) -> &[Value] {
        self.document
            .get(TABLES_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn table(&self, table: usize) -> Option<&Value> {
        self.tables().get(table)
    }

    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Persist as pretty-printed JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> MetadataResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.document)?;
        std::fs::write(path, content).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SHIPPED_TEMPLATE: &str = include_str!("../../metadata_template.json");

    fn template() -> MetadataTemplate {
        MetadataTemplate::parse(SHIPPED_TEMPLATE).unwrap()
    }

    #[test]
    fn test_shipped_template_is_valid() {
        let template = template();
        assert_eq!(template.title(), "English loanwords in ");
        assert_eq!(template.identifier(), "enborrowings");
    }

    #[test]
    fn test_for_language() {
        let descriptor = template().for_language("hungarian", 12, 5);

        assert_eq!(descriptor.title(), Some("English loanwords in Hungarian"));
        assert_eq!(descriptor.identifier(), Some("enborrowingshungarian"));
        assert_eq!(descriptor.extent(FORMS_TABLE), Some(12));
        assert_eq!(descriptor.extent(BORROWINGS_TABLE), Some(5));
        assert_eq!(descriptor.extent(LANGUAGES_TABLE), None);
        assert_eq!(descriptor.table_url(FORMS_TABLE), Some("forms.csv"));
    }

    #[test]
    fn test_template_not_mutated() {
        let template = template();
        let before = template.clone();

        let first = template.for_language("Welsh", 3, 1);
        let second = template.for_language("Maltese", 7, 2);

        assert_eq!(template, before);
        assert_eq!(first.title(), Some("English loanwords in Welsh"));
        assert_eq!(second.title(), Some("English loanwords in Maltese"));
        assert_eq!(second.extent(FORMS_TABLE), Some(7));
    }

    #[test]
    fn test_minimal_template() {
        let template = MetadataTemplate::parse(
            r#"{"dc:title": "T ", "rdf:ID": "id", "tables": [{}, {}, {}]}"#,
        )
        .unwrap();
        let descriptor = template.for_language("x", 1, 0);
        assert_eq!(descriptor.extent(FORMS_TABLE), Some(1));
        assert_eq!(descriptor.extent(BORROWINGS_TABLE), Some(0));
    }

    #[test]
    fn test_missing_template_is_error() {
        let err = MetadataTemplate::load("/nonexistent/metadata_template.json").unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }

    #[test]
    fn test_malformed_template_is_error() {
        let err = MetadataTemplate::parse("{ not json").unwrap_err();
        assert!(matches!(err, MetadataError::Json(_)));
    }

    #[test]
    fn test_template_structure_checked() {
        let cases = [
            r#"[]"#,
            r#"{"rdf:ID": "id", "tables": [{}, {}, {}]}"#,
            r#"{"dc:title": "t", "rdf:ID": 3, "tables": [{}, {}, {}]}"#,
            r#"{"dc:title": "t", "rdf:ID": "id", "tables": [{}, {}]}"#,
            r#"{"dc:title": "t", "rdf:ID": "id", "tables": [{}, 1, {}]}"#,
        ];
        for case in cases {
            let err = MetadataTemplate::parse(case).unwrap_err();
            assert!(matches!(err, MetadataError::InvalidTemplate(_)), "{}", case);
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        let descriptor = template().for_language("Welsh", 4, 2);
        descriptor.write(&path).unwrap();

        let read = MetadataDescriptor::read(&path).unwrap();
        assert_eq!(read, descriptor);
    }
}
