//! Languages table: the donor language plus the recipient language.
//!
//! Both rows copy their catalog record. A recipient the catalog does not list
//! gets a placeholder row carrying only its capitalized name.

use std::path::Path;

use crate::catalog::{CatalogLookup, NAME_COLUMN};
use crate::error::{CatalogError, CatalogResult, ConvertResult};
use crate::output::write_records;

/// Donor language of every dataset.
pub const DEFAULT_DONOR: &str = "English";

/// Column identifying a row of the languages table.
pub const LANGUAGE_ID_COLUMN: &str = "Language_ID";

/// `Language_ID` of the donor row.
pub const DONOR_LANGUAGE_ID: &str = "0";

/// `Language_ID` of the recipient row.
pub const RECIPIENT_LANGUAGE_ID: &str = "1";

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// The two-row languages table of one dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageTable {
    pub columns: Vec<String>,
    /// Donor row first, recipient row second.
    pub rows: Vec<Vec<String>>,
    /// Whether the recipient row came from the catalog.
    pub recipient_listed: bool,
}

impl LanguageTable {
    pub fn donor(&self) -> &[String] {
        &self.rows[0]
    }

    pub fn recipient(&self) -> &[String] {
        &self.rows[1]
    }

    /// Cell of `row` in `column`.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    pub fn write_csv(&self, path: &Path) -> ConvertResult<()> {
        write_records(path, &self.columns, &self.rows)
    }
}

/// Build the languages table for `language`, borrowing from `donor`.
pub fn build_language_table(
    catalog: &dyn CatalogLookup,
    donor: &str,
    language: &str,
) -> CatalogResult<LanguageTable> {
    let mut columns = catalog.columns().to_vec();
    let id_idx = match columns.iter().position(|c| c == LANGUAGE_ID_COLUMN) {
        Some(idx) => idx,
        None => {
            columns.push(LANGUAGE_ID_COLUMN.to_string());
            columns.len() - 1
        }
    };
    let name_idx = columns
        .iter()
        .position(|c| c == NAME_COLUMN)
        .ok_or_else(|| CatalogError::MissingColumn(NAME_COLUMN.to_string()))?;

    let row_with_id = |mut values: Vec<String>, id: &str| {
        values.resize(columns.len(), String::new());
        values[id_idx] = id.to_string();
        values
    };

    let donor_record = catalog
        .lookup(donor)
        .ok_or_else(|| CatalogError::DonorNotFound(donor.to_string()))?;
    let donor_row = row_with_id(donor_record.values, DONOR_LANGUAGE_ID);

    let recipient_record = catalog.lookup(language);
    let recipient_listed = recipient_record.is_some();
    let recipient_row = match recipient_record {
        Some(record) => row_with_id(record.values, RECIPIENT_LANGUAGE_ID),
        None => {
            let mut values = vec![String::new(); columns.len()];
            values[name_idx] = capitalize(language);
            row_with_id(values, RECIPIENT_LANGUAGE_ID)
        }
    };

    Ok(LanguageTable {
        columns,
        rows: vec![donor_row, recipient_row],
        recipient_listed,
    })
}
