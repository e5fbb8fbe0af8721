//! CSV writers for the dataset tables.

use std::fs::File;
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::models::TableRow;

/// Dataset file names inside a language folder.
pub const FORMS_FILE: &str = "forms.csv";
pub const BORROWINGS_FILE: &str = "borrowings.csv";
pub const LANGUAGES_FILE: &str = "languages.csv";
pub const METADATA_FILE: &str = "metadata.json";
pub const REPORT_FILE: &str = "readme.md";

fn create(path: &Path) -> ConvertResult<csv::Writer<File>> {
    let file = File::create(path).map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::WriterBuilder::new().has_headers(false).from_writer(file))
}

fn finish(mut writer: csv::Writer<File>, path: &Path) -> ConvertResult<()> {
    writer.flush().map_err(|source| ConvertError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write typed rows under their fixed header.
pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> ConvertResult<()> {
    let mut writer = create(path)?;
    writer.write_record(T::HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer, path)
}

/// Write string rows under a dynamic header.
pub fn write_records(path: &Path, header: &[String], rows: &[Vec<String>]) -> ConvertResult<()> {
    let mut writer = create(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    finish(writer, path)
}

/// Number of data rows in a CSV file (header excluded).
pub fn count_rows(path: &Path) -> csv::Result<usize> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut count = 0;
    for record in reader.records() {
        record?;
        count += 1;
    }
    Ok(count)
}
