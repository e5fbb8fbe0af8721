//! Reader for per-language borrowing lists.
//!
//! Source files carry one borrowing candidate per row:
//!
//! | column     | meaning                          |
//! |------------|----------------------------------|
//! | `L2_orth`  | recipient orthographic form      |
//! | `L2_ipa`   | recipient IPA                    |
//! | `L2_gloss` | recipient gloss                  |
//! | `L2_etym`  | English etymon (optional column) |
//!
//! Encoding and delimiter are auto-detected. Missing-value markers such as
//! `NA` or `NaN` count as empty cells; an empty etymon means "no borrowing".

use std::path::Path;

use crate::error::{SourceError, SourceResult};
use crate::models::SourceRow;

/// Column holding the recipient orthographic form.
pub const FORM_COLUMN: &str = "L2_orth";
/// Column holding the recipient IPA transcription.
pub const IPA_COLUMN: &str = "L2_ipa";
/// Column holding the recipient gloss.
pub const GLOSS_COLUMN: &str = "L2_gloss";
/// Column holding the donor etymon.
pub const ETYMON_COLUMN: &str = "L2_etym";

/// Cell values read as "no value", as tabular tooling does by default.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Parsed source file with detection metadata
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub rows: Vec<SourceRow>,
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
}

impl SourceFile {
    pub fn borrowing_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_borrowing()).count()
    }
}

/// True when a cell should be treated as absent.
///
/// Whitespace is significant: `" "` is a value.
pub fn is_missing(value: &str) -> bool {
    value.is_empty() || MISSING_MARKERS.contains(&value)
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is taken as is; anything else is left to chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes using the given encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8(bytes.to_vec())
            .map_err(|e| SourceError::Encoding(format!("utf-8 ({})", e)))?,
        "iso-8859-1" | "latin-1" | "latin1" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Comma wins ties.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Read a source file with auto-detected encoding and delimiter.
pub fn read_source_file(path: impl AsRef<Path>) -> SourceResult<SourceFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_source_bytes(&bytes)
}

/// Parse source bytes with auto-detected encoding and delimiter.
pub fn parse_source_bytes(bytes: &[u8]) -> SourceResult<SourceFile> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_source_str(&content, delimiter, encoding)
}

/// Parse decoded source text with an explicit delimiter.
pub fn parse_source_str(
    content: &str,
    delimiter: char,
    encoding: String,
) -> SourceResult<SourceFile> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(SourceError::NoHeader);
    }

    let position = |name: &str| headers.iter().position(|h| h == name);
    let required = |name: &str| {
        position(name).ok_or_else(|| SourceError::MissingColumn(name.to_string()))
    };

    let form_idx = required(FORM_COLUMN)?;
    let ipa_idx = required(IPA_COLUMN)?;
    let gloss_idx = required(GLOSS_COLUMN)?;
    let etymon_idx = position(ETYMON_COLUMN);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // A row of empty cells (`,,,`) is still a row
        if record.len() <= 1 && record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let cell = |idx: usize| -> String {
            match record.get(idx) {
                Some(value) if !is_missing(value) => value.to_string(),
                _ => String::new(),
            }
        };

        let etymon = etymon_idx.map(cell).filter(|e| !e.is_empty());

        rows.push(SourceRow {
            form: cell(form_idx),
            ipa: cell(ipa_idx),
            gloss: cell(gloss_idx),
            etymon,
        });
    }

    Ok(SourceFile {
        rows,
        encoding,
        delimiter,
        headers,
    })
}
