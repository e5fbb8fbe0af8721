//! Offline validator.
//!
//! Checks the descriptor against the embedded schema, then every table it
//! declares: the file exists, carries the declared columns, required cells
//! are filled, integer cells are integers, primary keys are unique, form
//! references resolve and the row count matches `dc:extent`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use super::{validate_schema, Validator, Verdict};
use crate::error::{ValidatorError, ValidatorResult};
use crate::metadata::{EXTENT_KEY, ID_KEY, TABLES_KEY, TITLE_KEY, URL_KEY};

const METADATA_SCHEMA: &str = include_str!("../../schemas/cldf-metadata.json");

const FORM_TABLE_SUFFIX: &str = "#FormTable";
const FORM_REFERENCE_SUFFIXES: &[&str] = &["#targetFormReference", "#sourceFormReference"];

/// Non-negative integer.
static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid integer pattern"));

/// Declared column of a table.
#[derive(Debug)]
struct ColumnSpec {
    name: String,
    required: bool,
    datatype: Option<String>,
    property: Option<String>,
}

impl ColumnSpec {
    fn from_value(value: &Value) -> Option<Self> {
        Some(Self {
            name: value.get("name")?.as_str()?.to_string(),
            required: value.get("required").and_then(Value::as_bool).unwrap_or(false),
            datatype: value.get("datatype").and_then(Value::as_str).map(str::to_string),
            property: value.get("propertyUrl").and_then(Value::as_str).map(str::to_string),
        })
    }

    fn is_integer(&self) -> bool {
        self.datatype.as_deref() == Some("integer")
    }

    fn is_form_reference(&self) -> bool {
        self.property
            .as_deref()
            .is_some_and(|p| FORM_REFERENCE_SUFFIXES.iter().any(|s| p.ends_with(s)))
    }

    /// Last segment of the property URL.
    fn term(&self) -> &str {
        self.property
            .as_deref()
            .and_then(|p| p.rsplit('#').next())
            .unwrap_or("")
    }
}

/// Table-level facts gathered while checking.
#[derive(Debug, Default)]
struct TableSummary {
    url: String,
    conforms_to: String,
    rows: usize,
    columns: Vec<ColumnSpec>,
}

/// Validates datasets without any external tool.
#[derive(Debug, Clone, Default)]
pub struct BuiltinValidator;

impl BuiltinValidator {
    pub fn new() -> Self {
        Self
    }
}

impl Validator for BuiltinValidator {
    fn name(&self) -> &str {
        "builtin"
    }

    fn validate(&self, metadata: &Path) -> ValidatorResult<Verdict> {
        let content = std::fs::read_to_string(metadata).map_err(|source| ValidatorError::Io {
            path: metadata.to_path_buf(),
            source,
        })?;
        let file_name = metadata
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "metadata.json".to_string());

        let document: Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => {
                return Ok(Verdict::Invalid {
                    diagnostic: format!("{}: not valid JSON: {}", file_name, e),
                })
            }
        };

        let schema: Value = serde_json::from_str(METADATA_SCHEMA)
            .map_err(|e| ValidatorError::Schema(e.to_string()))?;
        if let Err(errors) = validate_schema(&schema, &document) {
            let diagnostic = errors
                .iter()
                .map(|e| format!("{}: {}", file_name, e))
                .collect::<Vec<_>>()
                .join("\n");
            return Ok(Verdict::Invalid { diagnostic });
        }

        let base = metadata.parent().unwrap_or_else(|| Path::new("."));
        let tables = document
            .get(TABLES_KEY)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut problems = Vec::new();
        let form_ids = tables
            .iter()
            .find(|t| conforms_to(t).ends_with(FORM_TABLE_SUFFIX))
            .and_then(|t| read_ids(base, t));

        let summaries: Vec<TableSummary> = tables
            .iter()
            .map(|table| check_table(base, table, form_ids.as_ref(), &mut problems))
            .collect();

        if problems.is_empty() {
            Ok(Verdict::Valid {
                rendered: render_markdown(&document, &file_name, &summaries),
            })
        } else {
            Ok(Verdict::Invalid {
                diagnostic: problems.join("\n"),
            })
        }
    }
}

fn conforms_to(table: &Value) -> &str {
    table.get("dc:conformsTo").and_then(Value::as_str).unwrap_or("")
}

fn column_specs(table: &Value) -> Vec<ColumnSpec> {
    table
        .pointer("/tableSchema/columns")
        .and_then(Value::as_array)
        .map(|cols| cols.iter().filter_map(ColumnSpec::from_value).collect())
        .unwrap_or_default()
}

/// Values of the `ID` column of a table, if it can be read.
fn read_ids(base: &Path, table: &Value) -> Option<HashSet<String>> {
    let url = table.get(URL_KEY)?.as_str()?;
    let mut reader = csv::Reader::from_path(base.join(url)).ok()?;
    let idx = reader.headers().ok()?.iter().position(|h| h == "ID")?;
    let ids = reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|r| r.get(idx).map(str::to_string))
        .collect();
    Some(ids)
}

fn check_table(
    base: &Path,
    table: &Value,
    form_ids: Option<&HashSet<String>>,
    problems: &mut Vec<String>,
) -> TableSummary {
    let url = table.get(URL_KEY).and_then(Value::as_str).unwrap_or_default();
    let mut summary = TableSummary {
        url: url.to_string(),
        conforms_to: conforms_to(table).to_string(),
        rows: 0,
        columns: column_specs(table),
    };

    let path = base.join(url);
    let mut reader = match csv::Reader::from_path(&path) {
        Ok(reader) => reader,
        Err(e) => {
            problems.push(format!("{}: cannot read table: {}", url, e));
            return summary;
        }
    };
    let headers: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(str::to_string).collect(),
        Err(e) => {
            problems.push(format!("{}: cannot read header: {}", url, e));
            return summary;
        }
    };

    let mut positions = Vec::new();
    for column in &summary.columns {
        match headers.iter().position(|h| *h == column.name) {
            Some(idx) => positions.push((idx, column)),
            None => problems.push(format!("{}: missing column '{}'", url, column.name)),
        }
    }

    let primary_key: Option<usize> = table
        .pointer("/tableSchema/primaryKey")
        .and_then(Value::as_array)
        .filter(|key| key.len() == 1)
        .and_then(|key| key[0].as_str())
        .and_then(|name| headers.iter().position(|h| h == name));
    let mut seen_keys = HashSet::new();

    for (row, record) in reader.records().enumerate() {
        let line = row + 2;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                problems.push(format!("{}:{}: {}", url, line, e));
                continue;
            }
        };
        summary.rows += 1;

        for &(idx, column) in &positions {
            let value = record.get(idx).unwrap_or("");
            if value.is_empty() {
                if column.required {
                    problems.push(format!(
                        "{}:{}: required column '{}' is empty",
                        url, line, column.name
                    ));
                }
                continue;
            }
            if column.is_integer() && !INTEGER.is_match(value) {
                problems.push(format!(
                    "{}:{}: '{}' is not a non-negative integer ({})",
                    url, line, value, column.name
                ));
            }
            if column.is_form_reference() {
                if let Some(ids) = form_ids {
                    if !ids.contains(value) {
                        problems.push(format!(
                            "{}:{}: {} '{}' matches no form",
                            url, line, column.name, value
                        ));
                    }
                }
            }
        }

        if let Some(key) = primary_key.and_then(|idx| record.get(idx)) {
            if !seen_keys.insert(key.to_string()) {
                problems.push(format!("{}:{}: duplicate primary key '{}'", url, line, key));
            }
        }
    }

    if let Some(extent) = table.get(EXTENT_KEY).and_then(Value::as_u64) {
        if extent != summary.rows as u64 {
            problems.push(format!(
                "{}: dc:extent is {} but the table has {} rows",
                url, extent, summary.rows
            ));
        }
    }

    summary
}

fn render_markdown(document: &Value, file_name: &str, tables: &[TableSummary]) -> String {
    let text = |key: &str| document.get(key).and_then(Value::as_str).unwrap_or("");

    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", text(TITLE_KEY));
    let _ = writeln!(out, "**CLDF Metadata**: [{0}](./{0})\n", file_name);
    let _ = writeln!(out, "property | value\n --- | ---");
    for key in ["dc:conformsTo", ID_KEY, "dc:source"] {
        if !text(key).is_empty() {
            let _ = writeln!(out, "{} | {}", key, text(key));
        }
    }

    for table in tables {
        let kind = table.conforms_to.rsplit('#').next().unwrap_or("");
        let _ = writeln!(out, "\n## Table [{0}](./{0})\n", table.url);
        let _ = writeln!(out, "property | value\n --- | ---");
        if !kind.is_empty() {
            let _ = writeln!(out, "dc:conformsTo | {}", kind);
        }
        let _ = writeln!(out, "dc:extent | {}", table.rows);

        let _ = writeln!(out, "\n### Columns\n");
        let _ = writeln!(out, "Name | Datatype | Property\n --- | --- | ---");
        for column in &table.columns {
            let _ = writeln!(
                out,
                "`{}` | `{}` | {}",
                column.name,
                column.datatype.as_deref().unwrap_or("string"),
                column.term()
            );
        }
    }

    out
}
