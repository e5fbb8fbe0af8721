//! External `cldf` command-line validator.

use std::path::Path;
use std::process::{Command, Output};

use super::{Validator, Verdict};
use crate::error::{ValidatorError, ValidatorResult};

/// Default validator program.
pub const DEFAULT_PROGRAM: &str = "cldf";

/// Runs `<program> validate <metadata>` and, when that exits with status 0,
/// `<program> markdown <metadata>`.
#[derive(Debug, Clone)]
pub struct CldfCommand {
    program: String,
    /// Arguments placed before the subcommand
    prefix_args: Vec<String>,
}

impl CldfCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args: Vec::new(),
        }
    }

    /// Build from a whitespace-separated command line, e.g. `python -m pycldf`.
    pub fn from_command_line(command_line: &str) -> Self {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_else(|| DEFAULT_PROGRAM.to_string());
        Self {
            program,
            prefix_args: parts.collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, subcommand: &str, metadata: &Path) -> ValidatorResult<Output> {
        Command::new(&self.program)
            .args(&self.prefix_args)
            .arg(subcommand)
            .arg(metadata)
            .output()
            .map_err(|source| ValidatorError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

impl Default for CldfCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

/// stdout followed by stderr, trimmed.
fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    [stdout.trim(), stderr.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

impl Validator for CldfCommand {
    fn name(&self) -> &str {
        &self.program
    }

    fn validate(&self, metadata: &Path) -> ValidatorResult<Verdict> {
        let check = self.run("validate", metadata)?;
        if !check.status.success() {
            return Ok(Verdict::Invalid {
                diagnostic: combined_output(&check),
            });
        }

        let markdown = self.run("markdown", metadata)?;
        if !markdown.status.success() {
            return Ok(Verdict::Invalid {
                diagnostic: format!(
                    "{} markdown failed: {}",
                    self.program,
                    combined_output(&markdown)
                ),
            });
        }

        Ok(Verdict::Valid {
            rendered: String::from_utf8_lossy(&markdown.stdout).into_owned(),
        })
    }
}
