//! borrowings2cldf CLI - Convert English loanword lists to CLDF datasets
//!
//! # Commands
//!
//! ```bash
//! borrowings2cldf                          # Convert every collection (same as `run`)
//! borrowings2cldf run -i ../raw2 -i ../raw1
//! borrowings2cldf convert raw1/Hungarian.csv
//! borrowings2cldf validate Hungarian       # Re-validate an existing dataset
//! borrowings2cldf lookup Hungarian         # Show a catalog record
//! borrowings2cldf config                   # Show the resolved configuration
//! ```
//!
//! Settings come from `BORROWINGS_*` environment variables (or `.env`) and
//! can be overridden with the global flags below.

use borrowings::{
    BatchDriver, BatchSummary, CatalogLookup, Config, Conversion, DatasetBuilder, DiagnosticLog,
    LanguageCatalog, LanguageOutcome, LanguageResult, MetadataTemplate, ReportOutcome, Reporter,
    ValidatorKind,
};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "borrowings2cldf")]
#[command(about = "Convert English loanword lists to CLDF datasets", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Flags overriding the environment configuration.
#[derive(Args, Debug, Default)]
struct ConfigArgs {
    /// Source collection directory (repeatable, processed in order)
    #[arg(short, long = "input", global = true)]
    input: Vec<PathBuf>,

    /// Parent directory of the dataset folders
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Metadata template file
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Language catalog URL or file
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// Diagnostic log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Validator to judge datasets with
    #[arg(long, value_enum, global = true)]
    validator: Option<ValidatorKind>,

    /// Command line of the external cldf tool
    #[arg(long, global = true)]
    cldf_program: Option<String>,

    /// Donor language name
    #[arg(long, global = true)]
    donor: Option<String>,

    /// Leave donor IPA and gloss cells empty
    #[arg(long, global = true)]
    blank_donor_fields: bool,
}

impl ConfigArgs {
    fn apply(self, config: &mut Config) {
        if !self.input.is_empty() {
            config.input_dirs = self.input;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if let Some(template) = self.template {
            config.template = template;
        }
        if let Some(catalog) = self.catalog {
            config.catalog = catalog;
        }
        if let Some(log_file) = self.log_file {
            config.log_file = log_file;
        }
        if let Some(validator) = self.validator {
            config.validator = validator;
        }
        if let Some(program) = self.cldf_program {
            config.cldf_program = program;
        }
        if let Some(donor) = self.donor {
            config.donor = donor;
        }
        if self.blank_donor_fields {
            config.blank_donor_fields = true;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every source file of every collection (default)
    Run,

    /// Convert a single source file
    Convert {
        /// Source CSV file
        source: PathBuf,

        /// Language name (default: file name without extension)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Re-validate an existing dataset folder
    Validate {
        /// Dataset folder containing metadata.json
        dataset: PathBuf,
    },

    /// Print the catalog record of a language
    Lookup {
        /// Exact language name
        name: String,
    },

    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match Config::from_env() {
        Ok(mut config) => {
            cli.config.apply(&mut config);
            match cli.command.unwrap_or(Commands::Run) {
                Commands::Run => cmd_run(&config).await,
                Commands::Convert { source, language } => {
                    cmd_convert(&config, &source, language.as_deref()).await
                }
                Commands::Validate { dataset } => cmd_validate(&config, &dataset),
                Commands::Lookup { name } => cmd_lookup(&config, &name).await,
                Commands::Config => cmd_config(&config),
            }
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn dataset_builder<'a>(
    config: &Config,
    template: &'a MetadataTemplate,
    catalog: &'a LanguageCatalog,
    reporter: Reporter<'a>,
) -> DatasetBuilder<'a> {
    DatasetBuilder::new(template, catalog, reporter)
        .with_donor(&config.donor)
        .with_donor_fields(config.donor_fields())
}

async fn cmd_run(config: &Config) -> CliResult {
    // Fatal before any folder is created
    let template = MetadataTemplate::load(&config.template)?;
    let catalog = LanguageCatalog::shared(&config.catalog_source()).await?;
    let validator = config.build_validator();
    let log = DiagnosticLog::new(&config.log_file);

    let reporter = Reporter::new(validator.as_ref(), &log).with_badge(config.badge());
    let builder = dataset_builder(config, &template, catalog, reporter);
    let driver = BatchDriver::new(builder, config.input_dirs.clone(), &config.output_dir, &log);

    let summary = driver.run()?;
    print_summary(&summary, &log);
    Ok(())
}

async fn cmd_convert(config: &Config, source: &Path, language: Option<&str>) -> CliResult {
    let template = MetadataTemplate::load(&config.template)?;
    let catalog = LanguageCatalog::shared(&config.catalog_source()).await?;
    let validator = config.build_validator();
    let log = DiagnosticLog::new(&config.log_file);

    fs::create_dir_all(&config.output_dir)?;
    let reporter = Reporter::new(validator.as_ref(), &log).with_badge(config.badge());
    let builder = dataset_builder(config, &template, catalog, reporter);
    let driver = BatchDriver::new(builder, Vec::new(), &config.output_dir, &log);

    let result = match language {
        Some(language) => driver.process_as(source, language),
        None => driver.process(source),
    };
    print_result(&result);

    match result.outcome {
        LanguageOutcome::Failed(reason) => Err(reason.into()),
        _ => Ok(()),
    }
}

fn cmd_validate(config: &Config, dataset: &Path) -> CliResult {
    eprintln!("✔️  Validating: {}", dataset.display());

    let validator = config.build_validator();
    let log = DiagnosticLog::new(&config.log_file);
    let reporter = Reporter::new(validator.as_ref(), &log).with_badge(config.badge());

    match reporter.report(dataset)? {
        ReportOutcome::Written(path) => {
            eprintln!("✅ Valid, report written to {}", path.display());
            Ok(())
        }
        ReportOutcome::Logged { .. } => {
            eprintln!("❌ Invalid, see {}", log.path().display());
            std::process::exit(1);
        }
    }
}

async fn cmd_lookup(config: &Config, name: &str) -> CliResult {
    let catalog = LanguageCatalog::shared(&config.catalog_source()).await?;
    let record = catalog
        .lookup(name)
        .ok_or_else(|| format!("Language not in catalog: {}", name))?;

    println!("📄 {}", name);
    for (column, value) in record.columns.iter().zip(&record.values) {
        println!("   {}: {}", column, value);
    }
    Ok(())
}

fn cmd_config(config: &Config) -> CliResult {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn print_result(result: &LanguageResult) {
    match &result.outcome {
        LanguageOutcome::AlreadyDone => {
            eprintln!("⏭️  {}: already converted", result.language);
        }
        LanguageOutcome::Converted(conversion) => print_conversion(conversion),
        LanguageOutcome::Failed(reason) => {
            eprintln!("❌ {}: {}", result.source.display(), reason);
        }
    }
}

fn print_conversion(conversion: &Conversion) {
    let status = if conversion.report.is_valid() { "✅ valid" } else { "⚠️  invalid" };
    eprintln!(
        "📦 {}: {} forms, {} borrowings, {}",
        conversion.language, conversion.form_count, conversion.borrowing_count, status
    );
    for artifact in conversion.artifacts() {
        eprintln!("   💾 {}", artifact.display());
    }
}

fn print_summary(summary: &BatchSummary, log: &DiagnosticLog) {
    eprintln!("\n📊 Results:");
    eprintln!("   Converted: {}", summary.converted());
    eprintln!("   ✅ Valid: {}", summary.valid());
    eprintln!("   ⚠️  Invalid: {}", summary.invalid());
    eprintln!("   ⏭️  Already done: {}", summary.skipped());
    eprintln!("   ❌ Failed: {}", summary.failed());

    for result in &summary.results {
        if let LanguageOutcome::Failed(reason) = &result.outcome {
            eprintln!("   - {}: {}", result.source.display(), reason);
        }
    }
    if summary.invalid() + summary.failed() > 0 {
        eprintln!("\n   Diagnostics in {}", log.path().display());
    }
    eprintln!("\n✨ Done!");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_source_is_not_a_collection() {
        let cli = Cli::try_parse_from(["borrowings2cldf", "convert", "raw1/Hungarian.csv"]).unwrap();

        assert!(cli.config.input.is_empty());
        match cli.command {
            Some(Commands::Convert { source, language }) => {
                assert_eq!(source, PathBuf::from("raw1/Hungarian.csv"));
                assert_eq!(language, None);
            }
            _ => panic!("expected the convert subcommand"),
        }
    }

    #[test]
    fn test_global_flags_override_config() {
        let cli = Cli::try_parse_from([
            "borrowings2cldf",
            "run",
            "-i",
            "a/raw2",
            "--input",
            "b/raw1",
            "--validator",
            "builtin",
            "--blank-donor-fields",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.config.apply(&mut config);
        assert_eq!(config.input_dirs, vec![PathBuf::from("a/raw2"), PathBuf::from("b/raw1")]);
        assert_eq!(config.validator, ValidatorKind::Builtin);
        assert!(config.blank_donor_fields);
    }
}
