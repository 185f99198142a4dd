//! psyscore CLI - Command-line interface for psyscore
//!
//! Commands:
//! - score: Deduplicate and score responses into a CSV score table
//! - dedup: Deduplicate responses only, preserving full rows
//! - validate: Dry-run check of timestamps, ids, row widths and tokens
//! - schema: Print scheme.v1 configuration information

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use psyscore::coding::{CodingScheme, SchemeConfig, SCHEME_VERSION};
use psyscore::dedup::{Deduplicator, TIMESTAMP_FORMAT};
use psyscore::instruments;
use psyscore::pipeline::ScoreProcessor;
use psyscore::scorer::InstrumentScorer;
use psyscore::types::RawResponseRow;
use psyscore::{ScoreError, PSYSCORE_VERSION};

/// psyscore - Questionnaire response deduplication and scoring
#[derive(Parser)]
#[command(name = "psyscore")]
#[command(version = PSYSCORE_VERSION)]
#[command(about = "Deduplicate and score questionnaire responses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deduplicate and score responses into a CSV score table
    Score {
        /// Input responses CSV (use - for stdin); first row is a header
        #[arg(short, long)]
        input: PathBuf,

        /// Output scores CSV (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,

        /// Built-in instrument to score (repeatable; default: k6 and srs2)
        #[arg(long = "instrument")]
        instruments: Vec<String>,

        /// Additional scheme.v1 JSON file to score (repeatable)
        #[arg(long = "scheme")]
        schemes: Vec<PathBuf>,

        /// Load a previously saved score table and merge into it
        #[arg(long)]
        load_table: Option<PathBuf>,

        /// Save the merged score table as JSON after scoring
        #[arg(long)]
        save_table: Option<PathBuf>,
    },

    /// Deduplicate responses only, keeping full rows and the header
    Dedup {
        /// Input responses CSV (use - for stdin); first row is a header
        #[arg(short, long)]
        input: PathBuf,

        /// Output deduplicated CSV (use - for stdout)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Check timestamps, participant ids, row widths and tokens without scoring
    Validate {
        /// Input responses CSV (use - for stdin); first row is a header
        #[arg(short, long)]
        input: PathBuf,

        /// Built-in instrument to check tokens against (repeatable; default: k6 and srs2)
        #[arg(long = "instrument")]
        instruments: Vec<String>,

        /// Additional scheme.v1 JSON file to check (repeatable)
        #[arg(long = "scheme")]
        schemes: Vec<PathBuf>,

        /// Output the validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print scheme.v1 configuration information
    Schema {
        /// Print the built-in instrument configurations as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PsyscoreCliError> {
    match cli.command {
        Commands::Score {
            input,
            output,
            instruments,
            schemes,
            load_table,
            save_table,
        } => cmd_score(
            &input,
            &output,
            &instruments,
            &schemes,
            load_table.as_deref(),
            save_table.as_deref(),
        ),

        Commands::Dedup { input, output } => cmd_dedup(&input, &output),

        Commands::Validate {
            input,
            instruments,
            schemes,
            json,
        } => cmd_validate(&input, &instruments, &schemes, json),

        Commands::Schema { json } => cmd_schema(json),
    }
}

fn cmd_score(
    input: &Path,
    output: &Path,
    instrument_names: &[String],
    scheme_files: &[PathBuf],
    load_table: Option<&Path>,
    save_table: Option<&Path>,
) -> Result<(), PsyscoreCliError> {
    let schemes = resolve_schemes(instrument_names, scheme_files)?;
    let (_, rows) = read_responses(input)?;

    if rows.is_empty() {
        return Err(PsyscoreCliError::NoResponses);
    }

    let mut processor = ScoreProcessor::new();
    if let Some(table_path) = load_table {
        let table_json = fs::read_to_string(table_path)?;
        processor.load_table(&table_json)?;
    }

    let canonical = Deduplicator::deduplicate(&rows)?;
    for scheme in &schemes {
        processor.run_pass(&canonical, scheme)?;
    }

    if let Some(table_path) = save_table {
        fs::write(table_path, processor.save_table()?)?;
    }

    // All passes succeeded; only now touch the output.
    write_records(output, &processor.table().to_records())
}

fn cmd_dedup(input: &Path, output: &Path) -> Result<(), PsyscoreCliError> {
    let (header, rows) = read_responses(input)?;

    if rows.is_empty() {
        return Err(PsyscoreCliError::NoResponses);
    }

    let canonical = Deduplicator::deduplicate(&rows)?;

    let mut records = Vec::with_capacity(canonical.len() + 1);
    records.push(header);
    for (_, row) in canonical.iter() {
        records.push(row.fields().to_vec());
    }

    write_records(output, &records)
}

fn cmd_validate(
    input: &Path,
    instrument_names: &[String],
    scheme_files: &[PathBuf],
    json: bool,
) -> Result<(), PsyscoreCliError> {
    let schemes = resolve_schemes(instrument_names, scheme_files)?;
    let (_, rows) = read_responses(input)?;

    let mut errors: Vec<ValidationErrorDetail> = Vec::new();

    match Deduplicator::deduplicate(&rows) {
        Ok(canonical) => {
            for (_, row) in canonical.iter() {
                for scheme in &schemes {
                    if let Err(e) = InstrumentScorer::score(row, scheme) {
                        errors.push(ValidationErrorDetail {
                            participant: Some(row.participant_id().to_string()),
                            instrument: Some(scheme.name().to_string()),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
        Err(e) => {
            errors.push(ValidationErrorDetail {
                participant: None,
                instrument: None,
                error: e.to_string(),
            });
        }
    }

    let report = ValidationReport {
        total_rows: rows.len(),
        checked_instruments: schemes.iter().map(|s| s.name().to_string()).collect(),
        errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:  {}", report.total_rows);
        println!("Instruments: {}", report.checked_instruments.join(", "));

        if report.errors.is_empty() {
            println!("No errors found.");
        } else {
            println!("\nErrors:");
            for err in &report.errors {
                match (&err.participant, &err.instrument) {
                    (Some(participant), Some(instrument)) => {
                        println!("  - participant {participant} ({instrument}): {}", err.error)
                    }
                    _ => println!("  - {}", err.error),
                }
            }
        }
    }

    if report.errors.is_empty() {
        Ok(())
    } else {
        Err(PsyscoreCliError::ValidationFailed(report.errors.len()))
    }
}

fn cmd_schema(json: bool) -> Result<(), PsyscoreCliError> {
    if json {
        let configs: Vec<SchemeConfig> = instruments::builtin_names()
            .iter()
            .filter_map(|name| instruments::builtin(name))
            .collect();
        println!("{}", serde_json::to_string_pretty(&configs)?);
    } else {
        println!("Scheme format: {}", SCHEME_VERSION);
        println!();
        println!("A scheme.v1 JSON document describes one instrument:");
        println!();
        println!("  name          score column name (e.g. \"k6_score\")");
        println!("  first_column  absolute column of item 1 in a response row");
        println!("  last_column   absolute column of the last item, inclusive");
        println!("  max_ordinal   highest item score; reverse items mirror around it");
        println!("  regular       token -> score table for regularly coded items");
        println!("  reverse_items 1-based item numbers scored as max_ordinal - score");
        println!();
        println!("Input rows: column 0 is the submission timestamp ({TIMESTAMP_FORMAT}),");
        println!("column 1 the participant id.");
        println!();
        println!("Built-in instruments: {}", instruments::builtin_names().join(", "));
        println!("Run with --json to print their full configurations.");
    }

    Ok(())
}

// Helper functions

fn resolve_schemes(
    instrument_names: &[String],
    scheme_files: &[PathBuf],
) -> Result<Vec<CodingScheme>, PsyscoreCliError> {
    let names: Vec<String> = if instrument_names.is_empty() && scheme_files.is_empty() {
        instruments::builtin_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        instrument_names.to_vec()
    };

    let mut schemes = Vec::new();
    for name in &names {
        let config = instruments::builtin(name)
            .ok_or_else(|| PsyscoreCliError::UnknownInstrument(name.clone()))?;
        schemes.push(CodingScheme::new(config)?);
    }

    for path in scheme_files {
        let config: SchemeConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
        schemes.push(CodingScheme::new(config)?);
    }

    Ok(schemes)
}

/// Read a responses CSV: a header record followed by data rows.
fn read_responses(input: &Path) -> Result<(Vec<String>, Vec<RawResponseRow>), PsyscoreCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input_data.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record?.iter().map(|s| s.to_string()).collect(),
        None => return Err(PsyscoreCliError::NoResponses),
    };

    let mut rows = Vec::new();
    for record in records {
        let fields: Vec<String> = record?.iter().map(|s| s.to_string()).collect();
        rows.push(RawResponseRow::new(fields));
    }

    Ok((header, rows))
}

fn write_records(output: &Path, records: &[Vec<String>]) -> Result<(), PsyscoreCliError> {
    let mut writer = csv::Writer::from_writer(Vec::<u8>::new());
    for record in records {
        writer.write_record(record)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| PsyscoreCliError::Io(io::Error::other(e.to_string())))?;

    if output.to_string_lossy() == "-" {
        io::stdout().write_all(&data)?;
    } else {
        fs::write(output, data)?;
    }

    Ok(())
}

// Error types

#[derive(Debug)]
enum PsyscoreCliError {
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Score(ScoreError),
    UnknownInstrument(String),
    NoResponses,
    ValidationFailed(usize),
}

impl From<io::Error> for PsyscoreCliError {
    fn from(e: io::Error) -> Self {
        PsyscoreCliError::Io(e)
    }
}

impl From<csv::Error> for PsyscoreCliError {
    fn from(e: csv::Error) -> Self {
        PsyscoreCliError::Csv(e)
    }
}

impl From<serde_json::Error> for PsyscoreCliError {
    fn from(e: serde_json::Error) -> Self {
        PsyscoreCliError::Json(e)
    }
}

impl From<ScoreError> for PsyscoreCliError {
    fn from(e: ScoreError) -> Self {
        PsyscoreCliError::Score(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PsyscoreCliError> for CliError {
    fn from(e: PsyscoreCliError) -> Self {
        match e {
            PsyscoreCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PsyscoreCliError::Csv(e) => CliError {
                code: "CSV_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check CSV syntax and quoting".to_string()),
            },
            PsyscoreCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check scheme.v1 JSON syntax; run 'psyscore schema'".to_string()),
            },
            PsyscoreCliError::Score(e) => CliError {
                code: "SCORE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Fix the offending row in the source data and rerun".to_string()),
            },
            PsyscoreCliError::UnknownInstrument(name) => CliError {
                code: "UNKNOWN_INSTRUMENT".to_string(),
                message: format!("unknown instrument {name:?}"),
                hint: Some(format!(
                    "Built-in instruments: {}; or pass --scheme <file.json>",
                    instruments::builtin_names().join(", ")
                )),
            },
            PsyscoreCliError::NoResponses => CliError {
                code: "NO_RESPONSES".to_string(),
                message: "No response rows found in input".to_string(),
                hint: Some("Ensure the input has a header row and at least one response".to_string()),
            },
            PsyscoreCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} validation errors"),
                hint: Some("Review the validation report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    checked_instruments: Vec<String>,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    participant: Option<String>,
    instrument: Option<String>,
    error: String,
}
