//! Screen CLI - Command-line interface for the screening engine
//!
//! Commands:
//! - analyze: Score a session file into an analysis result
//! - validate: Report input-quality issues in a session file
//! - calibration: Print the default calibration
//! - schema: Describe the input and output shapes

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use screening_engine::adapter::{parse_session, validate_tasks};
use screening_engine::{
    AnalysisEncoder, Calibration, ScreeningAnalyzer, ScreeningError, ENGINE_NAME, ENGINE_VERSION,
};

/// Screen - Deterministic scoring for gamified developmental screening sessions
#[derive(Parser)]
#[command(name = "screen")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Score screening sessions into a probability, tiers and red flags", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a session (object with `tasks` or a bare task array)
    Analyze {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        format: OutputFormat,

        /// Calibration file (JSON); missing keys use the defaults
        #[arg(long)]
        calibration: Option<PathBuf>,
    },

    /// Report input-quality issues without scoring
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default calibration as JSON
    Calibration,

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact analysis result
    Json,
    /// Pretty-printed analysis result
    JsonPretty,
    /// Result wrapped with engine provenance
    Envelope,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Session / task records
    Input,
    /// Analysis result
    Output,
}

fn main() -> ExitCode {
    init_tracing();
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

/// Log to stderr, filtered by RUST_LOG (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<(), ScreenCliError> {
    match cli.command {
        Commands::Analyze {
            input,
            output,
            format,
            calibration,
        } => cmd_analyze(&input, &output, format, calibration.as_deref()),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Calibration => {
            println!("{}", Calibration::default().to_json()?);
            Ok(())
        }

        Commands::Schema { schema_type } => {
            cmd_schema(schema_type);
            Ok(())
        }
    }
}

fn read_input(input: &Path) -> Result<String, ScreenCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn cmd_analyze(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    calibration: Option<&Path>,
) -> Result<(), ScreenCliError> {
    let analyzer = match calibration {
        Some(path) => {
            let calibration = Calibration::from_json(&fs::read_to_string(path)?)?;
            ScreeningAnalyzer::with_calibration(calibration)?
        }
        None => ScreeningAnalyzer::new(),
    };

    let session = parse_session(&read_input(input)?)?;
    let result = analyzer.analyze(&session.tasks);

    let output_data = match format {
        OutputFormat::Json => serde_json::to_string(&result)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&result)?,
        OutputFormat::Envelope => {
            AnalysisEncoder::new().encode_to_json(session.session_id.as_ref(), &result)?
        }
    };

    if output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data + "\n")?;
    }

    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), ScreenCliError> {
    let session = parse_session(&read_input(input)?)?;
    let issues = validate_tasks(&session.tasks);

    let report = ValidationReport {
        total_tasks: session.tasks.len(),
        tasks_with_issues: {
            let mut indices: Vec<usize> = issues.iter().map(|i| i.index).collect();
            indices.dedup();
            indices.len()
        },
        issues: issues
            .iter()
            .map(|i| ValidationIssueDetail {
                index: i.index,
                task_id: i.task_id,
                issue: i.kind.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total tasks:       {}", report.total_tasks);
        println!("Tasks with issues: {}", report.tasks_with_issues);

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                let id = issue
                    .task_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                println!("  - Task {} (index {}): {}", id, issue.index, issue.issue);
            }
        }
    }

    // Issues are tolerated by the scorer, so they are reported but never fail the run
    Ok(())
}

fn cmd_schema(schema_type: SchemaType) {
    match schema_type {
        SchemaType::Input => {
            println!("Input: screening session");
            println!();
            println!("Either {{ \"sessionId\": <int|string>, \"tasks\": [...] }} or a bare task array.");
            println!("Array order is task order.");
            println!();
            println!("Task record (camelCase; snake_case accepted):");
            println!("- id: integer (optional)");
            println!("- taskType, taskName: string");
            println!("- durationSeconds: number (missing or <= 0 scored as 1)");
            println!("- engagementScore: number, fraction (<= 1) or percentage (missing scored as 0.5)");
            println!("- rawData: object or serialized object; recognized keys:");
            println!("  social:      eyeContact, nameResponse, jointAttention, socialReciprocity, socialScore");
            println!("  repetitive:  repetitiveIntensity, repetitiveFrequency");
            println!("  sensory:     sensoryHypo, sensoryHyper");
            println!("  motor:       fineMotor, grossMotor, motorPlanning, imitation");
            println!("  flags:       noEyeContact, noNameResponse, handFlapping, spinRepetitions, coverEars");
            println!("  timeline:    observation");
        }
        SchemaType::Output => {
            println!("Output: analysis result ({} {})", ENGINE_NAME, ENGINE_VERSION);
            println!();
            println!("- asdProbability: 0-100");
            println!("- confidenceLevel: high | medium | low");
            println!("- severityScore: 1 | 2 | 3");
            println!("- socialCommunicationScore, repetitiveBehaviorsScore,");
            println!("  sensoryProcessingScore, motorCoordinationScore: 0-100 (higher is more typical)");
            println!("- redFlags: [string]");
            println!("- keyObservations: [{{ timestamp: HH:MM:SS, behavior }}] (1 to 6 entries)");
            println!("- recommendation: refer_for_diagnostic | monitor | reassure");
            println!("- analysisData: {{ tasksAnalyzed, domainScores, engagementAverage, calibrationVersion, notes }}");
            println!();
            println!("--format envelope wraps the result as {{ engine, sessionId, computedAtUtc, result }}.");
        }
    }
}

// Error types

#[derive(Debug)]
enum ScreenCliError {
    Io(io::Error),
    Screening(ScreeningError),
    Json(serde_json::Error),
}

impl From<io::Error> for ScreenCliError {
    fn from(e: io::Error) -> Self {
        ScreenCliError::Io(e)
    }
}

impl From<ScreeningError> for ScreenCliError {
    fn from(e: ScreeningError) -> Self {
        ScreenCliError::Screening(e)
    }
}

impl From<serde_json::Error> for ScreenCliError {
    fn from(e: serde_json::Error) -> Self {
        ScreenCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<ScreenCliError> for CliError {
    fn from(e: ScreenCliError) -> Self {
        match e {
            ScreenCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            ScreenCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            ScreenCliError::Screening(e) => {
                let (code, hint) = match &e {
                    ScreeningError::ParseError(_)
                    | ScreeningError::JsonError(_)
                    | ScreeningError::MissingField(_) => (
                        "PARSE_ERROR",
                        "Run 'screen schema input' for the accepted shape",
                    ),
                    ScreeningError::InvalidCalibration(_) => (
                        "INVALID_CALIBRATION",
                        "Start from 'screen calibration' and edit the values",
                    ),
                    ScreeningError::SessionNotFound(_) | ScreeningError::UpstreamFetch(_) => {
                        ("FETCH_ERROR", "Check the session source")
                    }
                    ScreeningError::EncodingError(_) => ("ENCODING_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
        }
    }
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    total_tasks: usize,
    tasks_with_issues: usize,
    issues: Vec<ValidationIssueDetail>,
}

#[derive(Serialize)]
struct ValidationIssueDetail {
    index: usize,
    task_id: Option<i64>,
    issue: String,
}
