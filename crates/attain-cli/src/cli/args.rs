use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DEFAULT_DB: &str = ".attain/matrix.db";

#[derive(Parser)]
#[command(
    name = "attain",
    version,
    about = "Outcome relation matrix: store academic outcome data, derive weighted attainment reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the base schema (idempotent)
    Init(InitArgs),
    /// Insert outcomes, relations, criteria and students
    Add(AddArgs),
    /// Load a full dataset from a YAML document
    Import(ImportArgs),
    /// Generate report artifacts and materialize the derived tables
    Report(ReportArgs),
    /// Show store row counts
    Status(StatusArgs),
}

#[derive(clap::Args)]
pub struct InitArgs {
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,
}

#[derive(clap::Args)]
pub struct AddArgs {
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub entity: AddCommand,
}

#[derive(Subcommand)]
pub enum AddCommand {
    /// Add a program outcome
    ProgramOutcome { text: String },
    /// Add a course outcome
    CourseOutcome { text: String },
    /// Relate a program outcome to a course outcome (value in [0, 1])
    Relation {
        #[arg(long)]
        program: i64,
        #[arg(long)]
        course: i64,
        #[arg(long)]
        value: f64,
    },
    /// Commit a complete criteria set (name=weight ...; weights must sum
    /// to 100). Replaces the previous set and rebuilds the students table.
    Criteria { entries: Vec<String> },
    /// Mark a course outcome as assessed by a criterion (value 0 or 1)
    Assessment {
        #[arg(long)]
        course: i64,
        #[arg(long)]
        criterion: String,
        #[arg(long)]
        value: u8,
    },
    /// Add a student row (criterion=score ..., scores in [0, 100])
    Student {
        #[arg(long)]
        id: i64,
        scores: Vec<String>,
    },
}

#[derive(clap::Args)]
pub struct ImportArgs {
    #[arg(long)]
    pub file: PathBuf,

    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,
}

#[derive(clap::Args)]
pub struct ReportArgs {
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,

    /// Output directory for the CSV artifacts
    #[arg(long, default_value = "reports")]
    pub out: PathBuf,

    /// Generate a single report: table1..table5 or gradebook. table5 reads
    /// the table4 materialization, so run table4 (or a full run) first.
    #[arg(long)]
    pub only: Option<String>,

    /// Also render each grid to the terminal
    #[arg(long)]
    pub print: bool,
}

#[derive(clap::Args)]
pub struct StatusArgs {
    #[arg(long, default_value = DEFAULT_DB)]
    pub db: PathBuf,

    /// Output format: text | json
    #[arg(long, default_value = "text")]
    pub format: String,
}
