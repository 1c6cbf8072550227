use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use rta_prep::app::{PrepareUseCase, TableSink};
use rta_prep::infra::{CsvSink, JsonLinesSink};
use rta_prep::logging;
use rta_prep::pipeline::ingestion;
use rta_prep::pipeline::processing::derive::DerivationRegistry;
use rta_prep::pipeline::processing::normalize::canonical_key;

#[derive(Parser)]
#[command(name = "rta_prep")]
#[command(about = "Road traffic accident dataset preparation pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the schema, derive features, and write the cleaned table
    Prepare {
        /// Input CSV file
        input: PathBuf,
        /// Output file; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        /// Output format for the cleaned table
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Show canonical headers and which derivations would apply
    Inspect {
        /// Input CSV file
        input: PathBuf,
    },
}

fn run_prepare(
    input: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let bytes = fs::read(&input)?;
    let mut use_case = PrepareUseCase::new();

    let mut sink: Box<dyn TableSink> = match (&output, format) {
        (Some(path), OutputFormat::Json) => Box::new(JsonLinesSink::new(fs::File::create(path)?)),
        (Some(path), OutputFormat::Csv) => Box::new(CsvSink::new(fs::File::create(path)?)),
        (None, OutputFormat::Json) => Box::new(JsonLinesSink::new(std::io::stdout())),
        (None, OutputFormat::Csv) => Box::new(CsvSink::new(std::io::stdout())),
    };

    let summary = use_case.prepare_into(&bytes, sink.as_mut())?;
    info!(input = %input.display(), "prepare finished");

    eprintln!("\n📊 Prepare results for {}:", input.display());
    eprintln!("   Rows: {}", summary.rows);
    eprintln!("   Sentinel cells cleared: {}", summary.cleared_cells);
    eprintln!("   Derivations applied: {}", summary.applied.join(", "));
    if !summary.skipped.is_empty() {
        eprintln!("   Derivations skipped: {}", summary.skipped.join(", "));
    }
    let missing: usize = summary.missing_by_column.values().sum();
    eprintln!("   Missing cells after preparation: {}", missing);
    Ok(())
}

fn run_inspect(input: PathBuf) -> anyhow::Result<()> {
    let raw = ingestion::read_csv_path(&input)?;
    let registry = DerivationRegistry::builtin();

    println!("Columns ({}):", raw.headers().len());
    for header in raw.headers() {
        println!("   {:?} -> {}", header, canonical_key(header));
    }

    let canonical: Vec<String> = raw.headers().iter().map(|h| canonical_key(h)).collect();
    println!("\nDerivations:");
    for derivation in registry.iter() {
        let available = derivation
            .required()
            .iter()
            .all(|c| canonical.iter().any(|h| h == c));
        let status = if available { "available" } else { "skipped (source column absent)" };
        println!("   {} [{}]: {}", derivation.name(), derivation.required().join(", "), status);
    }
    println!("\nRows: {}", raw.len());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Prepare {
            input,
            output,
            format,
        } => run_prepare(input, output, format),
        Commands::Inspect { input } => run_inspect(input),
    }
}
