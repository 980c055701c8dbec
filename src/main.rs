// Merchant Blocking CLI
// Reads a two-column merchant CSV and writes candidate pairs sharing a block key.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use merchant_blocking::config::{DEFAULT_COLUMN_1, DEFAULT_COLUMN_2, DEFAULT_OUTPUT};
use merchant_blocking::{run_blocking, BlockingConfig, BlockingSummary, Engine, VERSION};

#[derive(Parser, Debug)]
#[command(author, version = VERSION, about = "Merchant-name blocking for record linkage", long_about = None)]
struct Cli {
    /// Input CSV with the two merchant-name columns
    #[arg(long)]
    input: PathBuf,

    /// First merchant-name column
    #[arg(long, default_value = DEFAULT_COLUMN_1)]
    col1: String,

    /// Second merchant-name column
    #[arg(long, default_value = DEFAULT_COLUMN_2)]
    col2: String,

    /// Candidate pair CSV to write
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// memory | sqlite (case-insensitive)
    #[arg(long, default_value = "memory")]
    engine: String,

    /// Rows per chunk for the sqlite engine; zero or negative uses the default
    #[arg(long, allow_negative_numbers = true)]
    chunksize: Option<i64>,

    /// Keep the sqlite store at this path instead of a temp directory
    #[arg(long)]
    store_path: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    summary_json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Unknown engines fail here, before any input is read
    let engine: Engine = cli
        .engine
        .parse()
        .with_context(|| format!("Invalid --engine value '{}'", cli.engine))?;

    let config = build_config(&cli, engine);

    let summary = run_blocking(&config)
        .with_context(|| format!("Blocking failed for {}", cli.input.display()))?;

    if cli.summary_json {
        println!("{}", summary.to_json()?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn build_config(cli: &Cli, engine: Engine) -> BlockingConfig {
    BlockingConfig::new(&cli.input)
        .with_columns(&cli.col1, &cli.col2)
        .with_output(&cli.output)
        .with_engine(engine)
        .with_chunk_size(cli.chunksize)
        .with_store_path(cli.store_path.clone())
}

fn print_summary(summary: &BlockingSummary) {
    match &summary.output_path {
        Some(path) => {
            println!("Done.");
            println!("Engine:           {}", summary.engine);
            println!("Records col1:     {}", summary.records_1);
            println!("Records col2:     {}", summary.records_2);
            println!("Candidate pairs:  {}", summary.candidate_pairs);
            println!("Output:           {}", path.display());
        }
        None => println!("No data found in input."),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["merchant-blocking", "--input", "in.csv"]).unwrap();
        assert_eq!(cli.col1, "Merchant_Name_1");
        assert_eq!(cli.col2, "Merchant_Name_2");
        assert_eq!(cli.output, PathBuf::from("merchant_candidate_pairs_blocked.csv"));
        assert_eq!(cli.engine, "memory");
        assert_eq!(cli.chunksize, None);
        assert!(!cli.summary_json);
    }

    #[test]
    fn test_cli_accepts_negative_chunksize() {
        let cli = Cli::try_parse_from([
            "merchant-blocking",
            "--input",
            "in.csv",
            "--engine",
            "sqlite",
            "--chunksize",
            "-5",
        ])
        .unwrap();
        assert_eq!(cli.chunksize, Some(-5));

        let engine: Engine = cli.engine.parse().unwrap();
        let config = build_config(&cli, engine);
        assert_eq!(config.engine, Engine::Sqlite);
        assert_eq!(config.effective_chunk_size(), 200_000);
    }

    #[test]
    fn test_cli_zero_chunksize_uses_default() {
        let cli = Cli::try_parse_from([
            "merchant-blocking",
            "--input",
            "in.csv",
            "--chunksize",
            "0",
        ])
        .unwrap();
        let config = build_config(&cli, Engine::Sqlite);
        assert_eq!(config.effective_chunk_size(), 200_000);
    }

    #[test]
    fn test_cli_requires_input() {
        assert!(Cli::try_parse_from(["merchant-blocking"]).is_err());
    }

    #[test]
    fn test_cli_version_is_crate_version() {
        let err = Cli::try_parse_from(["merchant-blocking", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        assert!(err.to_string().contains(VERSION));
    }
}
