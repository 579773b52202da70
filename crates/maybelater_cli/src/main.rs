//! MAYBELATER CLI
//!
//! Runs `.ml` programs through the probabilistic scheduler. Program
//! output goes to stdout; logs go to stderr.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use maybelater_lang::{Node, parse_program};
use maybelater_runtime::{Environment, Interpreter, RuntimeConfig};
use maybelater_sim::SimSeed;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "maybelater")]
#[command(about = "MAYBELATER - statements run eventually, probably", long_about = None)]
struct Cli {
    /// Log level for maybelater crates (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program
    Run {
        /// Path to the program
        file: PathBuf,
        /// Random seed: a number, or any string to hash
        #[arg(long)]
        seed: Option<String>,
        /// JSON runtime configuration
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the merged variable view as JSON after the run
        #[arg(long)]
        dump_vars: bool,
    },
    /// Parse a program and print its AST as JSON
    Parse {
        /// Path to the program
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match cli.command {
        Commands::Run {
            file,
            seed,
            config,
            dump_vars,
        } => run(&file, seed.as_deref(), config.as_deref(), dump_vars),
        Commands::Parse { file } => {
            let program = load_program(&file)?;
            println!("{}", serde_json::to_string_pretty(&program)?);
            Ok(())
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("maybelater={}", level)),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("maybelater=info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(file: &Path, seed: Option<&str>, config: Option<&Path>, dump_vars: bool) -> Result<()> {
    let program = load_program(file)?;
    let config = match config {
        Some(path) => RuntimeConfig::from_file(path)
            .wrap_err_with(|| format!("loading config {}", path.display()))?,
        None => RuntimeConfig::default(),
    };
    let seed = seed_from_arg(seed);
    tracing::info!(file = %file.display(), seed = seed.seed, "starting run");

    let mut interpreter = Interpreter::new(config, Environment::seeded(seed));
    interpreter.load_program(&program)?;
    let report = interpreter.run()?;
    tracing::info!(
        dispatched = report.dispatched,
        abandoned = report.abandoned,
        panicked = report.panicked,
        "run complete"
    );

    if dump_vars {
        println!("{}", serde_json::to_string_pretty(&report.final_state)?);
    }
    Ok(())
}

fn load_program(file: &Path) -> Result<Vec<Node>> {
    let source = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("reading program {}", file.display()))?;
    let program = parse_program(&source).wrap_err_with(|| format!("parsing {}", file.display()))?;
    Ok(program)
}

/// Numeric seeds are used as-is, anything else is hashed
fn seed_from_arg(arg: Option<&str>) -> SimSeed {
    match arg {
        Some(text) => match text.parse::<u64>() {
            Ok(seed) => SimSeed::from_literal(seed),
            Err(_) => SimSeed::from_string(text.to_string()),
        },
        None => SimSeed::entropy(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maybelater_sim::SeedSource;
    use std::io::Write;

    #[test]
    fn test_numeric_seed_is_literal() {
        let seed = seed_from_arg(Some("7"));
        assert_eq!(seed.seed, 7);
        assert_eq!(seed.source, SeedSource::Literal(7));
    }

    #[test]
    fn test_text_seed_is_hashed_stably() {
        assert_eq!(
            seed_from_arg(Some("tuesday")).seed,
            seed_from_arg(Some("tuesday")).seed
        );
        assert!(matches!(
            seed_from_arg(Some("tuesday")).source,
            SeedSource::FromString(_)
        ));
    }

    #[test]
    fn test_load_program_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "meh x = 5;\nPRINT(x);").unwrap();
        let program = load_program(file.path()).unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn test_missing_program_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_program(&dir.path().join("nope.ml")).is_err());
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "maybelater",
            "run",
            "prog.ml",
            "--seed",
            "3",
            "--dump-vars",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                file,
                seed,
                dump_vars,
                config,
            } => {
                assert_eq!(file, PathBuf::from("prog.ml"));
                assert_eq!(seed.as_deref(), Some("3"));
                assert!(dump_vars);
                assert!(config.is_none());
            }
            Commands::Parse { .. } => panic!("expected run"),
        }
    }
}
