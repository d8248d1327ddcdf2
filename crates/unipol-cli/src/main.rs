//! Binary entrypoint for the unipol pre-processor.
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use unipol_cli::config::{RunConfig, CONFIG_ENV};
use unipol_cli::{
    build_preprocessor, execute, exit_code, init_tracing, policy_report, source, write_stats,
};

#[derive(Debug, Parser)]
#[command(
    name = "unipol",
    version = unipol_core::UNIPOL_VERSION,
    about = "Turns testnet logs into monitoring facts"
)]
struct Cli {
    /// YAML run configuration
    #[arg(long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Pre-process logs into facts (default)
    Run(RunArgs),
    /// List supported policies
    Policies {
        /// Only policies that run without global infra
        #[arg(long)]
        without_infra: bool,
    },
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Newline-delimited JSON log documents (stdin if omitted)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Fact output (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Global infra description (YAML or JSON)
    #[arg(long)]
    infra: Option<PathBuf>,
    /// Write run statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,
    /// Policies to monitor (all if omitted)
    #[arg(long, value_delimiter = ',')]
    policies: Option<Vec<String>>,
    #[arg(long)]
    log_level: Option<String>,
}

impl RunArgs {
    fn apply(self, config: &mut RunConfig) {
        if self.input.is_some() {
            config.input = self.input;
        }
        if self.output.is_some() {
            config.output = self.output;
        }
        if self.infra.is_some() {
            config.infra = self.infra;
        }
        if self.stats.is_some() {
            config.stats = self.stats;
        }
        if self.policies.is_some() {
            config.policies = self.policies;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
    }
}

fn run(config: RunConfig) -> anyhow::Result<()> {
    let processor = build_preprocessor(&config)?;

    let input = source::open_input(config.input.as_deref()).context("opening input")?;
    let mut output: Box<dyn Write> = match &config.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let stats = execute(processor, input, &mut output)?;
    tracing::info!(
        documents = stats.documents_processed,
        facts = stats.facts_emitted,
        test_runtime_ms = stats.test_runtime_milliseconds,
        pre_processing_s = stats.pre_processing.perf_counter_seconds,
        "run statistics"
    );
    if let Some(path) = &config.stats {
        write_stats(path, &stats)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = RunConfig::load(cli.config.as_deref())?;
    config.apply_env();

    match cli.command.unwrap_or_else(|| Command::Run(RunArgs::default())) {
        Command::Run(args) => {
            args.apply(&mut config);
            init_tracing(&config.log_level);
            run(config)
        }
        Command::Policies { without_infra } => {
            init_tracing(&config.log_level);
            println!("{}", serde_json::to_string_pretty(&policy_report(without_infra))?);
            Ok(())
        }
    }
}
