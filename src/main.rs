mod input;
mod report;

use clap::{Parser, ValueEnum};
use input::read_input;
use laminax::{analyze_load_cases, AnalysisMode};
use report::{render_json, render_text};
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Analysis mode selected on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Evaluate the undamaged laminate only.
    FirstPly,
    /// Degrade failed plies until final failure.
    LastPly,
}

impl From<ModeArg> for AnalysisMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::FirstPly => Self::FirstPly,
            ModeArg::LastPly => Self::LastPly,
        }
    }
}

/// Output format of the report.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
enum Format {
    /// Human readable summary.
    #[default]
    Text,
    /// Complete results as JSON.
    Json,
}

/// Laminate failure analysis with progressive ply degradation.
#[derive(Debug, Parser)]
#[command(name = "laminax", version, about)]
struct Cli {
    /// JSON document with `laminate`, `load` and optional `config`.
    input: PathBuf,
    /// Override the analysis mode from the input document.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so the report on stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("laminax=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let input = read_input(&cli.input)?;
    let mut config = input.config;
    if let Some(mode) = cli.mode {
        config.mode = mode.into();
    }

    // Load cases are independent, so they run in parallel on copies of the
    // degraded materials.
    let loads = input.load.into_vec();
    let results = analyze_load_cases(&input.laminate, &loads, &config);
    let cases: Vec<_> = loads.into_iter().zip(results).collect();

    let report = match cli.format {
        Format::Text => render_text(&cases),
        Format::Json => render_json(&cases)?,
    };
    println!("{report}");

    if let Some((_, Err(error))) = cases.iter().find(|(_, result)| result.is_err()) {
        return Err(error.clone().into());
    }
    Ok(())
}
