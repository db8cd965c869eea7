//! Build history reconstruction from fog-of-war replays.
//!
//! Reads the per-turn documents of one match, rebuilds every unit's history,
//! infers build turns that were never observed, and prints the production
//! of each day.
//!
//! # Usage
//!
//! ```bash
//! # Day listing for both parties
//! cargo run -p recon_cli -- 1234567
//!
//! # Only the opponent's production, from alice's point of view
//! cargo run -p recon_cli -- 1234567 --only-enemy --viewer alice
//!
//! # Unit-type ratios as JSON
//! cargo run -p recon_cli -- 1234567 --mode ratios --format json
//! ```
//!
//! Report on stdout, logs on stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::result::Result;

use clap::Parser;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recon_cli::render::{self, Format, MatchInfo, Mode};
use recon_cli::source::DirectorySource;
use recon_cli::CliError;
use recon_core::prelude::*;

#[derive(Parser)]
#[command(name = "recon")]
#[command(about = "Reconstruct build history from fog-of-war replays")]
#[command(version)]
struct Cli {
    /// Match identifier
    match_id: String,

    /// Directory holding one folder of turn documents per match
    #[arg(long, default_value = "replays")]
    replay_dir: PathBuf,

    /// Only show the opponent's production
    #[arg(long)]
    only_enemy: bool,

    /// Display name of the party whose view the replay shows
    #[arg(long)]
    viewer: Option<String>,

    /// Report to produce
    #[arg(long, value_enum, default_value_t = Mode::Days)]
    mode: Mode,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// RON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of turns to read
    #[arg(long)]
    ceiling: Option<u32>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for the report
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

/// Load settings and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<ReconConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => ReconConfig::load(path)?,
        None => ReconConfig::default(),
    };
    if let Some(viewer) = &cli.viewer {
        config.viewer = Some(viewer.clone());
    }
    if let Some(ceiling) = cli.ceiling {
        config.turn_ceiling = ceiling;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let filter = match (cli.only_enemy, &config.viewer) {
        (false, _) => ReportFilter::All,
        (true, Some(viewer)) => ReportFilter::EnemyOf(viewer.clone()),
        (true, None) => return Err(CliError::MissingViewer),
    };

    let mut source = DirectorySource::new(&cli.replay_dir, &cli.match_id);
    tracing::info!(match_id = %cli.match_id, dir = %source.dir().display(), "Analysing match");

    let result = match reconstruct(&mut source, &config) {
        Ok(result) => result,
        Err(ReconError::NoData(reason)) => {
            tracing::warn!(%reason, "Turn 0 unavailable");
            return render::write_report(&mut std::io::stdout().lock(), "No game info");
        }
        Err(e) => return Err(e.into()),
    };

    let info = MatchInfo::new(&cli.match_id, &result);
    let output = match cli.mode {
        Mode::Days => {
            let groups: Vec<DayGroup> =
                aggregate(&result.registry, &config.cost_resolver(), &filter)?.collect();
            match cli.format {
                Format::Text => render::days_text(&info, &groups),
                Format::Json => render::days_json(&info, &groups)?,
            }
        }
        Mode::Ratios => {
            let party = match &filter {
                ReportFilter::All => None,
                ReportFilter::EnemyOf(viewer) => {
                    let roster = result.registry.roster();
                    let me = roster
                        .by_name(viewer)
                        .ok_or_else(|| ReconError::UnknownParty(viewer.clone()))?;
                    roster.parties().iter().find(|p| p.id != me.id).map(|p| p.id)
                }
            };
            let report = production_ratios(&result.registry, &config.ratio_options(party));
            match cli.format {
                Format::Text => render::ratios_text(&info, &report),
                Format::Json => render::ratios_json(&info, &report)?,
            }
        }
    };

    render::write_report(&mut std::io::stdout().lock(), &output)
}
