use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{Parser, Subcommand};
use jam_cli::play::{autoplay, replay, Autoplay};
use jam_cli::script::load_script;
use jam_cli::summary::{LintReport, PlaySummary};
use jam_core::level::{LevelDefinition, SessionConfig};
use jam_core::{LevelResult, LevelSession};
use log::{error, info, warn};

/// Headless bus-jam level player
#[derive(Parser)]
#[command(version, about = "Plays bus-jam levels without a renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a level from a click script or by autoplay and print a JSON summary
    Play {
        /// Level definition JSON
        #[arg(long, value_name = "PATH")]
        level: PathBuf,
        /// Session config JSON; defaults apply to missing fields
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Click script JSON
        #[arg(long, value_name = "PATH", conflicts_with = "autoplay")]
        script: Option<PathBuf>,
        /// Choose clicks automatically
        #[arg(long)]
        autoplay: bool,
        /// Random autoplay seed; greedy autoplay when omitted
        #[arg(long, requires = "autoplay")]
        seed: Option<u64>,
    },
    /// Validate a level and report design warnings
    Lint {
        #[arg(long, value_name = "PATH")]
        level: PathBuf,
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> LevelResult<SessionConfig> {
    match path {
        Some(path) => SessionConfig::load(path),
        None => Ok(SessionConfig::default()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> LevelResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn play(
    level: &Path,
    config: Option<&Path>,
    script: Option<&Path>,
    strategy: Option<Autoplay>,
) -> LevelResult<()> {
    let definition = LevelDefinition::load(level)?;
    let config = load_config(config)?;
    for warning in definition.lint(config.bus_capacity) {
        warn!("{}: {warning:?}", level.display());
    }
    let mut session = LevelSession::new(definition, config)?;

    let events = match (script, strategy) {
        (Some(script), _) => {
            let clicks = load_script(script)?;
            info!("replaying {} clicks from {}", clicks.len(), script.display());
            replay(&mut session, &clicks)
        }
        (None, Some(strategy)) => {
            info!("autoplaying {} with {strategy:?}", level.display());
            autoplay(&mut session, strategy)
        }
        (None, None) => {
            warn!("neither --script nor --autoplay given, nothing to play");
            0
        }
    };

    let summary = PlaySummary::collect(&mut session, events);
    info!(
        "{} finished {:?} after {events} events ({:.0} events/sec)",
        level.display(),
        summary.outcome,
        session.metrics().events_per_second()
    );
    print_json(&summary)
}

fn lint(level: &Path, config: Option<&Path>) -> LevelResult<()> {
    let definition = LevelDefinition::load(level)?;
    let config = load_config(config)?;
    let report = LintReport {
        passengers: definition.passenger_count(),
        buses: definition.buses.len(),
        warnings: definition.lint(config.bus_capacity),
    };
    print_json(&report)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Play {
            level,
            config,
            script,
            autoplay,
            seed,
        } => {
            let strategy = autoplay.then(|| match seed {
                Some(seed) => Autoplay::Random { seed: *seed },
                None => Autoplay::Greedy,
            });
            play(level, config.as_deref(), script.as_deref(), strategy)
        }
        Commands::Lint { level, config } => lint(level, config.as_deref()),
    };

    if let Err(err) = result {
        error!("{err}");
        exit(1);
    }
}
