use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the bus-jam workspace",
    long_about = "A unified CLI for playing levels, benchmarks,\n\
                  and CI checks in the bus-jam workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Autoplay a level headlessly and print its summary
    Run {
        /// Level definition JSON
        #[arg(long, default_value = "levels/first_steps.json")]
        level: String,
        /// Seed for random autoplay; greedy autoplay when omitted
        #[arg(long, env = "JAM_SEED")]
        seed: Option<u64>,
    },
    /// Lint every level under levels/
    Lint,
    /// Run Criterion benchmarks
    Bench {
        /// Save results under this baseline name
        #[arg(long)]
        save_baseline: Option<String>,
        /// Compare against a previously saved baseline
        #[arg(long, conflicts_with = "save_baseline")]
        baseline: Option<String>,
    },
    /// Run CI checks (fmt, clippy, tests, levels, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run workspace tests
    Test {
        /// Run the ignored load tests in jam_core instead
        #[arg(long)]
        load: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Lint and autoplay the bundled levels
    Levels,
    /// Run benchmarks
    Bench,
    /// Run check + levels + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn bundled_levels() -> Vec<PathBuf> {
    let mut levels: Vec<PathBuf> = std::fs::read_dir(Path::new("levels"))
        .expect("failed to read levels/")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    levels.sort();
    levels
}

fn jam_cli(args: &[&str]) {
    let mut full = vec!["run", "-p", "jam_cli", "--quiet", "--"];
    full.extend_from_slice(args);
    run_cargo(&full);
}

fn lint_levels() {
    for level in bundled_levels() {
        let path = level.to_string_lossy();
        jam_cli(&["lint", "--level", &path]);
    }
}

fn ci_check() {
    step("Format check");
    run_cargo(&["fmt", "--all", "--", "--check"]);
    step("Clippy");
    run_cargo(&[
        "clippy",
        "--workspace",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ]);
    step("Tests: jam_core");
    run_cargo(&["test", "-p", "jam_core"]);
    step("Tests: jam_cli");
    run_cargo(&["test", "-p", "jam_cli"]);
}

fn ci_levels() {
    step("Lint bundled levels");
    lint_levels();
    step("Autoplay bundled levels");
    for level in bundled_levels() {
        let path = level.to_string_lossy();
        jam_cli(&["play", "--level", &path, "--autoplay"]);
    }
}

fn ci_bench() {
    step("Benchmarks");
    run_cargo(&["bench", "--package", "jam_core", "--bench", "performance"]);
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { level, seed } => {
            let seed = seed.map(|s| s.to_string());
            let mut args = vec!["play", "--level", &level, "--autoplay"];
            if let Some(seed) = seed.as_deref() {
                args.extend_from_slice(&["--seed", seed]);
            }
            jam_cli(&args);
        }
        Commands::Lint => lint_levels(),
        Commands::Bench {
            save_baseline,
            baseline,
        } => {
            let mut args = vec!["bench", "--package", "jam_core", "--bench", "performance"];
            if let Some(name) = save_baseline.as_deref() {
                args.extend_from_slice(&["--", "--save-baseline", name]);
            } else if let Some(name) = baseline.as_deref() {
                args.extend_from_slice(&["--", "--baseline", name]);
            }
            run_cargo(&args);
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Levels => ci_levels(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_levels();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
        Commands::Test { load: false } => {
            run_cargo(&["test", "--workspace"]);
        }
        Commands::Test { load: true } => {
            run_cargo(&[
                "test",
                "-p",
                "jam_core",
                "--test",
                "load_tests",
                "--",
                "--ignored",
            ]);
        }
    }
}
