//! Translation CLI
//!
//! Runs consecutive timesteps of the translation process and prints one JSON
//! update per line:
//! ```text
//! translation-cli --steps 10 --timestep 1.0 [--config config.json] [--states states.json]
//! ```
//!
//! Each update is applied to the snapshot before the next step, the way the
//! scheduling framework would apply it.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use stochastic_translation_rs::{ProcessStates, Translation, TranslationConfig};

#[derive(Parser, Debug)]
#[command(name = "translation-cli")]
#[command(author = "Cell Simulation Team")]
#[command(version)]
#[command(about = "Stochastic gene translation kernel", long_about = None)]
struct Cli {
    /// Process configuration (JSON); defaults to the built-in six-transcript process
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial snapshot (JSON); defaults to 10 of every operon and ribosome
    #[arg(long)]
    states: Option<PathBuf>,

    /// Override the configured RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Duration of each step; defaults to the configured time_step
    #[arg(long)]
    timestep: Option<f64>,

    /// Number of consecutive steps
    #[arg(long, default_value = "1")]
    steps: usize,

    /// Print the final snapshot after the updates
    #[arg(long)]
    print_states: bool,
}

/// Snapshot used when none is given: every monomer at 100, ATP plentiful
fn default_states(process: &Translation) -> ProcessStates {
    let mut states = ProcessStates::new();
    states.set_unbound_ribosomes(10);
    for operon in &process.ports_schema().transcripts {
        states.transcripts.insert(operon.clone(), 10);
    }
    for monomer in process.monomer_ids() {
        states.molecules.insert(monomer.clone(), 100);
    }
    states.molecules.insert("ATP".to_string(), 100_000);
    states.molecules.insert("ADP".to_string(), 0);
    states
}

/// Route the engine's `log` output to stderr; `RUST_LOG` overrides the level
fn init_logging() {
    // A logger may already be installed (tests, embedding)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            TranslationConfig::from_json(&json)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => TranslationConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.rng_seed = seed;
    }

    let mut process = Translation::new(config).context("Failed to build translation process")?;
    let timestep = cli.timestep.unwrap_or_else(|| process.time_step());
    if !timestep.is_finite() || timestep < 0.0 {
        bail!("timestep must be finite and non-negative, got {}", timestep);
    }

    let mut states = match &cli.states {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read states {}", path.display()))?;
            ProcessStates::from_json(&json)
                .with_context(|| format!("Invalid states {}", path.display()))?
        }
        None => default_states(&process),
    };

    for step in 0..cli.steps {
        let update = process
            .next_update(timestep, &states)
            .with_context(|| format!("Step {} failed", step))?;
        println!("{}", serde_json::to_string(&update)?);
        states.apply_update(&update);
    }

    if cli.print_states {
        println!("{}", serde_json::to_string(&states)?);
    }

    Ok(())
}
