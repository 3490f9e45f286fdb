// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap. All
// work is delegated to Layer 2 (application); this layer picks
// the burn backend and prints JSON.
//
//   1. `init`    — corpus → vocabulary → checkpoint bundle
//   2. `predict` — checkpoint + sequence(s) → predictions
//   3. `stats`   — sequence(s) → base composition
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{bail, Result};
use burn::prelude::Backend;
use clap::Parser;
use serde::Serialize;

use commands::{BackendChoice, Commands, InitArgs, PredictArgs, StatsArgs};
use dna_phenotype::application::{
    predict_use_case::PredictUseCase,
    scaffold_use_case::ScaffoldUseCase,
    stats_use_case::StatsUseCase,
};

type CpuBackend = burn::backend::NdArray;
type GpuBackend = burn::backend::Wgpu;

#[derive(Parser, Debug)]
#[command(
    name = "dna-phenotype",
    version = "0.1.0",
    about = "Predict phenotypes from DNA sequences with a k-mer transformer."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the use case; never computes anything itself.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init(args)    => run_init(args),
            Commands::Predict(args) => run_predict(args),
            Commands::Stats(args)   => run_stats(args),
        }
    }
}

fn run_init(args: InitArgs) -> Result<()> {
    let backend  = args.backend;
    let use_case = ScaffoldUseCase::new(args.into());

    let summary = match backend {
        BackendChoice::Cpu => use_case.execute::<CpuBackend>(&Default::default())?,
        BackendChoice::Gpu => use_case.execute::<GpuBackend>(&Default::default())?,
    };
    tracing::info!("Checkpoint bundle written to '{}'", summary.checkpoint_dir);
    print_json(&summary)
}

fn run_predict(args: PredictArgs) -> Result<()> {
    match args.backend {
        BackendChoice::Cpu => predict_with::<CpuBackend>(&args, Default::default()),
        BackendChoice::Gpu => predict_with::<GpuBackend>(&args, Default::default()),
    }
}

fn predict_with<B: Backend>(args: &PredictArgs, device: B::Device) -> Result<()> {
    let use_case = PredictUseCase::<B>::new(&args.checkpoint_dir, device)?;
    match (&args.sequence, &args.input) {
        (Some(sequence), _) => print_json(&use_case.predict(sequence)?),
        (None, Some(path))  => print_json(&use_case.predict_path(path)?),
        (None, None)        => bail!("Provide --sequence or --input"),
    }
}

fn run_stats(args: StatsArgs) -> Result<()> {
    let use_case = StatsUseCase::new();
    match (&args.sequence, &args.input) {
        (Some(sequence), _) => print_json(&use_case.sequence_stats(sequence)),
        (None, Some(path))  => print_json(&use_case.path_stats(path)?),
        (None, None)        => bail!("Provide --sequence or --input"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
