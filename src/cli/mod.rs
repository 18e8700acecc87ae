// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `pretrain` — phase 1, checkpoint on improvement
//   2. `finetune` — phase 2, checkpoint every epoch
//   3. `evaluate` — raw / pre-trained / fine-tuned table
//   4. `run`      — all of the above in order
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs};

use crate::application::{
    evaluate_use_case::EvaluateUseCase,
    train_use_case::{TrainConfig, TrainUseCase},
};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "ae-cluster",
    version = "0.1.0",
    about = "Train a depth-parameterised autoencoder in two phases, then compare k-means on raw features and on its embeddings."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Pretrain(args) => run_pretrain(resolve(args)?),
            Commands::Finetune(args) => run_finetune(resolve(args)?),
            Commands::Evaluate(args) => run_evaluate(resolve(args)?),
            Commands::Run(args) => {
                let cfg = resolve(args)?;
                run_pretrain(cfg.clone())?;
                run_finetune(cfg.clone())?;
                run_evaluate(cfg)
            }
        }
    }
}

fn resolve(args: TrainArgs) -> Result<TrainConfig> {
    let cfg = args.into_config()?;
    tracing::debug!("Resolved config: {:?}", cfg);
    Ok(cfg)
}

fn run_pretrain(cfg: TrainConfig) -> Result<()> {
    tracing::info!("Pre-training, checkpoints in '{}'", cfg.checkpoint_dir);
    let report = TrainUseCase::new(cfg).pretrain()?;
    println!("Pre-training complete. Best loss {:.6}.", report.best_loss);
    Ok(())
}

fn run_finetune(cfg: TrainConfig) -> Result<()> {
    tracing::info!("Fine-tuning, checkpoints in '{}'", cfg.checkpoint_dir);
    let report = TrainUseCase::new(cfg).finetune()?;
    println!("Fine-tuning complete. Final loss {:.6}.", report.final_loss);
    Ok(())
}

fn run_evaluate(cfg: TrainConfig) -> Result<()> {
    EvaluateUseCase::new(cfg).execute()?;
    Ok(())
}
