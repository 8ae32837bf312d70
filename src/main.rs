use std::path::PathBuf;
use std::process::ExitCode;

use alloy_primitives::hex;
use anyhow::{Context, Result};
use clap::Parser;

use panagram::{CircuitArtifact, ProofPipeline, Verbosity};

/// Generate a Panagram guess proof and print the ABI-encoded calldata.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Field-reduced keccak hash of the guess (hex)
    guess_hash: String,
    /// Double hash of the secret answer (hex)
    answer_double_hash: String,
    /// Claimer wallet address (0x + 40 hex digits)
    address: String,
    /// Path to a circuit artifact; defaults to the deterministic
    /// development setup
    #[arg(long)]
    artifact: Option<PathBuf>,
    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,
}

fn run(args: &Args) -> Result<String> {
    let artifact = match &args.artifact {
        Some(path) => CircuitArtifact::load(path)
            .with_context(|| format!("loading circuit artifact {}", path.display()))?,
        None => CircuitArtifact::dev_setup()?,
    };

    let verbosity = if args.quiet { Verbosity::Quiet } else { Verbosity::Normal };
    let pipeline = ProofPipeline::new(artifact).with_verbosity(verbosity);

    let quiet = args.quiet;
    let proved = pipeline.prove_hash(
        &args.guess_hash,
        &args.answer_double_hash,
        &args.address,
        |message| {
            if !quiet {
                eprintln!("{message}");
            }
        },
    )?;

    Ok(format!("0x{}", hex::encode(&proved.payload)))
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(payload) => {
            println!("{payload}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
