//! Command line front end of pulseq-writer.
//!
//! ```bash
//! # Write a MessagePack (optionally zstd compressed) sequence as .seq file
//! pulseq-write write gre.msgpack.zst gre.seq
//!
//! # Check the signature of an existing file
//! pulseq-write verify gre.seq
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use pulseq_writer::{WriteOptions, convert, verify_signature};

#[derive(Parser)]
#[command(name = "pulseq-write")]
#[command(version)]
#[command(about = "Write MRI sequences as signed Pulseq files")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a MessagePack sequence into a .seq file
    Write {
        input: PathBuf,
        output: PathBuf,

        /// Store all shapes uncompressed
        #[arg(long)]
        no_compress: bool,

        /// Gyromagnetic ratio in Hz/T
        #[arg(long)]
        gamma: Option<f64>,
    },

    /// Verify the [SIGNATURE] of a .seq file
    Verify { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Write {
            input,
            output,
            no_compress,
            gamma,
        } => {
            let mut opts = WriteOptions::default();
            if no_compress {
                opts.compress_shapes = false;
            }
            if let Some(gamma) = gamma {
                opts.gamma = gamma;
            }

            let report = convert(&input, &output, &opts)?;
            info!(
                warnings = report.warnings.len(),
                hash = %report.hash,
                "done"
            );
        }
        Commands::Verify { file } => {
            let contents = std::fs::read_to_string(&file)?;
            verify_signature(&contents)?;
            info!(file = %file.display(), "signature ok");
        }
    }
    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
