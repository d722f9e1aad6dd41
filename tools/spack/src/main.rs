//! spack - pack and unpack binary data with struct-style format strings

mod commands;
mod config;
mod hex;
mod logging;
mod values;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;

use crate::config::OutputFormat;

#[derive(Parser)]
#[command(name = "spack")]
#[command(about = "Pack and unpack binary data with struct-style format strings")]
#[command(long_about = "Pack and unpack binary data with struct-style format strings

Format strings:
  @ = < > !    byte order (native, native, little, big, network)
  x            pad byte
  ? b B        bool, i8, u8
  h H          i16, u16
  i I l L      i32, u32
  q Q          i64, u64
  e f d        f16, f32, f64
  Ns           N-byte string
  Np           N-byte Pascal string (length byte first)

Examples:
  spack calcsize '>bhbl'                 # 8
  spack pack '>bhbl' -- -1 -2 -3 -4      # FFFFFEFDFFFFFFFC
  spack unpack '<hh' 34127856            # i16 4660 / i16 22136
  spack unpack '>H' 0000BEEF --offset 2")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (default: spack.toml / spack.yaml / spack.json if present)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the number of bytes a format occupies
    Calcsize {
        /// Format string
        format: String,
    },

    /// Pack values and print the bytes as hex
    Pack {
        /// Format string
        format: String,

        /// One value per field; strings for `s` and `p`, true/false for `?`
        #[arg(allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Unpack hex-encoded bytes and print the values
    Unpack {
        /// Format string
        format: String,

        /// Input bytes as hex
        hex: String,

        /// Byte offset to start reading at
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    let output = if cli.json {
        OutputFormat::Json
    } else {
        config.output
    };

    let rendered = match cli.command {
        Commands::Calcsize { format } => commands::calcsize(&config, output, &format)?,
        Commands::Pack { format, values } => commands::pack(&config, output, &format, &values)?,
        Commands::Unpack {
            format,
            hex,
            offset,
        } => commands::unpack(&config, output, &format, &hex, offset)?,
    };

    println!("{}", rendered);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Configure colored output
    if cli.no_color {
        colored::control::set_override(false);
    }

    // Initialize logging
    logging::init(cli.verbose, !cli.no_color);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        },
    }
}
