//! informergen - generates cluster-aware informers and listers for
//! multi-tenant Kubernetes API types

use anyhow::Result;
use clap::{Parser, Subcommand};
use informergen::cli::{self, ConfigSubcommand, GenerateArgs};

/// Generates cluster-aware informers and listers for multi-tenant Kubernetes API types
#[derive(Parser, Debug)]
#[command(name = "informergen")]
#[command(about = "Generates cluster-aware informers and listers", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(long, short = 'd', global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Generate informers for the configured group/versions
    Generate(GenerateArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
    /// Show version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();
    cli::init_logging(args.debug);

    match args.command {
        Command::Generate(generate) => cli::handle_generate(generate),
        Command::Config { subcommand } => cli::handle_config_command(subcommand),
        Command::Version => {
            cli::display_version();
            Ok(())
        }
    }
}
