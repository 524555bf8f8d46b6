mod config;
mod error;

use clap::Parser;
use config::{Cli, Commands};

mod cmd;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Import(args) => cmd::import::run(&cli.global, args),
        Commands::Export(args) => cmd::export::run(&cli.global, args),
        Commands::Check(args) => cmd::check::run(&cli.global, args),
        Commands::Schema(args) => cmd::schema::run(&cli.global, args),
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
