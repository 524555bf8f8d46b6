use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use avro_meta::config::{ConfigParser, TomlParser, ToolConfig};
use avro_meta_config_hcl::HclParser;

use crate::error::CliError;

#[derive(Parser)]
#[command(name = "avro-meta", about = "Avro input step metadata: markup and repository persistence")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct GlobalArgs {
    /// Path to the TOML or HCL config file
    #[arg(long, global = true, default_value = "avro-meta.toml", env = "AVRO_META_CONFIG")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load step markup and save it into the repository
    Import(ImportArgs),
    /// Read a step from the repository and print its markup
    Export(ExportArgs),
    /// Load step markup and report configuration problems
    Check(CheckArgs),
    /// Derive the field list from an Avro schema file
    Schema(SchemaArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ImportArgs {
    #[arg(long)]
    pub xml: PathBuf,
    #[arg(long)]
    pub transformation: String,
    #[arg(long)]
    pub step: String,
}

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    #[arg(long)]
    pub step: String,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    #[arg(long)]
    pub xml: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct SchemaArgs {
    #[arg(long)]
    pub schema: PathBuf,
}

/// A missing config file means defaults.
pub fn load_config(path: &Path) -> Result<ToolConfig, CliError> {
    if !path.exists() {
        tracing::debug!(config = %path.display(), "config file not found, using defaults");
        return Ok(ToolConfig::default());
    }
    let parsers: [&dyn ConfigParser; 2] = [&TomlParser, &HclParser];
    let config = ToolConfig::load(path, &parsers)?;
    tracing::info!(config = %path.display(), store = %config.store.kind, "loaded config");
    Ok(config)
}
