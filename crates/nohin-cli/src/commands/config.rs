//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use nohin_core::LedgerConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "extraction.match_tolerance")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nohin")
        .join("config.json")
}

/// Configuration used by the parsing commands: the explicit `--config` file,
/// else the default file when it exists, else built-in defaults.
pub fn load(config_path: Option<&str>) -> anyhow::Result<LedgerConfig> {
    match config_path {
        Some(path) => Ok(LedgerConfig::from_file(Path::new(path))?),
        None => load_or_default(&default_config_path()),
    }
}

fn load_or_default(path: &Path) -> anyhow::Result<LedgerConfig> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(LedgerConfig::from_file(path)?)
    } else {
        Ok(LedgerConfig::default())
    }
}

/// `extraction.match_tolerance` -> `/extraction/match_tolerance`
fn json_pointer(key: &str) -> String {
    key.split('.').map(|part| format!("/{part}")).collect()
}

fn lookup(config: &LedgerConfig, key: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::to_value(config)?
        .pointer(&json_pointer(key))
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
}

/// Replace one existing key; the result must still be a valid configuration.
fn assign(
    config: &LedgerConfig,
    key: &str,
    value: serde_json::Value,
) -> anyhow::Result<LedgerConfig> {
    let mut json = serde_json::to_value(config)?;
    let slot = json
        .pointer_mut(&json_pointer(key))
        .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    *slot = value;

    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

fn show_config(config_path: &Path) -> anyhow::Result<()> {
    if !config_path.exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    let config = load_or_default(config_path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, config_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| config_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    save(&LedgerConfig::default(), &output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    let value = lookup(&load_or_default(config_path)?, key)?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}

fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    // Bare words such as `computed-amount` are taken as JSON strings.
    let value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let config = assign(&load_or_default(config_path)?, key, value.clone())?;
    save(&config, config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&value)?
    );

    Ok(())
}

fn save(config: &LedgerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'nohin config init' to create a configuration file.");
    }

    Ok(())
}
