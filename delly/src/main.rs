//! Dell-Lookup CLI - model and warranty information for Dell service tags
//!
//! # Commands
//!
//! ```bash
//! delly info ABC1234                # Warranty info for one tag
//! delly info ABC1234 --extended     # ... plus entitlements
//! delly bulk assets.csv             # Enrich one CSV file
//! delly bulk --dir ./exports        # Enrich every CSV in a directory
//! delly bulk                        # Enrich every CSV in the current directory
//! delly config show|edit|reset|backup|browse
//! ```
//!
//! Credentials come from `CLIENT_ID` / `CLIENT_SECRET` (a `.env` file is
//! honored) or from the `[dell]` table of the config file.

use clap::{Parser, Subcommand};
use dell_lookup::{
    enrich_file_with, get_warranty_info, process_directory, ConfigStore, Connector, Logger,
};
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "delly")]
#[command(about = "Dell-Lookup CLI tool for interacting with Dell's Warranty API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get warranty information for a single service tag
    Info {
        /// Service tag to look up
        service_tag: String,

        /// Show extended information
        #[arg(short, long)]
        extended: bool,
    },

    /// Process CSV files containing service tags and add model information
    Bulk {
        /// CSV file containing service tags
        csv_file: Option<PathBuf>,

        /// Directory containing CSV files to process
        #[arg(short = 'd', long = "dir")]
        directory: Option<PathBuf>,
    },

    /// Manage Dell-Lookup configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display the current configuration
    Show,
    /// Open the configuration file in your default editor
    Edit,
    /// Reset the configuration to default values
    Reset,
    /// Create a backup of the current configuration
    Backup,
    /// Open the configuration directory in your file browser
    Browse,
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let log = Logger::new();

    let result = match cli.command {
        Commands::Info { service_tag, extended } => cmd_info(&service_tag, extended, &log).await,

        Commands::Bulk { csv_file, directory } => {
            cmd_bulk(csv_file.as_deref(), directory.as_deref(), &log).await
        }

        Commands::Config { action } => cmd_config(action, &log),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn connector(log: &Logger) -> Result<Connector, Box<dyn std::error::Error>> {
    let config = ConfigStore::default_location(log.clone())?.load()?;
    Ok(Connector::from_config(&config)?)
}

async fn cmd_info(service_tag: &str, extended: bool, log: &Logger) -> CliResult {
    let client = connector(log)?.connect().await?;

    match get_warranty_info(&client, service_tag, extended, log).await? {
        Some(info) => {
            println!("{}", info);
            Ok(())
        }
        None => Err(format!("No information found for Service Tag: {}", service_tag.to_uppercase()).into()),
    }
}

async fn cmd_bulk(csv_file: Option<&Path>, directory: Option<&Path>, log: &Logger) -> CliResult {
    if let Some(file) = csv_file {
        if !file.is_file() {
            return Err(format!("File '{}' does not exist.", file.display()).into());
        }
    }
    if let Some(dir) = directory {
        if !dir.is_dir() {
            return Err(format!("Directory '{}' does not exist.", dir.display()).into());
        }
    }

    let connector = connector(log)?;

    if let Some(file) = csv_file {
        return match enrich_file_with(&connector, file, log).await {
            Some(updated) => {
                eprintln!("✅ Successfully processed: {}", updated.display());
                Ok(())
            }
            None => Err("Failed to process CSV file".into()),
        };
    }

    let updated = process_directory(directory, &connector, log).await;
    if updated.is_empty() {
        return Err("No files were processed successfully".into());
    }

    eprintln!("\n✅ Successfully processed files:");
    for file in &updated {
        println!("  - {}", file.display());
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, log: &Logger) -> CliResult {
    let store = ConfigStore::default_location(log.clone())?;

    match action {
        ConfigAction::Show => {
            let shown = store.show()?;
            println!("\nCurrent Configuration ({}):\n", store.path().display());
            println!("{}", shown);
        }
        ConfigAction::Edit => store.edit()?,
        ConfigAction::Reset => store.reset()?,
        ConfigAction::Backup => {
            store.backup()?;
        }
        ConfigAction::Browse => store.browse()?,
    }

    Ok(())
}
