//! # Dell Lookup - model and warranty information by service tag
//!
//! Queries the Dell warranty API for one service tag, or enriches CSV
//! files of service tags with `Model` and `Warranty Start` columns.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │  CSV files  │────▶│    Batch    │────▶│   Enrich    │────▶│ *_updated.csv    │
//! │ (directory) │     │   driver    │     │ (join by    │     │ + Model          │
//! └─────────────┘     └─────────────┘     │  tag)       │     │ + Warranty Start │
//!                                         └──────┬──────┘     └──────────────────┘
//!                                                │
//!                                         ┌──────▼──────┐
//!                                         │  Warranty   │
//!                                         │  API client │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dell_lookup::{AppConfig, Connector, Logger, process_directory};
//!
//! #[tokio::main]
//! async fn main() {
//!     let log = Logger::new();
//!     let connector = Connector::from_config(&AppConfig::default()).unwrap();
//!     let updated = process_directory(None, &connector, &log).await;
//!     println!("Updated {} files", updated.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`logs`] - Logging handle
//! - [`models`] - Service tags, API records, display table
//! - [`client`] - Warranty API client
//! - [`parser`] - CSV reading and writing
//! - [`enrich`] - Row enrichment
//! - [`batch`] - Directory processing
//! - [`lookup`] - Single tag lookup
//! - [`config`] - Configuration store

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// API
pub mod client;

// CSV
pub mod parser;
pub mod enrich;
pub mod batch;

// Interactive lookup
pub mod lookup;

// Configuration
pub mod config;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ClientError, ConfigError, CsvError, EnrichError};

pub use logs::{LogEntry, LogLevel, Logger};

pub use models::{AssetHeader, AssetWarranty, Entitlement, ServiceTag, WarrantyInfo, UNKNOWN};

pub use client::{
    chunk_service_tags, ApiEndpoints, Connector, Credentials, Endpoint, WarrantyClient,
    MAX_BATCH_SIZE,
};

pub use parser::{parse_bytes_auto, parse_csv_file_auto, parse_csv_str, write_csv_file, Table};

pub use enrich::{
    enrich_file, enrich_file_with, enrich_records, updated_path, warranty_start,
    SERVICE_TAG_COLUMN,
};

pub use batch::{process_directory, process_files};

pub use lookup::get_warranty_info;

pub use config::{mask_secret, AppConfig, ConfigStore, DellConfig};
