//! Row enrichment: adds `Model` and `Warranty Start` columns to a CSV of
//! service tags.
//!
//! Headers returned by the API are joined back onto rows by service tag,
//! so tags the API omits (or answers out of order) never shift values
//! onto the wrong row.
//!
//! # Example
//!
//! ```rust,ignore
//! use dell_lookup::enrich::enrich_file;
//!
//! let client = connector.connect().await?;
//! if let Some(out) = enrich_file(&client, Path::new("assets.csv"), &log).await {
//!     println!("Wrote {}", out.display());
//! }
//! ```

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::client::{Connector, WarrantyClient};
use crate::error::{CsvError, EnrichResult};
use crate::logs::Logger;
use crate::models::{AssetHeader, ServiceTag, UNKNOWN};
use crate::parser::{parse_csv_file_auto, write_csv_file, Table};

/// Identifier column every input file must carry
pub const SERVICE_TAG_COLUMN: &str = "Service Tag";

pub const MODEL_COLUMN: &str = "Model";

pub const WARRANTY_START_COLUMN: &str = "Warranty Start";

/// Inserted before the extension of output files
pub const OUTPUT_SUFFIX: &str = "_updated";

/// Ship date format used by the API
const SHIP_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

const WARRANTY_START_FORMAT: &str = "%Y-%m-%d";

/// Model name from a header, or `Unknown`.
pub fn model_name(header: Option<&AssetHeader>) -> String {
    header
        .and_then(|h| h.product_line_description.as_deref())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}

/// `YYYY-MM-DDTHH:MM:SSZ` reformatted as `YYYY-MM-DD`.
///
/// Absent or non-matching dates give `Unknown`.
pub fn warranty_start(ship_date: Option<&str>) -> String {
    ship_date
        .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), SHIP_DATE_FORMAT).ok())
        .map(|dt| dt.format(WARRANTY_START_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Output path for an input file: `a.csv` becomes `a_updated.csv`.
pub fn updated_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, OUTPUT_SUFFIX, ext.to_string_lossy()),
        None => format!("{}{}", stem, OUTPUT_SUFFIX),
    };
    path.with_file_name(file_name)
}

/// Service tags of a table in row order, or `None` without the tag column.
pub fn service_tags(table: &Table) -> Option<Vec<ServiceTag>> {
    table
        .column(SERVICE_TAG_COLUMN)
        .map(|cells| cells.into_iter().map(ServiceTag::new).collect())
}

/// Join headers onto rows and set the two derived columns.
///
/// Every row gets exactly one `Model` and one `Warranty Start` value.
pub fn enrich_records(table: &mut Table, headers: &[AssetHeader]) -> Result<(), CsvError> {
    let tags = service_tags(table)
        .ok_or_else(|| CsvError::MissingColumn(SERVICE_TAG_COLUMN.to_string()))?;

    let by_tag: HashMap<String, &AssetHeader> = headers
        .iter()
        .map(|h| (h.service_tag.trim().to_uppercase(), h))
        .collect();

    let (models, starts): (Vec<String>, Vec<String>) = tags
        .iter()
        .map(|tag| {
            let header = if tag.is_blank() {
                None
            } else {
                by_tag.get(&tag.normalized()).copied()
            };
            (
                model_name(header),
                warranty_start(header.and_then(|h| h.ship_date.as_deref())),
            )
        })
        .unzip();

    table.set_column(MODEL_COLUMN, models);
    table.set_column(WARRANTY_START_COLUMN, starts);
    Ok(())
}

/// Enrich one file and write the result beside it.
///
/// Returns the output path, or `None` when the file was skipped or
/// failed; the reason is logged. Never touches the input file.
pub async fn enrich_file(client: &WarrantyClient, path: &Path, log: &Logger) -> Option<PathBuf> {
    let (mut table, tags) = load(path, log)?;
    finish(run(client, &mut table, &tags, path, log).await, path, log)
}

/// Like [`enrich_file`], authenticating a fresh client once the file is
/// known to be eligible.
pub async fn enrich_file_with(connector: &Connector, path: &Path, log: &Logger) -> Option<PathBuf> {
    let (mut table, tags) = load(path, log)?;

    let result = match connector.connect().await {
        Ok(client) => run(&client, &mut table, &tags, path, log).await,
        Err(e) => Err(e.into()),
    };
    finish(result, path, log)
}

fn load(path: &Path, log: &Logger) -> Option<(Table, Vec<ServiceTag>)> {
    log.info(format!("Processing file: {}", path.display()));

    let table = match parse_csv_file_auto(path) {
        Ok(result) => {
            log.info_indent(format!("Encoding: {}", result.encoding), 1);
            result.table
        }
        Err(e) => {
            log.error(format!("Failed to read CSV file {}: {}", path.display(), e));
            return None;
        }
    };

    let Some(tags) = service_tags(&table) else {
        log.warning(format!(
            "Skipping file {}: No '{}' column found.",
            path.display(),
            SERVICE_TAG_COLUMN
        ));
        return None;
    };

    Some((table, tags))
}

async fn run(
    client: &WarrantyClient,
    table: &mut Table,
    tags: &[ServiceTag],
    path: &Path,
    log: &Logger,
) -> EnrichResult<PathBuf> {
    log.info_indent(format!("Fetching asset headers for {} rows...", tags.len()), 1);
    let headers = client.get_asset_headers(tags).await?;

    log.info_indent(format!("API returned {} asset headers", headers.len()), 1);

    enrich_records(table, &headers)?;

    let output = updated_path(path);
    write_csv_file(&output, table)?;
    Ok(output)
}

fn finish(result: EnrichResult<PathBuf>, path: &Path, log: &Logger) -> Option<PathBuf> {
    match result {
        Ok(output) => {
            log.success(format!("File updated: {}", output.display()));
            Some(output)
        }
        Err(e) => {
            log.error(format!("Failed to process {}: {}", path.display(), e));
            None
        }
    }
}
