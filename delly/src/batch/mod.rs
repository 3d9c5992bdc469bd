//! Batch driver: enrich every CSV file in a directory.
//!
//! Files are processed one after another; a failing file is logged and
//! skipped, never aborting the rest of the batch.

use std::fs;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use crate::client::Connector;
use crate::enrich::enrich_file_with;
use crate::logs::Logger;

/// `*.csv` files directly inside `dir`, sorted by name.
pub fn discover_csv_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Run `enrich_one` over `files` in order, collecting the outputs of the
/// files that succeeded.
pub async fn process_files<F, Fut>(files: &[PathBuf], mut enrich_one: F, log: &Logger) -> Vec<PathBuf>
where
    F: FnMut(PathBuf) -> Fut,
    Fut: Future<Output = Option<PathBuf>>,
{
    let total = files.len();
    let mut updated = Vec::new();

    for (idx, path) in files.iter().enumerate() {
        match enrich_one(path.clone()).await {
            Some(output) => updated.push(output),
            None => log.warning(format!("Skipped: {}", path.display())),
        }
        log.info(format!("[{}/{}] Processing CSV files...", idx + 1, total));
    }

    log.success(format!(
        "Processing complete: {} of {} files updated",
        updated.len(),
        total
    ));
    updated
}

/// Enrich every CSV file in `dir` (default: the current directory).
///
/// Each eligible file authenticates its own client. Returns the paths written;
/// an unusable directory or one without CSV files is reported and gives
/// an empty list.
pub async fn process_directory(dir: Option<&Path>, connector: &Connector, log: &Logger) -> Vec<PathBuf> {
    let directory = match dir {
        Some(d) => d.to_path_buf(),
        None => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                log.error(format!("Cannot determine current directory: {}", e));
                return Vec::new();
            }
        },
    };

    if !directory.is_dir() {
        log.error(format!("Input directory '{}' does not exist.", directory.display()));
        return Vec::new();
    }

    let files = match discover_csv_files(&directory) {
        Ok(files) => files,
        Err(e) => {
            log.error(format!("Cannot read directory '{}': {}", directory.display(), e));
            return Vec::new();
        }
    };

    if files.is_empty() {
        log.error(format!("No CSV files found in directory '{}'.", directory.display()));
        return Vec::new();
    }

    log.info(format!("Found {} CSV files in '{}'", files.len(), directory.display()));

    process_files(
        &files,
        move |path| async move { enrich_file_with(connector, &path, log).await },
        log,
    )
    .await
}
