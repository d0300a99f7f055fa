// Upload pipeline used by both the `upload` action and the interactive
// menu: enumerate a folder, upload each regular file, then poll the
// returned operation until the server reports it as done.

use crate::api::{FileStoreClient, Operation};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Fixed delay between two polls of the same operation.
    pub poll_interval: Duration,
    /// Show an indicatif spinner while waiting instead of printing a line
    /// per poll.
    pub spinner: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        UploadOptions {
            poll_interval: DEFAULT_POLL_INTERVAL,
            spinner: false,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub attempted: usize,
    pub uploaded: usize,
    /// Uploads whose response carried no operation to poll.
    pub unconfirmed: usize,
    pub failed: Vec<PathBuf>,
}

enum Outcome {
    Indexed,
    Unconfirmed(Operation),
}

/// Regular files directly inside `folder`, sorted by path. Subdirectories
/// are not descended into.
pub fn list_folder_files(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Upload every file of `folder` into `store_name`. A failure on one file
/// is reported and the batch moves on to the next file.
pub fn upload_folder(
    client: &FileStoreClient,
    store_name: &str,
    folder: &Path,
    options: &UploadOptions,
    out: &mut dyn Write,
) -> Result<UploadSummary> {
    let files = list_folder_files(folder)
        .with_context(|| format!("Cannot read folder '{}'", folder.display()))?;
    debug!(folder = %folder.display(), count = files.len(), "files to upload");

    let mut summary = UploadSummary::default();
    for path in files {
        summary.attempted += 1;
        writeln!(out, "Uploading {}...", path.display())?;
        match upload_one(client, store_name, &path, options, out) {
            Ok(Outcome::Indexed) => {
                summary.uploaded += 1;
                writeln!(out, "File {} uploaded successfully.", path.display())?;
            }
            Ok(Outcome::Unconfirmed(op)) => {
                summary.unconfirmed += 1;
                writeln!(out, "Server returned no operation for {}:", path.display())?;
                writeln!(out, "{}", serde_json::to_string_pretty(&op)?)?;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "upload failed");
                writeln!(out, "Error uploading {}: {:#}", path.display(), e)?;
                summary.failed.push(path);
            }
        }
    }
    writeln!(
        out,
        "Uploaded {} of {} file(s).",
        summary.uploaded, summary.attempted
    )?;
    Ok(summary)
}

fn upload_one(
    client: &FileStoreClient,
    store_name: &str,
    path: &Path,
    options: &UploadOptions,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let op = client.upload_file(store_name, path)?;
    let name = match op.name.clone() {
        Some(name) => name,
        None => return Ok(Outcome::Unconfirmed(op)),
    };

    let spinner = options.spinner.then(|| processing_spinner(&name));
    let polled = poll_until_done(client, op, &name, options, spinner.as_ref(), out);
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }

    let op = polled?;
    if let Some(error) = op.error {
        bail!("Indexing failed: {}", error);
    }
    Ok(Outcome::Indexed)
}

/// Re-fetch `name` every `poll_interval` until it is done. There is no
/// upper bound on the number of polls.
fn poll_until_done(
    client: &FileStoreClient,
    mut op: Operation,
    name: &str,
    options: &UploadOptions,
    spinner: Option<&ProgressBar>,
    out: &mut dyn Write,
) -> Result<Operation> {
    while !op.done {
        match spinner {
            Some(pb) => pb.set_message(format!("Processing... (operation: {})", name)),
            None => writeln!(out, "Processing... (operation: {})", name)?,
        }
        thread::sleep(options.poll_interval);
        debug!(operation = name, "polling operation");
        op = client.get_operation(name)?;
    }
    Ok(op)
}

fn processing_spinner(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Processing... (operation: {})", name));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
