//! `rget get <url>` – download a remote file to a path or stdout.

use super::request::build_locator;
use crate::cli::RequestArgs;
use anyhow::{Context, Result};
use rget_core::{RemoteFiler, TransferOutcome};
use std::io::{self, Write};
use std::path::Path;

pub fn run_get(client: &dyn RemoteFiler, args: &RequestArgs, output: Option<&Path>) -> Result<()> {
    let locator = build_locator(args)?;
    match output {
        Some(path) => {
            let outcome = download_to_path(client, &locator, path)?;
            report(&mut io::stdout().lock(), args, &outcome, &path.display().to_string())
        }
        None => {
            let outcome = {
                let mut out = io::stdout().lock();
                let outcome = client.get(&locator, &mut out)?;
                out.flush()?;
                outcome
            };
            // Body went to stdout; keep the report off it.
            report(&mut io::stderr().lock(), args, &outcome, "stdout")
        }
    }
}

/// Write the body to a temp file beside `path` and rename it into place only
/// after a successful transfer, so `path` never holds a partial download.
pub(crate) fn download_to_path(
    client: &dyn RemoteFiler,
    locator: &rget_core::ResourceLocator,
    path: &Path,
) -> Result<TransferOutcome> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;

    let outcome = client.get(locator, tmp.as_file_mut())?;

    tmp.as_file()
        .sync_all()
        .with_context(|| format!("failed to sync {}", tmp.path().display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to move download into {}", path.display()))?;
    tracing::info!(
        "saved {} ({} bytes) to {}",
        locator.address(),
        outcome.bytes_copied,
        path.display()
    );
    Ok(outcome)
}

fn report(
    out: &mut dyn Write,
    args: &RequestArgs,
    outcome: &TransferOutcome,
    destination: &str,
) -> Result<()> {
    if args.json {
        serde_json::to_writer_pretty(&mut *out, outcome)?;
        writeln!(out)?;
    } else {
        writeln!(
            out,
            "HTTP {}: {} bytes from {} to {}",
            outcome.status, outcome.bytes_copied, args.url, destination
        )?;
    }
    Ok(())
}
