//! `rget stat <url>` – HEAD a remote file and print its metadata.

use super::request::build_locator;
use crate::cli::RequestArgs;
use anyhow::Result;
use rget_core::{RemoteFiler, TransferOutcome};
use std::io::{self, Write};

pub fn run_stat(client: &dyn RemoteFiler, args: &RequestArgs) -> Result<()> {
    let locator = build_locator(args)?;
    let outcome = client.stat(&locator)?;
    let mut out = io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &outcome)?;
        writeln!(out)?;
    } else {
        print_summary(&mut out, &outcome)?;
    }
    Ok(())
}

pub(crate) fn print_summary(out: &mut dyn Write, outcome: &TransferOutcome) -> io::Result<()> {
    writeln!(out, "HTTP {}", outcome.status)?;
    let size = outcome
        .content_length()
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    writeln!(out, "  Size:          {}", size)?;
    writeln!(
        out,
        "  Last-Modified: {}",
        outcome.headers.get("last-modified").unwrap_or("-")
    )?;
    writeln!(
        out,
        "  Ranges:        {}",
        if outcome.accept_ranges() { "bytes" } else { "none" }
    )?;
    if let Some(etag) = outcome.headers.etag() {
        writeln!(out, "  ETag:          {}", etag)?;
    }
    Ok(())
}
