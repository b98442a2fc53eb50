//! Turn CLI request arguments into a resource locator.

use crate::cli::RequestArgs;
use anyhow::{Context, Result};
use rget_core::ResourceLocator;
use std::fs;
use std::path::Path;

pub(crate) fn build_locator(args: &RequestArgs) -> Result<ResourceLocator> {
    let mut locator = ResourceLocator::parse(&args.url)?;
    for raw in &args.headers {
        let (name, value) = parse_header_arg(raw)?;
        locator = locator.with_header(name, value);
    }
    if let Some(path) = &args.token_file {
        locator = locator.with_header("Authorization", read_token(path)?);
    }
    Ok(locator)
}

/// Split `Name: value`. The value may be empty (`Name:`).
pub(crate) fn parse_header_arg(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("header {:?} is not in `Name: value` form", raw))?;
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("header {:?} has an empty name", raw);
    }
    Ok((name, value.trim()))
}

/// Read a token file into an `Authorization` header value.
pub(crate) fn read_token(path: &Path) -> Result<String> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("cannot read token file {}", path.display()))?;
    let token = data.trim();
    if token.is_empty() {
        anyhow::bail!("token file {} is empty", path.display());
    }
    Ok(format!("token {}", token))
}
