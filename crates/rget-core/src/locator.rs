//! Resource locator: the address of a remote file plus the request headers
//! (authentication, content negotiation) needed to reach it.

use crate::error::TransferError;
use crate::headers::Headers;
use url::Url;

/// Identifies a remote resource. Carries no per-call state, so one locator can
/// be reused for any number of `stat`/`get` calls, from any thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    address: Url,
    headers: Headers,
}

impl ResourceLocator {
    pub fn new(address: Url) -> Self {
        Self {
            address,
            headers: Headers::new(),
        }
    }

    /// Parse an absolute URL.
    pub fn parse(address: &str) -> Result<Self, TransferError> {
        let url = Url::parse(address).map_err(|source| TransferError::InvalidUrl {
            url: address.to_string(),
            source,
        })?;
        Ok(Self::new(url))
    }

    /// Adds a request header. Repeating a name sends one header line per value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replaces the whole request header set.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}
