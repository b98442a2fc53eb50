//! Result of a Stat or Get call.

use crate::headers::Headers;
use serde::Serialize;
use std::time::SystemTime;

/// Status and headers of the final response, plus the number of body bytes
/// copied into the sink (always 0 for a stat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// HTTP status of the final response (after redirects).
    pub status: u32,
    /// Headers of the final response.
    pub headers: Headers,
    /// Body bytes written to the sink.
    pub bytes_copied: u64,
}

impl TransferOutcome {
    /// True for `200 <= status < 300`.
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.headers.content_length()
    }

    pub fn last_modified(&self) -> Option<SystemTime> {
        self.headers.last_modified()
    }

    pub fn accept_ranges(&self) -> bool {
        self.headers.accept_ranges()
    }

    pub fn content_range(&self) -> Option<&str> {
        self.headers.content_range()
    }
}

pub(crate) fn is_success_status(code: u32) -> bool {
    (200..300).contains(&code)
}
