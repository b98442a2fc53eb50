//! Transfer error taxonomy.
//!
//! Three classes, exposed through [`TransferError::kind`]: the request never
//! produced a response (transport), a response arrived with a non-2xx status
//! (status), or the body could not be copied into the sink in full (copy).
//! Status and copy errors carry the outcome observed so far.

use crate::outcome::TransferOutcome;
use thiserror::Error;

/// Coarse error class, for callers deciding how to react (e.g. retry or not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response: bad URL or header, DNS failure, refused connection, timeout.
    Transport,
    /// Response received with a status outside `[200, 300)`.
    Status,
    /// Body received but not fully written to the sink.
    Copy,
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Only `http` and `https` addresses can be fetched.
    #[error("unsupported URL scheme in {url}")]
    UnsupportedScheme { url: String },

    /// Header name or value that cannot be sent verbatim on the wire.
    #[error("invalid request header {name:?}")]
    InvalidHeader { name: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("{method} {url} returned HTTP {}", .outcome.status)]
    Status {
        method: &'static str,
        url: String,
        outcome: Box<TransferOutcome>,
    },

    /// The sink rejected a write. Bytes written before the failure stay in the sink.
    #[error("writing body of {url} failed after {} bytes: {source}", .outcome.bytes_copied)]
    Sink {
        url: String,
        outcome: Box<TransferOutcome>,
        #[source]
        source: std::io::Error,
    },

    /// The connection broke while the body was streaming.
    #[error("body of {url} interrupted after {} bytes: {source}", .outcome.bytes_copied)]
    Interrupted {
        url: String,
        outcome: Box<TransferOutcome>,
        #[source]
        source: curl::Error,
    },

    /// Transfer finished but the byte count disagrees with `Content-Length`.
    ///
    /// libcurl itself fails a body that ends before `Content-Length`, which
    /// surfaces as `Interrupted`; this covers a transfer libcurl accepted
    /// anyway, such as a body longer than advertised.
    #[error("partial transfer of {url}: expected {expected} bytes, got {}", .outcome.bytes_copied)]
    Truncated {
        url: String,
        expected: u64,
        outcome: Box<TransferOutcome>,
    },
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidUrl { .. }
            | TransferError::UnsupportedScheme { .. }
            | TransferError::InvalidHeader { .. }
            | TransferError::Transport { .. } => ErrorKind::Transport,
            TransferError::Status { .. } => ErrorKind::Status,
            TransferError::Sink { .. }
            | TransferError::Interrupted { .. }
            | TransferError::Truncated { .. } => ErrorKind::Copy,
        }
    }

    /// Response observed before the failure. `None` for transport errors.
    pub fn outcome(&self) -> Option<&TransferOutcome> {
        match self {
            TransferError::InvalidUrl { .. }
            | TransferError::UnsupportedScheme { .. }
            | TransferError::InvalidHeader { .. }
            | TransferError::Transport { .. } => None,
            TransferError::Status { outcome, .. }
            | TransferError::Sink { outcome, .. }
            | TransferError::Interrupted { outcome, .. }
            | TransferError::Truncated { outcome, .. } => Some(outcome.as_ref()),
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u32> {
        self.outcome().map(|o| o.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::Headers;

    fn outcome(status: u32, bytes_copied: u64) -> Box<TransferOutcome> {
        Box::new(TransferOutcome {
            status,
            headers: Headers::new(),
            bytes_copied,
        })
    }

    #[test]
    fn status_error_carries_outcome() {
        let err = TransferError::Status {
            method: "GET",
            url: "http://h/x".into(),
            outcome: outcome(404, 0),
        };
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "GET http://h/x returned HTTP 404");
    }

    #[test]
    fn copy_errors_are_copy_kind() {
        let sink = TransferError::Sink {
            url: "http://h/x".into(),
            outcome: outcome(200, 3),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert_eq!(sink.kind(), ErrorKind::Copy);
        assert_eq!(sink.outcome().map(|o| o.bytes_copied), Some(3));

        let truncated = TransferError::Truncated {
            url: "http://h/x".into(),
            expected: 10,
            outcome: outcome(200, 4),
        };
        assert_eq!(truncated.kind(), ErrorKind::Copy);
        assert_eq!(
            truncated.to_string(),
            "partial transfer of http://h/x: expected 10 bytes, got 4"
        );
    }

    #[test]
    fn header_error_is_transport_kind() {
        let err = TransferError::InvalidHeader { name: "Bad\nName".into() };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.status().is_none());
    }
}
