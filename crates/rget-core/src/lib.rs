//! Remote-file retrieval: stat (HEAD) and get (GET into a caller-owned sink)
//! with status and length validation, over a shared libcurl transport.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod locator;
pub mod logging;
pub mod outcome;
pub mod transport;

pub use client::{RemoteFiler, TransferClient};
pub use config::{RgetConfig, TransportConfig};
pub use error::{ErrorKind, TransferError};
pub use headers::Headers;
pub use locator::ResourceLocator;
pub use outcome::TransferOutcome;
pub use transport::Transport;
