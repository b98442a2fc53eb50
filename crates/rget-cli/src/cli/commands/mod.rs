//! CLI command handlers, one per file.

mod config;
mod get;
mod request;
mod stat;

pub use config::run_config;
pub use get::run_get;
pub use stat::run_stat;
