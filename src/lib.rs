/// Datamere Client - async core for the Datamere research-data platform.
///
/// Core library providing dataset search and filtering, incremental
/// pagination, and chunked file preview against the Datamere REST API.

pub mod config;
pub mod core;


pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
