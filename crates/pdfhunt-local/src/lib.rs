//! Local implementations of the pdfhunt pipeline: query a provider's HTML results page, pull
//! candidate links out of it with the shallow extractor, and stream a chosen document to disk.

pub mod config;
pub mod download;
pub mod extract;
pub mod rank;
pub mod redirect;
pub mod sanitize;
pub mod search;
#[cfg(test)]
mod test_env;

pub use config::{DownloadConfig, ProviderConfig, ProviderKind};
pub use download::{download, LocalDownloader};
pub use search::{search, HtmlSearchProvider};
