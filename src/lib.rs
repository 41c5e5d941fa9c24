//! Scraper for the budownictwo.pl business directory.
//!
//! Pages are walked by a fixed number of workers, each taking every
//! `stride`-th page, until a page comes back without listings. The merged
//! records can then be exported to CSV or JSON.

mod address;
mod error;
pub mod export;
pub mod logging;
mod macros;
mod parse;
pub mod process;
pub mod record;
mod request;

pub use address::AddressResolver;
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use process::{Scraper, ScraperConfig, WorkerExit};
pub use record::{Field, Record};
pub use request::{Fetch, HttpFetcher};

pub const BASE_URL: &str = "http://budownictwo.pl";
pub const DEFAULT_KEYWORD: &str = "tartak";
/// Workers never go past this page, and stop earlier on the first empty page.
pub const DEFAULT_PAGES: usize = 20;
pub const DEFAULT_THREADS: usize = 20;
pub const DEFAULT_OUTPUT: &str = "test.csv";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
