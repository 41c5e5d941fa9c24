use thiserror::Error;

use crate::record::Field;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Request to {url} failed with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Couldn't find `{selector}` while extracting {field}")]
    MissingElement { field: Field, selector: String },
    #[error("Element for {field} has no `{attr}` attribute")]
    MissingAttribute { field: Field, attr: &'static str },
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("The map page doesn't contain a setAddress(...) call")]
    AddressNotFound,
    #[error("Regex Error: {0}")]
    Regex(#[from] regex::Error),
    #[error("Url Error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Export format {0} not implemented")]
    UnsupportedFormat(String),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),
}

impl Error {
    /// True for a non-success HTTP status, as opposed to a transport failure.
    pub fn is_http_status(&self) -> bool {
        matches!(self, Error::HttpStatus { .. })
    }
}
