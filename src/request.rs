use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{Error, Result, USER_AGENT};

/// Source of page bodies. `HttpFetcher` is the real one; tests plug in their own.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Returns the body of `url`, or `Error::HttpStatus` for a non-success response.
    async fn fetch(&self, url: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    // Client uses Arc so we can clone cheaply
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let html = res.text().await?;
        Ok(html)
    }
}
