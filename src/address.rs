use regex::Regex;
use scraper::Html;
use tracing::warn;

use crate::request::Fetch;
use crate::{Error, Result};

/// Pulls the full street address out of a listing's "view on map" page, where it
/// is passed to an inline `setAddress("...")` script call.
#[derive(Debug, Clone)]
pub struct AddressResolver {
    pattern: Regex,
}

impl AddressResolver {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r#"setAddress\("([^)]+)"\)"#)?;
        Ok(Self { pattern })
    }

    /// Returns an empty string when the map page answers with a non-success status.
    /// Transport errors and a page without the script call are errors.
    pub async fn resolve<F: Fetch + ?Sized>(&self, fetcher: &F, uri: &str) -> Result<String> {
        let body = match fetcher.fetch(uri).await {
            Ok(body) => body,
            Err(err) if err.is_http_status() => {
                warn!("{err}");
                return Ok(String::new());
            }
            Err(err) => return Err(err),
        };
        self.extract(&body)
    }

    pub fn extract(&self, body: &str) -> Result<String> {
        let raw = self
            .pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .ok_or(Error::AddressNotFound)?;
        Ok(decode_entities(raw.as_str()))
    }
}

/// Lets the HTML parser resolve the entity references.
fn decode_entities(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text = fragment.root_element().text().collect::<String>();
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;

    struct StaticFetcher(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl Fetch for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0.get(url).map(|body| body.to_string()).ok_or_else(|| Error::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    const MAP_PAGE: &str = r#"<html><head><script>
        var map = new Map();
        map.setAddress("ul. Le&#347;na 5, 30-001 Krak&oacute;w");
    </script></head><body></body></html>"#;

    #[test]
    fn extracts_and_decodes_the_address() {
        let resolver = AddressResolver::new().unwrap();
        assert_eq!(resolver.extract(MAP_PAGE).unwrap(), "ul. Leśna 5, 30-001 Kraków");
    }

    #[test]
    fn page_without_script_call_is_an_error() {
        let resolver = AddressResolver::new().unwrap();
        let err = resolver.extract("<html><body>mapa</body></html>").unwrap_err();
        assert!(matches!(err, Error::AddressNotFound));
    }

    #[tokio::test]
    async fn failed_map_request_gives_empty_address() {
        let resolver = AddressResolver::new().unwrap();
        let fetcher = StaticFetcher(HashMap::from([("http://budownictwo.pl/mapa/1", MAP_PAGE)]));

        let found = resolver.resolve(&fetcher, "http://budownictwo.pl/mapa/1").await.unwrap();
        assert_eq!(found, "ul. Leśna 5, 30-001 Kraków");

        let missing = resolver.resolve(&fetcher, "http://budownictwo.pl/mapa/2").await.unwrap();
        assert_eq!(missing, "");
    }
}
