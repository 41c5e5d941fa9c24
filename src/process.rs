use std::path::Path;
use std::sync::Arc;

use chrono::Local;
use tokio::task::{spawn_blocking, JoinSet};
use tracing::{error, info, info_span, Instrument, Span};
use url::Url;

use crate::address::AddressResolver;
use crate::export::ExportFormat;
use crate::parse::{parse_page, Listing, Page};
use crate::record::Record;
use crate::request::Fetch;
use crate::{info_time, Error, Result, BASE_URL};

/// What to search for and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    pub keyword: String,
    pub base_url: String,
}

impl ScraperConfig {
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// `<base>/<keyword>/firma,<page>.html`
    pub fn page_url(&self, page_num: usize) -> String {
        format!(
            "{}/{}/firma,{page_num}.html",
            self.base_url.trim_end_matches('/'),
            self.keyword
        )
    }
}

/// Why a worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Walked past the page limit.
    Exhausted,
    /// Hit a page without listings.
    EndOfData,
    FetchError,
    ParseError,
}

struct WorkerReport {
    offset: usize,
    records: Vec<Record>,
    exit: WorkerExit,
}

/// Everything a worker needs that is shared between all workers of one run.
struct Shared<F> {
    config: ScraperConfig,
    base: Url,
    fetcher: Arc<F>,
    resolver: AddressResolver,
}

/// Owns the search and the accumulated records.
pub struct Scraper<F> {
    config: ScraperConfig,
    fetcher: Arc<F>,
    span: Span,
    results: Vec<Record>,
}

impl<F: Fetch + 'static> Scraper<F> {
    /// Every log line of the scrape is recorded under `span`.
    pub fn new(config: ScraperConfig, fetcher: F, span: Span) -> Self {
        Self {
            config,
            fetcher: Arc::new(fetcher),
            span,
            results: Vec::new(),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn records(&self) -> &[Record] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Walks pages `1..=num_pages` with `num_threads` workers, capped at `num_pages`,
    /// and appends what they find to the results. Returns once every worker has stopped.
    /// Zero pages or zero threads start no workers.
    pub async fn fetch_data(&mut self, num_pages: usize, num_threads: usize) -> Result<()> {
        let start_time = Local::now();
        let max_page = num_pages;
        let num_threads = num_threads.min(num_pages);
        if num_threads == 0 {
            let _enter = self.span.enter();
            info!(num_pages, "No workers to start");
            return Ok(());
        }

        let shared = Arc::new(Shared {
            base: Url::parse(&self.config.base_url)?,
            config: self.config.clone(),
            fetcher: self.fetcher.clone(),
            resolver: AddressResolver::new()?,
        });

        let results = &mut self.results;
        async move {
            info!(keyword = %shared.config.keyword, max_page, num_threads, "Started scraping");

            let mut workers = JoinSet::new();
            for offset in 1..=num_threads {
                let shared = shared.clone();
                let span = info_span!("worker", offset);
                workers.spawn(run_worker(shared, offset, num_threads, max_page).instrument(span));
            }

            // Each worker collects into its own list, merged here once it is done.
            while let Some(report) = workers.join_next().await {
                let WorkerReport { offset, records, exit } = report?;
                info!(offset, ?exit, entries = records.len(), "Worker finished");
                results.extend(records);
            }

            info_time!(start_time, "Finished scraping, {} entries in total", results.len());
            Ok::<_, Error>(())
        }
        .instrument(self.span.clone())
        .await
    }

    /// Writes the results to `filename`. `format` is `csv` or `json`, any case;
    /// anything else fails before the file is touched.
    pub fn export(&self, filename: impl AsRef<Path>, format: &str) -> Result<()> {
        let format: ExportFormat = format.parse()?;
        self.export_as(filename, format)
    }

    pub fn export_as(&self, filename: impl AsRef<Path>, format: ExportFormat) -> Result<()> {
        let path = filename.as_ref();
        let _enter = self.span.enter();
        format.write(path, &self.results)?;
        info!("Exported {} entries as {format} to {}", self.results.len(), path.display());
        Ok(())
    }
}

/// Pages visited by the worker starting at `offset`: `offset, offset + stride, ...`
/// up to `max_page`.
pub fn page_numbers(offset: usize, stride: usize, max_page: usize) -> impl Iterator<Item = usize> {
    (offset..=max_page).step_by(stride.max(1))
}

async fn run_worker<F: Fetch>(
    shared: Arc<Shared<F>>,
    offset: usize,
    stride: usize,
    max_page: usize,
) -> WorkerReport {
    let mut records = Vec::new();
    let exit = walk_pages(&shared, offset, stride, max_page, &mut records).await;
    WorkerReport { offset, records, exit }
}

async fn walk_pages<F: Fetch>(
    shared: &Shared<F>,
    offset: usize,
    stride: usize,
    max_page: usize,
    records: &mut Vec<Record>,
) -> WorkerExit {
    for page_num in page_numbers(offset, stride, max_page) {
        let url = shared.config.page_url(page_num);

        let html = match shared.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(err) => {
                error!("Error HTTP: {err}");
                return WorkerExit::FetchError;
            }
        };

        info!("Parsing page {url}");
        let listings = match parse_html(html, shared.base.clone()).await {
            Ok(Page::Listings(listings)) => listings,
            Ok(Page::EndOfData) => {
                info!("Found EMPTY page {url}");
                return WorkerExit::EndOfData;
            }
            Err(err) => {
                error!("Error parsing page {url}: {err}");
                return WorkerExit::ParseError;
            }
        };

        for listing in listings {
            records.push(resolve_listing(shared, listing).await);
        }
        info!("Entries after page: {}", records.len());
    }
    WorkerExit::Exhausted
}

/// The parsed document isn't `Send`, so parsing runs on the blocking pool.
async fn parse_html(html: String, base: Url) -> Result<Page> {
    let span = Span::current();
    spawn_blocking(move || {
        let _enter = span.enter();
        parse_page(&html, &base)
    })
    .await?
}

/// Fetches the map pages of a listing. A failed lookup only drops its own field.
async fn resolve_listing<F: Fetch>(shared: &Shared<F>, listing: Listing) -> Record {
    let Listing { mut record, map_links } = listing;
    for (field, uri) in map_links {
        match shared.resolver.resolve(shared.fetcher.as_ref(), &uri).await {
            Ok(address) => record.insert(field, address),
            Err(err) => error!("Error extracting {field}, {err}"),
        }
    }
    record
}
