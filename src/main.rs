use bud_scrap::{
    info_time, logging, HttpFetcher, Result, Scraper, ScraperConfig, BASE_URL, DEFAULT_KEYWORD, DEFAULT_OUTPUT,
    DEFAULT_PAGES, DEFAULT_THREADS,
};
use chrono::Local;
use clap::Parser;
use tracing::info_span;

#[derive(Debug, Parser)]
#[command(name = "bud-scrap", version, about = "Scrapes company listings from budownictwo.pl")]
struct Cli {
    /// Search keyword, the first path segment of the listing pages
    #[arg(short, long, default_value = DEFAULT_KEYWORD)]
    keyword: String,
    /// Highest page to fetch, workers stop earlier on an empty page
    #[arg(short, long, default_value_t = DEFAULT_PAGES)]
    pages: usize,
    /// Number of concurrent workers, capped at the page count; 0 fetches nothing
    #[arg(short, long, default_value_t = DEFAULT_THREADS)]
    threads: usize,
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: String,
    /// Export format: csv or json
    #[arg(short, long, default_value = "csv")]
    format: String,
    #[arg(long, default_value = BASE_URL)]
    base_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let start_time = Local::now();

    let config = ScraperConfig::new(&cli.keyword).with_base_url(&cli.base_url);
    let span = info_span!("scrape", keyword = %cli.keyword);
    let mut scraper = Scraper::new(config, HttpFetcher::new()?, span);

    scraper.fetch_data(cli.pages, cli.threads).await?;
    scraper.export(&cli.output, &cli.format)?;
    info_time!(start_time, "Full program time:");

    Ok(())
}
