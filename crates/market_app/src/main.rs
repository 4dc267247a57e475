use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use market_app::logging::{self, LogDestination};
use market_app::{AppConfig, FeedPresenter, FeedStore, TextRenderer};
use market_core::{ItemId, LayoutMode};
use market_engine::ReqwestPageFetcher;

#[derive(Parser)]
#[command(name = "market", version, about = "Browse paginated marketplace listings")]
struct Cli {
    /// Config file (RON). Defaults to ./market.ron if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base url.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Override items per page.
    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Also write logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the feed page by page, as if scrolling to the end each time.
    Feed {
        /// Stop after this many pages.
        #[arg(long, default_value_t = 3)]
        pages: u32,

        /// list or grid
        #[arg(long, default_value = "list")]
        layout: LayoutMode,

        /// Seconds to wait for each page.
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Fetch and print one product.
    Detail { id: ItemId },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    logging::initialize(&destination, level);

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    if let Some(base_url) = cli.base_url {
        config.feed.base_url = base_url;
    }
    if let Some(page_size) = cli.page_size {
        config.feed.page_size = page_size;
    }
    config.validate()?;

    let fetcher = ReqwestPageFetcher::new(
        config.base_url()?,
        config.feed.page_size,
        config.fetch_settings(),
    )
    .context("failed to build HTTP client")?;

    match cli.command {
        Commands::Feed {
            pages,
            layout,
            timeout,
        } => run_feed(&config, fetcher, pages, layout, Duration::from_secs(timeout)),
        Commands::Detail { id } => run_detail(&fetcher, id),
    }
}

fn run_feed(
    config: &AppConfig,
    fetcher: ReqwestPageFetcher,
    pages: u32,
    layout: LayoutMode,
    timeout: Duration,
) -> anyhow::Result<()> {
    let mut store = FeedStore::new(Arc::new(fetcher), config.gate()?)
        .context("failed to start fetch engine")?;
    let errors = store.error_occurred();
    let mut presenter = FeedPresenter::new(&store, layout, TextRenderer::new(io::stdout()));

    store.activate();
    for loaded_pages in 1..=pages {
        if !store.wait_until_idle(timeout) {
            anyhow::bail!("timed out waiting for page {}", loaded_pages);
        }
        presenter.sync();
        for message in errors.drain() {
            eprintln!("error: {message}");
        }

        let loaded = store.items().len();
        if loaded_pages == pages || loaded == 0 {
            break;
        }
        // The surface prefetches one page ahead of the last loaded row.
        store.on_visible_range_end(loaded + store.page_size() - 1);
        if !store.is_loading() {
            break;
        }
    }

    eprintln!("{}", store.view().status_line());
    Ok(())
}

fn run_detail(fetcher: &ReqwestPageFetcher, id: ItemId) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let item = runtime
        .block_on(fetcher.fetch_item(id))
        .with_context(|| format!("failed to load product {id}"))?;

    println!("{} (#{})", item.name, item.id);
    if let Some(vendor) = &item.vendor_name {
        println!("  vendor:    {vendor}");
    }
    let currency = item.currency.as_deref().unwrap_or("");
    if item.has_discount() {
        println!(
            "  price:     {currency} {:.0} (was {:.0})",
            item.effective_price(),
            item.price
        );
    } else {
        println!("  price:     {currency} {:.0}", item.price);
    }
    if let Some(stock) = item.stock {
        println!("  stock:     {stock}");
    }
    if !item.thumbnail.is_empty() {
        println!("  thumbnail: {}", item.thumbnail);
    }
    if let Some(description) = &item.description {
        println!();
        println!("{description}");
    }
    Ok(())
}
