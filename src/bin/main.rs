use clap::Parser;
use offer_scraper::{report, Config, Scraper};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "offer-scraper")]
#[command(about = "Headless-browser price scraper for product offer listings")]
#[command(version)]
struct Cli {
    /// Config file (YAML); defaults cover the built-in target page
    config: Option<PathBuf>,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Output file (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> offer_scraper::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let mut config = match cli.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    if cli.check {
        println!("Config valid");
        println!("  Target: {}", config.target.url);
        println!("  Rows: {}", config.selectors.row);
        println!("  Load more: {}", config.selectors.load_more);
        println!(
            "  Timeouts: control {}ms, growth {}ms",
            config.timeouts.control_ms, config.timeouts.growth_ms
        );
        println!("  Output: {}", config.output.display());
        return Ok(());
    }

    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(output) = cli.output {
        config.output = output;
    }

    println!("Scraping: {}", config.target.url);
    let start = Instant::now();

    // A failed scrape is logged, never turned into a nonzero exit; this is a
    // best-effort one-off run, not a service.
    match scrape(&config).await {
        Ok((offers, persisted)) => {
            println!();
            println!("✓ Finished");
            println!("  Offers: {}", offers);
            if !persisted {
                println!("  Output: {} (write failed)", config.output.display());
            } else {
                println!("  Output: {}", config.output.display());
            }
            println!("  Duration: {}ms", start.elapsed().as_millis());
        }
        Err(e) => {
            error!("scrape failed: {}", e);
            println!();
            println!("✗ Failed: {}", e);
        }
    }

    Ok(())
}

/// One full run: scrape, release the browser, then serialize and persist.
async fn scrape(config: &Config) -> offer_scraper::Result<(usize, bool)> {
    let mut scraper = Scraper::launch(&config.browser).await?;

    let outcome = match scraper.run(config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // Still release the browser on a failed run.
            let _ = scraper.close().await;
            return Err(e);
        }
    };

    scraper.close().await?;

    let json = outcome.results.to_pretty_json()?;
    let persisted = report::write_report(&json, &config.output);

    println!(
        "  Rows: {} after {} load-more clicks ({}), consent {}",
        outcome.load.rows, outcome.load.clicks, outcome.load.end, outcome.consent
    );
    if outcome.rows_dropped > 0 {
        println!("  Dropped: {} invalid rows", outcome.rows_dropped);
    }

    Ok((outcome.results.len(), persisted))
}
