//! # docscrawl CLI
//!
//! Command-line entry point: crawls a documentation site into Markdown files
//! with per-page summaries, then prints (and optionally saves) a report of the
//! run.

mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use docscrawl::crawler::{
    Address, CrawlReport, Crawler, CrawlerConfig, HttpFetcher, Storage, StorageConfig,
    DEFAULT_CONTENT_SELECTOR,
};
use docscrawl::summarizer::{CompletionSummarizer, NoSummary, Summarizer, SummarizerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Crawl a documentation site into Markdown with LLM summaries", long_about = None)]
struct Cli {
    /// Export traces and metrics over OTLP
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl a site and write one Markdown document (and summary) per page
    Crawl(CrawlArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Seed URL to start crawling from
    #[arg(default_value = "https://requests.readthedocs.io/en/latest/")]
    url: String,

    /// Directory for page documents and summaries
    #[arg(short, long, default_value = "./docs_md")]
    output: PathBuf,

    /// CSS selector of the main content region
    #[arg(short, long, default_value = DEFAULT_CONTENT_SELECTOR)]
    selector: String,

    /// Maximum number of pages to fetch (0 for no limit)
    #[arg(short = 'p', long, default_value = "500")]
    max_pages: usize,

    /// Maximum link depth from the seed, along the shortest discovered path
    #[arg(short = 'd', long)]
    max_depth: Option<u32>,

    /// Do not generate summaries
    #[arg(long)]
    no_summary: bool,

    /// LLM model for summaries
    #[arg(short, long, default_value = "gemini-2.0-flash")]
    model: String,

    /// Number of leading document characters sent for summarization
    #[arg(long, default_value = "4000")]
    excerpt_chars: usize,

    /// Sampling temperature for summaries
    #[arg(long, default_value = "0.3")]
    temperature: f64,

    /// Maximum tokens per summary
    #[arg(long, default_value = "300")]
    max_tokens: u64,

    /// Summary requests per minute
    #[arg(long, default_value = "30")]
    rpm: u32,

    /// Request timeout in seconds
    #[arg(short, long, default_value = "30")]
    timeout: u64,

    /// User agent for page requests
    #[arg(long)]
    user_agent: Option<String>,

    /// Write the crawl report as JSON to this file
    #[arg(short, long)]
    report: Option<PathBuf>,

    /// Output format (text|json)
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _otel = telemetry::init_tracing_subscriber(cli.otel)?;

    match cli.command {
        Some(Commands::Crawl(args)) => {
            crawl_command(args).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["docscrawl", "--help"]);
        }
    }

    Ok(())
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let seed = Address::parse(&args.url)?;

    let mut builder = CrawlerConfig::builder()
        .content_selector(args.selector.clone())
        .max_pages((args.max_pages > 0).then_some(args.max_pages))
        .max_depth(args.max_depth)
        .request_timeout_secs(args.timeout);
    if let Some(user_agent) = &args.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }
    let config = builder.build();

    let storage = Storage::with_config(StorageConfig {
        output_dir: args.output.clone(),
    });
    let fetcher = HttpFetcher::new(&config)?;

    let report = if args.no_summary {
        run_crawl(&seed, fetcher, NoSummary, storage, config).await?
    } else {
        let summarizer_config = SummarizerConfig::builder()
            .model(args.model.clone())
            .temperature(args.temperature)
            .max_tokens(args.max_tokens)
            .excerpt_chars(args.excerpt_chars)
            .requests_per_minute(args.rpm)
            .build();
        let model = docscrawl::model::gemini_model_from_env(
            &summarizer_config.model,
            summarizer_config.requests_per_minute,
        )?;
        let summarizer = CompletionSummarizer::new(model, &summarizer_config);
        run_crawl(&seed, fetcher, summarizer, storage, config).await?
    };

    if let Some(report_file) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(report_file, json).await?;
        println!("Saved crawl report to {}", report_file.display());
    }

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print_report(&report, &args.output),
    }

    Ok(())
}

async fn run_crawl<S: Summarizer>(
    seed: &Address,
    fetcher: HttpFetcher,
    summarizer: S,
    storage: Storage,
    config: CrawlerConfig,
) -> anyhow::Result<CrawlReport> {
    let mut crawler = Crawler::new(fetcher, summarizer, storage, config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Crawling {}", seed));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let report = crawler.crawl(seed).await;

    spinner.finish_and_clear();
    Ok(report)
}

fn print_report(report: &CrawlReport, output: &std::path::Path) {
    println!(
        "Crawled {} pages from {} into {}",
        report.fetch_attempts,
        report.seed,
        output.display()
    );
    println!(
        "Stored {} documents and {} summaries",
        report.pages.len(),
        report.summary_count()
    );

    for page in &report.pages {
        let title = page.metadata.title.as_deref().unwrap_or("(untitled)");
        println!("  {} - {}", page.document_path.display(), title);
    }

    if !report.skipped.is_empty() {
        println!("Skipped {} pages:", report.skipped.len());
        for skipped in &report.skipped {
            println!("  {} ({:?})", skipped.url, skipped.reason);
        }
    }

    if report.truncated {
        println!("Stopped at the page limit; raise --max-pages to crawl further");
    }
}
