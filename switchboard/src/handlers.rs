use anyhow::{Context, Result, bail};
use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switchboard_scanner::{Crawler, ScrapeOutcome};
use tracing::info;
use url::Url;

pub const MISSING_URL_MESSAGE: &str = "Missing <web-site-url> argument";

/// Crawler settings taken from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub timeout_secs: u64,
    pub retries: usize,
    pub user_agent: Option<String>,
    pub json: bool,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            retries: 0,
            user_agent: None,
            json: false,
        }
    }
}

impl ScrapeOptions {
    pub fn from_matches(args: &ArgMatches) -> Self {
        let defaults = Self::default();
        Self {
            timeout_secs: args
                .get_one::<u64>("timeout")
                .copied()
                .unwrap_or(defaults.timeout_secs),
            retries: args
                .get_one::<usize>("retries")
                .copied()
                .unwrap_or(defaults.retries),
            user_agent: args.get_one::<String>("user-agent").cloned(),
            json: args.get_flag("json"),
        }
    }

    pub fn build_crawler(&self) -> Crawler {
        let crawler = Crawler::with_timeout(self.timeout_secs).with_retries(self.retries);
        match self.user_agent {
            Some(ref user_agent) => crawler.with_user_agent(user_agent.as_str()),
            None => crawler,
        }
    }
}

/// Logs go to stderr so stdout only ever carries results
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load and parse sites from a file, one per line
pub fn load_sites_from_file(path: &Path) -> Result<Vec<String>> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read sites file {}", path.display()))?;

    let sites: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(parse_site_line)
        .collect();

    if sites.is_empty() {
        bail!("No valid sites found in {}", path.display());
    }

    Ok(sites)
}

/// Parse a single line as a site URL, trying to add http:// if needed
pub fn parse_site_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{} Skipping invalid site '{}'", "⚠".yellow().bold(), line);
    None
}

/// Single-site output: the bare result, or the outcome as JSON
pub fn format_outcome(outcome: &ScrapeOutcome, json: bool) -> String {
    if json {
        serde_json::to_string(outcome).unwrap_or_else(|_| outcome.result.to_string())
    } else {
        outcome.result.to_string()
    }
}

/// Batch output: `<site>\t<result>`, or the outcome as JSON
pub fn format_batch_line(outcome: &ScrapeOutcome, json: bool) -> String {
    if json {
        format_outcome(outcome, true)
    } else {
        format!("{}\t{}", outcome.site, outcome.result)
    }
}

pub async fn handle_scrape(site: &str, options: &ScrapeOptions) {
    let crawler = options.build_crawler();
    let outcome = crawler.scrape_site(site).await;
    println!("{}", format_outcome(&outcome, options.json));
}

pub async fn handle_batch(sites_file: &Path, options: &ScrapeOptions) -> Result<()> {
    let sites = load_sites_from_file(sites_file)?;
    info!("Scraping {} site(s) from {}", sites.len(), sites_file.display());

    let progress_bar = ProgressBar::new(sites.len() as u64);
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {prefix} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let pb_clone = progress_bar.clone();
    let crawler = options
        .build_crawler()
        .with_progress_callback(Arc::new(move |index: usize, link: String| {
            let link = if link.is_empty() { "/".to_string() } else { link };
            pb_clone.set_message(format!("page {}: {}", index + 1, link));
        }));

    for site in &sites {
        progress_bar.set_prefix(site.clone());
        let outcome = crawler.scrape_site(site).await;
        progress_bar.suspend(|| println!("{}", format_batch_line(&outcome, options.json)));
        progress_bar.inc(1);
    }

    progress_bar.finish_and_clear();
    Ok(())
}

pub fn report_error(error: &anyhow::Error) {
    eprintln!("{} {:#}", "✗".red().bold(), error);
}
