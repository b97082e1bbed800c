use crate::error::Result;
use crate::heuristic::{Decision, PageText, ScanState, scan_page};
use crate::links::{PrefixClassifier, prioritize_page_links, validate_page_links};
use crate::origin::{SiteOrigin, normalize_site_url};
use crate::phone::{LibPhoneMatcher, PhoneMatcher};
use crate::result::{ScrapeOutcome, ScrapeResult};
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_REDIRECTS: usize = 10;
const RETRY_DELAY: Duration = Duration::from_millis(500);

pub fn default_user_agent() -> String {
    format!("switchboard/{}", env!("CARGO_PKG_VERSION"))
}

/// A fetched page, after redirects.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: Url,
    pub status_code: u16,
    pub body: String,
}

/// What the crawl needs from a page's HTML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Raw `href` of every anchor, in document order
    pub anchors: Vec<String>,
    /// Trimmed, non-empty text nodes outside `<script>`/`<style>`
    pub text_units: Vec<String>,
}

/// Crawls one site at a time, strictly in discovery order, looking for its
/// main phone number.
pub struct Crawler {
    client: Client,
    matcher: Box<dyn PhoneMatcher>,
    progress_callback: Option<ProgressCallback>,
    timeout_secs: u64,
    user_agent: String,
    retries: usize,
}

impl Crawler {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let user_agent = default_user_agent();
        Self {
            client: Self::build_client(timeout_secs, &user_agent),
            matcher: Box::new(LibPhoneMatcher::new()),
            progress_callback: None,
            timeout_secs,
            user_agent,
            retries: 0,
        }
    }

    fn build_client(timeout_secs: u64, user_agent: &str) -> Client {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .expect("Failed to create HTTP client")
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self.client = Self::build_client(self.timeout_secs, &self.user_agent);
        self
    }

    /// Extra attempts for a fetch that failed at the network level
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_phone_matcher(mut self, matcher: impl PhoneMatcher + 'static) -> Self {
        self.matcher = Box::new(matcher);
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Main phone number of `site`, `NotFound`, or `ConnectionError` when
    /// the site's root page cannot be fetched.
    pub async fn scrape(&self, site: &str) -> ScrapeResult {
        self.scrape_site(site).await.result
    }

    /// Like [`Crawler::scrape`], also reporting the pages and candidates
    /// seen along the way.
    pub async fn scrape_site(&self, site: &str) -> ScrapeOutcome {
        info!("Starting scrape of {}", site);
        let start = Instant::now();

        let (origin, root_page) = match self.resolve_origin(site).await {
            Ok(resolved) => resolved,
            Err(e) => {
                warn!("Root page of {} unreachable: {}", site, e);
                return ScrapeOutcome::with_connection_error(site.to_string());
            }
        };

        let classifier = PrefixClassifier::new(&origin);
        let region = origin.region_hint();
        debug!("Site origin {} (region hint: {:?})", origin.as_str(), region);

        let mut outcome = ScrapeOutcome::new(site.to_string());
        let mut work_list = vec![String::new()];
        let mut state = ScanState::new();
        let mut root_page = Some(root_page);
        let mut decision = Decision::Continue;
        let mut index = 0;

        while index < work_list.len() {
            if let Some(ref callback) = self.progress_callback {
                callback(index, work_list[index].clone());
            }

            let page = match root_page.take() {
                Some(page) => page,
                None => match self.fetch_link(&origin, &work_list[index]).await {
                    Ok(page) => page,
                    Err(e) => {
                        warn!("Skipping {}: {}", work_list[index], e);
                        index += 1;
                        continue;
                    }
                },
            };
            outcome.pages_visited += 1;

            let parsed = parse_page(&page.body);
            let discovered = prioritize_page_links(validate_page_links(
                &classifier,
                &parsed.anchors,
                &work_list,
            ));
            debug!(
                "Page {} ({}, status {}): {} anchors, {} new priority links",
                index,
                page.final_url,
                page.status_code,
                parsed.anchors.len(),
                discovered.len()
            );
            work_list.extend(discovered);

            let page_text = PageText {
                visit_index: index,
                text_units: &parsed.text_units,
                region,
            };
            let (next_state, page_decision) = scan_page(state, page_text, self.matcher.as_ref());
            state = next_state;

            if page_decision != Decision::Continue {
                decision = page_decision;
                break;
            }
            index += 1;
        }

        if decision == Decision::Continue {
            decision = state.fallback();
        }

        outcome.result = match decision {
            Decision::Decided { number, rule } => {
                info!("Found {} for {} ({:?})", number, site, rule);
                outcome.rule = Some(rule);
                ScrapeResult::Found(number)
            }
            Decision::Continue => {
                info!("No phone number found for {}", site);
                ScrapeResult::NotFound
            }
        };
        outcome.work_list = work_list;
        outcome.clue_pages = state.clue_pages;
        outcome.candidates = state.candidates;

        info!(
            "Scrape of {} complete. Visited {} pages in {}ms",
            site,
            outcome.pages_visited,
            start.elapsed().as_millis()
        );
        outcome
    }

    /// Fetch the root page and fix the site origin from where it ended up
    async fn resolve_origin(&self, site: &str) -> Result<(SiteOrigin, FetchedPage)> {
        let requested = normalize_site_url(site)?;
        let root_page = self.fetch_page(requested.as_str()).await?;
        let origin = SiteOrigin::resolve(&requested, &root_page.final_url)?;
        Ok((origin, root_page))
    }

    async fn fetch_link(&self, origin: &SiteOrigin, link: &str) -> Result<FetchedPage> {
        let url = origin.join(link)?;
        self.fetch_page(url.as_str()).await
    }

    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    warn!("Fetch of {} failed ({}), retry {}/{}", url, e, attempt, self.retries);
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchedPage> {
        debug!("Fetching {}", url);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let response_time = start.elapsed();

        let final_url = response.url().clone();
        let status_code = response.status().as_u16();

        let body = response.text().await?;
        debug!("Fetched {} bytes from {} in {:?}", body.len(), final_url, response_time);

        Ok(FetchedPage {
            final_url,
            status_code,
            body,
        })
    }
}

impl Default for Crawler {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull anchors and visible text out of an HTML document
pub fn parse_page(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let link_selector = Selector::parse("a[href]").unwrap();
    let anchors = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect();

    let text_units = document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element())
                .is_some_and(|element| matches!(element.name(), "script" | "style"));
            let text = text.trim();
            if hidden || text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        })
        .collect();

    ParsedPage {
        anchors,
        text_units,
    }
}
