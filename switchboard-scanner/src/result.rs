use crate::heuristic::{PhoneCandidate, Rule};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CONNECTION_ERROR: &str = "connection error";

/// Terminal result of scraping one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "number", rename_all = "snake_case")]
pub enum ScrapeResult {
    /// A normalized E.164 number
    Found(String),
    /// Crawl finished without any usable number
    NotFound,
    /// The root page could not be fetched
    ConnectionError,
}

impl fmt::Display for ScrapeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrapeResult::Found(number) => f.write_str(number),
            ScrapeResult::NotFound => Ok(()),
            ScrapeResult::ConnectionError => f.write_str(CONNECTION_ERROR),
        }
    }
}

/// Everything a scrape produced, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeOutcome {
    pub site: String,
    pub result: ScrapeResult,
    /// Rule that settled a `Found` result
    pub rule: Option<Rule>,
    pub pages_visited: usize,
    /// Pages on which a clue word was seen
    pub clue_pages: usize,
    pub work_list: Vec<String>,
    pub candidates: Vec<PhoneCandidate>,
}

impl ScrapeOutcome {
    pub fn new(site: String) -> Self {
        Self {
            site,
            result: ScrapeResult::NotFound,
            rule: None,
            pages_visited: 0,
            clue_pages: 0,
            work_list: Vec::new(),
            candidates: Vec::new(),
        }
    }

    pub fn with_connection_error(site: String) -> Self {
        Self {
            result: ScrapeResult::ConnectionError,
            ..Self::new(site)
        }
    }
}
