use crate::origin::SiteOrigin;
use tracing::debug;

/// Path fragments of pages that usually carry the switchboard number:
/// contact, imprint, privacy policy and terms pages (de/pl/en).
pub const PRIORITY_KEYWORDS: [&str; 5] = [
    "/kontakt",
    "datenschutz",
    "polityka-prywatnosci",
    "contact",
    "regulamin",
];

/// Decides whether an anchor href names a same-site page worth visiting.
pub trait LinkClassifier {
    /// Returns the href as a `/`-rooted path, or `None` if it must not be
    /// queued. `accepted` is everything already on the work-list, `pending`
    /// the links accepted earlier from the same page.
    fn classify(&self, href: &str, accepted: &[String], pending: &[String]) -> Option<String>;
}

/// Same-site check by string prefix against the site origin, with and
/// without its `www.`.
pub struct PrefixClassifier {
    origin: String,
    origin_without_www: String,
}

impl PrefixClassifier {
    pub fn new(origin: &SiteOrigin) -> Self {
        Self::from_origin_str(origin.as_str())
    }

    pub fn from_origin_str(origin: &str) -> Self {
        Self {
            origin: origin.to_string(),
            origin_without_www: origin.replacen("www.", "", 1),
        }
    }

    fn strip_origin<'a>(&self, href: &'a str) -> Option<&'a str> {
        href.strip_prefix(self.origin.as_str())
            .or_else(|| href.strip_prefix(self.origin_without_www.as_str()))
    }
}

impl LinkClassifier for PrefixClassifier {
    fn classify(&self, href: &str, accepted: &[String], pending: &[String]) -> Option<String> {
        if is_fragment_jump(href) || href.len() <= 1 || is_pdf(href) {
            return None;
        }

        let link = if href.starts_with('/') {
            href.to_string()
        } else {
            let rest = self.strip_origin(href)?;
            if rest.is_empty() {
                // the origin itself, i.e. the root page
                String::new()
            } else {
                format!("/{}", rest)
            }
        };

        let seen = accepted.iter().chain(pending).any(|known| *known == link);
        if seen { None } else { Some(link) }
    }
}

/// `.../page#section`: an in-page jump, no new content
fn is_fragment_jump(href: &str) -> bool {
    href.rsplit_once('/')
        .is_some_and(|(_, last_segment)| last_segment.contains('#'))
}

fn is_pdf(href: &str) -> bool {
    href.len() >= 4
        && href
            .get(href.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"))
}

/// Run every href of a page through the classifier, keeping discovery order.
pub fn validate_page_links<C, I, S>(classifier: &C, hrefs: I, accepted: &[String]) -> Vec<String>
where
    C: LinkClassifier + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut new_links: Vec<String> = Vec::new();

    for href in hrefs {
        let href = href.as_ref();
        if let Some(link) = classifier.classify(href, accepted, &new_links) {
            debug!("Accepted link {} (href: {})", link, href);
            new_links.push(link);
        }
    }

    new_links
}

/// Keep only links whose lowercased path contains a priority keyword.
pub fn prioritize_page_links(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .filter(|link| is_priority_link(link))
        .collect()
}

pub fn is_priority_link(link: &str) -> bool {
    let lower = link.to_lowercase();
    PRIORITY_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}
