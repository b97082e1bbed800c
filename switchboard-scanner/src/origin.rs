use crate::error::{Result, ScanError};
use phonenumber::country;
use url::Url;

const WWW_PREFIX: &str = "www.";

/// Parse a site argument, adding `http://` when no scheme was given
pub fn normalize_site_url(site: &str) -> Result<Url> {
    let site = site.trim();

    if let Ok(url) = Url::parse(site)
        && url.has_host()
    {
        return Ok(url);
    }

    let with_scheme = format!("http://{}", site);
    let url = Url::parse(&with_scheme)?;
    if !url.has_host() {
        return Err(ScanError::InvalidUrl(format!("no host in '{}'", site)));
    }
    Ok(url)
}

/// Canonical `scheme://host[:port]/` of the site being scraped.
///
/// Every same-site check during a scrape is a string-prefix comparison
/// against [`SiteOrigin::as_str`], so the value is fixed once from the root
/// page and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOrigin {
    url: Url,
}

impl SiteOrigin {
    /// Build the origin from the root page's final (post-redirect) URL.
    ///
    /// If the requested URL carried `www.` and the redirect target dropped
    /// it, the prefix is put back.
    pub fn resolve(requested: &Url, final_url: &Url) -> Result<Self> {
        let final_host = final_url
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(format!("no host in '{}'", final_url)))?;

        let requested_www = requested
            .host_str()
            .is_some_and(|host| host.starts_with(WWW_PREFIX));

        let host = if requested_www && !final_host.starts_with(WWW_PREFIX) {
            format!("{}{}", WWW_PREFIX, final_host)
        } else {
            final_host.to_string()
        };

        let authority = match final_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host,
        };

        let url = Url::parse(&format!("{}://{}/", final_url.scheme(), authority))?;
        Ok(Self { url })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Absolute URL of a work-list link (`""` is the root page)
    pub fn join(&self, link: &str) -> Result<Url> {
        Ok(self.url.join(link)?)
    }

    /// Region used to parse national-format numbers found on this site
    pub fn region_hint(&self) -> Option<country::Id> {
        region_hint_for_host(self.host())
    }
}

/// `.pl` hosts parse as Polish numbers, `.de` as German, anything else
/// only accepts international-format numbers.
pub fn region_hint_for_host(host: &str) -> Option<country::Id> {
    if host.contains(".pl") {
        Some(country::Id::PL)
    } else if host.contains(".de") {
        Some(country::Id::DE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_normalize_adds_scheme() {
        let parsed = normalize_site_url("www.lindt.de").unwrap();
        assert_eq!(parsed.as_str(), "http://www.lindt.de/");
    }

    #[test]
    fn test_normalize_keeps_scheme() {
        let parsed = normalize_site_url("https://zeb-consulting.com/").unwrap();
        assert_eq!(parsed.scheme(), "https");
        assert_eq!(parsed.host_str(), Some("zeb-consulting.com"));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_site_url("not a valid url!!!").is_err());
    }

    #[test]
    fn test_resolve_uses_final_scheme_and_host() {
        let origin = SiteOrigin::resolve(
            &url("http://www.prolupin.de/"),
            &url("https://www.prolupin.de/de/start.html"),
        )
        .unwrap();
        assert_eq!(origin.as_str(), "https://www.prolupin.de/");
    }

    #[test]
    fn test_resolve_restores_dropped_www() {
        let origin =
            SiteOrigin::resolve(&url("http://www.hellma.de"), &url("https://hellma.de/home")).unwrap();
        assert_eq!(origin.as_str(), "https://www.hellma.de/");
    }

    #[test]
    fn test_resolve_does_not_invent_www() {
        let origin = SiteOrigin::resolve(
            &url("https://dreistern-gerichte.de/"),
            &url("https://dreistern-gerichte.de/"),
        )
        .unwrap();
        assert_eq!(origin.as_str(), "https://dreistern-gerichte.de/");
    }

    #[test]
    fn test_resolve_keeps_port() {
        let origin = SiteOrigin::resolve(
            &url("http://127.0.0.1:8080"),
            &url("http://127.0.0.1:8080/index.html"),
        )
        .unwrap();
        assert_eq!(origin.as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn test_join_links() {
        let origin =
            SiteOrigin::resolve(&url("https://www.ruf.eu/"), &url("https://www.ruf.eu/")).unwrap();
        assert_eq!(origin.join("").unwrap().as_str(), "https://www.ruf.eu/");
        assert_eq!(
            origin.join("/kontakt").unwrap().as_str(),
            "https://www.ruf.eu/kontakt"
        );
    }

    #[test]
    fn test_region_hint() {
        assert_eq!(region_hint_for_host("www.orlen.pl"), Some(country::Id::PL));
        assert_eq!(region_hint_for_host("www.lindt.de"), Some(country::Id::DE));
        assert_eq!(region_hint_for_host("www.mondelezinternational.com"), None);
        assert_eq!(region_hint_for_host("127.0.0.1"), None);
    }
}
