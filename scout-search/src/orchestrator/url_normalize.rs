//! URL canonicalisation for the optional normalised dedup key.
//!
//! News aggregators and search APIs hand out the same article under
//! cosmetically different URLs. When [`crate::DedupConfig::normalize_urls`]
//! is set, the dedup engine compares URLs in the canonical form produced
//! here instead of byte-for-byte.

use url::Url;

/// Query parameters that only carry campaign or referral tracking.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_cid",
    "mc_eid",
    "ref",
    "cmpid",
    "ocid",
];

/// Canonicalise a URL for dedup comparison.
///
/// - scheme and host lowercased, a leading `www.` dropped
/// - default ports removed
/// - tracking parameters dropped, remaining parameters sorted
/// - fragment removed
/// - trailing slash removed unless the path is `/`
///
/// Input that does not parse as an absolute URL is returned trimmed but
/// otherwise unchanged, so bare keys like `a.com/1` still compare exactly.
///
/// # Examples
///
/// ```
/// use scout_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://WWW.Example.com/story/?b=2&a=1&utm_source=feed#top");
/// let b = normalize_url("https://example.com/story?a=1&b=2");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut parsed) = Url::parse(trimmed) else {
        return trimmed.to_owned();
    };

    parsed.set_fragment(None);

    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    if let Some(bare) = parsed
        .host_str()
        .and_then(|h| h.strip_prefix("www."))
        .map(str::to_owned)
    {
        let _ = parsed.set_host(Some(&bare));
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.to_lowercase().as_str()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();

    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(&params);
    }

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_host_keeps_path_case() {
        assert_eq!(
            normalize_url("HTTPS://News.Example.COM/Path"),
            "https://news.example.com/Path"
        );
    }

    #[test]
    fn drops_www_prefix() {
        assert_eq!(
            normalize_url("https://www.example.com/a"),
            "https://example.com/a"
        );
    }

    #[test]
    fn removes_trailing_slashes() {
        assert_eq!(
            normalize_url("https://example.com/path//"),
            "https://example.com/path"
        );
        assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
    }

    #[test]
    fn removes_default_ports_only() {
        assert_eq!(
            normalize_url("http://example.com:80/p"),
            "http://example.com/p"
        );
        assert_eq!(
            normalize_url("https://example.com:443/p"),
            "https://example.com/p"
        );
        assert_eq!(
            normalize_url("https://example.com:8443/p"),
            "https://example.com:8443/p"
        );
    }

    #[test]
    fn strips_tracking_and_sorts_params() {
        assert_eq!(
            normalize_url("https://example.com/s?z=1&UTM_Source=x&a=2&fbclid=y"),
            "https://example.com/s?a=2&z=1"
        );
    }

    #[test]
    fn removes_fragment() {
        assert_eq!(
            normalize_url("https://example.com/page#comments"),
            "https://example.com/page"
        );
    }

    #[test]
    fn unparseable_input_only_trimmed() {
        assert_eq!(normalize_url(" a.com/1 "), "a.com/1");
        assert_eq!(normalize_url(""), "");
    }
}
