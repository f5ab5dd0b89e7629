//! Short code derivation and canonical post URLs

use url::Url;

/// Path segments that precede a short code in post URLs
const POST_PREFIXES: &[&str] = &["p", "reel", "tv"];

/// Builds the canonical URL for a short code
pub fn canonical_post_url(short_code: &str) -> String {
    format!("https://www.instagram.com/p/{}/", short_code)
}

/// Extracts the short code from a post URL
///
/// Looks for the segment following `p`, `reel` or `tv` in the URL path, so a
/// missing trailing slash or a query string does not change the result.
/// Returns `None` for anything that is not a post URL.
///
/// # Examples
///
/// ```
/// use insta_scraper::normalize::short_code_from_url;
///
/// assert_eq!(short_code_from_url("https://www.instagram.com/p/C1a2B3/").as_deref(), Some("C1a2B3"));
/// assert_eq!(short_code_from_url("https://www.instagram.com/reel/XyZ?igsh=1").as_deref(), Some("XyZ"));
/// assert_eq!(short_code_from_url("https://www.instagram.com/natgeo/"), None);
/// ```
pub fn short_code_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.filter(|s| !s.is_empty()).collect();

    segments
        .windows(2)
        .find(|pair| POST_PREFIXES.contains(&pair[0]))
        .map(|pair| pair[1])
        .filter(|code| is_short_code(code))
        .map(str::to_string)
}

/// Returns true if `code` only uses the characters Instagram short codes use
pub fn is_short_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
