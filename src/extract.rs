#![forbid(unsafe_code)]

//! Pattern-based scraping of Wistia page URLs, HTML snippets and response
//! bodies. Every vendor page-format assumption lives in this file.

use std::sync::LazyLock;

use regex::Regex;

static HTML_VIDEO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wvideo=([a-zA-Z0-9]+)").unwrap());
static URL_MEDIA_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]wmediaid=([a-zA-Z0-9]+)").unwrap());
static LINK_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wistia\.com/[^/]+/([a-zA-Z0-9]+)").unwrap());
static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://([^/?#]+)").unwrap());
static GRAPHQL_MEDIA_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""media":\s*\{[^}]*"hashedId"\s*:\s*"([a-zA-Z0-9]+)""#).unwrap()
});
static CHANNEL_PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"window\['wchanneljsonp-[^']+'\]\s*=\s*JSON\.parse\(decodeURIComponent\(atob\("([^"]+)"\)\)\);"#,
    )
    .unwrap()
});

/// First capture group of the first match, if any.
pub fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().to_string())
}

pub fn video_id_from_html(snippet: &str) -> Option<String> {
    capture(&HTML_VIDEO_RE, snippet)
}

pub fn media_id_from_url(url: &str) -> Option<String> {
    capture(&URL_MEDIA_ID_RE, url)
}

pub fn is_channel_url(url: &str) -> bool {
    url.contains("/embed/channel/") || url.contains("wchannelid=")
}

/// Opaque share-link hash, e.g. `abc` in `https://acme.wistia.com/medias/abc`.
pub fn link_hash_from_url(url: &str) -> Option<String> {
    capture(&LINK_HASH_RE, url)
}

pub fn domain_from_url(url: &str) -> Option<String> {
    capture(&DOMAIN_RE, url)
}

pub fn media_id_from_graphql(body: &str) -> Option<String> {
    capture(&GRAPHQL_MEDIA_ID_RE, body)
}

/// Base64 blob assigned to `window['wchanneljsonp-…']` on a channel page.
pub fn channel_payload(html: &str) -> Option<String> {
    capture(&CHANNEL_PAYLOAD_RE, html)
}
