#![forbid(unsafe_code)]

//! Per-media metadata from Wistia's public embed JSON endpoint.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::http::HttpClient;

const ORIGINAL_ASSET_TYPE: &str = "original";

/// Opaque Wistia media identifier (the `hashedId` of a video).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One rendition listed under `media.assets`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    #[serde(rename = "type", default)]
    pub asset_type: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub bitrate: Option<f64>,
}

/// Title and asset list for one media. Both are empty when the lookup
/// failed; callers fall back to the ID for naming.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    pub title: Option<String>,
    pub assets: Vec<Asset>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    media: EmbedMedia,
}

#[derive(Deserialize)]
struct EmbedMedia {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    assets: Vec<Asset>,
}

/// Never fails: transport errors, non-2xx statuses and unexpected shapes all
/// collapse into an empty [`MediaInfo`].
pub fn fetch_media(client: &dyn HttpClient, settings: &Settings, media_id: &MediaId) -> MediaInfo {
    let url = settings.media_json_url(media_id.as_str());
    let response = match client.get(&url) {
        Ok(response) => response,
        Err(err) => {
            warn!(%media_id, "media lookup failed: {err}");
            return MediaInfo::default();
        }
    };
    if !response.is_success() {
        warn!(%media_id, status = response.status, "media lookup returned non-success status");
        debug!(body = %response.body, "media lookup response");
        return MediaInfo::default();
    }
    parse_media_info(&response.body).unwrap_or_else(|err| {
        warn!(%media_id, "could not parse media info: {err}");
        MediaInfo::default()
    })
}

pub fn parse_media_info(body: &str) -> serde_json::Result<MediaInfo> {
    let parsed: EmbedResponse = serde_json::from_str(body)?;
    Ok(MediaInfo {
        title: parsed.media.name.filter(|name| !name.is_empty()),
        assets: parsed.media.assets,
    })
}

/// Highest-bitrate asset tagged exactly `original`. Ties keep the first one
/// seen; a missing bitrate counts as zero.
pub fn best_original_asset(assets: &[Asset]) -> Option<&Asset> {
    let mut best: Option<(&Asset, f64)> = None;
    for asset in assets {
        if asset.asset_type.as_deref() != Some(ORIGINAL_ASSET_TYPE) || asset.url.is_none() {
            continue;
        }
        let bitrate = asset.bitrate.unwrap_or(0.0);
        match best {
            Some((_, best_bitrate)) if bitrate <= best_bitrate => {}
            _ => best = Some((asset, bitrate)),
        }
    }
    best.map(|(asset, _)| asset)
}

pub fn best_download_url(info: &MediaInfo) -> Option<&str> {
    best_original_asset(&info.assets).and_then(|asset| asset.url.as_deref())
}
