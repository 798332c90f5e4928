#![forbid(unsafe_code)]

//! Decoding of the channel payload embedded in Wistia channel pages.
//!
//! The page carries the whole channel as
//! `JSON.parse(decodeURIComponent(atob("…")))`; this module applies the same
//! three stages and flattens the series/section/episode tree.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::error::{Result, WistiaError};
use crate::extract::channel_payload;
use crate::media::MediaId;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelData {
    #[serde(default)]
    pub hashed_id: String,
    #[serde(default)]
    pub numeric_id: Option<i64>,
    #[serde(default)]
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    /// Empty when the page omits it; the orchestrator fails that entry alone.
    #[serde(default)]
    pub hashed_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub episode_title: Option<String>,
    #[serde(default)]
    pub episode_description: Option<String>,
    #[serde(default)]
    pub duration_in_seconds: Option<f64>,
    #[serde(default)]
    pub still_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub index: Option<i64>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

/// One downloadable video of a channel, tagged with its section.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEntry {
    pub media_id: MediaId,
    pub title: String,
    pub description: String,
    pub section: String,
    pub duration: f64,
    pub position: i64,
    pub index: i64,
    pub aspect_ratio: f64,
    pub thumbnail_url: Option<String>,
}

impl ChannelData {
    /// Episodes in document order: series, then section, then episode.
    pub fn entries(&self) -> Vec<ChannelEntry> {
        self.series
            .iter()
            .flat_map(|series| series.sections.iter())
            .flat_map(|section| {
                let section_name = section.name.clone().unwrap_or_default();
                section
                    .episodes
                    .iter()
                    .map(move |episode| episode.to_entry(&section_name))
            })
            .collect()
    }
}

impl Episode {
    fn to_entry(&self, section: &str) -> ChannelEntry {
        let title = self
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.episode_title.clone())
            .unwrap_or_default();
        ChannelEntry {
            media_id: MediaId::new(self.hashed_id.clone()),
            title,
            description: self.episode_description.clone().unwrap_or_default(),
            section: section.to_string(),
            duration: self.duration_in_seconds.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            index: self.index.unwrap_or_default(),
            aspect_ratio: self.aspect_ratio.unwrap_or_default(),
            thumbnail_url: self.thumbnail_url.clone().or_else(|| self.still_url.clone()),
        }
    }
}

pub fn decode_channel(html: &str) -> Result<ChannelData> {
    let payload =
        channel_payload(html).ok_or_else(|| WistiaError::decode("channel data not found in HTML"))?;
    decode_payload(&payload)
}

/// base64 → percent-decoding → JSON, failing as a whole on any stage.
pub fn decode_payload(payload: &str) -> Result<ChannelData> {
    let json = decode_payload_text(payload)?;
    serde_json::from_str(&json).map_err(|err| WistiaError::decode(format!("JSON decode failed: {err}")))
}

fn decode_payload_text(payload: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|err| WistiaError::decode(format!("base64 decode failed: {err}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|err| WistiaError::decode(format!("payload is not UTF-8: {err}")))?;
    percent_decode(&text)
}

/// `decodeURIComponent` semantics: `+` stays literal, and a `%` that does not
/// start a two-digit hex escape is an error.
pub fn percent_decode(text: &str) -> Result<String> {
    let bytes = text.as_bytes();
    let mut position = 0;
    while let Some(offset) = bytes[position..].iter().position(|byte| *byte == b'%') {
        let start = position + offset;
        let escape = bytes.get(start + 1..start + 3);
        if !escape.is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit)) {
            return Err(WistiaError::decode(format!(
                "URL decode failed: invalid escape at byte {start}"
            )));
        }
        position = start + 3;
    }
    urlencoding::decode(text)
        .map(|decoded| decoded.into_owned())
        .map_err(|err| WistiaError::decode(format!("URL decode failed: {err}")))
}

/// Inverse of [`decode_payload`].
pub fn encode_payload(json: &str) -> String {
    STANDARD.encode(urlencoding::encode(json).as_bytes())
}

/// Number of entries per section, in order of first appearance.
pub fn section_counts(entries: &[ChannelEntry]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for entry in entries {
        match counts.iter_mut().find(|(name, _)| *name == entry.section) {
            Some((_, count)) => *count += 1,
            None => counts.push((entry.section.clone(), 1)),
        }
    }
    counts
}
