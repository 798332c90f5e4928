#![forbid(unsafe_code)]

use std::sync::LazyLock;

use regex::Regex;

use crate::channel::ChannelEntry;
use crate::media::MediaId;

pub const VIDEO_EXTENSION: &str = "mp4";
pub const DEFAULT_OUTPUT: &str = "video.mp4";
const MAX_STEM_CHARS: usize = 200;

static FORBIDDEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Filename stem safe on every major filesystem, without extension.
pub fn sanitize_filename(title: &str) -> String {
    let name = FORBIDDEN_RE.replace_all(title, "_");
    let name = WS_RE.replace_all(&name, " ");
    name.trim().chars().take(MAX_STEM_CHARS).collect()
}

pub fn with_extension(stem: &str) -> String {
    format!("{stem}.{VIDEO_EXTENSION}")
}

/// `<section> - <title>.mp4`, or `<title>.mp4` outside any section.
pub fn episode_filename(entry: &ChannelEntry) -> String {
    let label = if entry.section.is_empty() {
        entry.title.clone()
    } else {
        format!("{} - {}", entry.section, entry.title)
    };
    with_extension(&sanitize_filename(&label))
}

/// `None` when the title sanitizes down to nothing.
pub fn title_stem(title: Option<&str>) -> Option<String> {
    title.map(sanitize_filename).filter(|stem| !stem.is_empty())
}

/// Output name for a single video when the operator kept the default `-o`.
pub fn single_video_filename(title: Option<&str>, media_id: &MediaId) -> String {
    match title_stem(title) {
        Some(stem) => with_extension(&stem),
        None => with_extension(media_id.as_str()),
    }
}
