#![forbid(unsafe_code)]

//! Streams a media asset to disk while drawing a single-line progress bar.

use std::fs::File;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, WistiaError};
use crate::http::HttpClient;
use crate::media::{MediaId, best_download_url, fetch_media};

pub const CHUNK_SIZE: usize = 32 * 1024;
pub const BAR_WIDTH: usize = 20;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Whole-number percentage, floored and capped at 100.
pub fn percent_of(downloaded: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (downloaded as u128 * 100 / total as u128).min(100);
    percent as u8
}

pub fn render_bar(percent: u8) -> String {
    let filled = BAR_WIDTH * usize::from(percent.min(100)) / 100;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Redraws the bar in place, and only when the percentage moves.
pub struct TextProgress<W: Write> {
    out: W,
    total: Option<u64>,
    last_percent: Option<u8>,
    renders: usize,
}

impl<W: Write> TextProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            total: None,
            last_percent: None,
            renders: 0,
        }
    }

    pub fn begin(&mut self, total: Option<u64>) -> std::io::Result<()> {
        self.total = total;
        self.last_percent = None;
        if total.is_none() {
            write!(self.out, "Downloading (size unknown)...")?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Returns whether a new frame was drawn.
    pub fn update(&mut self, downloaded: u64) -> std::io::Result<bool> {
        let Some(total) = self.total else {
            return Ok(false);
        };
        let percent = percent_of(downloaded, total);
        if self.last_percent == Some(percent) {
            return Ok(false);
        }
        write!(
            self.out,
            "\r[{}] {:>3}% ({:.2}/{:.2} MB)",
            render_bar(percent),
            percent,
            megabytes(downloaded),
            megabytes(total)
        )?;
        self.out.flush()?;
        self.last_percent = Some(percent);
        self.renders += 1;
        Ok(true)
    }

    pub fn finish(&mut self, downloaded: u64) -> std::io::Result<()> {
        match self.total {
            Some(total) => writeln!(
                self.out,
                "\rDownloaded successfully ({:.2} MB){}",
                megabytes(total),
                " ".repeat(10)
            ),
            None => writeln!(
                self.out,
                "\rDownloaded successfully ({:.2} MB)",
                megabytes(downloaded)
            ),
        }
    }

    /// Terminates the progress line so the caller's error starts cleanly.
    pub fn abort(&mut self) -> std::io::Result<()> {
        if self.renders > 0 || self.total.is_none() {
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn renders(&self) -> usize {
        self.renders
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Creates (or truncates) `dest`, then copies the body of a GET on `url`
/// into it. Returns the number of bytes written.
pub fn download_file(
    client: &dyn HttpClient,
    url: &str,
    dest: &Path,
    out: &mut dyn Write,
) -> Result<u64> {
    let mut file = File::create(dest)?;
    let mut response = client.stream(url)?;
    if response.status != 200 {
        return Err(WistiaError::network(format!(
            "bad status {} for {url}",
            response.status
        )));
    }
    debug!(%url, content_length = ?response.content_length, "streaming asset");

    let mut progress = TextProgress::new(out);
    progress.begin(response.content_length)?;
    match copy_with_progress(&mut response.reader, &mut file, &mut progress) {
        Ok(downloaded) => {
            progress.finish(downloaded)?;
            Ok(downloaded)
        }
        Err(err) => {
            progress.abort()?;
            Err(err)
        }
    }
}

fn copy_with_progress<W: Write>(
    reader: &mut dyn Read,
    file: &mut File,
    progress: &mut TextProgress<W>,
) -> Result<u64> {
    let mut buffer = vec![0u8; CHUNK_SIZE];
    let mut downloaded: u64 = 0;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(WistiaError::network(format!("error reading: {err}")));
            }
        };
        file.write_all(&buffer[..read])?;
        downloaded += read as u64;
        progress.update(downloaded)?;
    }
    file.flush()?;
    Ok(downloaded)
}

/// Looks up the media's assets, picks the best original rendition and
/// downloads it to `dest`.
pub fn download_media(
    client: &dyn HttpClient,
    settings: &Settings,
    media_id: &MediaId,
    dest: &Path,
    out: &mut dyn Write,
) -> Result<u64> {
    let info = fetch_media(client, settings, media_id);
    let url = best_download_url(&info)
        .ok_or_else(|| WistiaError::NoDownloadUrl(media_id.clone()))?
        .to_string();
    let shown = dest
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| dest.display().to_string());
    writeln!(out, "Downloading: {shown}")?;
    download_file(client, &url, dest, out)
}
