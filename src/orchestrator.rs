#![forbid(unsafe_code)]

//! Whole-channel runs: fetch the channel page, confirm with the operator,
//! then download every episode in order into one directory.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::thread;

use tracing::warn;

use crate::channel::{ChannelEntry, decode_channel, section_counts};
use crate::config::Settings;
use crate::download::download_media;
use crate::error::{Result, WistiaError};
use crate::filename::episode_filename;
use crate::http::HttpClient;
use crate::prompt::Prompt;

const RULE_WIDTH: usize = 60;

/// Outcome of a single episode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Succeeded,
    Skipped(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl DownloadSummary {
    pub fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Succeeded => self.succeeded += 1,
            DownloadOutcome::Skipped(_) => self.skipped += 1,
            DownloadOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }
}

pub struct ChannelDownloader<'a, W: Write> {
    client: &'a dyn HttpClient,
    settings: &'a Settings,
    console: W,
}

impl<'a, W: Write> ChannelDownloader<'a, W> {
    pub fn new(client: &'a dyn HttpClient, settings: &'a Settings, console: W) -> Self {
        Self {
            client,
            settings,
            console,
        }
    }

    /// `Ok(None)` when the operator declines the confirmation.
    pub fn run(&mut self, page_url: &str, prompt: &mut dyn Prompt) -> Result<Option<DownloadSummary>> {
        writeln!(self.console, "Fetching channel page...")?;
        let response = self.client.get(page_url)?;
        if !response.is_success() {
            return Err(WistiaError::network(format!(
                "channel page returned status {}",
                response.status
            )));
        }

        let channel = decode_channel(&response.body)?;
        let entries = channel.entries();
        if entries.is_empty() {
            return Err(WistiaError::not_found("videos in channel"));
        }

        writeln!(self.console)?;
        writeln!(self.console, "Channel Information:")?;
        writeln!(self.console, "Channel ID: {}", channel.hashed_id)?;
        writeln!(self.console, "Total videos found: {}", entries.len())?;
        writeln!(self.console)?;
        writeln!(self.console, "Videos by section:")?;
        for (section, count) in section_counts(&entries) {
            let label = if section.is_empty() { "(no section)" } else { section.as_str() };
            writeln!(self.console, "  {label}: {count} videos")?;
        }
        writeln!(self.console)?;
        writeln!(
            self.console,
            "Note: -o flag will be ignored. Files will be named based on video titles."
        )?;
        self.console.flush()?;

        if !prompt.confirm_download_all(entries.len())? {
            writeln!(self.console, "Download cancelled.")?;
            return Ok(None);
        }

        let summary = self.download_entries(&entries)?;
        Ok(Some(summary))
    }

    /// Pacing applies only after an attempted download, never after a skip.
    pub fn download_entries(&mut self, entries: &[ChannelEntry]) -> Result<DownloadSummary> {
        let dir = &self.settings.download_dir;
        fs::create_dir_all(dir)?;
        writeln!(
            self.console,
            "\nStarting download of {} videos to {}/",
            entries.len(),
            dir.display()
        )?;
        writeln!(self.console, "{}", "=".repeat(RULE_WIDTH))?;

        let mut summary = DownloadSummary::default();
        for (position, entry) in entries.iter().enumerate() {
            writeln!(
                self.console,
                "\n[{}/{}] {}",
                position + 1,
                entries.len(),
                entry.title
            )?;
            let outcome = self.download_entry(entry)?;
            summary.record(&outcome);
            match &outcome {
                DownloadOutcome::Skipped(path) => {
                    let shown = path.file_name().map(|name| name.to_string_lossy());
                    writeln!(
                        self.console,
                        "Skipping - file already exists: {}",
                        shown.unwrap_or_default()
                    )?;
                    continue;
                }
                DownloadOutcome::Failed(reason) => {
                    writeln!(self.console, "Failed: {reason}")?;
                }
                DownloadOutcome::Succeeded => {}
            }
            thread::sleep(self.settings.pacing_delay);
        }

        writeln!(self.console, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(self.console, "Download Summary:")?;
        writeln!(self.console, "Successful: {}", summary.succeeded)?;
        writeln!(self.console, "Skipped: {}", summary.skipped)?;
        writeln!(self.console, "Failed: {}", summary.failed)?;
        writeln!(self.console, "Files saved to: {}/", dir.display())?;
        Ok(summary)
    }

    /// Errors of the entry itself become `Failed`; only console write
    /// failures escape.
    fn download_entry(&mut self, entry: &ChannelEntry) -> Result<DownloadOutcome> {
        if entry.media_id.is_empty() {
            warn!(title = %entry.title, "channel entry without media ID");
            return Ok(DownloadOutcome::Failed("episode has no media ID".to_string()));
        }
        let path = self.settings.download_dir.join(episode_filename(entry));
        if path.exists() {
            return Ok(DownloadOutcome::Skipped(path));
        }
        match download_media(
            self.client,
            self.settings,
            &entry.media_id,
            &path,
            &mut self.console,
        ) {
            Ok(_) => Ok(DownloadOutcome::Succeeded),
            Err(err) => {
                warn!(media_id = %entry.media_id, "channel entry failed: {err}");
                Ok(DownloadOutcome::Failed(err.to_string()))
            }
        }
    }

    pub fn into_console(self) -> W {
        self.console
    }
}
