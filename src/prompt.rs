#![forbid(unsafe_code)]

//! Operator interaction. Resolution and channel logic only see the
//! [`Prompt`] trait; the binary wires it to stdin/stdout.

use std::io::{self, BufRead, Write};

use crate::media::MediaId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Video,
    Channel,
}

pub trait Prompt {
    /// Asked when a channel URL also pins a specific video.
    fn choose_target(&mut self, title: &str, media_id: &MediaId) -> io::Result<Choice>;

    fn confirm_download_all(&mut self, total: usize) -> io::Result<bool>;
}

/// `None` for anything other than `1` or `2`; callers default to the video.
pub fn parse_choice(line: &str) -> Option<Choice> {
    match line.trim() {
        "1" => Some(Choice::Video),
        "2" => Some(Choice::Channel),
        _ => None,
    }
}

pub fn parse_confirmation(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Line-oriented prompt over any reader/writer pair. End of input reads as
/// an empty answer.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self) -> io::Result<String> {
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line)
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn choose_target(&mut self, title: &str, media_id: &MediaId) -> io::Result<Choice> {
        writeln!(self.output)?;
        writeln!(self.output, "What would you like to download?")?;
        writeln!(self.output, "1) Just this video: \"{title}\" (ID: {media_id})")?;
        writeln!(self.output, "2) Entire channel (all videos)")?;
        write!(self.output, "Enter your choice (1 or 2): ")?;
        let answer = self.read_answer()?;
        Ok(parse_choice(&answer).unwrap_or_else(|| {
            let _ = writeln!(
                self.output,
                "Invalid choice. Defaulting to single video download."
            );
            Choice::Video
        }))
    }

    fn confirm_download_all(&mut self, total: usize) -> io::Result<bool> {
        write!(self.output, "\nDo you want to download all {total} videos? (y/N): ")?;
        let answer = self.read_answer()?;
        Ok(parse_confirmation(&answer))
    }
}
