#![forbid(unsafe_code)]

//! Command-line entry point: resolve a Wistia ID, page URL or "Copy link"
//! snippet, then download the single video or the whole channel.

use anyhow::{Context, Result, bail};
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use wistia_downloader::config::{Settings, load_settings};
use wistia_downloader::download::download_media;
use wistia_downloader::filename::{DEFAULT_OUTPUT, single_video_filename, title_stem};
use wistia_downloader::http::{HttpClient, UreqClient};
use wistia_downloader::media::{MediaId, fetch_media};
use wistia_downloader::orchestrator::ChannelDownloader;
use wistia_downloader::prompt::LinePrompt;
use wistia_downloader::resolver::{Input, Target, resolve};

const USAGE: &str = "Usage: wistia_download -id <videoID> OR -url <WistiaPageURL> OR -clipboard <HTMLSnippet> [-o <output.mp4>]\n  For channel pages: -url <WistiaChannelURL> (will download all videos)";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliArgs {
    id: Option<String>,
    url: Option<String>,
    clipboard: Option<String>,
    output: String,
    help: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        Self::from_iter(env::args().skip(1))
    }

    #[cfg(test)]
    fn from_slice(values: &[&str]) -> Result<Self> {
        Self::from_iter(values.iter().map(|value| value.to_string()))
    }

    /// Accepts `-flag value`, `--flag value`, `-flag=value` and
    /// `--flag=value` for every flag.
    fn from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Self {
            id: None,
            url: None,
            clipboard: None,
            output: DEFAULT_OUTPUT.to_string(),
            help: false,
        };
        let mut args = iter.into_iter();

        while let Some(arg) = args.next() {
            let Some(flag) = arg.strip_prefix("--").or_else(|| arg.strip_prefix('-')) else {
                bail!("unexpected argument: {arg}");
            };
            if flag == "h" || flag == "help" {
                parsed.help = true;
                continue;
            }
            let (name, inline) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (flag, None),
            };
            let slot = match name {
                "id" => &mut parsed.id,
                "url" => &mut parsed.url,
                "clipboard" => &mut parsed.clipboard,
                "o" => {
                    parsed.output = Self::value_for(name, inline, &mut args)?;
                    continue;
                }
                _ => bail!("unknown argument: {arg}"),
            };
            *slot = Some(Self::value_for(name, inline, &mut args)?);
        }

        Ok(parsed)
    }

    fn value_for(
        name: &str,
        inline: Option<String>,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<String> {
        match inline {
            Some(value) => Ok(value),
            None => args
                .next()
                .ok_or_else(|| anyhow::anyhow!("-{name} requires a value")),
        }
    }

    /// Explicit ID wins over a snippet, which wins over a page URL.
    fn input(&self) -> Option<Input> {
        let non_empty = |value: &Option<String>| value.clone().filter(|value| !value.is_empty());
        non_empty(&self.id)
            .map(Input::Id)
            .or_else(|| non_empty(&self.clipboard).map(Input::HtmlSnippet))
            .or_else(|| non_empty(&self.url).map(Input::PageUrl))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args = match CliArgs::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            println!("{USAGE}");
            return ExitCode::from(1);
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }
    let Some(input) = args.input() else {
        println!("{USAGE}");
        return ExitCode::from(1);
    };

    match run(input, &args.output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(input: Input, output: &str) -> Result<()> {
    let settings = load_settings();
    debug!(?settings, "loaded settings");
    let client = UreqClient::new(&settings.user_agent);
    let mut prompt = LinePrompt::stdio();

    let target = resolve(&input, &client, &settings, &mut prompt, &mut io::stdout())
        .context("resolving video ID")?;
    match target {
        Target::Channel(page_url) => {
            let mut downloader = ChannelDownloader::new(&client, &settings, io::stdout());
            downloader
                .run(&page_url, &mut prompt)
                .with_context(|| format!("downloading channel {page_url}"))?;
            Ok(())
        }
        Target::Video(media_id) => download_single(&client, &settings, &media_id, output),
    }
}

fn download_single(
    client: &dyn HttpClient,
    settings: &Settings,
    media_id: &MediaId,
    output: &str,
) -> Result<()> {
    let destination = if output == DEFAULT_OUTPUT {
        let title = fetch_media(client, settings, media_id).title;
        let (name, announcement) = default_destination(title.as_deref(), media_id);
        println!("{announcement}");
        PathBuf::from(name)
    } else {
        PathBuf::from(output)
    };

    download_media(client, settings, media_id, &destination, &mut io::stdout())
        .with_context(|| format!("downloading {media_id} to {}", destination.display()))?;
    Ok(())
}

/// Name used when `-o` is left at its default, plus the line announcing it.
fn default_destination(title: Option<&str>, media_id: &MediaId) -> (String, String) {
    let name = single_video_filename(title, media_id);
    let announcement = if title_stem(title).is_some() {
        format!("Using video title as filename: {name}")
    } else {
        format!("Using video ID as filename: {name}")
    };
    (name, announcement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_args_use_default_output() {
        let args = CliArgs::from_slice(&["-id", "abc123"]).unwrap();
        assert_eq!(args.id.as_deref(), Some("abc123"));
        assert_eq!(args.output, DEFAULT_OUTPUT);
        assert_eq!(args.input(), Some(Input::Id("abc123".into())));
    }

    #[test]
    fn cli_args_accept_go_and_gnu_spellings() {
        let args = CliArgs::from_slice(&[
            "--url",
            "https://acme.wistia.com/medias/h3b2k9f5xp",
            "-o=talk.mp4",
        ])
        .unwrap();
        assert_eq!(
            args.input(),
            Some(Input::PageUrl("https://acme.wistia.com/medias/h3b2k9f5xp".into()))
        );
        assert_eq!(args.output, "talk.mp4");

        let args = CliArgs::from_slice(&["-clipboard=<a href=\"?wvideo=abc\">"]).unwrap();
        assert_eq!(
            args.input(),
            Some(Input::HtmlSnippet("<a href=\"?wvideo=abc\">".into()))
        );
    }

    #[test]
    fn cli_args_selector_precedence() {
        let args = CliArgs::from_slice(&[
            "-url",
            "https://acme.wistia.com/medias/x",
            "-clipboard",
            "wvideo=snip",
            "-id",
            "explicit",
        ])
        .unwrap();
        assert_eq!(args.input(), Some(Input::Id("explicit".into())));

        let args = CliArgs::from_slice(&["-url", "https://a/b", "-clipboard", "wvideo=snip"]).unwrap();
        assert_eq!(args.input(), Some(Input::HtmlSnippet("wvideo=snip".into())));
    }

    #[test]
    fn cli_args_without_selector_have_no_input() {
        let args = CliArgs::from_slice(&["-o", "out.mp4"]).unwrap();
        assert!(args.input().is_none());
        let args = CliArgs::from_slice(&["-id", ""]).unwrap();
        assert!(args.input().is_none());
    }

    #[test]
    fn cli_args_reject_unknown_and_missing_values() {
        let err = CliArgs::from_slice(&["-verbose"]).unwrap_err();
        assert!(err.to_string().contains("unknown argument"));
        let err = CliArgs::from_slice(&["-id"]).unwrap_err();
        assert!(err.to_string().contains("requires a value"));
        let err = CliArgs::from_slice(&["abc123"]).unwrap_err();
        assert!(err.to_string().contains("unexpected argument"));
    }

    #[test]
    fn default_destination_announces_where_the_name_came_from() {
        let id = MediaId::new("abc123");
        let (name, line) = default_destination(Some("My Talk"), &id);
        assert_eq!(name, "My Talk.mp4");
        assert_eq!(line, "Using video title as filename: My Talk.mp4");

        let (name, line) = default_destination(Some("   "), &id);
        assert_eq!(name, "abc123.mp4");
        assert_eq!(line, "Using video ID as filename: abc123.mp4");

        let (_, line) = default_destination(None, &id);
        assert_eq!(line, "Using video ID as filename: abc123.mp4");
    }

    #[test]
    fn cli_args_help_flag() {
        assert!(CliArgs::from_slice(&["-h"]).unwrap().help);
        assert!(CliArgs::from_slice(&["--help"]).unwrap().help);
    }
}
