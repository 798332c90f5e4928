#![forbid(unsafe_code)]

//! Turns whatever the operator supplied into something downloadable.

use std::io::Write;

use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, WistiaError};
use crate::extract::{is_channel_url, link_hash_from_url, media_id_from_url, video_id_from_html};
use crate::graphql::resolve_link;
use crate::http::HttpClient;
use crate::media::{MediaId, fetch_media};
use crate::prompt::{Choice, Prompt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Id(String),
    PageUrl(String),
    HtmlSnippet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Video(MediaId),
    Channel(String),
}

/// Status lines for the operator go to `console`.
pub fn resolve(
    input: &Input,
    client: &dyn HttpClient,
    settings: &Settings,
    prompt: &mut dyn Prompt,
    console: &mut dyn Write,
) -> Result<Target> {
    match input {
        Input::Id(id) => Ok(Target::Video(MediaId::new(id.clone()))),
        Input::HtmlSnippet(snippet) => {
            let id = video_id_from_html(snippet)
                .ok_or_else(|| WistiaError::not_found("Wistia video ID in HTML snippet"))?;
            writeln!(console, "Found video ID from HTML snippet: {id}")?;
            Ok(Target::Video(MediaId::new(id)))
        }
        Input::PageUrl(url) if is_channel_url(url) => {
            resolve_channel_url(url, client, settings, prompt, console)
        }
        Input::PageUrl(url) => resolve_page_url(url, client, settings, console),
    }
}

fn resolve_channel_url(
    url: &str,
    client: &dyn HttpClient,
    settings: &Settings,
    prompt: &mut dyn Prompt,
    console: &mut dyn Write,
) -> Result<Target> {
    let Some(id) = media_id_from_url(url) else {
        writeln!(console, "Detected Wistia channel page!")?;
        return Ok(Target::Channel(url.to_string()));
    };

    writeln!(console, "Detected Wistia channel page with specific video!")?;
    writeln!(console, "Found channel and video ID: {id}")?;
    console.flush()?;
    let media_id = MediaId::new(id);
    let title = fetch_media(client, settings, &media_id)
        .title
        .unwrap_or_else(|| media_id.to_string());
    match prompt.choose_target(&title, &media_id)? {
        Choice::Video => {
            writeln!(console, "Downloading single video...")?;
            Ok(Target::Video(media_id))
        }
        Choice::Channel => {
            writeln!(console, "Downloading entire channel...")?;
            Ok(Target::Channel(url.to_string()))
        }
    }
}

fn resolve_page_url(
    url: &str,
    client: &dyn HttpClient,
    settings: &Settings,
    console: &mut dyn Write,
) -> Result<Target> {
    if let Some(id) = media_id_from_url(url) {
        writeln!(console, "Found video ID from URL parameter: {id}")?;
        return Ok(Target::Video(MediaId::new(id)));
    }

    let link_hash = link_hash_from_url(url)
        .ok_or_else(|| WistiaError::not_found(format!("Wistia video ID in page {url}")))?;
    debug!(%link_hash, "resolving share link via GraphQL");
    let media_id = resolve_link(client, settings, url, &link_hash)?;
    writeln!(console, "Found video ID via GraphQL: {media_id}")?;
    Ok(Target::Video(media_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeClient, ScriptedPrompt};

    fn run(input: Input, client: &FakeClient, prompt: &mut ScriptedPrompt) -> Result<Target> {
        resolve(&input, client, &Settings::default(), prompt, &mut std::io::sink())
    }

    fn run_with_console(input: Input, client: &FakeClient) -> (Result<Target>, String) {
        let mut prompt = ScriptedPrompt::new(Choice::Channel, true);
        let mut console = Vec::<u8>::new();
        let target = resolve(&input, client, &Settings::default(), &mut prompt, &mut console);
        (target, String::from_utf8(console).unwrap())
    }

    #[test]
    fn explicit_id_is_used_verbatim() {
        let client = FakeClient::new();
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let target = run(Input::Id("not even alnum!".into()), &client, &mut prompt).unwrap();
        assert_eq!(target, Target::Video(MediaId::new("not even alnum!")));
        assert_eq!(client.request_count(), 0);
    }

    #[test]
    fn html_snippet_yields_wvideo() {
        let client = FakeClient::new();
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let snippet = r#"<p><a href="https://acme.com/?wvideo=abc123"><img src="thumb.jpg"></a></p>"#;
        let target = run(Input::HtmlSnippet(snippet.into()), &client, &mut prompt).unwrap();
        assert_eq!(target, Target::Video(MediaId::new("abc123")));

        let (_, console) = run_with_console(Input::HtmlSnippet(snippet.into()), &client);
        assert_eq!(console, "Found video ID from HTML snippet: abc123\n");
    }

    #[test]
    fn html_snippet_without_token_is_not_found() {
        let client = FakeClient::new();
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let err = run(Input::HtmlSnippet("<p>nothing</p>".into()), &client, &mut prompt).unwrap_err();
        assert!(matches!(err, WistiaError::NotFound(_)));
    }

    #[test]
    fn wmediaid_parameter_skips_graphql() {
        let client = FakeClient::new();
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let target = run(
            Input::PageUrl("https://acme.wistia.com/medias/h3b2k9f5xp?wmediaid=xyz987".into()),
            &client,
            &mut prompt,
        )
        .unwrap();
        assert_eq!(target, Target::Video(MediaId::new("xyz987")));
        assert_eq!(client.request_count(), 0);
    }

    #[test]
    fn share_link_falls_back_to_graphql() {
        let client = FakeClient::new().with_text(
            "https://acme.wistia.com/graphql?op=AudienceLink",
            200,
            r#"{"data":{"audienceLink":{"media":{"hashedId":"x9f2k7m8vq"}}}}"#,
        );
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let target = run(
            Input::PageUrl("https://acme.wistia.com/medias/h3b2k9f5xp".into()),
            &client,
            &mut prompt,
        )
        .unwrap();
        assert_eq!(target, Target::Video(MediaId::new("x9f2k7m8vq")));
        assert_eq!(client.requests()[0].method, "POST");

        let (_, console) = run_with_console(
            Input::PageUrl("https://acme.wistia.com/medias/h3b2k9f5xp".into()),
            &client,
        );
        assert!(console.contains("Found video ID via GraphQL: x9f2k7m8vq"));
    }

    #[test]
    fn unrecognised_page_is_not_found() {
        let client = FakeClient::new();
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let err = run(Input::PageUrl("https://example.com/about".into()), &client, &mut prompt)
            .unwrap_err();
        assert!(matches!(err, WistiaError::NotFound(_)));
        assert_eq!(client.request_count(), 0);
    }

    #[test]
    fn channel_url_without_media_goes_to_channel() {
        let client = FakeClient::new();
        let mut prompt = ScriptedPrompt::new(Choice::Video, true);
        let url = "https://fast.wistia.com/embed/channel/m9k8d7f2jq";
        let target = run(Input::PageUrl(url.into()), &client, &mut prompt).unwrap();
        assert_eq!(target, Target::Channel(url.into()));
        assert_eq!(prompt.choices_asked, 0);
    }

    #[test]
    fn channel_url_with_media_asks_operator() {
        let url = "https://fast.wistia.com/embed/channel/m9k8d7f2jq?wchannelid=m9k8d7f2jq&wmediaid=p5v8q3n7rb";
        let client = FakeClient::new().with_text(
            "https://fast.wistia.com/embed/medias/p5v8q3n7rb.json",
            200,
            r#"{"media":{"name":"Episode 4","assets":[]}}"#,
        );

        let mut video = ScriptedPrompt::new(Choice::Video, true);
        let target = run(Input::PageUrl(url.into()), &client, &mut video).unwrap();
        assert_eq!(target, Target::Video(MediaId::new("p5v8q3n7rb")));
        assert_eq!(video.choices_asked, 1);

        let (target, console) = run_with_console(Input::PageUrl(url.into()), &client);
        assert_eq!(target.unwrap(), Target::Channel(url.into()));
        assert!(console.contains("Found channel and video ID: p5v8q3n7rb"));
        assert!(console.ends_with("Downloading entire channel...\n"));
    }
}
