//! Recording in-memory [`HttpClient`] shared by the unit tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Cursor, Read};

use crate::error::{Result, WistiaError};
use crate::http::{BodyStream, HttpClient, TextResponse};
use crate::media::MediaId;
use crate::prompt::{Choice, Prompt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Clone)]
struct StreamFixture {
    status: u16,
    body: Vec<u8>,
    content_length: Option<u64>,
    reset_after_body: bool,
}

/// Yields its bytes, then fails the way a dropped connection does.
struct ResetReader {
    body: Cursor<Vec<u8>>,
}

impl Read for ResetReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.body.read(buf)? {
            0 => Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
            read => Ok(read),
        }
    }
}

#[derive(Default)]
pub struct FakeClient {
    texts: HashMap<String, TextResponse>,
    streams: HashMap<String, StreamFixture>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, url: &str, status: u16, body: &str) -> Self {
        self.texts.insert(
            url.to_string(),
            TextResponse {
                status,
                body: body.to_string(),
            },
        );
        self
    }

    /// Registers an asset body. `declare_length` controls whether a
    /// content length is advertised.
    pub fn with_stream(mut self, url: &str, status: u16, body: &[u8], declare_length: bool) -> Self {
        self.streams.insert(
            url.to_string(),
            StreamFixture {
                status,
                body: body.to_vec(),
                content_length: declare_length.then_some(body.len() as u64),
                reset_after_body: false,
            },
        );
        self
    }

    /// Advertises `content_length` but drops the connection after `partial`.
    pub fn with_reset_stream(mut self, url: &str, partial: &[u8], content_length: u64) -> Self {
        self.streams.insert(
            url.to_string(),
            StreamFixture {
                status: 200,
                body: partial.to_vec(),
                content_length: Some(content_length),
                reset_after_body: true,
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn record(&self, method: &'static str, url: &str, headers: &[(&str, &str)], body: Option<&str>) {
        self.requests.borrow_mut().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
            body: body.map(str::to_string),
        });
    }

    fn lookup(&self, url: &str) -> Result<TextResponse> {
        self.texts
            .get(url)
            .cloned()
            .ok_or_else(|| WistiaError::network(format!("connection refused: {url}")))
    }
}

impl HttpClient for FakeClient {
    fn get(&self, url: &str) -> Result<TextResponse> {
        self.record("GET", url, &[], None);
        self.lookup(url)
    }

    fn post(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<TextResponse> {
        self.record("POST", url, headers, Some(body));
        self.lookup(url)
    }

    fn stream(&self, url: &str) -> Result<BodyStream> {
        self.record("GET", url, &[], None);
        let fixture = self
            .streams
            .get(url)
            .cloned()
            .ok_or_else(|| WistiaError::network(format!("connection refused: {url}")))?;
        let body = Cursor::new(fixture.body);
        let reader: Box<dyn Read + Send> = if fixture.reset_after_body {
            Box::new(ResetReader { body })
        } else {
            Box::new(body)
        };
        Ok(BodyStream {
            status: fixture.status,
            content_length: fixture.content_length,
            reader,
        })
    }
}

/// Pre-recorded answers for resolver and orchestrator tests.
pub struct ScriptedPrompt {
    pub choice: Choice,
    pub confirm: bool,
    pub choices_asked: usize,
    pub confirmations_asked: usize,
}

impl ScriptedPrompt {
    pub fn new(choice: Choice, confirm: bool) -> Self {
        Self {
            choice,
            confirm,
            choices_asked: 0,
            confirmations_asked: 0,
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn choose_target(&mut self, _title: &str, _media_id: &MediaId) -> io::Result<Choice> {
        self.choices_asked += 1;
        Ok(self.choice)
    }

    fn confirm_download_all(&mut self, _total: usize) -> io::Result<bool> {
        self.confirmations_asked += 1;
        Ok(self.confirm)
    }
}
