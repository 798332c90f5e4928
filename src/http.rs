#![forbid(unsafe_code)]

//! Thin blocking HTTP seam. Every network call in the crate goes through
//! [`HttpClient`] so the resolution and download logic can run against a
//! recorded fake in tests.

use std::io::Read;

use tracing::debug;

use crate::error::{Result, WistiaError};

/// Fully buffered response. Non-success statuses are returned as data so
/// each caller decides what counts as a failure.
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub status: u16,
    pub body: String,
}

impl TextResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Streaming response used for asset downloads.
pub struct BodyStream {
    pub status: u16,
    pub content_length: Option<u64>,
    pub reader: Box<dyn Read + Send>,
}

pub trait HttpClient {
    fn get(&self, url: &str) -> Result<TextResponse>;

    fn post(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<TextResponse>;

    fn stream(&self, url: &str) -> Result<BodyStream>;
}

/// Production client backed by a shared `ureq` agent.
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(user_agent).build();
        Self { agent }
    }

    fn call(request: ureq::Request, body: Option<&str>) -> Result<ureq::Response> {
        let result = match body {
            Some(body) => request.send_string(body),
            None => request.call(),
        };
        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(_, response)) => Ok(response),
            Err(ureq::Error::Transport(transport)) => Err(WistiaError::network(transport.to_string())),
        }
    }

    /// Reads the whole body. `Response::into_string` stops at 10 MB, which
    /// large channel pages exceed.
    fn buffered(response: ureq::Response) -> Result<TextResponse> {
        let status = response.status();
        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|err| WistiaError::network(format!("reading response body: {err}")))?;
        Ok(TextResponse { status, body })
    }
}

impl HttpClient for UreqClient {
    fn get(&self, url: &str) -> Result<TextResponse> {
        debug!(%url, "GET");
        let response = Self::call(self.agent.get(url), None)?;
        Self::buffered(response)
    }

    fn post(&self, url: &str, headers: &[(&str, &str)], body: &str) -> Result<TextResponse> {
        debug!(%url, "POST");
        let mut request = self.agent.post(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }
        let response = Self::call(request, Some(body))?;
        Self::buffered(response)
    }

    fn stream(&self, url: &str) -> Result<BodyStream> {
        debug!(%url, "GET (stream)");
        let response = Self::call(self.agent.get(url), None)?;
        let status = response.status();
        let content_length = response
            .header("Content-Length")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|length| *length > 0);
        Ok(BodyStream {
            status,
            content_length,
            reader: response.into_reader(),
        })
    }
}
