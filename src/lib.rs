#![forbid(unsafe_code)]

//! Building blocks for the `wistia_download` binary: input resolution,
//! vendor API calls, channel payload decoding, and streaming downloads.

pub mod channel;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod filename;
pub mod graphql;
pub mod http;
pub mod media;
pub mod orchestrator;
pub mod prompt;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, WistiaError};
pub use media::MediaId;
