//! Remote audio conversion.
//!
//! The conversion service accepts a video URL and answers with the audio file.
//! [`ConversionEndpoint`] is the seam the submission workflow talks to;
//! [`HttpConversionClient`] is the production implementation.

mod client;
pub mod disposition;

pub use client::HttpConversionClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::submission::VideoUrl;

/// A successful conversion, before any local interpretation.
#[derive(Debug, Clone)]
pub struct ConvertedAudio {
    /// Raw `Content-Disposition` header value, if the service sent one
    pub content_disposition: Option<String>,
    /// The audio payload
    pub bytes: Vec<u8>,
}

/// Failures talking to the conversion service.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The service answered with a non-success status.
    #[error("conversion service returned status {status}")]
    Rejected {
        status: u16,
        /// `detail` field of the JSON error body, when present
        detail: Option<String>,
    },
    /// The request never produced a response, or the payload could not be read.
    #[error("{0}")]
    Transport(String),
}

/// Something that can turn a video URL into audio.
///
/// Implementations make exactly one attempt per call.
#[async_trait]
pub trait ConversionEndpoint {
    async fn convert(&self, video_url: &VideoUrl) -> Result<ConvertedAudio, ConversionError>;
}
