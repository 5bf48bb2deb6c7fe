//! Download submission workflow.
//!
//! One call to [`Submitter::submit`] validates the URL, makes exactly one
//! request to the conversion service, saves the returned audio locally and
//! records the submission in the owner's history.
//!
//! The file is delivered before the history record is written. If the record
//! cannot be written the file stays where it was saved and the error says so;
//! the payload is never delivered twice.

pub mod validation;

pub use validation::{ValidationError, VideoUrl};

use std::path::PathBuf;
use thiserror::Error;

use crate::conversion::disposition::{file_name_from_header, sanitize_file_name, title_from_file_name};
use crate::conversion::{ConversionEndpoint, ConversionError};
use crate::delivery::FileDelivery;
use crate::history::{DownloadRecord, DownloadStore, NewDownloadRecord};
use crate::identity::Identity;

const GENERIC_REMOTE_ERROR: &str = "The conversion service could not process this video";

/// Why a submission failed. Each variant renders as a user-facing message.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Could not save the audio file: {0}")]
    Delivery(#[source] std::io::Error),

    #[error("Saved to {} but it could not be added to your history: {source}", saved_to.display())]
    Persistence {
        saved_to: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("{0}")]
    Unknown(String),
}

impl From<ConversionError> for SubmitError {
    fn from(error: ConversionError) -> Self {
        match error {
            ConversionError::Rejected { status, detail } => SubmitError::Remote {
                status,
                message: detail.unwrap_or_else(|| GENERIC_REMOTE_ERROR.to_string()),
            },
            ConversionError::Transport(message) => SubmitError::Unknown(message),
        }
    }
}

/// A completed submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub title: String,
    pub file_name: String,
    pub saved_to: PathBuf,
    pub record: DownloadRecord,
}

/// Runs submissions against a conversion endpoint, a history store and a delivery target.
pub struct Submitter<E, S, D> {
    endpoint: E,
    store: S,
    delivery: D,
    allowed_hosts: Vec<String>,
    default_file_name: String,
}

impl<E, S, D> Submitter<E, S, D>
where
    E: ConversionEndpoint,
    S: DownloadStore,
    D: FileDelivery,
{
    pub fn new(
        endpoint: E,
        store: S,
        delivery: D,
        allowed_hosts: Vec<String>,
        default_file_name: impl Into<String>,
    ) -> Self {
        Self {
            endpoint,
            store,
            delivery,
            allowed_hosts,
            default_file_name: default_file_name.into(),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// File name to use when the service sends none.
    fn fallback_file_name(&self) -> String {
        sanitize_file_name(&self.default_file_name).unwrap_or_else(|| "audio.mp3".to_string())
    }

    /// Submits `url` on behalf of `identity`.
    ///
    /// # Errors
    /// - [`SubmitError::Validation`] before any network traffic
    /// - [`SubmitError::Remote`] for a non-success answer; nothing is saved or recorded
    /// - [`SubmitError::Unknown`] when the service cannot be reached
    /// - [`SubmitError::Delivery`] when the file cannot be written; nothing is recorded
    /// - [`SubmitError::Persistence`] when the file was saved but the record was not
    pub async fn submit(&self, url: &str, identity: &Identity) -> Result<Submission, SubmitError> {
        let video_url = VideoUrl::parse(url, &self.allowed_hosts)?;
        tracing::info!("Submitting {} for {}", video_url, identity.uid);

        let audio = self.endpoint.convert(&video_url).await.map_err(|e| {
            tracing::error!("Conversion failed: {e}");
            SubmitError::from(e)
        })?;

        let file_name = audio
            .content_disposition
            .as_deref()
            .and_then(file_name_from_header)
            .unwrap_or_else(|| self.fallback_file_name());
        let title = title_from_file_name(&file_name);
        tracing::debug!("Derived file name {:?}, title {:?}", file_name, title);

        let saved_to = self
            .delivery
            .deliver(&file_name, &audio.bytes)
            .map_err(|e| {
                tracing::error!("Delivery failed: {e}");
                SubmitError::Delivery(e)
            })?;

        let record = self
            .store
            .insert(NewDownloadRecord {
                source_url: video_url.to_string(),
                title: title.clone(),
                owner_id: identity.uid.clone(),
            })
            .map_err(|e| {
                tracing::error!("History write failed after saving {}: {e}", saved_to.display());
                SubmitError::Persistence {
                    saved_to: saved_to.clone(),
                    source: e,
                }
            })?;

        tracing::info!("Download complete: {}", title);
        Ok(Submission {
            title,
            file_name,
            saved_to,
            record,
        })
    }
}
