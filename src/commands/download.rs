//! Convert a video URL and save the resulting MP3.

use super::common::{build_submitter, open_history, require_identity, run_submission};
use crate::config::VortexConfig;
use crate::identity::IdentityProvider;

/// Submits `url` for the signed-in user.
///
/// # Errors
/// - If nobody is signed in
/// - If the history database cannot be opened
/// - If the submission fails (invalid URL, service error, save or history failure)
pub async fn handle_download(
    config: &VortexConfig,
    provider: &IdentityProvider,
    url: &str,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== vortex Download ===");

    let identity = require_identity(provider)?;
    let submitter = build_submitter(config, open_history()?)?;

    run_submission(&submitter, url, &identity).await
}
