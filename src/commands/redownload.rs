//! Submit a previous download's source URL again.

use super::common::{build_submitter, open_history, require_identity, run_submission};
use crate::config::VortexConfig;
use crate::history::DownloadStore;
use crate::identity::IdentityProvider;

/// Re-submits the N-th most recent download (1 = newest).
///
/// A new history record is created; earlier records are left untouched.
///
/// # Errors
/// - If nobody is signed in or the history is empty
/// - If the index is out of range
/// - If the submission fails
pub async fn handle_redownload(
    config: &VortexConfig,
    provider: &IdentityProvider,
    index: Option<usize>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== vortex Redownload ===");

    let identity = require_identity(provider)?;
    let store = open_history()?;
    let records = store.list_for_owner(&identity.uid)?;

    if records.is_empty() {
        return Err(anyhow::anyhow!("No downloads found in history"));
    }

    let index = index.unwrap_or(1);
    if index < 1 || index > records.len() {
        return Err(anyhow::anyhow!(
            "Download index out of range. Available downloads: 1-{}",
            records.len()
        ));
    }

    let record = &records[index - 1];
    tracing::info!("Downloading history entry #{} again ({})", index, record.source_url);

    let submitter = build_submitter(config, store)?;
    run_submission(&submitter, &record.source_url, &identity).await
}
