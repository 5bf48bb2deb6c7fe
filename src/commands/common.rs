//! Pieces shared by the commands that submit downloads.

use anyhow::anyhow;

use crate::config::{paths, VortexConfig};
use crate::conversion::HttpConversionClient;
use crate::delivery::DirectoryDelivery;
use crate::history::HistoryStore;
use crate::identity::{Identity, IdentityProvider};
use crate::submission::Submitter;

/// The production wiring of the submission workflow.
pub type LiveSubmitter = Submitter<HttpConversionClient, HistoryStore, DirectoryDelivery>;

/// The signed-in identity, or an error telling the user how to sign in.
pub fn require_identity(provider: &IdentityProvider) -> anyhow::Result<Identity> {
    provider
        .current()
        .ok_or_else(|| anyhow!("Not signed in. Run 'vortex auth' first."))
}

/// Opens the history database in the data directory.
pub fn open_history() -> anyhow::Result<HistoryStore> {
    HistoryStore::open(&paths::database_path()?)
}

/// Wires the HTTP client, delivery directory and history store from config.
pub fn build_submitter(config: &VortexConfig, store: HistoryStore) -> anyhow::Result<LiveSubmitter> {
    let output_dir = config.output_dir()?;
    tracing::debug!(
        "Submitter: endpoint={}, output_dir={}",
        config.api.endpoint,
        output_dir.display()
    );

    Ok(Submitter::new(
        HttpConversionClient::new(config.api.endpoint.clone()),
        store,
        DirectoryDelivery::new(output_dir),
        config.platforms.allowed_hosts.clone(),
        config.download.default_filename.clone(),
    ))
}

/// Runs one submission behind a spinner and reports the outcome.
///
/// The submission error is returned unchanged so the caller prints it once.
pub async fn run_submission(
    submitter: &LiveSubmitter,
    url: &str,
    identity: &Identity,
) -> anyhow::Result<()> {
    let spinner = cliclack::spinner();
    spinner.start("Converting to MP3...");

    match submitter.submit(url, identity).await {
        Ok(submission) => {
            spinner.stop(format!("{} downloaded", submission.title));
            tracing::debug!(
                "History record {} created for {}",
                submission.record.id,
                submission.file_name
            );
            cliclack::log::info(format!("Saved to {}", submission.saved_to.display()))?;
            Ok(())
        }
        Err(e) => {
            spinner.error("Download failed");
            Err(e.into())
        }
    }
}
