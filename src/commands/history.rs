//! Download history viewer.
//!
//! Opens the interactive browser on a terminal, or prints a plain listing
//! when asked to (or when stdout is piped).

use chrono::Local;
use std::io::IsTerminal;

use super::common::{build_submitter, open_history, require_identity, run_submission};
use crate::clipboard::copy_to_clipboard;
use crate::config::VortexConfig;
use crate::history::{DownloadRecord, DownloadStore, HistoryAction, HistoryViewer};
use crate::identity::IdentityProvider;

/// Lists the signed-in user's downloads, newest first.
///
/// # Errors
/// - If nobody is signed in
/// - If the history cannot be read
/// - If a re-download chosen in the browser fails
pub async fn handle_history(
    config: &VortexConfig,
    provider: &IdentityProvider,
    plain: bool,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== vortex History ===");

    let identity = require_identity(provider)?;
    let store = open_history()?;
    let records = store.list_for_owner(&identity.uid)?;

    if records.is_empty() {
        println!("No downloads yet. Try 'vortex download <URL>'.");
        return Ok(());
    }

    if plain || !std::io::stdout().is_terminal() {
        print!("{}", format_listing(&records));
        return Ok(());
    }

    let chosen = {
        let mut viewer = HistoryViewer::new(records)?;
        viewer.run()?
    };

    match chosen {
        Some(HistoryAction::Redownload(record)) => {
            let submitter = build_submitter(config, store)?;
            run_submission(&submitter, &record.source_url, &identity).await?;
        }
        Some(HistoryAction::CopySource(url)) => {
            if copy_to_clipboard(&url) {
                println!("Copied {url}");
            } else {
                println!("{url}");
            }
        }
        None => tracing::debug!("History browser closed without selection"),
    }

    Ok(())
}

/// Numbered listing; the numbers match `vortex redownload N`.
fn format_listing(records: &[DownloadRecord]) -> String {
    let mut out = String::new();
    for (i, record) in records.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {}  {}\n     {}\n",
            i + 1,
            record.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            record.title,
            record.source_url
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn listing_is_numbered_from_one() {
        let record = |id, title: &str| DownloadRecord {
            id,
            source_url: format!("https://youtu.be/{id}"),
            title: title.to_string(),
            owner_id: "U1".to_string(),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };

        let listing = format_listing(&[record(2, "Newer"), record(1, "Older")]);
        let lines: Vec<_> = listing.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("  1  "));
        assert!(lines[0].ends_with("Newer"));
        assert_eq!(lines[1].trim(), "https://youtu.be/2");
        assert!(lines[2].starts_with("  2  "));
    }
}
