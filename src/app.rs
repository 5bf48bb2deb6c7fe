//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing, one-time startup (logging, config,
//! identity) and delegates to the command handlers.

use crate::commands;
use crate::config::{paths, VortexConfig};
use crate::identity::{Identity, IdentityProvider};
use crate::logging;
use crate::setup;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::process;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Turn video URLs into MP3 downloads and keep track of what you downloaded
#[derive(Parser)]
#[command(name = "vortex")]
#[command(version)]
#[command(long_about = "Turn video URLs into MP3 downloads and keep track of what you downloaded.\n\nEXAMPLES:\n    # Sign in (or create an account)\n    $ vortex auth\n    \n    # Download a video as MP3\n    $ vortex download https://youtu.be/dQw4w9WgXcQ\n    \n    # Browse your downloads\n    $ vortex history\n    \n    # Download your most recent item again\n    $ vortex redownload")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/vortex/vortex.toml\n    History & session:  ~/.local/share/vortex/\n    Logs:               ~/.local/state/vortex/vortex.log.*"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a video URL to MP3 and save it
    ///
    /// The file lands in your Downloads folder (see download.output_dir)
    /// and the download is added to your history.
    #[command(visible_alias = "d")]
    Download {
        /// Video URL (youtube.com or youtu.be by default)
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Browse your download history
    ///
    /// Use arrow keys to navigate, Enter to download again, c to copy the
    /// source URL, Esc to exit.
    #[command(visible_alias = "h")]
    History {
        /// Print a numbered list instead of opening the browser
        #[arg(long)]
        plain: bool,
    },

    /// Download a previous item again
    Redownload {
        /// History index (1 = most recent, 2 = second most recent, etc.)
        #[arg(value_name = "N")]
        index: Option<usize>,
    },

    /// Sign in, create an account, or sign out
    #[command(visible_alias = "a")]
    Auth {
        /// Sign out instead of signing in
        #[arg(long)]
        logout: bool,
    },

    /// Show the signed-in account
    Whoami,

    /// Open configuration file in your preferred editor
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs,

    /// Generate shell completion script
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Calls `on_change` with the current identity, then again on every change
/// until the provider goes away.
///
/// The current value is read before the task is spawned so it is never
/// coalesced with a change that lands first.
fn watch_identity<F>(mut events: watch::Receiver<Option<Identity>>, mut on_change: F) -> JoinHandle<()>
where
    F: FnMut(Option<&Identity>) + Send + 'static,
{
    on_change(events.borrow_and_update().as_ref());
    tokio::spawn(async move {
        while events.changed().await.is_ok() {
            on_change(events.borrow_and_update().as_ref());
        }
    })
}

fn log_identity(identity: Option<&Identity>) {
    match identity {
        Some(identity) => tracing::info!("Identity: {}", identity.uid),
        None => tracing::info!("Identity: signed out"),
    }
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization or setup fails
/// - If the command fails
pub async fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // commands that need neither logging nor config
    match &cli.command {
        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "vortex", &mut io::stdout());
            return Ok(());
        }
        Commands::Logs => {
            if let Err(e) = commands::handle_logs() {
                eprintln!("Error: {e}");
                process::exit(1);
            }
            return Ok(());
        }
        _ => {}
    }

    logging::init_logging()?;

    let config_path = paths::config_path()?;
    setup::ensure_config(&config_path).map_err(|e| {
        tracing::error!("Setup failed: {e}");
        anyhow::anyhow!("Setup failed: {e}")
    })?;

    if let Commands::Config = cli.command {
        return commands::handle_config();
    }

    let config = VortexConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {e}")
    })?;

    let provider = IdentityProvider::open(&paths::database_path()?, &paths::data_dir()?)?;
    let identity_watcher = watch_identity(provider.subscribe(), log_identity);

    let result = match cli.command {
        Commands::Download { url } => commands::handle_download(&config, &provider, &url).await,
        Commands::History { plain } => commands::handle_history(&config, &provider, plain).await,
        Commands::Redownload { index } => {
            commands::handle_redownload(&config, &provider, index).await
        }
        Commands::Auth { logout } => match commands::handle_auth(&provider, logout).await {
            Err(e) if e.to_string().contains("cancelled") => {
                // cliclack already showed the cancellation
                process::exit(0);
            }
            other => other,
        },
        Commands::Whoami => commands::handle_whoami(&provider),
        Commands::Completions { .. } | Commands::Logs | Commands::Config => {
            unreachable!("These commands are handled earlier")
        }
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {e:#}");
    }

    drop(provider);
    if let Err(e) = identity_watcher.await {
        tracing::debug!("Identity watcher ended abnormally: {e}");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn identity_watcher_sees_startup_identity_then_changes() {
        let me = Identity {
            uid: "U1".to_string(),
            email: None,
        };
        let (state, events) = watch::channel(Some(me));
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();

        let sink = seen.clone();
        let watcher = watch_identity(events, move |identity| {
            sink.lock().unwrap().push(identity.map(|i| i.uid.clone()));
        });
        assert_eq!(*seen.lock().unwrap(), vec![Some("U1".to_string())]);

        state.send_replace(None);
        drop(state);
        watcher.await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Some("U1".to_string()), None]
        );
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
