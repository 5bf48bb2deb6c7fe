//! Application command handlers for vortex.
//!
//! # Commands
//! - `download`: Convert a video URL and save the MP3
//! - `history`: Browse previous downloads, download again or copy the source URL
//! - `redownload`: Submit a previous download's URL again
//! - `auth`: Sign in, create an account, or sign out
//! - `whoami`: Show the signed-in account
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod auth;
pub mod common;
pub mod config;
pub mod download;
pub mod history;
pub mod logs;
pub mod redownload;

pub use auth::{handle_auth, handle_whoami};
pub use config::handle_config;
pub use download::handle_download;
pub use history::handle_history;
pub use logs::handle_logs;
pub use redownload::handle_redownload;
