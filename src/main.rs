//! vortex: turn video URLs into MP3 downloads from the terminal.

mod app;
mod clipboard;
mod commands;
mod config;
mod conversion;
mod delivery;
mod history;
mod identity;
mod logging;
mod setup;
mod submission;

#[tokio::main]
async fn main() {
    if let Err(e) = app::run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
