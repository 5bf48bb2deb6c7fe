//! Display recent log entries from the application.

use anyhow::anyhow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::paths;
use crate::logging::LOG_FILE_PREFIX;

const DEFAULT_LINES: usize = 50;

/// Shows the last lines of the most recent log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If log files cannot be read
pub fn handle_logs() -> Result<(), anyhow::Error> {
    let log_dir = paths::log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = find_latest_log(&log_dir)? else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'vortex' commands to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let (total, tail) = last_lines(&content, DEFAULT_LINES);
    if tail.len() < total {
        println!("Showing last {} of {} lines:", tail.len(), total);
    } else {
        println!("Showing all {total} lines:");
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in tail {
        println!("{line}");
    }

    Ok(())
}

/// Total line count and the last `n` lines.
fn last_lines(content: &str, n: usize) -> (usize, Vec<&str>) {
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    (lines.len(), lines[start..].to_vec())
}

/// Most recently modified `vortex.log*` file in the directory.
fn find_latest_log(log_dir: &Path) -> Result<Option<PathBuf>, anyhow::Error> {
    let entries =
        fs::read_dir(log_dir).map_err(|e| anyhow!("Failed to read log directory: {e}"))?;

    let latest = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .filter_map(|path| {
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((path, modified))
        })
        .max_by_key(|(_, modified)| *modified)
        .map(|(path, _)| path);

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_of_short_and_long_content() {
        let (total, tail) = last_lines("a\nb\nc", 50);
        assert_eq!(total, 3);
        assert_eq!(tail, vec!["a", "b", "c"]);

        let long: String = (0..60).map(|i| format!("line {i}\n")).collect();
        let (total, tail) = last_lines(&long, 50);
        assert_eq!(total, 60);
        assert_eq!(tail.len(), 50);
        assert_eq!(tail[0], "line 10");
    }

    #[test]
    fn latest_log_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_latest_log(dir.path()).unwrap(), None);

        fs::write(dir.path().join("unrelated.txt"), "x").unwrap();
        fs::write(dir.path().join("vortex.log.2026-10-19"), "x").unwrap();
        assert_eq!(
            find_latest_log(dir.path()).unwrap(),
            Some(dir.path().join("vortex.log.2026-10-19"))
        );
    }
}
