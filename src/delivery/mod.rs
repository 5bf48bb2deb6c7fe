//! Local file delivery.
//!
//! Converted audio is first written to a staging file inside the output
//! directory and then persisted under its final name, so a half-written file
//! never appears under the user-visible name. Existing files are never
//! overwritten: `Song.mp3` becomes `Song (1).mp3`, `Song (2).mp3`, and so on.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// How many numbered alternatives are tried before giving up.
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Saves a payload under a suggested name and reports where it landed.
pub trait FileDelivery {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Delivers files into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
    output_dir: PathBuf,
}

impl DirectoryDelivery {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

/// `name.ext` → `name (n).ext`; names without an extension get the suffix appended.
fn numbered_name(file_name: &str, n: usize) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => format!("{} ({n}){}", &file_name[..idx], &file_name[idx..]),
        _ => format!("{file_name} ({n})"),
    }
}

impl FileDelivery for DirectoryDelivery {
    fn deliver(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;

        let mut staging = tempfile::Builder::new()
            .prefix(".vortex-")
            .suffix(".part")
            .tempfile_in(&self.output_dir)?;
        staging.write_all(bytes)?;
        staging.flush()?;

        let saved_to = persist_without_overwrite(staging, &self.output_dir, file_name)?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), saved_to.display());
        Ok(saved_to)
    }
}

/// Moves the staging file to the first free candidate name.
///
/// On failure the staging file is dropped, which deletes it.
fn persist_without_overwrite(
    mut staging: NamedTempFile,
    dir: &Path,
    file_name: &str,
) -> io::Result<PathBuf> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let candidate = if attempt == 0 {
            file_name.to_string()
        } else {
            numbered_name(file_name, attempt)
        };
        let target = dir.join(&candidate);

        match staging.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!("{} exists, trying next name", target.display());
                staging = e.file;
            }
            Err(e) => return Err(e.error),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("No free file name for {file_name} in {}", dir.display()),
    ))
}
