use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, warn};

use super::is_supported_audio;

/// Errors raised while walking the root folder.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Root folder is not a directory: {0}")]
    InvalidRoot(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Recursively list supported audio files beneath `root`.
///
/// Entries are visited in file-name order with the files of a directory
/// before its subdirectories, so the result is reproducible across runs.
pub fn discover_audio_files(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot(root.to_path_buf()));
    }
    let mut found = Vec::new();
    visit_dir(root, &mut |path| found.push(path.to_path_buf()))?;
    debug!(root = %root.display(), files = found.len(), "Discovery finished");
    Ok(found)
}

fn visit_dir(root: &Path, visitor: &mut impl FnMut(&Path)) -> Result<(), ScanError> {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(source) if dir != root => {
                warn!(
                    dir = %dir.display(),
                    error = %source,
                    "Failed to read directory during scan"
                );
                continue;
            }
            Err(source) => {
                return Err(ScanError::Io {
                    path: dir.clone(),
                    source,
                });
            }
        };
        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for entry_result in entries {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(
                        dir = %dir.display(),
                        error = %err,
                        "Failed to read directory entry during scan"
                    );
                    continue;
                }
            };

            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "Failed to read file type during scan"
                    );
                    continue;
                }
            };
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                subdirs.push(path);
            } else if file_type.is_file() && is_supported_audio(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        subdirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        for path in &files {
            visitor(path);
        }
        // Reversed so the first subdirectory is popped next.
        stack.extend(subdirs.into_iter().rev());
    }
    Ok(())
}
