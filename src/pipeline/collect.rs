//! Runs the extractor over discovered files and gathers the successes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::analysis::{AudioDecoder, AudioDescriptor, DescriptorExtractor, ExtractError};

use super::table::DescriptorTable;

/// Progress reported while collecting descriptors.
#[derive(Debug)]
pub enum CollectEvent<'a> {
    /// Discovery finished with `total` candidate files.
    Discovered { total: usize },
    /// Extraction of file `index` (0-based) of `total` is starting.
    FileStarted {
        index: usize,
        total: usize,
        path: &'a Path,
    },
    FileSucceeded {
        path: &'a Path,
        descriptor: &'a AudioDescriptor,
    },
    /// The file was skipped; the batch continues.
    FileFailed {
        path: &'a Path,
        error: &'a ExtractError,
    },
}

/// Outcome of a collection pass.
#[derive(Debug)]
pub enum Collection {
    /// At least one file produced descriptors.
    Table {
        table: DescriptorTable,
        failed: usize,
    },
    /// Every candidate failed to extract.
    NothingExtracted { failed: usize },
}

/// Extract descriptors for `paths` in order, skipping failures.
pub fn collect_descriptors<D: AudioDecoder>(
    paths: &[PathBuf],
    extractor: &DescriptorExtractor<D>,
    on_event: &mut dyn FnMut(&CollectEvent<'_>),
) -> Collection {
    let total = paths.len();
    on_event(&CollectEvent::Discovered { total });
    let mut rows = Vec::with_capacity(total);
    let mut failed = 0;
    for (index, path) in paths.iter().enumerate() {
        on_event(&CollectEvent::FileStarted { index, total, path });
        match extractor.extract(path) {
            Ok(descriptor) => {
                debug!(
                    path = %path.display(),
                    tempo = descriptor.tempo,
                    brightness = descriptor.brightness,
                    energy = descriptor.energy,
                    percussiveness = descriptor.percussiveness,
                    "Extracted descriptors"
                );
                on_event(&CollectEvent::FileSucceeded {
                    path,
                    descriptor: &descriptor,
                });
                rows.push(descriptor);
            }
            Err(error) => {
                debug!(path = %path.display(), error = %error, "Skipping file");
                on_event(&CollectEvent::FileFailed {
                    path,
                    error: &error,
                });
                failed += 1;
            }
        }
    }
    if rows.is_empty() {
        return Collection::NothingExtracted { failed };
    }
    Collection::Table {
        table: DescriptorTable::from_rows(rows),
        failed,
    }
}
