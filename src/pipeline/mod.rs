//! Batch analysis pipeline.
//!
//! Stages run strictly in order and each produces a new artifact:
//! discovered paths, [`DescriptorTable`], [`StandardizedMatrix`],
//! then [`ProjectionResult`] and [`ClusterAssignment`], joined into an
//! [`AnalysisResult`]. Progress is reported through [`CollectEvent`]s; the
//! pipeline itself never writes to the console.

mod collect;
mod group;
mod normalize;
mod reduce;
mod result;
mod table;

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::analysis::{AudioDecoder, DescriptorExtractor};
use crate::sample_sources::{ScanError, discover_audio_files};

pub use collect::{CollectEvent, Collection, collect_descriptors};
pub use group::{ClusterAssignment, GroupError, GroupingParams, group};
pub use normalize::{NormalizeError, StandardizedMatrix, standardize};
pub use reduce::{AXIS_COUNT, ProjectionResult, reduce};
pub use result::{AnalysisResult, ClusterSummary, ResultPoint, assemble};
pub use table::DescriptorTable;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
    #[error(transparent)]
    Group(#[from] GroupError),
}

/// How a folder run ended.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    /// No file with a supported extension was found.
    NoAudioFiles,
    /// Files were found but none could be analysed.
    NoFeaturesExtracted { failed: usize },
}

/// Standardize, project, and cluster an in-memory table.
pub fn analyze_table(
    table: DescriptorTable,
    params: &GroupingParams,
) -> Result<AnalysisResult, PipelineError> {
    let standardized = standardize(&table)?;
    let projection = reduce(&standardized);
    let clusters = group(&standardized, params)?;
    info!(
        rows = table.len(),
        clusters = clusters.cluster_count(),
        "Analysis finished"
    );
    Ok(assemble(table, projection, clusters))
}

/// Discover, extract, and analyse every supported file beneath `root`.
pub fn analyze_folder<D: AudioDecoder>(
    root: &Path,
    extractor: &DescriptorExtractor<D>,
    params: &GroupingParams,
    on_event: &mut dyn FnMut(&CollectEvent<'_>),
) -> Result<AnalysisOutcome, PipelineError> {
    let paths = discover_audio_files(root)?;
    if paths.is_empty() {
        return Ok(AnalysisOutcome::NoAudioFiles);
    }
    match collect_descriptors(&paths, extractor, on_event) {
        Collection::NothingExtracted { failed } => {
            Ok(AnalysisOutcome::NoFeaturesExtracted { failed })
        }
        Collection::Table { table, failed } => {
            if failed > 0 {
                info!(failed, kept = table.len(), "Some files were skipped");
            }
            analyze_table(table, params).map(AnalysisOutcome::Completed)
        }
    }
}
