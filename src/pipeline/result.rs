use crate::analysis::{AudioDescriptor, DESCRIPTOR_COUNT};

use super::group::ClusterAssignment;
use super::reduce::ProjectionResult;
use super::table::DescriptorTable;

/// Mean raw descriptor values of one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    /// Means in descriptor column order.
    pub means: [f64; DESCRIPTOR_COUNT],
}

/// One plotted row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResultPoint<'a> {
    pub descriptor: &'a AudioDescriptor,
    pub pca_1: f64,
    pub pca_2: f64,
    pub cluster: usize,
}

/// Table, projection, and clustering joined by row position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    table: DescriptorTable,
    projection: ProjectionResult,
    clusters: ClusterAssignment,
    summaries: Vec<ClusterSummary>,
}

impl AnalysisResult {
    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn projection(&self) -> &ProjectionResult {
        &self.projection
    }

    pub fn clusters(&self) -> &ClusterAssignment {
        &self.clusters
    }

    /// Per-cluster means, ascending cluster id.
    pub fn summaries(&self) -> &[ClusterSummary] {
        &self.summaries
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn axis_labels(&self) -> [String; 2] {
        self.projection.axis_labels()
    }

    pub fn points(&self) -> impl Iterator<Item = ResultPoint<'_>> + '_ {
        let pca_1 = self.projection.pca_1();
        let pca_2 = self.projection.pca_2();
        self.table
            .rows()
            .iter()
            .zip(self.clusters.labels())
            .enumerate()
            .map(move |(row, (descriptor, &cluster))| ResultPoint {
                descriptor,
                pca_1: pca_1[row],
                pca_2: pca_2[row],
                cluster,
            })
    }
}

/// Join the three artifacts by row position.
///
/// # Panics
/// Panics when the row counts differ; that is a defect in the pipeline.
pub fn assemble(
    table: DescriptorTable,
    projection: ProjectionResult,
    clusters: ClusterAssignment,
) -> AnalysisResult {
    assert_eq!(
        table.len(),
        projection.len(),
        "descriptor table and projection row counts differ"
    );
    assert_eq!(
        table.len(),
        clusters.len(),
        "descriptor table and cluster assignment row counts differ"
    );
    let summaries = summarize(&table, &clusters);
    AnalysisResult {
        table,
        projection,
        clusters,
        summaries,
    }
}

fn summarize(table: &DescriptorTable, clusters: &ClusterAssignment) -> Vec<ClusterSummary> {
    let mut sums = vec![[0.0_f64; DESCRIPTOR_COUNT]; clusters.cluster_count()];
    let mut sizes = vec![0_usize; clusters.cluster_count()];
    for (descriptor, &cluster) in table.rows().iter().zip(clusters.labels()) {
        if cluster >= sums.len() {
            sums.resize(cluster + 1, [0.0; DESCRIPTOR_COUNT]);
            sizes.resize(cluster + 1, 0);
        }
        for (sum, value) in sums[cluster].iter_mut().zip(descriptor.values()) {
            *sum += value;
        }
        sizes[cluster] += 1;
    }
    sums.into_iter()
        .zip(sizes)
        .enumerate()
        .filter(|(_, (_, size))| *size > 0)
        .map(|(cluster, (sum, size))| ClusterSummary {
            cluster,
            size,
            means: sum.map(|total| total / size as f64),
        })
        .collect()
}
