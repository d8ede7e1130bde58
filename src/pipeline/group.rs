//! Seeded k-means grouping of standardized rows.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use linfa::DatasetBase;
use linfa::traits::{Fit, Predict};
use linfa_clustering::{KMeans, KMeansError};
use ndarray::Array2;
use rand_08::SeedableRng;
use rand_08::rngs::StdRng;
use thiserror::Error;
use tracing::debug;

use super::normalize::StandardizedMatrix;

const DEFAULT_CLUSTERS: NonZeroUsize = NonZeroUsize::new(3).unwrap();

/// Parameters for the grouping stage.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupingParams {
    /// Requested cluster count; the effective count is capped by the row count.
    pub clusters: NonZeroUsize,
    /// Seed for k-means++ initialisation.
    pub seed: u64,
    pub max_iterations: u64,
    pub tolerance: f64,
    /// Independent initialisations; the lowest inertia wins.
    pub restarts: usize,
}

impl Default for GroupingParams {
    fn default() -> Self {
        Self {
            clusters: DEFAULT_CLUSTERS,
            seed: 42,
            max_iterations: 300,
            tolerance: 1e-4,
            restarts: 10,
        }
    }
}

/// Cluster id per row, ids in `[0, cluster_count)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    labels: Vec<usize>,
    cluster_count: usize,
}

impl ClusterAssignment {
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Effective `k = min(requested, rows)`.
    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Cannot cluster an empty matrix")]
    EmptyMatrix,
    #[error("K-means failed: {0}")]
    KMeans(#[from] KMeansError),
}

/// Partition the rows of `matrix` into `min(params.clusters, rows)` groups.
pub fn group(
    matrix: &StandardizedMatrix,
    params: &GroupingParams,
) -> Result<ClusterAssignment, GroupError> {
    group_rows(matrix.values(), params)
}

pub(crate) fn group_rows(
    values: &Array2<f64>,
    params: &GroupingParams,
) -> Result<ClusterAssignment, GroupError> {
    let rows = values.nrows();
    if rows == 0 {
        return Err(GroupError::EmptyMatrix);
    }
    let cluster_count = params.clusters.get().min(rows);
    let distinct = distinct_rows(values);
    if cluster_count == 1 || distinct == 1 {
        return Ok(ClusterAssignment {
            labels: vec![0; rows],
            cluster_count,
        });
    }

    // k-means++ cannot seed more centres than there are distinct points.
    let fitted_clusters = cluster_count.min(distinct);
    debug!(
        rows,
        requested = params.clusters.get(),
        clusters = fitted_clusters,
        "Running k-means"
    );
    let rng = StdRng::seed_from_u64(params.seed);
    let model = KMeans::params_with_rng(fitted_clusters, rng)
        .max_n_iterations(params.max_iterations)
        .tolerance(params.tolerance)
        .n_runs(params.restarts.max(1))
        .fit(&DatasetBase::from(values.clone()))?;
    let raw = model.predict(values);
    Ok(ClusterAssignment {
        labels: canonical_labels(raw.iter().copied()),
        cluster_count,
    })
}

/// Renumber labels in order of first appearance so row 0 is cluster 0.
fn canonical_labels(raw: impl Iterator<Item = usize>) -> Vec<usize> {
    let mut mapping: Vec<(usize, usize)> = Vec::new();
    raw.map(|label| match mapping.iter().find(|(from, _)| *from == label) {
        Some(&(_, to)) => to,
        None => {
            let to = mapping.len();
            mapping.push((label, to));
            to
        }
    })
    .collect()
}

fn distinct_rows(values: &Array2<f64>) -> usize {
    values
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .map(|&value| if value == 0.0 { 0 } else { value.to_bits() })
                .collect::<Vec<u64>>()
        })
        .collect::<BTreeSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn params(clusters: usize) -> GroupingParams {
        GroupingParams {
            clusters: NonZeroUsize::new(clusters).unwrap(),
            ..GroupingParams::default()
        }
    }

    #[test]
    fn defaults_are_three_clusters_seed_42() {
        let defaults = GroupingParams::default();
        assert_eq!(defaults.clusters.get(), 3);
        assert_eq!(defaults.seed, 42);
    }

    #[test]
    fn cluster_count_is_capped_by_rows() {
        let values = array![[-1.0, -1.0], [1.0, 1.0]];
        let assignment = group_rows(&values, &params(3)).unwrap();
        assert_eq!(assignment.cluster_count(), 2);
        assert_eq!(assignment.labels(), &[0, 1]);
    }

    #[test]
    fn single_cluster_assigns_zero_everywhere() {
        let values = array![[-1.0, 0.5], [1.0, 2.0], [0.3, -0.7]];
        let assignment = group_rows(&values, &params(1)).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 0]);
        assert_eq!(assignment.cluster_count(), 1);
    }

    #[test]
    fn separated_groups_are_recovered() {
        let values = array![
            [-1.0, -1.0],
            [-1.1, -0.9],
            [-0.9, -1.05],
            [5.0, 5.0],
            [5.1, 4.9],
        ];
        let assignment = group_rows(&values, &params(2)).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 0, 1, 1]);
    }

    #[test]
    fn identical_rows_need_no_fit() {
        let values = Array2::<f64>::zeros((4, 3));
        let assignment = group_rows(&values, &params(3)).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 0, 0]);
        assert_eq!(assignment.cluster_count(), 3);
    }

    #[test]
    fn fewer_distinct_rows_than_clusters_still_groups() {
        let values = array![[0.0, 1.0], [0.0, 1.0], [2.0, -1.0], [2.0, -1.0]];
        let assignment = group_rows(&values, &params(3)).unwrap();
        assert_eq!(assignment.labels(), &[0, 0, 1, 1]);
        assert!(assignment.labels().iter().all(|&l| l < assignment.cluster_count()));
    }

    #[test]
    fn same_seed_gives_same_labels() {
        let values = array![
            [0.1, 0.3],
            [2.0, 1.0],
            [-1.0, 0.4],
            [0.7, -2.0],
            [1.5, 1.2],
            [-0.8, -0.1],
        ];
        let first = group_rows(&values, &params(3)).unwrap();
        let second = group_rows(&values, &params(3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_matrix_is_rejected() {
        let values = Array2::<f64>::zeros((0, 4));
        assert!(matches!(
            group_rows(&values, &params(2)),
            Err(GroupError::EmptyMatrix)
        ));
    }

    #[test]
    fn labels_follow_first_appearance() {
        assert_eq!(canonical_labels([2, 2, 0, 1, 0].into_iter()), vec![0, 0, 1, 2, 1]);
    }
}
