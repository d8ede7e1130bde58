//! Two-axis principal component projection with descriptor loadings.
//!
//! The covariance of the standardized matrix is diagonalised with Jacobi
//! rotations, which is exact and fully deterministic for the small symmetric
//! matrices involved. Loadings are component coefficients scaled by the
//! square root of the explained variance of their axis.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::normalize::StandardizedMatrix;

/// Number of output axes.
pub const AXIS_COUNT: usize = 2;

/// Eigenvalues at or below this fraction of the total variance mark an unused axis.
const RELATIVE_EIGENVALUE_FLOOR: f64 = 1e-10;
const JACOBI_TOLERANCE: f64 = 1e-14;
/// Magnitudes within this relative distance of each other count as equal.
const TIE_TOLERANCE: f64 = 1e-9;

/// Coordinates of every row on two axes plus the axis interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    coordinates: Array2<f64>,
    loadings: Array2<f64>,
    explained_variance: [f64; AXIS_COUNT],
    dominant: [Option<usize>; AXIS_COUNT],
    column_names: Vec<&'static str>,
}

impl ProjectionResult {
    pub fn len(&self) -> usize {
        self.coordinates.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.nrows() == 0
    }

    /// `n x 2` embedding.
    pub fn coordinates(&self) -> &Array2<f64> {
        &self.coordinates
    }

    pub fn pca_1(&self) -> ArrayView1<'_, f64> {
        self.coordinates.column(0)
    }

    pub fn pca_2(&self) -> ArrayView1<'_, f64> {
        self.coordinates.column(1)
    }

    /// `columns x 2` loading table.
    pub fn loadings(&self) -> &Array2<f64> {
        &self.loadings
    }

    /// Variance captured by each axis; zero for unused axes.
    pub fn explained_variance(&self) -> [f64; AXIS_COUNT] {
        self.explained_variance
    }

    pub fn column_names(&self) -> &[&'static str] {
        &self.column_names
    }

    /// Column index with the largest absolute loading on `axis` (0 or 1).
    pub fn dominant_index(&self, axis: usize) -> Option<usize> {
        self.dominant[axis]
    }

    /// Name of the descriptor dominating `axis` (0 or 1).
    pub fn dominant_descriptor(&self, axis: usize) -> Option<&'static str> {
        self.dominant[axis].map(|index| self.column_names[index])
    }

    /// Display label for `axis` (0 or 1), numbered from 1.
    pub fn axis_label(&self, axis: usize) -> String {
        match self.dominant_descriptor(axis) {
            Some(name) => format!("Axis {} (Dominant: {name})", axis + 1),
            None => format!("Axis {} (Composite)", axis + 1),
        }
    }

    pub fn axis_labels(&self) -> [String; AXIS_COUNT] {
        [self.axis_label(0), self.axis_label(1)]
    }
}

/// Project `matrix` onto its two highest-variance orthogonal axes.
pub fn reduce(matrix: &StandardizedMatrix) -> ProjectionResult {
    let values = matrix.values();
    let (n, d) = values.dim();
    let mut coordinates = Array2::<f64>::zeros((n, AXIS_COUNT));
    let mut loadings = Array2::<f64>::zeros((d, AXIS_COUNT));
    let mut explained_variance = [0.0; AXIS_COUNT];
    let mut dominant = [None; AXIS_COUNT];

    if n >= 2 && d >= 1 {
        let covariance = covariance(values);
        let total_variance: f64 = covariance.diag().sum();
        let (eigenvalues, eigenvectors) = jacobi_eigen(&covariance, 64 * d * d);
        let floor = RELATIVE_EIGENVALUE_FLOOR * total_variance.max(f64::MIN_POSITIVE);

        for (axis, &component) in sorted_components(&eigenvalues)
            .iter()
            .take(AXIS_COUNT)
            .enumerate()
        {
            let eigenvalue = eigenvalues[component];
            if eigenvalue.is_nan() || eigenvalue <= floor {
                continue;
            }
            let mut vector = eigenvectors.column(component).to_owned();
            orient(&mut vector);
            coordinates.column_mut(axis).assign(&values.dot(&vector));
            let scale = eigenvalue.sqrt();
            loadings
                .column_mut(axis)
                .assign(&vector.mapv(|coefficient| coefficient * scale));
            explained_variance[axis] = eigenvalue;
            dominant[axis] = dominant_column(loadings.column(axis));
        }
    }

    ProjectionResult {
        coordinates,
        loadings,
        explained_variance,
        dominant,
        column_names: matrix.column_names().to_vec(),
    }
}

/// Sample covariance with divisor `n - 1`; callers guarantee `n >= 2`.
fn covariance(values: &Array2<f64>) -> Array2<f64> {
    let n = values.nrows() as f64;
    let centred = match values.mean_axis(Axis(0)) {
        Some(mean) => values - &mean,
        None => values.clone(),
    };
    centred.t().dot(&centred) / (n - 1.0)
}

/// Component indices by descending eigenvalue, ties by ascending index.
fn sorted_components(eigenvalues: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eigenvalues[b].total_cmp(&eigenvalues[a]).then(a.cmp(&b)));
    order
}

/// Whether `magnitude` beats `top` by more than rounding noise.
fn clearly_greater(magnitude: f64, top: f64) -> bool {
    magnitude > top * (1.0 + TIE_TOLERANCE)
}

/// Flip the vector so its largest-magnitude coefficient is positive.
fn orient(vector: &mut Array1<f64>) {
    let mut pivot = 0.0_f64;
    for &value in vector.iter() {
        if clearly_greater(value.abs(), pivot.abs()) {
            pivot = value;
        }
    }
    if pivot < 0.0 {
        vector.mapv_inplace(|value| -value);
    }
}

/// First index of the maximum absolute value; `None` when all are zero.
/// Values equal up to rounding keep the earlier index.
fn dominant_column(loadings: ArrayView1<'_, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, value) in loadings.iter().enumerate() {
        let magnitude = value.abs();
        if magnitude > 0.0 && best.is_none_or(|(_, top)| clearly_greater(magnitude, top)) {
            best = Some((index, magnitude));
        }
    }
    best.map(|(index, _)| index)
}

/// Jacobi eigenvalue algorithm for real symmetric matrices.
/// Returns eigenvalues and the matching eigenvectors as columns.
fn jacobi_eigen(matrix: &Array2<f64>, max_rotations: usize) -> (Vec<f64>, Array2<f64>) {
    let n = matrix.nrows();
    let mut d = matrix.clone();
    let mut v = Array2::<f64>::eye(n);
    let scale = matrix.iter().map(|x| x * x).sum::<f64>().sqrt();

    for _ in 0..max_rotations {
        let mut max_val = 0.0;
        let (mut p, mut q) = (0, 0);
        for i in 0..n {
            for j in (i + 1)..n {
                let val = d[[i, j]].abs();
                if val > max_val {
                    max_val = val;
                    p = i;
                    q = j;
                }
            }
        }
        if max_val <= JACOBI_TOLERANCE * scale.max(f64::MIN_POSITIVE) {
            break;
        }

        let theta = 0.5 * (2.0 * d[[p, q]]).atan2(d[[q, q]] - d[[p, p]]);
        let (s, c) = theta.sin_cos();
        let d_pp = d[[p, p]];
        let d_qq = d[[q, q]];
        let d_pq = d[[p, q]];

        d[[p, p]] = c * c * d_pp + s * s * d_qq - 2.0 * s * c * d_pq;
        d[[q, q]] = s * s * d_pp + c * c * d_qq + 2.0 * s * c * d_pq;
        d[[p, q]] = 0.0;
        d[[q, p]] = 0.0;
        for k in 0..n {
            if k != p && k != q {
                let d_pk = d[[p, k]];
                let d_qk = d[[q, k]];
                d[[p, k]] = c * d_pk - s * d_qk;
                d[[k, p]] = d[[p, k]];
                d[[q, k]] = s * d_pk + c * d_qk;
                d[[k, q]] = d[[q, k]];
            }
        }
        for k in 0..n {
            let v_kp = v[[k, p]];
            let v_kq = v[[k, q]];
            v[[k, p]] = c * v_kp - s * v_kq;
            v[[k, q]] = s * v_kp + c * v_kq;
        }
    }

    ((0..n).map(|i| d[[i, i]]).collect(), v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AudioDescriptor;
    use crate::pipeline::normalize::standardize;
    use crate::pipeline::table::DescriptorTable;
    use ndarray::array;

    fn table(rows: &[[f64; 4]]) -> DescriptorTable {
        rows.iter()
            .enumerate()
            .map(|(i, values)| AudioDescriptor {
                filename: format!("{i}.wav"),
                tempo: values[0],
                brightness: values[1],
                energy: values[2],
                percussiveness: values[3],
            })
            .collect()
    }

    fn project(rows: &[[f64; 4]]) -> ProjectionResult {
        reduce(&standardize(&table(rows)).unwrap())
    }

    #[test]
    fn jacobi_recovers_known_eigenpairs() {
        let matrix = array![[2.0, 1.0], [1.0, 2.0]];
        let (values, vectors) = jacobi_eigen(&matrix, 100);
        let order = sorted_components(&values);
        assert!((values[order[0]] - 3.0).abs() < 1e-12);
        assert!((values[order[1]] - 1.0).abs() < 1e-12);
        let top = vectors.column(order[0]);
        assert!((top[0].abs() - top[1].abs()).abs() < 1e-12);
        let product = matrix.dot(&top);
        assert!((product[0] - 3.0 * top[0]).abs() < 1e-12);
    }

    #[test]
    fn dominant_descriptor_follows_engineered_variance() {
        // Brightness is the shared factor behind energy and percussiveness,
        // which each add their own orthogonal component. Tempo is independent.
        let w1 = [1.0, 1.0, 1.0, 1.0, -1.0, -1.0, -1.0, -1.0];
        let w2 = [1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0];
        let w3 = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let w4 = [1.0, -1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0];
        let rows: Vec<[f64; 4]> = (0..8)
            .map(|i| {
                [
                    120.0 + 10.0 * w4[i],
                    3000.0 + 1000.0 * w1[i],
                    0.5 + 0.1 * w1[i] + 0.05 * w2[i],
                    0.2 + 0.04 * w1[i] + 0.02 * w3[i],
                ]
            })
            .collect();
        let projection = project(&rows);
        assert_eq!(projection.len(), 8);
        assert_eq!(projection.coordinates().ncols(), 2);
        assert_eq!(projection.dominant_descriptor(0), Some("brightness"));
        assert_eq!(projection.axis_label(0), "Axis 1 (Dominant: brightness)");
        assert_eq!(projection.dominant_descriptor(1), Some("tempo"));
        let variance = projection.explained_variance();
        assert!(variance[0] > variance[1]);
    }

    #[test]
    fn equal_loadings_from_reduce_name_the_first_column() {
        let two = project(&[[60.0, 500.0, 0.1, 0.01], [180.0, 5000.0, 0.9, 0.4]]);
        assert_eq!(two.axis_label(0), "Axis 1 (Dominant: tempo)");

        let proportional = project(&[
            [1.0, 10.0, 0.1, 0.01],
            [2.0, 20.0, 0.2, 0.02],
            [3.0, 30.0, 0.3, 0.03],
        ]);
        assert_eq!(proportional.dominant_descriptor(0), Some("tempo"));
        assert_eq!(proportional.axis_label(1), "Axis 2 (Composite)");
    }

    #[test]
    fn single_dominant_column_names_the_axis() {
        // Only tempo varies, every other column is constant.
        let rows = [
            [60.0, 500.0, 0.1, 0.01],
            [90.0, 500.0, 0.1, 0.01],
            [150.0, 500.0, 0.1, 0.01],
            [180.0, 500.0, 0.1, 0.01],
        ];
        let projection = project(&rows);
        assert_eq!(projection.dominant_descriptor(0), Some("tempo"));
        assert_eq!(projection.axis_label(0), "Axis 1 (Dominant: tempo)");
        assert_eq!(projection.axis_label(1), "Axis 2 (Composite)");
        assert!(projection.pca_2().iter().all(|&v| v == 0.0));
        // Positive orientation: the largest tempo has the largest coordinate.
        let pca_1 = projection.pca_1();
        assert!(pca_1[3] > pca_1[0]);
    }

    #[test]
    fn one_and_two_rows_fall_back_deterministically() {
        let one = project(&[[120.0, 1000.0, 0.2, 0.1]]);
        assert_eq!(one.coordinates(), &Array2::<f64>::zeros((1, 2)));
        assert_eq!(
            one.axis_labels(),
            ["Axis 1 (Composite)".to_string(), "Axis 2 (Composite)".to_string()]
        );

        let two = project(&[[60.0, 500.0, 0.1, 0.01], [180.0, 5000.0, 0.9, 0.4]]);
        assert_eq!(two.coordinates().dim(), (2, 2));
        assert!(two.pca_2().iter().all(|&v| v == 0.0));
        assert!(two.coordinates().iter().all(|v| v.is_finite()));
        assert!(two.pca_1()[0] != 0.0);
    }

    #[test]
    fn equal_loadings_break_ties_by_column_order() {
        let loadings = array![0.5, -0.5, 0.5, 0.0];
        assert_eq!(dominant_column(loadings.view()), Some(0));
        let noisy = array![1.224744871391589, 1.2247448713915887, 1.2247448713915892];
        assert_eq!(dominant_column(noisy.view()), Some(0));
        let zeros = array![0.0, 0.0];
        assert_eq!(dominant_column(zeros.view()), None);
    }

    #[test]
    fn orientation_makes_largest_coefficient_positive() {
        let mut vector = array![0.2, -0.9, 0.1];
        orient(&mut vector);
        assert_eq!(vector, array![-0.2, 0.9, -0.1]);
    }

    #[test]
    fn repeated_reduction_is_bit_identical() {
        let rows = [
            [60.0, 500.0, 0.1, 0.01],
            [61.0, 510.0, 0.11, 0.011],
            [180.0, 5000.0, 0.9, 0.4],
            [120.0, 2000.0, 0.4, 0.2],
        ];
        assert_eq!(project(&rows), project(&rows));
    }
}
