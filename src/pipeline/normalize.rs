//! Per-column standardization with a single fit over the whole batch.

use ndarray::{Array2, Axis};
use thiserror::Error;

use super::table::DescriptorTable;

/// Standard deviations at or below this are treated as zero variance.
const DEGENERATE_STD: f64 = 1e-12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Cannot standardize an empty descriptor table")]
    EmptyTable,
}

/// Descriptor matrix rescaled to zero mean and unit variance per column.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedMatrix {
    values: Array2<f64>,
    means: Vec<f64>,
    std_devs: Vec<f64>,
    column_names: Vec<&'static str>,
}

impl StandardizedMatrix {
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Column means of the raw values.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Population standard deviations of the raw values.
    pub fn std_devs(&self) -> &[f64] {
        &self.std_devs
    }

    pub fn column_names(&self) -> &[&'static str] {
        &self.column_names
    }

    pub fn rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn columns(&self) -> usize {
        self.values.ncols()
    }
}

/// Standardize every descriptor column of `table`.
pub fn standardize(table: &DescriptorTable) -> Result<StandardizedMatrix, NormalizeError> {
    let (values, means, std_devs) = standardize_columns(table.feature_matrix())?;
    Ok(StandardizedMatrix {
        values,
        means,
        std_devs,
        column_names: table.column_names(),
    })
}

/// Rescale columns in place to `(x - mean) / std`; zero-variance columns become 0.
pub(crate) fn standardize_columns(
    mut features: Array2<f64>,
) -> Result<(Array2<f64>, Vec<f64>, Vec<f64>), NormalizeError> {
    let Some(means) = features.mean_axis(Axis(0)) else {
        return Err(NormalizeError::EmptyTable);
    };
    let std_devs = features.std_axis(Axis(0), 0.0);
    for ((mut column, &mean), &std) in features
        .axis_iter_mut(Axis(1))
        .zip(means.iter())
        .zip(std_devs.iter())
    {
        if std.is_finite() && std > DEGENERATE_STD {
            column.mapv_inplace(|value| (value - mean) / std);
        } else {
            column.fill(0.0);
        }
    }
    Ok((features, means.to_vec(), std_devs.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AudioDescriptor;

    fn descriptor(name: &str, values: [f64; 4]) -> AudioDescriptor {
        AudioDescriptor {
            filename: name.into(),
            tempo: values[0],
            brightness: values[1],
            energy: values[2],
            percussiveness: values[3],
        }
    }

    #[test]
    fn columns_have_zero_mean_and_unit_std() {
        let table = DescriptorTable::from_rows(vec![
            descriptor("a", [60.0, 500.0, 0.1, 0.01]),
            descriptor("b", [90.0, 1500.0, 0.3, 0.05]),
            descriptor("c", [120.0, 2500.0, 0.2, 0.2]),
            descriptor("d", [180.0, 4000.0, 0.9, 0.4]),
        ]);
        let standardized = standardize(&table).unwrap();
        let values = standardized.values();
        for column in values.axis_iter(Axis(1)) {
            let n = column.len() as f64;
            let mean = column.sum() / n;
            let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-12, "mean {mean}");
            assert!((var.sqrt() - 1.0).abs() < 1e-12, "std {}", var.sqrt());
        }
        assert!((standardized.means()[0] - 112.5).abs() < 1e-12);
        assert_eq!(standardized.column_names()[3], "percussiveness");
    }

    #[test]
    fn constant_columns_become_zero() {
        let table = DescriptorTable::from_rows(vec![
            descriptor("a", [120.0, 500.0, 0.1, 0.02]),
            descriptor("b", [120.0, 900.0, 0.1, 0.02]),
            descriptor("c", [120.0, 700.0, 0.1, 0.02]),
        ]);
        let standardized = standardize(&table).unwrap();
        let values = standardized.values();
        for col in [0, 2, 3] {
            assert!(values.column(col).iter().all(|&v| v == 0.0));
        }
        assert!(values.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn single_row_standardizes_to_zeros() {
        let table = DescriptorTable::from_rows(vec![descriptor("a", [99.0, 1.0, 2.0, 0.5])]);
        let standardized = standardize(&table).unwrap();
        assert_eq!(standardized.rows(), 1);
        assert!(standardized.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(
            standardize(&DescriptorTable::default()),
            Err(NormalizeError::EmptyTable)
        );
    }
}
