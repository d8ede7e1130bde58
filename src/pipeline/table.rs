use ndarray::Array2;

use crate::analysis::{AudioDescriptor, DESCRIPTOR_COLUMNS, DESCRIPTOR_COUNT, descriptor_names};

/// Successfully analysed files in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorTable {
    rows: Vec<AudioDescriptor>,
}

impl DescriptorTable {
    pub fn from_rows(rows: Vec<AudioDescriptor>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[AudioDescriptor] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Numeric column names in matrix order.
    pub fn column_names(&self) -> Vec<&'static str> {
        descriptor_names()
    }

    /// Raw descriptor values as an `n x columns` matrix.
    pub fn feature_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), DESCRIPTOR_COUNT), |(row, col)| {
            (DESCRIPTOR_COLUMNS[col].value)(&self.rows[row])
        })
    }
}

impl FromIterator<AudioDescriptor> for DescriptorTable {
    fn from_iter<I: IntoIterator<Item = AudioDescriptor>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}
