use std::ops::{Index, IndexMut};

/// SquareMatrix is implemented as a single dimensional vector of f64s.
/// This implementation is row-major.
/// The layers only ever consume square matrices, so squareness is enforced
/// by construction instead of being re-checked on every call.
#[derive(PartialEq, Debug, Clone)]
pub struct SquareMatrix {
    size: usize,
    values: Vec<f64>,
}

impl SquareMatrix {
    /// Creates a size x size matrix where every element is zero.
    pub fn zeroed(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0f64; size * size],
        }
    }

    /// Create a matrix from a vector. The vector length must be size².
    pub fn from_vec(size: usize, values: Vec<f64>) -> Self {
        assert_eq!(size * size, values.len());

        Self { size, values }
    }

    /// Side length of the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of elements (size²).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns index in the backing vec given row and column.
    fn index_for(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < self.size);
        debug_assert!(column < self.size);

        row * self.size + column
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[self.index_for(row, column)]
    }

    pub fn set(&mut self, row: usize, column: usize, value: f64) {
        let index = self.index_for(row, column);
        self.values[index] = value;
    }

    /// Resets every element back to zero. Used by the layers to clear
    /// gradient accumulators at the start of each backpropagation.
    pub fn fill_zero(&mut self) {
        self.values.fill(0.0);
    }

    /// Read-only view of the backing row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;

    fn index(&self, (row, column): (usize, usize)) -> &f64 {
        &self.values[self.index_for(row, column)]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (row, column): (usize, usize)) -> &mut f64 {
        let index = self.index_for(row, column);
        &mut self.values[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed() {
        let m = SquareMatrix::zeroed(3);

        assert_eq!(m.size(), 3);
        assert_eq!(m.len(), 9);
        assert!(m.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_from_vec_row_major() {
        let m = SquareMatrix::from_vec(2, vec![1.0, 2.0, 3.0, 4.0]);

        assert_eq!(m.get(0, 0), 1.0);
        assert_eq!(m.get(0, 1), 2.0);
        assert_eq!(m.get(1, 0), 3.0);
        assert_eq!(m.get(1, 1), 4.0);
    }

    #[test]
    #[should_panic]
    fn test_from_vec_wrong_length_panics() {
        let _ = SquareMatrix::from_vec(2, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_index_and_fill_zero() {
        let mut m = SquareMatrix::zeroed(2);
        m[(1, 0)] = 7.5;

        assert_eq!(m[(1, 0)], 7.5);

        m.fill_zero();
        assert_eq!(m[(1, 0)], 0.0);
    }
}
