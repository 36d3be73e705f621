// ---------------------------------------------------------------------------
// CorrelationMatrix: square, finite, row-major score matrix
// ---------------------------------------------------------------------------
//
// Row/column i lines up with catalog index i. Symmetry is not required and
// nothing is assumed about the diagonal.
// ---------------------------------------------------------------------------

use crate::error::RankError;

#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
	size: usize,
	values: Vec<f64>,
}

impl CorrelationMatrix {
	/// Build from nested rows. Every row must have `rows.len()` finite values.
	pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RankError> {
		let size = rows.len();
		let mut values = Vec::with_capacity(size * size);
		for (row, data) in rows.into_iter().enumerate() {
			if data.len() != size {
				return Err(RankError::NotSquare {
					row,
					len: data.len(),
					expected: size,
				});
			}
			values.extend(data);
		}
		Self::from_row_major(size, values)
	}

	/// Build from a flat row-major buffer of `size * size` values.
	pub fn from_row_major(size: usize, values: Vec<f64>) -> Result<Self, RankError> {
		if size.checked_mul(size) != Some(values.len()) {
			return Err(RankError::NotSquare {
				row: values.len() / size.max(1),
				len: values.len() % size.max(1),
				expected: size,
			});
		}
		if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
			return Err(RankError::NonFinite {
				row: pos / size,
				col: pos % size,
			});
		}
		Ok(Self { size, values })
	}

	pub fn size(&self) -> usize {
		self.size
	}

	pub fn is_empty(&self) -> bool {
		self.size == 0
	}

	pub fn row(&self, i: usize) -> Result<&[f64], RankError> {
		self.check_index(i)?;
		Ok(&self.values[i * self.size..(i + 1) * self.size])
	}

	pub fn get(&self, i: usize, j: usize) -> Result<f64, RankError> {
		self.check_index(j)?;
		Ok(self.row(i)?[j])
	}

	pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
		// chunks_exact panics on a zero chunk size
		self.values.chunks_exact(self.size.max(1))
	}

	pub fn check_index(&self, i: usize) -> Result<(), RankError> {
		if i >= self.size {
			return Err(RankError::IndexOutOfBounds {
				index: i,
				len: self.size,
			});
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> CorrelationMatrix {
		CorrelationMatrix::from_rows(vec![
			vec![0.0, 0.2, 0.8],
			vec![0.2, 0.0, 0.5],
			vec![0.8, 0.5, 0.0],
		])
		.unwrap()
	}

	#[test]
	fn rows_are_addressable() {
		let m = sample();
		assert_eq!(m.size(), 3);
		assert_eq!(m.row(1).unwrap(), &[0.2, 0.0, 0.5]);
		assert!((m.get(2, 1).unwrap() - 0.5).abs() < 1e-10);
		assert_eq!(m.rows().count(), 3);
	}

	#[test]
	fn rejects_ragged_rows() {
		let err = CorrelationMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
		assert!(matches!(
			err,
			RankError::NotSquare {
				row: 1,
				len: 1,
				expected: 2
			}
		));
	}

	#[test]
	fn rejects_non_finite_values() {
		let err = CorrelationMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![1.0, 0.0]])
			.unwrap_err();
		assert!(matches!(err, RankError::NonFinite { row: 0, col: 1 }));
	}

	#[test]
	fn rejects_short_flat_buffer() {
		assert!(CorrelationMatrix::from_row_major(2, vec![0.0; 3]).is_err());
	}

	#[test]
	fn rejects_size_whose_square_overflows() {
		assert!(matches!(
			CorrelationMatrix::from_row_major(1 << 32, Vec::new()),
			Err(RankError::NotSquare { row: 0, len: 0, .. })
		));
	}

	#[test]
	fn out_of_range_row_is_error() {
		let m = sample();
		assert!(matches!(
			m.row(3),
			Err(RankError::IndexOutOfBounds { index: 3, len: 3 })
		));
		assert!(m.get(0, 9).is_err());
	}

	#[test]
	fn empty_matrix_has_no_rows() {
		let m = CorrelationMatrix::from_rows(vec![]).unwrap();
		assert!(m.is_empty());
		assert_eq!(m.rows().count(), 0);
	}
}
