use crate::matrix::CorrelationMatrix;

/// Mean of row `i` with the self position counted as zero, divided by the
/// full row length.
pub fn mean_correlation(row: &[f64], i: usize) -> f64 {
	if row.is_empty() {
		return 0.0;
	}
	let sum: f64 = row
		.iter()
		.enumerate()
		.map(|(j, &v)| if j == i { 0.0 } else { v })
		.sum();
	sum / row.len() as f64
}

/// Every catalog index ordered by mean correlation to all others, highest
/// first. Equal means keep index order.
pub fn most_correlated(matrix: &CorrelationMatrix) -> Vec<usize> {
	let mut means: Vec<(usize, f64)> = matrix
		.rows()
		.enumerate()
		.map(|(i, row)| (i, mean_correlation(row, i)))
		.collect();
	means.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
	means.into_iter().map(|(i, _)| i).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn three_entry_ranking() {
		let m = CorrelationMatrix::from_rows(vec![
			vec![0.0, 0.2, 0.8],
			vec![0.2, 0.0, 0.5],
			vec![0.8, 0.5, 0.0],
		])
		.unwrap();
		assert_eq!(most_correlated(&m), vec![2, 0, 1]);
	}

	#[test]
	fn self_value_contributes_zero_but_counts_in_length() {
		let row = [5.0, 0.3, 0.6];
		assert!((mean_correlation(&row, 0) - 0.3).abs() < 1e-10);
		assert!((mean_correlation(&row, 2) - (5.3 / 3.0)).abs() < 1e-10);
	}

	#[test]
	fn large_diagonal_does_not_affect_order() {
		let m = CorrelationMatrix::from_rows(vec![
			vec![100.0, 0.1, 0.1],
			vec![0.9, 0.0, 0.9],
			vec![0.5, 0.5, -50.0],
		])
		.unwrap();
		assert_eq!(most_correlated(&m), vec![1, 2, 0]);
	}

	#[test]
	fn is_a_permutation() {
		let n = 7;
		let rows: Vec<Vec<f64>> = (0..n)
			.map(|i| (0..n).map(|j| ((i * 31 + j * 17) % 11) as f64 / 10.0).collect())
			.collect();
		let m = CorrelationMatrix::from_rows(rows).unwrap();
		let mut result = most_correlated(&m);
		assert_eq!(result.len(), n);
		result.sort();
		assert_eq!(result, (0..n).collect::<Vec<_>>());
	}

	#[test]
	fn ties_keep_index_order() {
		let m = CorrelationMatrix::from_rows(vec![
			vec![0.0, 0.5, 0.25],
			vec![0.25, 0.0, 0.5],
			vec![1.0, 1.0, 0.0],
		])
		.unwrap();
		assert_eq!(most_correlated(&m), vec![2, 0, 1]);
	}

	#[test]
	fn empty_matrix() {
		let m = CorrelationMatrix::from_rows(vec![]).unwrap();
		assert!(most_correlated(&m).is_empty());
	}
}
