// ---------------------------------------------------------------------------
// Preference recommender: affinity to liked entries, length-bias corrected
// ---------------------------------------------------------------------------
//
// Pure functions over a borrowed matrix and catalog. Each candidate row is
// min-max rescaled so that globally well-correlated entries do not dominate,
// scored by its mean over the liked columns, then optionally divided by a
// word-count trend fitted over the first ranking.
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use crate::catalog::EntryCatalog;
use crate::error::RankError;
use crate::matrix::CorrelationMatrix;
use crate::regression::LinearFit;

// ---------------------------------------------------------------------------
// Base pass
// ---------------------------------------------------------------------------

/// Shift `row` so its minimum is zero, then divide by the shifted maximum.
///
/// `i` only labels the error for a row that cannot be rescaled.
pub fn normalize_row(row: &[f64], i: usize) -> Result<Vec<f64>, RankError> {
	let min = row.iter().copied().fold(f64::INFINITY, f64::min);
	let mut shifted: Vec<f64> = row.iter().map(|v| v - min).collect();
	let max = shifted.iter().copied().fold(f64::NEG_INFINITY, f64::max);
	if !max.is_finite() {
		return Err(RankError::NormalizationOverflow(i));
	}
	if max == 0.0 {
		return Err(RankError::ConstantRow(i));
	}
	for v in &mut shifted {
		*v /= max;
	}
	Ok(shifted)
}

/// Score every non-completed entry by its mean normalized correlation to
/// the liked entries, highest first. Equal scores keep index order.
pub fn base_scores(
	liked: &[usize],
	completed: &HashSet<usize>,
	matrix: &CorrelationMatrix,
) -> Result<Vec<(usize, f64)>, RankError> {
	if liked.is_empty() {
		return Err(RankError::EmptyLiked);
	}

	let mut results = Vec::with_capacity(matrix.size());
	for (i, row) in matrix.rows().enumerate() {
		if completed.contains(&i) {
			continue;
		}
		let row = normalize_row(row, i)?;
		let sum: f64 = liked.iter().map(|&l| row[l]).sum();
		results.push((i, sum / liked.len() as f64));
	}
	results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
	Ok(results)
}

// ---------------------------------------------------------------------------
// Recommendation
// ---------------------------------------------------------------------------

/// Rank every entry not in `completed` by affinity to `liked`.
///
/// With `apply_length_bias`, a line is fitted to (word count, score) over
/// the first ranking and each position's score in a recomputed ranking is
/// divided by the line's value at that position before re-sorting.
pub fn recommend(
	liked: &[usize],
	completed: &[usize],
	matrix: &CorrelationMatrix,
	catalog: &EntryCatalog,
	apply_length_bias: bool,
) -> Result<Vec<usize>, RankError> {
	if matrix.size() != catalog.len() {
		return Err(RankError::DimensionMismatch {
			matrix: matrix.size(),
			catalog: catalog.len(),
		});
	}
	for &i in liked.iter().chain(completed) {
		matrix.check_index(i)?;
	}

	let completed: HashSet<usize> = completed.iter().copied().collect();
	let mut results = base_scores(liked, &completed, matrix)?;

	if apply_length_bias {
		let word_counts = catalog.word_counts();
		let xs: Vec<f64> = results.iter().map(|&(i, _)| word_counts[i] as f64).collect();
		let ys: Vec<f64> = results.iter().map(|&(_, score)| score).collect();
		let fit = LinearFit::fit(&xs, &ys)?;
		let multipliers: Vec<f64> = xs.iter().map(|&x| fit.evaluate(x)).collect();

		results = base_scores(liked, &completed, matrix)?;
		for (pos, (entry, multiplier)) in results.iter_mut().zip(&multipliers).enumerate() {
			if *multiplier == 0.0 {
				return Err(RankError::ZeroMultiplier(pos));
			}
			entry.1 /= multiplier;
		}
		results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

		tracing::debug!(
			slope = fit.slope,
			intercept = fit.intercept,
			candidates = results.len(),
			"Applied length-bias correction"
		);
	}

	Ok(results.into_iter().map(|(i, _)| i).collect())
}

/// The tail of a recommendation ranking: up to `count` least-affine entries,
/// in ranking order.
pub fn not_recommended(ranked: &[usize], count: usize) -> &[usize] {
	&ranked[ranked.len().saturating_sub(count)..]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
