// ---------------------------------------------------------------------------
// Similarity ranking: one entry's row, self removed, ascending by score
// ---------------------------------------------------------------------------
//
// The row is sorted ascending, so the lowest-correlation entries come first.
// Callers present these as "similar"; this looks inverted but is kept as-is
// until the intended direction is confirmed.
// ---------------------------------------------------------------------------

use std::collections::HashSet;

use crate::error::RankError;
use crate::matrix::CorrelationMatrix;

/// Rank the other entries of row `i` by ascending correlation and return
/// up to `count` catalog indices, optionally limited to `restrict_to`.
///
/// The result never contains `i`.
pub fn similar(
	matrix: &CorrelationMatrix,
	i: usize,
	count: usize,
	restrict_to: Option<&[usize]>,
) -> Result<Vec<usize>, RankError> {
	let row = matrix.row(i)?;

	// Drop the self position; later positions shift down by one and are
	// mapped back to catalog indices here.
	let mut candidates: Vec<(usize, f64)> = row
		.iter()
		.copied()
		.enumerate()
		.filter(|(j, _)| *j != i)
		.collect();
	candidates.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

	let allowed: Option<HashSet<usize>> = restrict_to.map(|r| r.iter().copied().collect());

	Ok(candidates
		.into_iter()
		.map(|(j, _)| j)
		.filter(|j| allowed.as_ref().map_or(true, |a| a.contains(j)))
		.take(count)
		.collect())
}
