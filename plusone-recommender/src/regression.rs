// ---------------------------------------------------------------------------
// First-degree least-squares fit used by the length-bias correction
// ---------------------------------------------------------------------------

use crate::error::RankError;

/// A fitted line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
	pub slope: f64,
	pub intercept: f64,
}

impl LinearFit {
	/// Ordinary least squares over paired samples.
	///
	/// When every `x` is equal the least-squares line passes through
	/// `mean(y)` at each sample, so the fit is flat at that value.
	pub fn fit(xs: &[f64], ys: &[f64]) -> Result<Self, RankError> {
		let n = xs.len().min(ys.len());
		if n == 0 {
			return Err(RankError::EmptyRegression);
		}
		let (xs, ys) = (&xs[..n], &ys[..n]);

		let mean_x = xs.iter().sum::<f64>() / n as f64;
		let mean_y = ys.iter().sum::<f64>() / n as f64;

		let mut sxx = 0.0;
		let mut sxy = 0.0;
		for (&x, &y) in xs.iter().zip(ys) {
			let dx = x - mean_x;
			sxx += dx * dx;
			sxy += dx * (y - mean_y);
		}

		if sxx == 0.0 {
			return Ok(Self {
				slope: 0.0,
				intercept: mean_y,
			});
		}

		let slope = sxy / sxx;
		Ok(Self {
			slope,
			intercept: mean_y - slope * mean_x,
		})
	}

	pub fn evaluate(&self, x: f64) -> f64 {
		self.slope * x + self.intercept
	}
}
