use std::path::Path;

use crate::catalog::EntryCatalog;
use crate::error::RankError;
use crate::loader;
use crate::matrix::CorrelationMatrix;

/// An immutable catalog + matrix pair, aligned by index.
pub struct RankingContext {
	catalog: EntryCatalog,
	matrix: CorrelationMatrix,
}

impl RankingContext {
	pub fn new(catalog: EntryCatalog, matrix: CorrelationMatrix) -> Result<Self, RankError> {
		if matrix.size() != catalog.len() {
			return Err(RankError::DimensionMismatch {
				matrix: matrix.size(),
				catalog: catalog.len(),
			});
		}
		Ok(Self { catalog, matrix })
	}

	/// Load both inputs from disk. Fails without a context if either does.
	pub fn load(catalog_path: &Path, matrix_path: &Path) -> Result<Self, RankError> {
		let catalog = EntryCatalog::new(loader::load_catalog(catalog_path)?)?;
		let matrix = loader::load_matrix(matrix_path)?;
		Self::new(catalog, matrix)
	}

	pub fn catalog(&self) -> &EntryCatalog {
		&self.catalog
	}

	pub fn matrix(&self) -> &CorrelationMatrix {
		&self.matrix
	}
}
