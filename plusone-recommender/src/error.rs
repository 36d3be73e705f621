use thiserror::Error;

use crate::loader::LoadError;

#[derive(Debug, Error)]
pub enum RankError {
	#[error("Context not loaded: call context/load first")]
	NotLoaded,
	#[error("Index out of bounds: {index} (size {len})")]
	IndexOutOfBounds { index: usize, len: usize },
	#[error("Dimension mismatch: matrix is {matrix}x{matrix}, catalog has {catalog} entries")]
	DimensionMismatch { matrix: usize, catalog: usize },
	#[error("Matrix is not square: row {row} has {len} values, expected {expected}")]
	NotSquare { row: usize, len: usize, expected: usize },
	#[error("Non-finite correlation at ({row}, {col})")]
	NonFinite { row: usize, col: usize },
	#[error("Duplicate entry id: {0}")]
	DuplicateId(String),
	#[error("Entry not found: {0}")]
	NotFound(String),
	#[error("Empty liked set: at least one liked entry is required")]
	EmptyLiked,
	#[error("Constant correlation row {0}: cannot normalize")]
	ConstantRow(usize),
	#[error("Correlation row {0} overflows when shifted: cannot normalize")]
	NormalizationOverflow(usize),
	#[error("Zero length-bias multiplier at ranked position {0}")]
	ZeroMultiplier(usize),
	#[error("Empty regression: no entries to fit")]
	EmptyRegression,
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Load error: {0}")]
	Load(#[from] LoadError),
	#[error("Serialization error: {0}")]
	Serialization(String),
}

impl RankError {
	pub fn code(&self) -> &str {
		match self {
			Self::NotLoaded => "RANK_NOT_LOADED",
			Self::IndexOutOfBounds { .. } => "RANK_INDEX_OUT_OF_BOUNDS",
			Self::DimensionMismatch { .. } => "RANK_DIMENSION_MISMATCH",
			Self::NotSquare { .. } => "RANK_NOT_SQUARE",
			Self::NonFinite { .. } => "RANK_NON_FINITE",
			Self::DuplicateId(_) => "RANK_DUPLICATE_ID",
			Self::NotFound(_) => "RANK_ENTRY_NOT_FOUND",
			Self::EmptyLiked => "RANK_EMPTY_LIKED",
			Self::ConstantRow(_) => "RANK_CONSTANT_ROW",
			Self::NormalizationOverflow(_) => "RANK_NORMALIZATION_OVERFLOW",
			Self::ZeroMultiplier(_) => "RANK_ZERO_MULTIPLIER",
			Self::EmptyRegression => "RANK_EMPTY_REGRESSION",
			Self::Io(_) => "RANK_IO",
			Self::Load(_) => "RANK_LOAD",
			Self::Serialization(_) => "RANK_SERIALIZATION",
		}
	}

	pub fn to_json_rpc_error(&self) -> serde_json::Value {
		serde_json::json!({
			"rankCode": self.code(),
			"message": self.to_string(),
		})
	}
}
