use std::path::PathBuf;

use clap::Parser;

use crate::server::ServerConfig;

#[derive(Parser, Debug)]
#[command(
	name = "plusone-recommender",
	about = "Correlation-matrix ranking engine over JSON-RPC 2.0 / NDJSON stdio"
)]
pub struct CliArgs {
	/// Catalog JSON (optionally gzipped) to load at startup
	#[arg(long, env = "PLUSONE_CATALOG", requires = "matrix")]
	pub catalog: Option<PathBuf>,

	/// Correlation matrix (.npy or JSON, optionally gzipped) to load at startup
	#[arg(long, env = "PLUSONE_MATRIX", requires = "catalog")]
	pub matrix: Option<PathBuf>,

	/// Similar entries logged next to each ranked entry
	#[arg(long, default_value = "3")]
	pub similar_count: usize,

	/// Result count for rank/similar when the request gives none
	#[arg(long, default_value = "10")]
	pub default_count: usize,

	/// Disable the word-count correction unless a request asks for it
	#[arg(long)]
	pub no_length_bias: bool,

	/// Log level (trace, debug, info, warn, error)
	#[arg(long, default_value = "info", env = "PLUSONE_LOG_LEVEL")]
	pub log_level: String,
}

impl CliArgs {
	pub fn server_config(&self) -> ServerConfig {
		ServerConfig {
			similar_count: self.similar_count,
			default_count: self.default_count,
			length_bias: !self.no_length_bias,
		}
	}

	/// Both startup paths, when given.
	pub fn context_paths(&self) -> Option<(PathBuf, PathBuf)> {
		match (&self.catalog, &self.matrix) {
			(Some(c), Some(m)) => Some((c.clone(), m.clone())),
			_ => None,
		}
	}
}
