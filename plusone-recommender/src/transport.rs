use std::io::{self, Write};

use serde::Serialize;

use crate::error::RankError;
use crate::protocol::{INVALID_PARAMS, RANK_ERROR};

#[derive(Serialize)]
struct JsonRpcResponse<'a> {
	jsonrpc: &'a str,
	id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	result: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<JsonRpcErrorBody>,
}

#[derive(Serialize)]
struct JsonRpcErrorBody {
	code: i32,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<serde_json::Value>,
}

/// NDJSON transport: one JSON-RPC 2.0 response per line on stdout.
pub struct NdjsonTransport;

impl Default for NdjsonTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl NdjsonTransport {
	pub fn new() -> Self {
		Self
	}

	pub fn write_response(&self, id: u64, result: serde_json::Value) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		});
	}

	pub fn write_error(
		&self,
		id: u64,
		code: i32,
		message: impl Into<String>,
		data: Option<serde_json::Value>,
	) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(JsonRpcErrorBody {
				code,
				message: message.into(),
				data,
			}),
		});
	}

	/// Write the outcome of a ranking method. Malformed params answer
	/// `INVALID_PARAMS`; every other failure answers `RANK_ERROR` with the
	/// machine-readable code in `data`.
	pub fn write_outcome(&self, id: u64, outcome: Result<serde_json::Value, RankError>) {
		match outcome {
			Ok(value) => self.write_response(id, value),
			Err(e) => {
				let code = match e {
					RankError::Serialization(_) => INVALID_PARAMS,
					_ => RANK_ERROR,
				};
				tracing::debug!(id, rank_code = e.code(), "Request failed: {}", e);
				self.write_error(id, code, e.to_string(), Some(e.to_json_rpc_error()));
			}
		}
	}

	fn write_line(&self, value: &impl Serialize) {
		let mut stdout = io::stdout().lock();
		if let Err(e) = serde_json::to_writer(&mut stdout, value) {
			tracing::error!("Failed to serialize: {}", e);
			return;
		}
		let _ = writeln!(stdout);
		let _ = stdout.flush();
	}
}
