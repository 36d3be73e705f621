// ---------------------------------------------------------------------------
// RankServer: JSON-RPC dispatcher
// ---------------------------------------------------------------------------
//
// Routes incoming JSON-RPC 2.0 requests (NDJSON over stdin) to the ranking
// functions. The loaded catalog and matrix live in one immutable
// `RankingContext`; every handler borrows it and passes both explicitly
// into the core. `context/load` swaps in a fresh context.
// ---------------------------------------------------------------------------

use std::io::{self, BufRead};
use std::path::Path;

use crate::context::RankingContext;
use crate::error::RankError;
use crate::popularity::most_correlated;
use crate::protocol::*;
use crate::recommendation::{not_recommended, recommend};
use crate::similarity::similar;
use crate::transport::NdjsonTransport;
use crate::types::EntrySummary;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ServerConfig {
	/// Similar entries logged next to each ranked entry.
	pub similar_count: usize,
	/// `count` for `rank/similar` when the request omits it.
	pub default_count: usize,
	/// `lengthBias` when a recommendation request omits it.
	pub length_bias: bool,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			similar_count: 3,
			default_count: 10,
			length_bias: true,
		}
	}
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct RankServer {
	transport: NdjsonTransport,
	config: ServerConfig,
	context: Option<RankingContext>,
}

impl RankServer {
	pub fn new(transport: NdjsonTransport, config: ServerConfig) -> Self {
		Self {
			transport,
			config,
			context: None,
		}
	}

	pub fn set_context(&mut self, context: RankingContext) {
		tracing::info!(entries = context.catalog().len(), "Ranking context ready");
		self.context = Some(context);
	}

	/// Main loop: read JSON-RPC messages from stdin, dispatch to handlers.
	pub fn run(&mut self) -> Result<(), RankError> {
		let stdin = io::stdin();
		let reader = stdin.lock();

		for line_result in reader.lines() {
			let line = line_result?;
			if line.trim().is_empty() {
				continue;
			}

			let request: JsonRpcRequest = match serde_json::from_str(&line) {
				Ok(r) => r,
				Err(e) => {
					tracing::error!("Failed to parse request: {}", e);
					continue;
				}
			};

			self.dispatch(request);
		}

		Ok(())
	}

	// ── Dispatch ──────────────────────────────────────────────────────────

	fn dispatch(&mut self, req: JsonRpcRequest) {
		let id = req.id;
		match self.handle(&req.method, req.params) {
			Some(outcome) => self.transport.write_outcome(id, outcome),
			None => self.transport.write_error(
				id,
				METHOD_NOT_FOUND,
				format!("Unknown method: {}", req.method),
				None,
			),
		}
	}

	/// Run one method. `None` means the method is unknown.
	pub fn handle(
		&mut self,
		method: &str,
		params: serde_json::Value,
	) -> Option<Result<serde_json::Value, RankError>> {
		let config = self.config.clone();
		let result = match method {
			// -- Lifecycle -----------------------------------------------
			"context/load" => self.handle_load(params),

			// -- Catalog -------------------------------------------------
			"catalog/size" => self.with_context(|c| {
				Ok(serde_json::json!({ "count": c.catalog().len() }))
			}),
			"catalog/related" => self.with_context(|c| handle_related(c, params)),

			// -- Ranking -------------------------------------------------
			"rank/similar" => self.with_context(|c| handle_similar(c, &config, params)),
			"rank/mostCorrelated" => {
				self.with_context(|c| handle_most_correlated(c, &config, params))
			}
			"rank/recommended" => {
				self.with_context(|c| handle_recommend(c, &config, params, Direction::Top))
			}
			"rank/notRecommended" => {
				self.with_context(|c| handle_recommend(c, &config, params, Direction::Bottom))
			}

			_ => return None,
		};
		Some(result)
	}

	// ── Context accessor ──────────────────────────────────────────────────

	fn with_context<F>(&self, f: F) -> Result<serde_json::Value, RankError>
	where
		F: FnOnce(&RankingContext) -> Result<serde_json::Value, RankError>,
	{
		match &self.context {
			Some(c) => f(c),
			None => Err(RankError::NotLoaded),
		}
	}

	// ── Load ──────────────────────────────────────────────────────────────

	fn handle_load(&mut self, params: serde_json::Value) -> Result<serde_json::Value, RankError> {
		let p: LoadParams = parse_params(params)?;
		let context = RankingContext::load(Path::new(&p.catalog_path), Path::new(&p.matrix_path))?;
		let count = context.catalog().len();
		self.set_context(context);
		Ok(serde_json::json!({ "count": count }))
	}
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_params<T: serde::de::DeserializeOwned>(params: serde_json::Value) -> Result<T, RankError> {
	serde_json::from_value(params)
		.map_err(|e| RankError::Serialization(format!("Invalid params: {}", e)))
}

fn summaries<'a>(
	ctx: &'a RankingContext,
	indices: &[usize],
) -> Result<Vec<EntrySummary<'a>>, RankError> {
	indices
		.iter()
		.map(|&i| ctx.catalog().get(i).map(|e| e.summary()))
		.collect()
}

fn resolve_one(ctx: &RankingContext, id: &str) -> Result<usize, RankError> {
	ctx.catalog()
		.index_of(id)
		.ok_or_else(|| RankError::NotFound(id.to_string()))
}

/// Log each ranked entry alongside its `similar` neighbours.
fn log_with_similar(
	ctx: &RankingContext,
	ranked: &[usize],
	similar_count: usize,
	restrict_to: Option<&[usize]>,
) -> Result<(), RankError> {
	if !tracing::enabled!(tracing::Level::DEBUG) {
		return Ok(());
	}
	for &i in ranked {
		let entry = ctx.catalog().get(i)?;
		let neighbours = similar(ctx.matrix(), i, similar_count, restrict_to)?;
		let titles = neighbours
			.iter()
			.map(|&j| ctx.catalog().get(j).map(|e| e.title.as_str()))
			.collect::<Result<Vec<_>, _>>()?;
		tracing::debug!(title = %entry.title, url = %entry.url, similar = ?titles, "Ranked entry");
	}
	Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_related(
	ctx: &RankingContext,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let p: IdParams = parse_params(params)?;
	let i = resolve_one(ctx, &p.id)?;
	let related = ctx.catalog().related_to(i)?;
	let entries = summaries(ctx, &related)?;
	Ok(serde_json::json!({ "entries": entries }))
}

fn handle_similar(
	ctx: &RankingContext,
	config: &ServerConfig,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let p: SimilarParams = parse_params(params)?;
	let i = resolve_one(ctx, &p.id)?;
	let restrict_to = p.restrict_to.map(|ids| ctx.catalog().resolve_ids(&ids));
	let result = similar(
		ctx.matrix(),
		i,
		p.count.unwrap_or(config.default_count),
		restrict_to.as_deref(),
	)?;
	let entries = summaries(ctx, &result)?;
	Ok(serde_json::json!({ "entries": entries }))
}

fn handle_most_correlated(
	ctx: &RankingContext,
	config: &ServerConfig,
	params: serde_json::Value,
) -> Result<serde_json::Value, RankError> {
	let p: CountParams = parse_params(params)?;
	let ranking = most_correlated(ctx.matrix());
	let top = &ranking[..p.count.min(ranking.len())];
	log_with_similar(ctx, top, config.similar_count, None)?;
	let entries = summaries(ctx, top)?;
	Ok(serde_json::json!({ "entries": entries }))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
	Top,
	Bottom,
}

fn handle_recommend(
	ctx: &RankingContext,
	config: &ServerConfig,
	params: serde_json::Value,
	direction: Direction,
) -> Result<serde_json::Value, RankError> {
	let p: RecommendParams = parse_params(params)?;
	let liked = ctx.catalog().resolve_ids(&p.faves);
	let completed = ctx.catalog().resolve_ids(&p.completed);
	let ranked = recommend(
		&liked,
		&completed,
		ctx.matrix(),
		ctx.catalog(),
		p.length_bias.unwrap_or(config.length_bias),
	)?;

	let selected = match direction {
		Direction::Top => {
			let top = &ranked[..p.count.min(ranked.len())];
			log_with_similar(ctx, top, config.similar_count, Some(liked.as_slice()))?;
			top
		}
		Direction::Bottom => not_recommended(&ranked, p.count),
	};
	tracing::info!(
		liked = liked.len(),
		completed = completed.len(),
		returned = selected.len(),
		"Recommendation served"
	);

	let entries = summaries(ctx, selected)?;
	Ok(serde_json::json!({ "entries": entries }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::EntryCatalog;
	use crate::matrix::CorrelationMatrix;
	use crate::types::entry;
	use serde_json::json;

	fn server() -> RankServer {
		let mut server = RankServer::new(NdjsonTransport::new(), ServerConfig::default());
		let catalog = EntryCatalog::new(vec![
			entry("100", 1, 100, &["focus"]),
			entry("101", 2, 900, &["sleep"]),
			entry("102", 3, 200, &["focus"]),
			entry("103", 4, 700, &[]),
			entry("104", 5, 300, &["sleep"]),
		])
		.unwrap();
		let matrix = CorrelationMatrix::from_rows(vec![
			vec![0.0, 0.9, 0.6, 0.3, 0.1],
			vec![0.9, 0.0, 0.2, 0.8, 0.4],
			vec![0.6, 0.2, 0.0, 0.5, 0.7],
			vec![0.3, 0.8, 0.5, 0.0, 0.6],
			vec![0.1, 0.4, 0.7, 0.6, 0.0],
		])
		.unwrap();
		server.set_context(RankingContext::new(catalog, matrix).unwrap());
		server
	}

	fn ids(value: &serde_json::Value) -> Vec<String> {
		value["entries"]
			.as_array()
			.unwrap()
			.iter()
			.map(|e| e["id"].as_str().unwrap().to_string())
			.collect()
	}

	fn call(server: &mut RankServer, method: &str, params: serde_json::Value) -> serde_json::Value {
		server.handle(method, params).unwrap().unwrap()
	}

	#[test]
	fn unknown_method_is_none() {
		assert!(server().handle("rank/unknown", json!({})).is_none());
	}

	#[test]
	fn ranking_before_load_fails() {
		let mut server = RankServer::new(NdjsonTransport::new(), ServerConfig::default());
		let err = server
			.handle("rank/mostCorrelated", json!({ "count": 1 }))
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, RankError::NotLoaded));
	}

	#[test]
	fn catalog_size() {
		let v = call(&mut server(), "catalog/size", json!({}));
		assert_eq!(v["count"], 5);
	}

	#[test]
	fn related_entries_share_tags() {
		let v = call(&mut server(), "catalog/related", json!({ "id": "101" }));
		assert_eq!(ids(&v), vec!["104"]);
	}

	#[test]
	fn similar_by_id() {
		let v = call(&mut server(), "rank/similar", json!({ "id": "100", "count": 2 }));
		assert_eq!(ids(&v), vec!["104", "103"]);
	}

	#[test]
	fn similar_restricted_to_ids() {
		let v = call(
			&mut server(),
			"rank/similar",
			json!({ "id": "100", "restrictTo": ["101", "102"] }),
		);
		assert_eq!(ids(&v), vec!["102", "101"]);
	}

	#[test]
	fn similar_unknown_id_fails() {
		let err = server()
			.handle("rank/similar", json!({ "id": "nope" }))
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, RankError::NotFound(_)));
	}

	#[test]
	fn most_correlated_truncates_to_count() {
		let v = call(&mut server(), "rank/mostCorrelated", json!({ "count": 2 }));
		// row means: 1.9, 2.3, 2.0, 2.2, 1.8 (over 5)
		assert_eq!(ids(&v), vec!["101", "103"]);
		assert!(v["entries"][0].get("content").is_none());
	}

	#[test]
	fn recommended_applies_length_bias_by_default() {
		let v = call(
			&mut server(),
			"rank/recommended",
			json!({ "faves": ["100"], "completed": [], "count": 2 }),
		);
		assert_eq!(ids(&v), vec!["102", "101"]);
	}

	#[test]
	fn recommended_without_length_bias() {
		let v = call(
			&mut server(),
			"rank/recommended",
			json!({ "faves": ["100"], "completed": [], "count": 2, "lengthBias": false }),
		);
		assert_eq!(ids(&v), vec!["101", "102"]);
	}

	#[test]
	fn not_recommended_returns_the_tail() {
		let v = call(
			&mut server(),
			"rank/notRecommended",
			json!({ "faves": ["100", "104"], "completed": ["102"], "count": 2 }),
		);
		assert_eq!(ids(&v), vec!["104", "100"]);
	}

	#[test]
	fn unknown_faves_leave_liked_empty() {
		let err = server()
			.handle(
				"rank/recommended",
				json!({ "faves": ["missing"], "completed": [], "count": 3 }),
			)
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, RankError::EmptyLiked));
	}

	#[test]
	fn bad_params_are_serialization_errors() {
		let err = server()
			.handle("rank/mostCorrelated", json!({ "count": "many" }))
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, RankError::Serialization(_)));
	}

	#[test]
	fn failed_load_keeps_previous_context() {
		let mut server = server();
		let err = server
			.handle(
				"context/load",
				json!({ "catalogPath": "/nonexistent/catalog.json", "matrixPath": "/nonexistent/m.json" }),
			)
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, RankError::Load(_)));
		let v = call(&mut server, "catalog/size", json!({}));
		assert_eq!(v["count"], 5);
	}
}
