use anyhow::Result;
use clap::Parser;
use plusone_recommender::config::CliArgs;
use plusone_recommender::context::RankingContext;
use plusone_recommender::server::RankServer;
use plusone_recommender::transport::NdjsonTransport;

fn main() -> Result<()> {
	let args = CliArgs::parse();

	// Logs go to stderr; stdout carries the protocol
	tracing_subscriber::fmt()
		.with_writer(std::io::stderr)
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
		)
		.init();

	let mut server = RankServer::new(NdjsonTransport::new(), args.server_config());

	if let Some((catalog, matrix)) = args.context_paths() {
		server.set_context(RankingContext::load(&catalog, &matrix)?);
	}

	tracing::info!("plusone-recommender ready");
	server.run()?;
	Ok(())
}
