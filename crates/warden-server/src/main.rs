// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Warden IAM server binary.

use clap::Parser;
use std::path::PathBuf;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warden_server::{create_router, AppState};

/// Warden server - IAM service over HTTP.
#[derive(Parser, Debug)]
#[command(name = "warden-server", about = "Warden IAM server", version)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/warden/server.toml).
	#[arg(long)]
	config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Parse CLI arguments
	let args = Args::parse();

	// Load .env file if present
	dotenvy::dotenv().ok();

	// Load configuration
	let config = match args.config {
		Some(path) => warden_config::load_config_with_file(path)?,
		None => warden_config::load_config()?,
	};

	// Setup tracing
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
			host = %config.http.host,
			port = config.http.port,
			database = %config.database.url,
			"starting warden-server"
	);

	// Create database pool and run migrations
	let pool = warden_db::create_pool(&config.database.url).await?;
	warden_db::run_migrations(&pool).await?;

	// Wire repositories, gate, APIs and authenticator
	let state: AppState = warden_server::state::create_app_state(pool, &config);

	let app = create_router(state).layer(TraceLayer::new_for_http());

	let listener = tokio::net::TcpListener::bind(config.socket_addr()).await?;
	tracing::info!(addr = %listener.local_addr()?, "listening");
	axum::serve(listener, app).await?;

	Ok(())
}
