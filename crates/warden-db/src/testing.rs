// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory pool helpers for tests.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Create a single-connection `:memory:` pool with the IAM schema applied.
///
/// The pool is capped at one connection: each SQLite `:memory:` connection
/// is its own database, so a larger pool would hand out empty databases.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str(":memory:").unwrap();
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await
		.unwrap();
	crate::schema::run_migrations(&pool).await.unwrap();
	pool
}
