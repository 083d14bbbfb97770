// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema creation for the IAM tables.
//!
//! Statements are idempotent (`CREATE TABLE IF NOT EXISTS`) so migrations
//! can run unconditionally at startup. All IDs are UUIDs stored as TEXT;
//! timestamps are RFC 3339 TEXT. Cascades are performed explicitly inside
//! repository transactions rather than relying on SQLite foreign-key
//! enforcement being switched on.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
	id TEXT PRIMARY KEY,
	external_id TEXT NOT NULL UNIQUE,
	path TEXT NOT NULL,
	urn TEXT NOT NULL UNIQUE,
	create_at TEXT NOT NULL,
	update_at TEXT NOT NULL
)
"#;

const CREATE_GROUPS: &str = r#"
CREATE TABLE IF NOT EXISTS groups (
	id TEXT PRIMARY KEY,
	org TEXT NOT NULL,
	name TEXT NOT NULL,
	path TEXT NOT NULL,
	urn TEXT NOT NULL UNIQUE,
	create_at TEXT NOT NULL,
	update_at TEXT NOT NULL,
	UNIQUE(org, name)
)
"#;

const CREATE_POLICIES: &str = r#"
CREATE TABLE IF NOT EXISTS policies (
	id TEXT PRIMARY KEY,
	org TEXT NOT NULL,
	name TEXT NOT NULL,
	path TEXT NOT NULL,
	urn TEXT NOT NULL UNIQUE,
	statements TEXT NOT NULL,
	create_at TEXT NOT NULL,
	update_at TEXT NOT NULL,
	UNIQUE(org, name)
)
"#;

const CREATE_GROUP_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS group_users (
	group_id TEXT NOT NULL,
	user_id TEXT NOT NULL,
	create_at TEXT NOT NULL,
	PRIMARY KEY (group_id, user_id)
)
"#;

const CREATE_GROUP_POLICIES: &str = r#"
CREATE TABLE IF NOT EXISTS group_policies (
	group_id TEXT NOT NULL,
	policy_id TEXT NOT NULL,
	create_at TEXT NOT NULL,
	PRIMARY KEY (group_id, policy_id)
)
"#;

const CREATE_INDEXES: &[&str] = &[
	"CREATE INDEX IF NOT EXISTS idx_groups_org_path ON groups (org, path)",
	"CREATE INDEX IF NOT EXISTS idx_policies_org_path ON policies (org, path)",
	"CREATE INDEX IF NOT EXISTS idx_users_path ON users (path)",
	"CREATE INDEX IF NOT EXISTS idx_group_users_user ON group_users (user_id)",
	"CREATE INDEX IF NOT EXISTS idx_group_policies_policy ON group_policies (policy_id)",
];

/// Create all IAM tables and indexes if they do not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for statement in [
		CREATE_USERS,
		CREATE_GROUPS,
		CREATE_POLICIES,
		CREATE_GROUP_USERS,
		CREATE_GROUP_POLICIES,
	] {
		sqlx::query(statement).execute(pool).await?;
	}
	for statement in CREATE_INDEXES {
		sqlx::query(statement).execute(pool).await?;
	}

	tracing::debug!("database schema ready");
	Ok(())
}
