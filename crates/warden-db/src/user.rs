// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! This module provides database access for user management:
//! - User CRUD keyed by external id
//! - Path-prefix filtered listing with totals
//! - Resolution of the groups a user belongs to

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use warden_core::{Group, User, UserId};

use crate::error::{map_unique_violation, DbError};
use crate::group::row_to_group;
use crate::sql::like_prefix;

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn add_user(&self, user: &User) -> Result<(), DbError>;
	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn update_user(&self, user: &User) -> Result<(), DbError>;
	async fn remove_user(&self, id: &UserId) -> Result<(), DbError>;
	async fn get_users_filtered(
		&self,
		path_prefix: Option<&str>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<User>, i64), DbError>;
	async fn get_groups_by_user_id(&self, id: &UserId) -> Result<Vec<Group>, DbError>;
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl UserStore for UserRepository {
	/// Create a new user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the external id or URN is taken.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id, external_id = %user.external_id))]
	async fn add_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, external_id, path, urn, create_at, update_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.external_id)
		.bind(&user.path)
		.bind(&user.urn)
		.bind(user.create_at.to_rfc3339())
		.bind(user.update_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "user already exists"))?;

		tracing::debug!(external_id = %user.external_id, "user created");
		Ok(())
	}

	/// Get a user by external id.
	///
	/// # Returns
	/// `None` if no user carries this external id.
	#[tracing::instrument(skip(self))]
	async fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, external_id, path, urn, create_at, update_at
			FROM users
			WHERE external_id = ?
			"#,
		)
		.bind(external_id)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Get a user by ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, external_id, path, urn, create_at, update_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Update a user's path and URN.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	async fn update_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			UPDATE users
			SET path = ?, urn = ?, update_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&user.path)
		.bind(&user.urn)
		.bind(Utc::now().to_rfc3339())
		.bind(user.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "user urn already exists"))?;

		tracing::debug!(user_id = %user.id, "user updated");
		Ok(())
	}

	/// Remove a user and its group memberships.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	async fn remove_user(&self, id: &UserId) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM group_users WHERE user_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		tracing::debug!(user_id = %id, "user removed");
		Ok(())
	}

	/// List users under a path prefix with the total count.
	#[tracing::instrument(skip(self))]
	async fn get_users_filtered(
		&self,
		path_prefix: Option<&str>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<User>, i64), DbError> {
		let prefix = like_prefix(path_prefix.unwrap_or(""));

		let rows = sqlx::query(
			r#"
			SELECT id, external_id, path, urn, create_at, update_at
			FROM users
			WHERE path LIKE ? ESCAPE '\'
			ORDER BY external_id ASC
			LIMIT ? OFFSET ?
			"#,
		)
		.bind(&prefix)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		let users: Result<Vec<_>, _> = rows.iter().map(row_to_user).collect();

		let (total,): (i64,) =
			sqlx::query_as(r#"SELECT COUNT(*) FROM users WHERE path LIKE ? ESCAPE '\'"#)
				.bind(&prefix)
				.fetch_one(&self.pool)
				.await?;

		Ok((users?, total))
	}

	/// Get the groups a user is a member of, ordered by join date.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	async fn get_groups_by_user_id(&self, id: &UserId) -> Result<Vec<Group>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT g.id, g.org, g.name, g.path, g.urn, g.create_at, g.update_at
			FROM group_users m
			INNER JOIN groups g ON m.group_id = g.id
			WHERE m.user_id = ?
			ORDER BY m.create_at ASC
			"#,
		)
		.bind(id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_group).collect()
	}
}

pub(crate) fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id_str: String = row.get("id");
	let create_at: String = row.get("create_at");
	let update_at: String = row.get("update_at");

	let id =
		Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

	Ok(User {
		id: UserId::new(id),
		external_id: row.get("external_id"),
		path: row.get("path"),
		urn: row.get("urn"),
		create_at: chrono::DateTime::parse_from_rfc3339(&create_at)
			.map_err(|e| DbError::Internal(format!("Invalid create_at: {e}")))?
			.with_timezone(&Utc),
		update_at: chrono::DateTime::parse_from_rfc3339(&update_at)
			.map_err(|e| DbError::Internal(format!("Invalid update_at: {e}")))?
			.with_timezone(&Utc),
	})
}
