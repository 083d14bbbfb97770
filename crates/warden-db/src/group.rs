// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group repository for database operations.
//!
//! This module provides database access for group management:
//! - Group CRUD keyed by `(org, name)`
//! - Membership management over the `group_users` join table
//! - Org- and path-prefix-filtered listing with totals
//!
//! Removing a group cascades its memberships and policy attachments in a
//! single transaction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use warden_core::{Group, GroupId, User, UserId};

use crate::error::{map_unique_violation, DbError};
use crate::sql::like_prefix;
use crate::user::row_to_user;

#[async_trait]
pub trait GroupStore: Send + Sync {
	async fn add_group(&self, group: &Group) -> Result<(), DbError>;
	async fn get_group_by_name(&self, org: &str, name: &str) -> Result<Option<Group>, DbError>;
	async fn get_group_by_id(&self, id: &GroupId) -> Result<Option<Group>, DbError>;
	async fn update_group(&self, group: &Group) -> Result<(), DbError>;
	async fn remove_group(&self, id: &GroupId) -> Result<(), DbError>;
	async fn get_groups_filtered(
		&self,
		org: Option<&str>,
		path_prefix: Option<&str>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<Group>, i64), DbError>;
	async fn add_member(&self, user_id: &UserId, group_id: &GroupId) -> Result<(), DbError>;
	async fn remove_member(&self, user_id: &UserId, group_id: &GroupId) -> Result<(), DbError>;
	async fn is_member_of_group(
		&self,
		user_id: &UserId,
		group_id: &GroupId,
	) -> Result<bool, DbError>;
	async fn get_group_members(&self, group_id: &GroupId) -> Result<Vec<User>, DbError>;
}

/// Repository for group database operations.
///
/// Manages groups and their memberships. All IDs are UUIDs stored as
/// strings in SQLite.
#[derive(Clone)]
pub struct GroupRepository {
	pool: SqlitePool,
}

impl GroupRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl GroupStore for GroupRepository {
	/// Create a new group.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if `(org, name)` is taken.
	#[tracing::instrument(skip(self, group), fields(group_id = %group.id, org = %group.org, name = %group.name))]
	async fn add_group(&self, group: &Group) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO groups (id, org, name, path, urn, create_at, update_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(group.id.to_string())
		.bind(&group.org)
		.bind(&group.name)
		.bind(&group.path)
		.bind(&group.urn)
		.bind(group.create_at.to_rfc3339())
		.bind(group.update_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "group already exists"))?;

		tracing::debug!(org = %group.org, name = %group.name, "group created");
		Ok(())
	}

	/// Get a group by organization and name.
	#[tracing::instrument(skip(self))]
	async fn get_group_by_name(&self, org: &str, name: &str) -> Result<Option<Group>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, org, name, path, urn, create_at, update_at
			FROM groups
			WHERE org = ? AND name = ?
			"#,
		)
		.bind(org)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_group(&r)).transpose()
	}

	/// Get a group by ID.
	#[tracing::instrument(skip(self), fields(group_id = %id))]
	async fn get_group_by_id(&self, id: &GroupId) -> Result<Option<Group>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, org, name, path, urn, create_at, update_at
			FROM groups
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_group(&r)).transpose()
	}

	/// Update a group's name, path and URN.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the new `(org, name)` is taken.
	#[tracing::instrument(skip(self, group), fields(group_id = %group.id))]
	async fn update_group(&self, group: &Group) -> Result<(), DbError> {
		sqlx::query(
			r#"
			UPDATE groups
			SET name = ?, path = ?, urn = ?, update_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&group.name)
		.bind(&group.path)
		.bind(&group.urn)
		.bind(Utc::now().to_rfc3339())
		.bind(group.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "group already exists"))?;

		tracing::debug!(group_id = %group.id, urn = %group.urn, "group updated");
		Ok(())
	}

	/// Remove a group, its memberships and its policy attachments.
	#[tracing::instrument(skip(self), fields(group_id = %id))]
	async fn remove_group(&self, id: &GroupId) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM group_users WHERE group_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		sqlx::query("DELETE FROM group_policies WHERE group_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		sqlx::query("DELETE FROM groups WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		tracing::debug!(group_id = %id, "group removed");
		Ok(())
	}

	/// List groups filtered by organization and path prefix, with the total
	/// count of matching rows.
	#[tracing::instrument(skip(self))]
	async fn get_groups_filtered(
		&self,
		org: Option<&str>,
		path_prefix: Option<&str>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<Group>, i64), DbError> {
		let org = org.unwrap_or("");
		let prefix = like_prefix(path_prefix.unwrap_or(""));

		let rows = sqlx::query(
			r#"
			SELECT id, org, name, path, urn, create_at, update_at
			FROM groups
			WHERE (? = '' OR org = ?) AND path LIKE ? ESCAPE '\'
			ORDER BY org ASC, name ASC
			LIMIT ? OFFSET ?
			"#,
		)
		.bind(org)
		.bind(org)
		.bind(&prefix)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		let groups: Result<Vec<_>, _> = rows.iter().map(row_to_group).collect();

		let (total,): (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM groups
			WHERE (? = '' OR org = ?) AND path LIKE ? ESCAPE '\'
			"#,
		)
		.bind(org)
		.bind(org)
		.bind(&prefix)
		.fetch_one(&self.pool)
		.await?;

		Ok((groups?, total))
	}

	/// Add a user to a group.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the user is already a member.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, group_id = %group_id))]
	async fn add_member(&self, user_id: &UserId, group_id: &GroupId) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO group_users (group_id, user_id, create_at)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(group_id.to_string())
		.bind(user_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "user is already a member of group"))?;

		tracing::debug!(user_id = %user_id, group_id = %group_id, "member added");
		Ok(())
	}

	/// Remove a user from a group.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, group_id = %group_id))]
	async fn remove_member(&self, user_id: &UserId, group_id: &GroupId) -> Result<(), DbError> {
		sqlx::query(
			r#"
			DELETE FROM group_users
			WHERE group_id = ? AND user_id = ?
			"#,
		)
		.bind(group_id.to_string())
		.bind(user_id.to_string())
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %user_id, group_id = %group_id, "member removed");
		Ok(())
	}

	/// Whether a user is a member of a group.
	#[tracing::instrument(skip(self), fields(user_id = %user_id, group_id = %group_id))]
	async fn is_member_of_group(
		&self,
		user_id: &UserId,
		group_id: &GroupId,
	) -> Result<bool, DbError> {
		let (count,): (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM group_users
			WHERE group_id = ? AND user_id = ?
			"#,
		)
		.bind(group_id.to_string())
		.bind(user_id.to_string())
		.fetch_one(&self.pool)
		.await?;

		Ok(count > 0)
	}

	/// List the members of a group, ordered by join date.
	#[tracing::instrument(skip(self), fields(group_id = %group_id))]
	async fn get_group_members(&self, group_id: &GroupId) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT u.id, u.external_id, u.path, u.urn, u.create_at, u.update_at
			FROM group_users m
			INNER JOIN users u ON m.user_id = u.id
			WHERE m.group_id = ?
			ORDER BY m.create_at ASC
			"#,
		)
		.bind(group_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_user).collect()
	}
}

pub(crate) fn row_to_group(row: &sqlx::sqlite::SqliteRow) -> Result<Group, DbError> {
	let id_str: String = row.get("id");
	let create_at: String = row.get("create_at");
	let update_at: String = row.get("update_at");

	let id =
		Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid group ID: {e}")))?;

	Ok(Group {
		id: GroupId::new(id),
		org: row.get("org"),
		name: row.get("name"),
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
