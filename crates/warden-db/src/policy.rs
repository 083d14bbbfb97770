// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy repository for database operations.
//!
//! This module provides database access for policy management:
//! - Policy CRUD keyed by `(org, name)`, statements stored as a JSON column
//! - Attachment management over the `group_policies` join table
//! - Org- and path-prefix-filtered listing with totals

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};
use uuid::Uuid;

use warden_core::{Group, GroupId, Policy, PolicyId, Statement};

use crate::error::{map_unique_violation, DbError};
use crate::group::row_to_group;
use crate::sql::like_prefix;

#[async_trait]
pub trait PolicyStore: Send + Sync {
	async fn add_policy(&self, policy: &Policy) -> Result<(), DbError>;
	async fn get_policy_by_name(&self, org: &str, name: &str) -> Result<Option<Policy>, DbError>;
	async fn get_policy_by_id(&self, id: &PolicyId) -> Result<Option<Policy>, DbError>;
	async fn update_policy(&self, policy: &Policy) -> Result<(), DbError>;
	async fn remove_policy(&self, id: &PolicyId) -> Result<(), DbError>;
	async fn get_policies_filtered(
		&self,
		org: Option<&str>,
		path_prefix: Option<&str>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<Policy>, i64), DbError>;
	async fn attach_policy(&self, group_id: &GroupId, policy_id: &PolicyId)
		-> Result<(), DbError>;
	async fn detach_policy(&self, group_id: &GroupId, policy_id: &PolicyId)
		-> Result<(), DbError>;
	async fn is_attached_to_group(
		&self,
		group_id: &GroupId,
		policy_id: &PolicyId,
	) -> Result<bool, DbError>;
	async fn get_attached_policies(&self, group_id: &GroupId) -> Result<Vec<Policy>, DbError>;
	async fn get_attached_groups(&self, policy_id: &PolicyId) -> Result<Vec<Group>, DbError>;
}

/// Repository for policy database operations.
///
/// Manages policies and their group attachments. Statements are persisted
/// as a JSON TEXT column and deserialized on read.
#[derive(Clone)]
pub struct PolicyRepository {
	pool: SqlitePool,
}

impl PolicyRepository {
	/// Create a new repository with the given pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}
}

#[async_trait]
impl PolicyStore for PolicyRepository {
	/// Create a new policy.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if `(org, name)` is taken.
	#[tracing::instrument(skip(self, policy), fields(policy_id = %policy.id, org = %policy.org, name = %policy.name))]
	async fn add_policy(&self, policy: &Policy) -> Result<(), DbError> {
		let statements = serde_json::to_string(&policy.statements)?;

		sqlx::query(
			r#"
			INSERT INTO policies (id, org, name, path, urn, statements, create_at, update_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(policy.id.to_string())
		.bind(&policy.org)
		.bind(&policy.name)
		.bind(&policy.path)
		.bind(&policy.urn)
		.bind(statements)
		.bind(policy.create_at.to_rfc3339())
		.bind(policy.update_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "policy already exists"))?;

		tracing::debug!(org = %policy.org, name = %policy.name, "policy created");
		Ok(())
	}

	/// Get a policy by organization and name.
	#[tracing::instrument(skip(self))]
	async fn get_policy_by_name(&self, org: &str, name: &str) -> Result<Option<Policy>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, org, name, path, urn, statements, create_at, update_at
			FROM policies
			WHERE org = ? AND name = ?
			"#,
		)
		.bind(org)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_policy(&r)).transpose()
	}

	/// Get a policy by ID.
	#[tracing::instrument(skip(self), fields(policy_id = %id))]
	async fn get_policy_by_id(&self, id: &PolicyId) -> Result<Option<Policy>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, org, name, path, urn, statements, create_at, update_at
			FROM policies
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_policy(&r)).transpose()
	}

	/// Update a policy's name, path, URN and statements.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the new `(org, name)` is taken.
	#[tracing::instrument(skip(self, policy), fields(policy_id = %policy.id))]
	async fn update_policy(&self, policy: &Policy) -> Result<(), DbError> {
		let statements = serde_json::to_string(&policy.statements)?;

		sqlx::query(
			r#"
			UPDATE policies
			SET name = ?, path = ?, urn = ?, statements = ?, update_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&policy.name)
		.bind(&policy.path)
		.bind(&policy.urn)
		.bind(statements)
		.bind(Utc::now().to_rfc3339())
		.bind(policy.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "policy already exists"))?;

		tracing::debug!(policy_id = %policy.id, urn = %policy.urn, "policy updated");
		Ok(())
	}

	/// Remove a policy and its group attachments.
	#[tracing::instrument(skip(self), fields(policy_id = %id))]
	async fn remove_policy(&self, id: &PolicyId) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query("DELETE FROM group_policies WHERE policy_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;
		sqlx::query("DELETE FROM policies WHERE id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?;

		tx.commit().await?;

		tracing::debug!(policy_id = %id, "policy removed");
		Ok(())
	}

	/// List policies filtered by organization and path prefix, with the
	/// total count of matching rows.
	#[tracing::instrument(skip(self))]
	async fn get_policies_filtered(
		&self,
		org: Option<&str>,
		path_prefix: Option<&str>,
		limit: i64,
		offset: i64,
	) -> Result<(Vec<Policy>, i64), DbError> {
		let org = org.unwrap_or("");
		let prefix = like_prefix(path_prefix.unwrap_or(""));

		let rows = sqlx::query(
			r#"
			SELECT id, org, name, path, urn, statements, create_at, update_at
			FROM policies
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

		let policies: Result<Vec<_>, _> = rows.iter().map(row_to_policy).collect();

		let (total,): (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM policies
			WHERE (? = '' OR org = ?) AND path LIKE ? ESCAPE '\'
			"#,
		)
		.bind(org)
		.bind(org)
		.bind(&prefix)
		.fetch_one(&self.pool)
		.await?;

		Ok((policies?, total))
	}

	/// Attach a policy to a group.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the policy is already attached.
	#[tracing::instrument(skip(self), fields(group_id = %group_id, policy_id = %policy_id))]
	async fn attach_policy(
		&self,
		group_id: &GroupId,
		policy_id: &PolicyId,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO group_policies (group_id, policy_id, create_at)
			VALUES (?, ?, ?)
			"#,
		)
		.bind(group_id.to_string())
		.bind(policy_id.to_string())
		.bind(Utc::now().to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| map_unique_violation(e, "policy is already attached to group"))?;

		tracing::debug!(group_id = %group_id, policy_id = %policy_id, "policy attached");
		Ok(())
	}

	/// Detach a policy from a group.
	#[tracing::instrument(skip(self), fields(group_id = %group_id, policy_id = %policy_id))]
	async fn detach_policy(
		&self,
		group_id: &GroupId,
		policy_id: &PolicyId,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			DELETE FROM group_policies
			WHERE group_id = ? AND policy_id = ?
			"#,
		)
		.bind(group_id.to_string())
		.bind(policy_id.to_string())
		.execute(&self.pool)
		.await?;

		tracing::debug!(group_id = %group_id, policy_id = %policy_id, "policy detached");
		Ok(())
	}

	/// Whether a policy is attached to a group.
	#[tracing::instrument(skip(self), fields(group_id = %group_id, policy_id = %policy_id))]
	async fn is_attached_to_group(
		&self,
		group_id: &GroupId,
		policy_id: &PolicyId,
	) -> Result<bool, DbError> {
		let (count,): (i64,) = sqlx::query_as(
			r#"
			SELECT COUNT(*) FROM group_policies
			WHERE group_id = ? AND policy_id = ?
			"#,
		)
		.bind(group_id.to_string())
		.bind(policy_id.to_string())
		.fetch_one(&self.pool)
		.await?;

		Ok(count > 0)
	}

	/// List the policies attached to a group, ordered by attachment date.
	#[tracing::instrument(skip(self), fields(group_id = %group_id))]
	async fn get_attached_policies(&self, group_id: &GroupId) -> Result<Vec<Policy>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT p.id, p.org, p.name, p.path, p.urn, p.statements, p.create_at, p.update_at
			FROM group_policies a
			INNER JOIN policies p ON a.policy_id = p.id
			WHERE a.group_id = ?
			ORDER BY a.create_at ASC
			"#,
		)
		.bind(group_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_policy).collect()
	}

	/// List the groups a policy is attached to, ordered by attachment date.
	#[tracing::instrument(skip(self), fields(policy_id = %policy_id))]
	async fn get_attached_groups(&self, policy_id: &PolicyId) -> Result<Vec<Group>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT g.id, g.org, g.name, g.path, g.urn, g.create_at, g.update_at
			FROM group_policies a
			INNER JOIN groups g ON a.group_id = g.id
			WHERE a.policy_id = ?
			ORDER BY a.create_at ASC
			"#,
		)
		.bind(policy_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_group).collect()
	}
}

fn row_to_policy(row: &sqlx::sqlite::SqliteRow) -> Result<Policy, DbError> {
	let id_str: String = row.get("id");
	let statements_json: String = row.get("statements");
	let create_at: String = row.get("create_at");
	let update_at: String = row.get("update_at");

	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid policy ID: {e}")))?;
	let statements: Vec<Statement> = serde_json::from_str(&statements_json)?;

	Ok(Policy {
		id: PolicyId::new(id),
		org: row.get("org"),
		name: row.get("name"),
		path: row.get("path"),
		urn: row.get("urn"),
		statements,
		create_at: chrono::DateTime::parse_from_rfc3339(&create_at)
			.map_err(|e| DbError::Internal(format!("Invalid create_at: {e}")))?
			.with_timezone(&Utc),
		update_at: chrono::DateTime::parse_from_rfc3339(&update_at)
			.map_err(|e| DbError::Internal(format!("Invalid update_at: {e}")))?
			.with_timezone(&Utc),
	})
}
