// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl DbError {
	/// True when the error is a uniqueness conflict.
	pub fn is_conflict(&self) -> bool {
		matches!(self, DbError::Conflict(_))
	}
}

/// Map an insert/update error, turning unique-constraint violations into
/// [`DbError::Conflict`] with the given description.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> DbError {
	if let sqlx::Error::Database(ref db) = e {
		if db.is_unique_violation() {
			return DbError::Conflict(what.to_string());
		}
	}
	DbError::Sqlx(e)
}

pub type Result<T> = std::result::Result<T, DbError>;
