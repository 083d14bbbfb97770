// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::UserId;
use crate::urn::{self, ResourceType};

/// A user known to the IAM service.
///
/// Users are cross-org: their URNs carry an empty org segment and their
/// identity is the globally unique `external_id` minted by whatever
/// authenticates callers upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Globally unique identifier assigned by the external identity source.
	pub external_id: String,

	/// Hierarchical path the user lives under, `/`-delimited.
	pub path: String,

	/// Canonical URN, derived from `external_id` and `path`.
	pub urn: String,

	/// When the user was created.
	pub create_at: DateTime<Utc>,

	/// When the user was last updated.
	pub update_at: DateTime<Utc>,
}

impl User {
	/// Creates a new user with a generated ID and a URN derived from the
	/// external id and path.
	pub fn new(external_id: impl Into<String>, path: impl Into<String>) -> Self {
		let external_id = external_id.into();
		let path = path.into();
		let urn = urn::compose("", ResourceType::User, &path, &external_id);
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			external_id,
			path,
			urn,
			create_at: now,
			update_at: now,
		}
	}

	/// Returns a copy moved to a new path, with the URN regenerated and the
	/// update timestamp refreshed.
	pub fn with_path(&self, new_path: impl Into<String>) -> Self {
		let new_path = new_path.into();
		let urn = urn::compose("", ResourceType::User, &new_path, &self.external_id);
		Self {
			path: new_path,
			urn,
			update_at: Utc::now(),
			..self.clone()
		}
	}
}
