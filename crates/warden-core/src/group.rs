// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::GroupId;
use crate::urn::{self, ResourceType};

/// A group of users within an organization.
///
/// Groups are the only way users acquire permissions: policies attach to
/// groups, never directly to users. `(org, name)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
	/// Unique identifier for this group.
	pub id: GroupId,

	/// Group name, unique within its organization.
	pub name: String,

	/// Hierarchical path the group lives under, `/`-delimited.
	pub path: String,

	/// Organization the group belongs to.
	pub org: String,

	/// Canonical URN, derived from org, path and name.
	pub urn: String,

	/// When the group was created.
	pub create_at: DateTime<Utc>,

	/// When the group was last updated.
	pub update_at: DateTime<Utc>,
}

impl Group {
	/// Creates a new group with a generated ID and a URN derived from org,
	/// path and name.
	pub fn new(org: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
		let org = org.into();
		let name = name.into();
		let path = path.into();
		let urn = urn::compose(&org, ResourceType::Group, &path, &name);
		let now = Utc::now();
		Self {
			id: GroupId::generate(),
			name,
			path,
			org,
			urn,
			create_at: now,
			update_at: now,
		}
	}

	/// Returns a copy renamed and re-pathed, with the URN regenerated and
	/// the update timestamp refreshed.
	pub fn renamed(&self, new_name: impl Into<String>, new_path: impl Into<String>) -> Self {
		let new_name = new_name.into();
		let new_path = new_path.into();
		let urn = urn::compose(&self.org, ResourceType::Group, &new_path, &new_name);
		Self {
			name: new_name,
			path: new_path,
			urn,
			update_at: Utc::now(),
			..self.clone()
		}
	}
}
