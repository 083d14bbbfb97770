// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared filter for list operations.

use serde::{Deserialize, Serialize};

/// Filter and pagination for list operations.
///
/// One struct serves every listing; operations read only the fields their
/// contract names and ignore the rest. `limit = 0` means "server default";
/// limits above the maximum are rejected by the API layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
	/// Organization scope, where the operation is org-scoped.
	pub org: Option<String>,

	/// Path prefix the listed resources must live under.
	pub path_prefix: Option<String>,

	/// Group name, for member and attachment listings.
	pub group_name: Option<String>,

	/// Policy name, for attachment listings.
	pub policy_name: Option<String>,

	/// Page size; `0` selects the server default.
	pub limit: usize,

	/// Number of leading results to skip.
	pub offset: usize,
}

impl Filter {
	/// A filter selecting the first default-sized page of everything.
	pub fn all() -> Self {
		Self::default()
	}

	/// Sets the organization scope.
	pub fn with_org(mut self, org: impl Into<String>) -> Self {
		self.org = Some(org.into());
		self
	}

	/// Sets the path prefix.
	pub fn with_path_prefix(mut self, path_prefix: impl Into<String>) -> Self {
		self.path_prefix = Some(path_prefix.into());
		self
	}

	/// Sets the group name.
	pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
		self.group_name = Some(group_name.into());
		self
	}

	/// Sets the page size and offset.
	pub fn with_page(mut self, limit: usize, offset: usize) -> Self {
		self.limit = limit;
		self.offset = offset;
		self
	}
}
