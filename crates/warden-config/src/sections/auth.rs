// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration: the static admin whitelist.

use serde::Deserialize;

/// Auth configuration (runtime, fully resolved).
///
/// Callers whose external id appears in `admin_external_ids` bypass the
/// authorization gate entirely.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
	pub admin_external_ids: Vec<String>,
}

impl AuthConfig {
	/// Whether the given external id is on the admin whitelist.
	pub fn is_admin(&self, external_id: &str) -> bool {
		self.admin_external_ids.iter().any(|id| id == external_id)
	}
}

/// Auth configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub admin_external_ids: Option<Vec<String>>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.admin_external_ids.is_some() {
			self.admin_external_ids = other.admin_external_ids;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			admin_external_ids: self.admin_external_ids.unwrap_or_default(),
		}
	}
}
