// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lightweight identity views returned by listing operations.

use serde::{Deserialize, Serialize};

use warden_core::{Group, Policy};

/// The `(org, name)` identity of a group, as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupIdentity {
	pub org: String,
	pub name: String,
}

impl From<&Group> for GroupIdentity {
	fn from(group: &Group) -> Self {
		Self {
			org: group.org.clone(),
			name: group.name.clone(),
		}
	}
}

/// The `(org, name)` identity of a policy, as returned by listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyIdentity {
	pub org: String,
	pub name: String,
}

impl From<&Policy> for PolicyIdentity {
	fn from(policy: &Policy) -> Self {
		Self {
			org: policy.org.clone(),
			name: policy.name.clone(),
		}
	}
}
