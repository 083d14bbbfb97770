// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy entity and statements.
//!
//! A policy is a named bag of [`Statement`]s scoped to an organization.
//! Statements are the atomic unit of permission: an effect, a set of
//! action patterns, and a set of resource URN patterns. A policy with no
//! statements grants nothing and denies nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::PolicyId;
use crate::urn::{self, ResourceType};

/// The effect of a matching statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
	/// The statement grants the matched actions on the matched resources.
	Allow,
	/// The statement forbids them; an applicable deny defeats every allow.
	Deny,
}

impl fmt::Display for Effect {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Effect::Allow => write!(f, "allow"),
			Effect::Deny => write!(f, "deny"),
		}
	}
}

/// A single policy statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
	/// Whether matching requests are allowed or denied.
	pub effect: Effect,

	/// Action patterns, colon-delimited with an optional trailing `*`
	/// segment (`iam:CreateGroup`, `iam:*`).
	pub actions: Vec<String>,

	/// Resource URN patterns, with an optional single trailing `*`.
	pub resources: Vec<String>,
}

impl Statement {
	/// Creates a statement from its parts.
	pub fn new(
		effect: Effect,
		actions: impl IntoIterator<Item = impl Into<String>>,
		resources: impl IntoIterator<Item = impl Into<String>>,
	) -> Self {
		Self {
			effect,
			actions: actions.into_iter().map(Into::into).collect(),
			resources: resources.into_iter().map(Into::into).collect(),
		}
	}
}

/// A policy: a named, org-scoped set of statements.
///
/// `(org, name)` is unique per entity type, exactly as for groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
	/// Unique identifier for this policy.
	pub id: PolicyId,

	/// Policy name, unique within its organization.
	pub name: String,

	/// Hierarchical path the policy lives under, `/`-delimited.
	pub path: String,

	/// Organization the policy belongs to.
	pub org: String,

	/// Canonical URN, derived from org, path and name.
	pub urn: String,

	/// The statements this policy carries. May be empty.
	pub statements: Vec<Statement>,

	/// When the policy was created.
	pub create_at: DateTime<Utc>,

	/// When the policy was last updated.
	pub update_at: DateTime<Utc>,
}

impl Policy {
	/// Creates a new policy with a generated ID and a URN derived from org,
	/// path and name.
	pub fn new(
		org: impl Into<String>,
		name: impl Into<String>,
		path: impl Into<String>,
		statements: Vec<Statement>,
	) -> Self {
		let org = org.into();
		let name = name.into();
		let path = path.into();
		let urn = urn::compose(&org, ResourceType::Policy, &path, &name);
		let now = Utc::now();
		Self {
			id: PolicyId::generate(),
			name,
			path,
			org,
			urn,
			statements,
			create_at: now,
			update_at: now,
		}
	}

	/// Returns a copy renamed, re-pathed and with replacement statements;
	/// the URN is regenerated and the update timestamp refreshed.
	pub fn updated(
		&self,
		new_name: impl Into<String>,
		new_path: impl Into<String>,
		new_statements: Vec<Statement>,
	) -> Self {
		let new_name = new_name.into();
		let new_path = new_path.into();
		let urn = urn::compose(&self.org, ResourceType::Policy, &new_path, &new_name);
		Self {
			name: new_name,
			path: new_path,
			urn,
			statements: new_statements,
			update_at: Utc::now(),
			..self.clone()
		}
	}
}
