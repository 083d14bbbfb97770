// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! URN composition and pattern matching.
//!
//! Every resource is identified by a canonical URN of the form
//! `urn:iws:iam:<org>:<type><path><name>` where `<path>` starts and ends
//! with `/` and `<org>` may be empty (users are cross-org). A URN
//! **prefix** drops the trailing name and appends `*`.
//!
//! Patterns support a single trailing `*` wildcard and nothing else:
//! `urn:iws:iam:org1:group/example/*` matches every group URN under
//! `/example/`. Matching is case-sensitive. The same rule is applied to
//! action strings (`iam:*` matches `iam:CreateGroup`).

use std::fmt;

/// Scheme prefix shared by every warden URN.
pub const URN_SCHEME: &str = "urn:iws:iam";

/// The resource types a URN can identify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
	User,
	Group,
	Policy,
}

impl fmt::Display for ResourceType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceType::User => write!(f, "user"),
			ResourceType::Group => write!(f, "group"),
			ResourceType::Policy => write!(f, "policy"),
		}
	}
}

/// Compose the canonical URN for a resource.
///
/// `org` may be empty; `path` must start and end with `/` (the caller is
/// expected to have validated it).
pub fn compose(org: &str, resource_type: ResourceType, path: &str, name: &str) -> String {
	format!("{URN_SCHEME}:{org}:{resource_type}{path}{name}")
}

/// Compose the wildcard URN prefix covering every resource of a type under
/// a path prefix.
pub fn compose_prefix(org: &str, resource_type: ResourceType, path_prefix: &str) -> String {
	format!("{URN_SCHEME}:{org}:{resource_type}{path_prefix}*")
}

/// Match a pattern against a value.
///
/// A pattern ending in `*` matches any value starting with the text before
/// the `*`; any other pattern must match exactly. Intermediate wildcards
/// are not supported.
pub fn matches(pattern: &str, value: &str) -> bool {
	match pattern.strip_suffix('*') {
		Some(prefix) => value.starts_with(prefix),
		None => pattern == value,
	}
}

/// Whether two prefix patterns cover any common URN.
///
/// Two patterns overlap iff, after stripping a trailing `*`, one is a
/// string prefix of the other. Used by the list gate to distinguish "caller
/// can see nothing here" from "caller has no grant anywhere near here".
pub fn patterns_overlap(a: &str, b: &str) -> bool {
	let a = a.strip_suffix('*').unwrap_or(a);
	let b = b.strip_suffix('*').unwrap_or(b);
	a.starts_with(b) || b.starts_with(a)
}
