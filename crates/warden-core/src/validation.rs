// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lexical validation for API inputs.
//!
//! Validation is a pure function of its input: same input, same verdict.
//! The API layer turns every failure here into an
//! `INVALID_PARAMETER_ERROR` naming the offending field and value.

use regex::Regex;
use std::sync::LazyLock;

use crate::urn::URN_SCHEME;

/// Maximum length accepted for entity names.
pub const MAX_NAME_LENGTH: usize = 128;
/// Maximum length accepted for organization identifiers.
pub const MAX_ORG_LENGTH: usize = 64;
/// Maximum length accepted for external user identifiers.
pub const MAX_EXTERNAL_ID_LENGTH: usize = 128;
/// Maximum length accepted for resource paths.
pub const MAX_PATH_LENGTH: usize = 512;

/// Maximum page size a caller may request.
pub const MAX_LIMIT: usize = 1000;
/// Page size applied when the caller passes `limit = 0`.
pub const DEFAULT_LIMIT: usize = 20;

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-]+$").unwrap());

static ORG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static EXTERNAL_ID_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-:\.@]+$").unwrap());

static PATH_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^/(?:[a-zA-Z0-9_\-]+/)*$").unwrap());

static ACTION_PATTERN_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_\-]+:(?:[a-zA-Z0-9_\-]+\*?|\*)$").unwrap());

/// Validate an entity name: `[a-zA-Z0-9_-]+`, 1-128 chars.
pub fn is_valid_name(name: &str) -> bool {
	!name.is_empty() && name.len() <= MAX_NAME_LENGTH && NAME_REGEX.is_match(name)
}

/// Validate an organization id: `[a-zA-Z0-9]+`, 1-64 chars.
pub fn is_valid_org(org: &str) -> bool {
	!org.is_empty() && org.len() <= MAX_ORG_LENGTH && ORG_REGEX.is_match(org)
}

/// Validate an external user identifier: `[a-zA-Z0-9_\-:.@]+`.
pub fn is_valid_external_id(external_id: &str) -> bool {
	!external_id.is_empty()
		&& external_id.len() <= MAX_EXTERNAL_ID_LENGTH
		&& EXTERNAL_ID_REGEX.is_match(external_id)
}

/// Validate a resource path: starts and ends with `/`, inner segments
/// `[a-zA-Z0-9_-]+`.
pub fn is_valid_path(path: &str) -> bool {
	path.len() <= MAX_PATH_LENGTH && PATH_REGEX.is_match(path)
}

/// Validate a path prefix: same rules as a path, but empty is allowed.
pub fn is_valid_path_prefix(path_prefix: &str) -> bool {
	path_prefix.is_empty() || is_valid_path(path_prefix)
}

/// Validate an action pattern as it appears in a policy statement:
/// colon-delimited, optionally ending in a `*` wildcard segment.
pub fn is_valid_action_pattern(action: &str) -> bool {
	ACTION_PATTERN_REGEX.is_match(action)
}

/// Validate a resource pattern as it appears in a policy statement: a
/// well-formed URN, optionally ending in a single trailing `*`.
pub fn is_valid_resource_pattern(resource: &str) -> bool {
	let body = resource.strip_suffix('*').unwrap_or(resource);
	if body.contains('*') {
		return false;
	}
	let Some(rest) = body.strip_prefix(&format!("{URN_SCHEME}:")) else {
		return false;
	};
	// <org>:<type><path...>
	let Some((org, resource_part)) = rest.split_once(':') else {
		return false;
	};
	if !org.is_empty() && !is_valid_org(org) {
		return false;
	}
	!resource_part.is_empty()
}
