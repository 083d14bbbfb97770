// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller identity carried through every API operation.

use serde::{Deserialize, Serialize};

/// The authenticated caller of an API operation.
///
/// Populated by the edge authenticator: `identifier` is the caller's
/// external id, and `admin` is true when the caller is on the configured
/// admin whitelist. Admin callers bypass the authorization gate entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestInfo {
	/// External identifier of the caller.
	pub identifier: String,

	/// Whether the caller bypasses authorization.
	pub admin: bool,
}

impl RequestInfo {
	/// Creates a request context for a caller.
	pub fn new(identifier: impl Into<String>, admin: bool) -> Self {
		Self {
			identifier: identifier.into(),
			admin,
		}
	}
}
