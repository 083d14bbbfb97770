// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Caller identification at the edge.
//!
//! The authenticator's only contract is: given a request, produce the
//! caller's external id and whether it is an admin. This implementation
//! reads the id from the `X-External-Id` header and consults the
//! configured admin whitelist; OIDC or basic-auth frontends slot in
//! behind the same trait.

use http::HeaderMap;

use warden_core::RequestInfo;

/// Header carrying the caller's external identifier.
pub const EXTERNAL_ID_HEADER: &str = "x-external-id";

/// Extracts the caller identity from a request.
pub trait Authenticator: Send + Sync {
	/// Returns the caller's request context, or `None` when the request
	/// carries no usable identity.
	fn retrieve_request_info(&self, headers: &HeaderMap) -> Option<RequestInfo>;
}

/// Header-based authenticator with a static admin whitelist.
#[derive(Debug, Clone)]
pub struct HeaderAuthenticator {
	admin_external_ids: Vec<String>,
}

impl HeaderAuthenticator {
	/// Create an authenticator treating the given external ids as admins.
	pub fn new(admin_external_ids: Vec<String>) -> Self {
		Self { admin_external_ids }
	}
}

impl Authenticator for HeaderAuthenticator {
	fn retrieve_request_info(&self, headers: &HeaderMap) -> Option<RequestInfo> {
		let external_id = headers.get(EXTERNAL_ID_HEADER)?.to_str().ok()?.trim();
		if external_id.is_empty() {
			return None;
		}
		let admin = self.admin_external_ids.iter().any(|id| id == external_id);
		Some(RequestInfo::new(external_id, admin))
	}
}
