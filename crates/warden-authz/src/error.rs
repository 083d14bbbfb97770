// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use warden_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
	/// The authenticated caller has no user record, so no permissions can
	/// be resolved for it.
	#[error("Authenticated user with externalId {0} not found. Unable to retrieve permissions.")]
	CallerNotFound(String),

	/// The caller's effective policies do not allow the action on the
	/// resource (either an explicit deny, or no applicable allow).
	#[error("User with externalId {external_id} is not allowed to access to resource {urn}")]
	NotAllowed { external_id: String, urn: String },

	/// The storage layer failed while resolving permissions.
	#[error(transparent)]
	Store(#[from] DbError),
}

pub type Result<T> = std::result::Result<T, AuthzError>;
