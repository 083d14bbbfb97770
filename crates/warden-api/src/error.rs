// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The API error taxonomy.
//!
//! Every failure an operation can produce is one of these codes plus a
//! human-readable message carrying literal context (external id, URN,
//! org/name pair). Lower layers are translated here: gate failures become
//! `UNAUTHORIZED_RESOURCES_ERROR`, storage conflicts become the
//! appropriate `*_ALREADY_EXIST` at the call site, and anything else from
//! storage becomes `UNKNOWN_API_ERROR`.

use serde::{Deserialize, Serialize};
use std::fmt;

use warden_authz::AuthzError;
use warden_db::DbError;

/// Error codes returned by the resource API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiErrorCode {
	/// Input failed lexical or range validation.
	InvalidParameterError,
	/// Target user does not exist.
	UserByExternalIdNotFound,
	/// Target group does not exist.
	GroupByOrgAndNameNotFound,
	/// Target policy does not exist.
	PolicyByOrgAndNameNotFound,
	/// User uniqueness violated.
	UserAlreadyExist,
	/// Group `(org, name)` uniqueness violated.
	GroupAlreadyExist,
	/// Policy `(org, name)` uniqueness violated.
	PolicyAlreadyExist,
	/// Membership precondition failed on add.
	UserIsAlreadyAMemberOfGroup,
	/// Membership precondition failed on remove.
	UserIsNotAMemberOfGroup,
	/// Attachment precondition failed on attach.
	PolicyIsAlreadyAttachedToGroup,
	/// Attachment precondition failed on detach.
	PolicyIsNotAttachedToGroup,
	/// Caller unknown or policy-denied.
	UnauthorizedResourcesError,
	/// Storage or other unclassified internal fault.
	UnknownApiError,
}

impl fmt::Display for ApiErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let code = match self {
			ApiErrorCode::InvalidParameterError => "INVALID_PARAMETER_ERROR",
			ApiErrorCode::UserByExternalIdNotFound => "USER_BY_EXTERNAL_ID_NOT_FOUND",
			ApiErrorCode::GroupByOrgAndNameNotFound => "GROUP_BY_ORG_AND_NAME_NOT_FOUND",
			ApiErrorCode::PolicyByOrgAndNameNotFound => "POLICY_BY_ORG_AND_NAME_NOT_FOUND",
			ApiErrorCode::UserAlreadyExist => "USER_ALREADY_EXIST",
			ApiErrorCode::GroupAlreadyExist => "GROUP_ALREADY_EXIST",
			ApiErrorCode::PolicyAlreadyExist => "POLICY_ALREADY_EXIST",
			ApiErrorCode::UserIsAlreadyAMemberOfGroup => "USER_IS_ALREADY_A_MEMBER_OF_GROUP",
			ApiErrorCode::UserIsNotAMemberOfGroup => "USER_IS_NOT_A_MEMBER_OF_GROUP",
			ApiErrorCode::PolicyIsAlreadyAttachedToGroup => "POLICY_IS_ALREADY_ATTACHED_TO_GROUP",
			ApiErrorCode::PolicyIsNotAttachedToGroup => "POLICY_IS_NOT_ATTACHED_TO_GROUP",
			ApiErrorCode::UnauthorizedResourcesError => "UNAUTHORIZED_RESOURCES_ERROR",
			ApiErrorCode::UnknownApiError => "UNKNOWN_API_ERROR",
		};
		write!(f, "{code}")
	}
}

/// The error envelope every operation returns to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct ApiError {
	pub code: ApiErrorCode,
	pub message: String,
}

impl ApiError {
	/// Create an error from a code and message.
	pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
		Self {
			code,
			message: message.into(),
		}
	}

	/// `INVALID_PARAMETER_ERROR` naming the offending field and value.
	pub fn invalid_parameter(field: &str, value: impl fmt::Display) -> Self {
		Self::new(
			ApiErrorCode::InvalidParameterError,
			format!("Invalid parameter: {field} {value}"),
		)
	}

	/// `INVALID_PARAMETER_ERROR` for an over-limit page size.
	pub fn invalid_limit(limit: usize, max: usize) -> Self {
		Self::new(
			ApiErrorCode::InvalidParameterError,
			format!("Invalid parameter: limit {limit}, max limit allowed: {max}"),
		)
	}

	pub fn user_not_found(external_id: &str) -> Self {
		Self::new(
			ApiErrorCode::UserByExternalIdNotFound,
			format!("User with externalId {external_id} not found"),
		)
	}

	pub fn group_not_found(org: &str, name: &str) -> Self {
		Self::new(
			ApiErrorCode::GroupByOrgAndNameNotFound,
			format!("Group with org {org} and name {name} not found"),
		)
	}

	pub fn policy_not_found(org: &str, name: &str) -> Self {
		Self::new(
			ApiErrorCode::PolicyByOrgAndNameNotFound,
			format!("Policy with org {org} and name {name} not found"),
		)
	}

	pub fn user_already_exist(external_id: &str) -> Self {
		Self::new(
			ApiErrorCode::UserAlreadyExist,
			format!("Unable to create user, user with externalId {external_id} already exists"),
		)
	}

	pub fn group_already_exist(org: &str, name: &str) -> Self {
		Self::new(
			ApiErrorCode::GroupAlreadyExist,
			format!("Unable to create group, group with org {org} and name {name} already exists"),
		)
	}

	pub fn policy_already_exist(org: &str, name: &str) -> Self {
		Self::new(
			ApiErrorCode::PolicyAlreadyExist,
			format!("Unable to create policy, policy with org {org} and name {name} already exists"),
		)
	}

	pub fn user_is_already_a_member(external_id: &str, org: &str, name: &str) -> Self {
		Self::new(
			ApiErrorCode::UserIsAlreadyAMemberOfGroup,
			format!(
				"User with externalId {external_id} is already a member of group with org {org} and name {name}"
			),
		)
	}

	pub fn user_is_not_a_member(external_id: &str, org: &str, name: &str) -> Self {
		Self::new(
			ApiErrorCode::UserIsNotAMemberOfGroup,
			format!(
				"User with externalId {external_id} is not a member of group with org {org} and name {name}"
			),
		)
	}

	pub fn policy_is_already_attached(org: &str, policy_name: &str, group_name: &str) -> Self {
		Self::new(
			ApiErrorCode::PolicyIsAlreadyAttachedToGroup,
			format!(
				"Policy with org {org} and name {policy_name} is already attached to group with name {group_name}"
			),
		)
	}

	pub fn policy_is_not_attached(org: &str, policy_name: &str, group_name: &str) -> Self {
		Self::new(
			ApiErrorCode::PolicyIsNotAttachedToGroup,
			format!(
				"Policy with org {org} and name {policy_name} is not attached to group with name {group_name}"
			),
		)
	}

	/// `UNKNOWN_API_ERROR` wrapping an internal fault.
	pub fn unknown(err: impl fmt::Display) -> Self {
		Self::new(ApiErrorCode::UnknownApiError, err.to_string())
	}
}

impl From<AuthzError> for ApiError {
	fn from(err: AuthzError) -> Self {
		match err {
			AuthzError::CallerNotFound(_) | AuthzError::NotAllowed { .. } => {
				Self::new(ApiErrorCode::UnauthorizedResourcesError, err.to_string())
			}
			AuthzError::Store(db) => Self::from(db),
		}
	}
}

impl From<DbError> for ApiError {
	fn from(err: DbError) -> Self {
		Self::unknown(err)
	}
}
