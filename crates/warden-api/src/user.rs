// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User operations: CRUD and group-membership lookups.

use std::sync::Arc;

use tracing::instrument;

use warden_core::action::*;
use warden_core::{urn, validation, Filter, RequestInfo, ResourceType, User};
use warden_authz::AccessControl;
use warden_db::{DbError, UserStore};

use crate::error::ApiError;
use crate::pagination::{page_params, paginate};
use crate::response::GroupIdentity;

/// The user API surface.
pub struct UserApi {
	users: Arc<dyn UserStore>,
	access: Arc<AccessControl>,
}

impl UserApi {
	/// Create the user API over the given store and gate.
	pub fn new(users: Arc<dyn UserStore>, access: Arc<AccessControl>) -> Self {
		Self { users, access }
	}

	/// Register a user under a path.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn add_user(
		&self,
		request: &RequestInfo,
		external_id: &str,
		path: &str,
	) -> Result<User, ApiError> {
		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}
		if !validation::is_valid_path(path) {
			return Err(ApiError::invalid_parameter("path", path));
		}

		if self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.is_some()
		{
			return Err(ApiError::user_already_exist(external_id));
		}

		let user = User::new(external_id, path);
		self.access
			.authorize(request, USER_ACTION_CREATE_USER, &user.urn)
			.await?;

		self.users.add_user(&user).await.map_err(|e| match e {
			DbError::Conflict(_) => ApiError::user_already_exist(external_id),
			other => ApiError::from(other),
		})?;

		Ok(user)
	}

	/// Fetch a user by external id.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn get_user_by_external_id(
		&self,
		request: &RequestInfo,
		external_id: &str,
	) -> Result<User, ApiError> {
		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}

		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| ApiError::user_not_found(external_id))?;

		self.access
			.authorize(request, USER_ACTION_GET_USER, &user.urn)
			.await?;

		Ok(user)
	}

	/// List user external ids under a path prefix, restricted to what the
	/// caller may see.
	///
	/// The returned total is the size of the authorized subset.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_users(
		&self,
		request: &RequestInfo,
		filter: &Filter,
	) -> Result<(Vec<String>, usize), ApiError> {
		let (limit, offset) = page_params(filter)?;

		let path_prefix = filter.path_prefix.as_deref().unwrap_or("");
		if !validation::is_valid_path_prefix(path_prefix) {
			return Err(ApiError::invalid_parameter("pathPrefix", path_prefix));
		}
		let effective_prefix = if path_prefix.is_empty() {
			"/"
		} else {
			path_prefix
		};

		let (users, _) = self
			.users
			.get_users_filtered(Some(effective_prefix), limit as i64, offset as i64)
			.await?;

		let prefix_urn = urn::compose_prefix("", ResourceType::User, effective_prefix);
		let urns = users.iter().map(|u| u.urn.clone()).collect();
		let allowed = self
			.access
			.authorize_list(request, USER_ACTION_LIST_USERS, &prefix_urn, urns)
			.await?;

		let external_ids: Vec<String> = users
			.iter()
			.filter(|u| allowed.iter().any(|a| a == &u.urn))
			.map(|u| u.external_id.clone())
			.collect();
		let total = external_ids.len();
		Ok((external_ids, total))
	}

	/// Move a user to a new path, regenerating its URN.
	///
	/// The caller must hold the update permission on both the current and
	/// the prospective URN.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn update_user(
		&self,
		request: &RequestInfo,
		external_id: &str,
		new_path: &str,
	) -> Result<User, ApiError> {
		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}
		if !validation::is_valid_path(new_path) {
			return Err(ApiError::invalid_parameter("path", new_path));
		}

		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| ApiError::user_not_found(external_id))?;

		self.access
			.authorize(request, USER_ACTION_UPDATE_USER, &user.urn)
			.await?;

		let updated = user.with_path(new_path);
		self.access
			.authorize(request, USER_ACTION_UPDATE_USER, &updated.urn)
			.await?;

		self.users.update_user(&updated).await?;
		Ok(updated)
	}

	/// Delete a user, cascading its group memberships.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn remove_user(
		&self,
		request: &RequestInfo,
		external_id: &str,
	) -> Result<(), ApiError> {
		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}

		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| ApiError::user_not_found(external_id))?;

		self.access
			.authorize(request, USER_ACTION_DELETE_USER, &user.urn)
			.await?;

		self.users.remove_user(&user.id).await?;
		Ok(())
	}

	/// List the identities of the groups a user belongs to.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_groups_by_user(
		&self,
		request: &RequestInfo,
		external_id: &str,
		filter: &Filter,
	) -> Result<(Vec<GroupIdentity>, usize), ApiError> {
		let (limit, offset) = page_params(filter)?;

		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}

		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| ApiError::user_not_found(external_id))?;

		self.access
			.authorize(request, USER_ACTION_LIST_GROUPS_FOR_USER, &user.urn)
			.await?;

		let groups = self.users.get_groups_by_user_id(&user.id).await?;
		let total = groups.len();
		let identities: Vec<GroupIdentity> = paginate(&groups, limit, offset)
			.iter()
			.map(GroupIdentity::from)
			.collect();
		Ok((identities, total))
	}
}
