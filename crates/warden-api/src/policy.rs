// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy operations: CRUD, statement validation and attachment lookups.

use std::sync::Arc;

use tracing::instrument;

use warden_core::action::*;
use warden_core::{urn, validation, Filter, Policy, RequestInfo, ResourceType, Statement};
use warden_authz::AccessControl;
use warden_db::{DbError, PolicyStore};

use crate::error::ApiError;
use crate::pagination::{page_params, paginate};
use crate::response::{GroupIdentity, PolicyIdentity};

/// The policy API surface.
pub struct PolicyApi {
	policies: Arc<dyn PolicyStore>,
	access: Arc<AccessControl>,
}

impl PolicyApi {
	/// Create the policy API over the given store and gate.
	pub fn new(policies: Arc<dyn PolicyStore>, access: Arc<AccessControl>) -> Self {
		Self { policies, access }
	}

	/// Create a policy.
	///
	/// Statements are validated lexically: a recognized effect, well-formed
	/// action patterns and well-formed resource URN patterns.
	#[instrument(skip(self, request, statements), fields(requester = %request.identifier))]
	pub async fn add_policy(
		&self,
		request: &RequestInfo,
		name: &str,
		path: &str,
		org: &str,
		statements: Vec<Statement>,
	) -> Result<Policy, ApiError> {
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_path(path) {
			return Err(ApiError::invalid_parameter("path", path));
		}
		validate_statements(&statements)?;

		if self.policies.get_policy_by_name(org, name).await?.is_some() {
			return Err(ApiError::policy_already_exist(org, name));
		}

		let policy = Policy::new(org, name, path, statements);
		self.access
			.authorize(request, POLICY_ACTION_CREATE_POLICY, &policy.urn)
			.await?;

		self.policies
			.add_policy(&policy)
			.await
			.map_err(|e| match e {
				DbError::Conflict(_) => ApiError::policy_already_exist(org, name),
				other => ApiError::from(other),
			})?;

		Ok(policy)
	}

	/// Fetch a policy by organization and name.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn get_policy_by_name(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
	) -> Result<Policy, ApiError> {
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}

		let policy = self
			.policies
			.get_policy_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::policy_not_found(org, name))?;

		self.access
			.authorize(request, POLICY_ACTION_GET_POLICY, &policy.urn)
			.await?;

		Ok(policy)
	}

	/// List policy identities, restricted to what the caller may see.
	///
	/// The returned total is the size of the authorized subset.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_policies(
		&self,
		request: &RequestInfo,
		filter: &Filter,
	) -> Result<(Vec<PolicyIdentity>, usize), ApiError> {
		let (limit, offset) = page_params(filter)?;

		let org = filter.org.as_deref().filter(|o| !o.is_empty());
		if let Some(org) = org {
			if !validation::is_valid_org(org) {
				return Err(ApiError::invalid_parameter("org", org));
			}
		}
		let path_prefix = filter.path_prefix.as_deref().unwrap_or("");
		if !validation::is_valid_path_prefix(path_prefix) {
			return Err(ApiError::invalid_parameter("pathPrefix", path_prefix));
		}
		let effective_prefix = if path_prefix.is_empty() {
			"/"
		} else {
			path_prefix
		};

		let (policies, _) = self
			.policies
			.get_policies_filtered(org, Some(effective_prefix), limit as i64, offset as i64)
			.await?;

		let prefix_urn =
			urn::compose_prefix(org.unwrap_or(""), ResourceType::Policy, effective_prefix);
		let urns = policies.iter().map(|p| p.urn.clone()).collect();
		let allowed = self
			.access
			.authorize_list(request, POLICY_ACTION_LIST_POLICIES, &prefix_urn, urns)
			.await?;

		let identities: Vec<PolicyIdentity> = policies
			.iter()
			.filter(|p| allowed.iter().any(|u| u == &p.urn))
			.map(PolicyIdentity::from)
			.collect();
		let total = identities.len();
		Ok((identities, total))
	}

	/// Rename, move and/or rewrite a policy, regenerating its URN.
	///
	/// The caller must hold the update permission on both the current and
	/// the prospective URN.
	#[instrument(skip(self, request, new_statements), fields(requester = %request.identifier))]
	pub async fn update_policy(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
		new_name: &str,
		new_path: &str,
		new_statements: Vec<Statement>,
	) -> Result<Policy, ApiError> {
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}
		if !validation::is_valid_name(new_name) {
			return Err(ApiError::invalid_parameter("name", new_name));
		}
		if !validation::is_valid_path(new_path) {
			return Err(ApiError::invalid_parameter("path", new_path));
		}
		validate_statements(&new_statements)?;

		let policy = self
			.policies
			.get_policy_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::policy_not_found(org, name))?;

		self.access
			.authorize(request, POLICY_ACTION_UPDATE_POLICY, &policy.urn)
			.await?;

		let updated = policy.updated(new_name, new_path, new_statements);
		self.access
			.authorize(request, POLICY_ACTION_UPDATE_POLICY, &updated.urn)
			.await?;

		if let Some(existing) = self.policies.get_policy_by_name(org, new_name).await? {
			if existing.id != policy.id {
				return Err(ApiError::policy_already_exist(org, new_name));
			}
		}

		self.policies
			.update_policy(&updated)
			.await
			.map_err(|e| match e {
				DbError::Conflict(_) => ApiError::policy_already_exist(org, new_name),
				other => ApiError::from(other),
			})?;

		Ok(updated)
	}

	/// Delete a policy, cascading its group attachments.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn remove_policy(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
	) -> Result<(), ApiError> {
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}

		let policy = self
			.policies
			.get_policy_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::policy_not_found(org, name))?;

		self.access
			.authorize(request, POLICY_ACTION_DELETE_POLICY, &policy.urn)
			.await?;

		self.policies.remove_policy(&policy.id).await?;
		Ok(())
	}

	/// List the identities of the groups a policy is attached to.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_attached_groups(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
		filter: &Filter,
	) -> Result<(Vec<GroupIdentity>, usize), ApiError> {
		let (limit, offset) = page_params(filter)?;

		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}

		let policy = self
			.policies
			.get_policy_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::policy_not_found(org, name))?;

		self.access
			.authorize(request, POLICY_ACTION_LIST_ATTACHED_GROUPS, &policy.urn)
			.await?;

		let groups = self.policies.get_attached_groups(&policy.id).await?;
		let total = groups.len();
		let identities: Vec<GroupIdentity> = paginate(&groups, limit, offset)
			.iter()
			.map(GroupIdentity::from)
			.collect();
		Ok((identities, total))
	}
}

/// Lexical validation of policy statements.
fn validate_statements(statements: &[Statement]) -> Result<(), ApiError> {
	for statement in statements {
		for action in &statement.actions {
			if !validation::is_valid_action_pattern(action) {
				return Err(ApiError::invalid_parameter("action", action));
			}
		}
		for resource in &statement.resources {
			if !validation::is_valid_resource_pattern(resource) {
				return Err(ApiError::invalid_parameter("resource", resource));
			}
		}
	}
	Ok(())
}
