// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group operations: CRUD, memberships and policy attachments.

use std::sync::Arc;

use tracing::instrument;

use warden_core::action::*;
use warden_core::{urn, validation, Filter, Group, RequestInfo, ResourceType};
use warden_authz::AccessControl;
use warden_db::{DbError, GroupStore, PolicyStore, UserStore};

use crate::error::ApiError;
use crate::pagination::{page_params, paginate};
use crate::response::{GroupIdentity, PolicyIdentity};

/// The group API surface.
///
/// Every operation validates, resolves its target, authorizes the caller
/// through the gate, and only then touches storage.
pub struct GroupApi {
	users: Arc<dyn UserStore>,
	groups: Arc<dyn GroupStore>,
	policies: Arc<dyn PolicyStore>,
	access: Arc<AccessControl>,
}

impl GroupApi {
	/// Create the group API over the given stores and gate.
	pub fn new(
		users: Arc<dyn UserStore>,
		groups: Arc<dyn GroupStore>,
		policies: Arc<dyn PolicyStore>,
		access: Arc<AccessControl>,
	) -> Self {
		Self {
			users,
			groups,
			policies,
			access,
		}
	}

	/// Create a group.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn add_group(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
		path: &str,
	) -> Result<Group, ApiError> {
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_path(path) {
			return Err(ApiError::invalid_parameter("path", path));
		}

		if self.groups.get_group_by_name(org, name).await?.is_some() {
			return Err(ApiError::group_already_exist(org, name));
		}

		let group = Group::new(org, name, path);
		self.access
			.authorize(request, GROUP_ACTION_CREATE_GROUP, &group.urn)
			.await?;

		self.groups.add_group(&group).await.map_err(|e| match e {
			DbError::Conflict(_) => ApiError::group_already_exist(org, name),
			other => ApiError::from(other),
		})?;

		Ok(group)
	}

	/// Fetch a group by organization and name.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn get_group_by_name(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
	) -> Result<Group, ApiError> {
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(name) {
			return Err(ApiError::invalid_parameter("name", name));
		}

		let group = self
			.groups
			.get_group_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, name))?;

		self.access
			.authorize(request, GROUP_ACTION_GET_GROUP, &group.urn)
			.await?;

		Ok(group)
	}

	/// List group identities, restricted to what the caller may see.
	///
	/// The returned total is the size of the authorized subset.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_groups(
		&self,
		request: &RequestInfo,
		filter: &Filter,
	) -> Result<(Vec<GroupIdentity>, usize), ApiError> {
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

		let (groups, _) = self
			.groups
			.get_groups_filtered(org, Some(effective_prefix), limit as i64, offset as i64)
			.await?;

		let prefix_urn =
			urn::compose_prefix(org.unwrap_or(""), ResourceType::Group, effective_prefix);
		let urns = groups.iter().map(|g| g.urn.clone()).collect();
		let allowed = self
			.access
			.authorize_list(request, GROUP_ACTION_LIST_GROUPS, &prefix_urn, urns)
			.await?;

		let identities: Vec<GroupIdentity> = groups
			.iter()
			.filter(|g| allowed.iter().any(|u| u == &g.urn))
			.map(GroupIdentity::from)
			.collect();
		let total = identities.len();
		Ok((identities, total))
	}

	/// Rename and/or move a group, regenerating its URN.
	///
	/// The caller must hold the update permission on both the current and
	/// the prospective URN.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn update_group(
		&self,
		request: &RequestInfo,
		org: &str,
		name: &str,
		new_name: &str,
		new_path: &str,
	) -> Result<Group, ApiError> {
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

		let group = self
			.groups
			.get_group_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, name))?;

		self.access
			.authorize(request, GROUP_ACTION_UPDATE_GROUP, &group.urn)
			.await?;

		let updated = group.renamed(new_name, new_path);
		self.access
			.authorize(request, GROUP_ACTION_UPDATE_GROUP, &updated.urn)
			.await?;

		if let Some(existing) = self.groups.get_group_by_name(org, new_name).await? {
			if existing.id != group.id {
				return Err(ApiError::group_already_exist(org, new_name));
			}
		}

		self.groups
			.update_group(&updated)
			.await
			.map_err(|e| match e {
				DbError::Conflict(_) => ApiError::group_already_exist(org, new_name),
				other => ApiError::from(other),
			})?;

		Ok(updated)
	}

	/// Delete a group, cascading its memberships and attachments.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn remove_group(
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

		let group = self
			.groups
			.get_group_by_name(org, name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, name))?;

		self.access
			.authorize(request, GROUP_ACTION_DELETE_GROUP, &group.urn)
			.await?;

		self.groups.remove_group(&group.id).await?;
		Ok(())
	}

	/// Add a user to a group.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn add_member(
		&self,
		request: &RequestInfo,
		external_id: &str,
		group_name: &str,
		org: &str,
	) -> Result<(), ApiError> {
		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}
		if !validation::is_valid_name(group_name) {
			return Err(ApiError::invalid_parameter("name", group_name));
		}
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}

		let group = self
			.groups
			.get_group_by_name(org, group_name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, group_name))?;
		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| ApiError::user_not_found(external_id))?;

		self.access
			.authorize(request, GROUP_ACTION_ADD_MEMBER, &group.urn)
			.await?;

		if self.groups.is_member_of_group(&user.id, &group.id).await? {
			return Err(ApiError::user_is_already_a_member(
				external_id,
				org,
				group_name,
			));
		}

		self.groups
			.add_member(&user.id, &group.id)
			.await
			.map_err(|e| match e {
				DbError::Conflict(_) => {
					ApiError::user_is_already_a_member(external_id, org, group_name)
				}
				other => ApiError::from(other),
			})?;

		Ok(())
	}

	/// Remove a user from a group.
	///
	/// Beyond the group-side permission this also requires the caller to
	/// be able to read the member being removed.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn remove_member(
		&self,
		request: &RequestInfo,
		external_id: &str,
		group_name: &str,
		org: &str,
	) -> Result<(), ApiError> {
		if !validation::is_valid_external_id(external_id) {
			return Err(ApiError::invalid_parameter("externalId", external_id));
		}
		if !validation::is_valid_name(group_name) {
			return Err(ApiError::invalid_parameter("name", group_name));
		}
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}

		let group = self
			.groups
			.get_group_by_name(org, group_name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, group_name))?;
		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| ApiError::user_not_found(external_id))?;

		self.access
			.authorize(request, GROUP_ACTION_REMOVE_MEMBER, &group.urn)
			.await?;
		self.access
			.authorize(request, USER_ACTION_GET_USER, &user.urn)
			.await?;

		if !self.groups.is_member_of_group(&user.id, &group.id).await? {
			return Err(ApiError::user_is_not_a_member(external_id, org, group_name));
		}

		self.groups.remove_member(&user.id, &group.id).await?;
		Ok(())
	}

	/// List the external ids of a group's members.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_members(
		&self,
		request: &RequestInfo,
		filter: &Filter,
	) -> Result<(Vec<String>, usize), ApiError> {
		let (limit, offset) = page_params(filter)?;

		let org = filter.org.as_deref().unwrap_or("");
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		let group_name = filter.group_name.as_deref().unwrap_or("");
		if !validation::is_valid_name(group_name) {
			return Err(ApiError::invalid_parameter("name", group_name));
		}

		let group = self
			.groups
			.get_group_by_name(org, group_name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, group_name))?;

		self.access
			.authorize(request, GROUP_ACTION_LIST_MEMBERS, &group.urn)
			.await?;

		let members = self.groups.get_group_members(&group.id).await?;
		let total = members.len();
		let external_ids: Vec<String> = paginate(&members, limit, offset)
			.into_iter()
			.map(|u| u.external_id)
			.collect();
		Ok((external_ids, total))
	}

	/// Attach a policy to a group.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn attach_policy_to_group(
		&self,
		request: &RequestInfo,
		org: &str,
		group_name: &str,
		policy_name: &str,
	) -> Result<(), ApiError> {
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(group_name) {
			return Err(ApiError::invalid_parameter("name", group_name));
		}
		if !validation::is_valid_name(policy_name) {
			return Err(ApiError::invalid_parameter("name", policy_name));
		}

		let group = self
			.groups
			.get_group_by_name(org, group_name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, group_name))?;
		let policy = self
			.policies
			.get_policy_by_name(org, policy_name)
			.await?
			.ok_or_else(|| ApiError::policy_not_found(org, policy_name))?;

		self.access
			.authorize(request, GROUP_ACTION_ATTACH_GROUP_POLICY, &group.urn)
			.await?;

		if self
			.policies
			.is_attached_to_group(&group.id, &policy.id)
			.await?
		{
			return Err(ApiError::policy_is_already_attached(
				org,
				policy_name,
				group_name,
			));
		}

		self.policies
			.attach_policy(&group.id, &policy.id)
			.await
			.map_err(|e| match e {
				DbError::Conflict(_) => {
					ApiError::policy_is_already_attached(org, policy_name, group_name)
				}
				other => ApiError::from(other),
			})?;

		Ok(())
	}

	/// Detach a policy from a group.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn detach_policy_from_group(
		&self,
		request: &RequestInfo,
		org: &str,
		group_name: &str,
		policy_name: &str,
	) -> Result<(), ApiError> {
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		if !validation::is_valid_name(group_name) {
			return Err(ApiError::invalid_parameter("name", group_name));
		}
		if !validation::is_valid_name(policy_name) {
			return Err(ApiError::invalid_parameter("name", policy_name));
		}

		let group = self
			.groups
			.get_group_by_name(org, group_name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, group_name))?;
		let policy = self
			.policies
			.get_policy_by_name(org, policy_name)
			.await?
			.ok_or_else(|| ApiError::policy_not_found(org, policy_name))?;

		self.access
			.authorize(request, GROUP_ACTION_DETACH_GROUP_POLICY, &group.urn)
			.await?;

		if !self
			.policies
			.is_attached_to_group(&group.id, &policy.id)
			.await?
		{
			return Err(ApiError::policy_is_not_attached(
				org,
				policy_name,
				group_name,
			));
		}

		self.policies.detach_policy(&group.id, &policy.id).await?;
		Ok(())
	}

	/// List the identities of the policies attached to a group.
	#[instrument(skip(self, request), fields(requester = %request.identifier))]
	pub async fn list_attached_group_policies(
		&self,
		request: &RequestInfo,
		filter: &Filter,
	) -> Result<(Vec<PolicyIdentity>, usize), ApiError> {
		let (limit, offset) = page_params(filter)?;

		let org = filter.org.as_deref().unwrap_or("");
		if !validation::is_valid_org(org) {
			return Err(ApiError::invalid_parameter("org", org));
		}
		let group_name = filter.group_name.as_deref().unwrap_or("");
		if !validation::is_valid_name(group_name) {
			return Err(ApiError::invalid_parameter("name", group_name));
		}

		let group = self
			.groups
			.get_group_by_name(org, group_name)
			.await?
			.ok_or_else(|| ApiError::group_not_found(org, group_name))?;

		self.access
			.authorize(
				request,
				GROUP_ACTION_LIST_ATTACHED_GROUP_POLICIES,
				&group.urn,
			)
			.await?;

		let attached = self.policies.get_attached_policies(&group.id).await?;
		let total = attached.len();
		let identities: Vec<PolicyIdentity> = paginate(&attached, limit, offset)
			.iter()
			.map(PolicyIdentity::from)
			.collect();
		Ok((identities, total))
	}
}
