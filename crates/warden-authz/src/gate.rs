// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authorization gate.
//!
//! [`AccessControl`] composes the identity resolver and the evaluator:
//! every API operation asks it "may this caller perform action X on URN
//! Y?" (or the list-filter variant) before any write reaches storage.
//!
//! Admin callers short-circuit: no user lookup, no policy resolution. For
//! everyone else the caller's user record must exist; a missing record is
//! an authorization failure, not a lookup failure.

use std::sync::Arc;

use tracing::instrument;

use warden_core::policy::{Effect, Statement};
use warden_core::{urn, Policy, RequestInfo, User};
use warden_db::{PolicyStore, UserStore};

use crate::error::AuthzError;
use crate::evaluator::{evaluate, filter_allowed, Decision};

/// Authorization gate over the storage ports.
///
/// Holds the stores needed to resolve a caller's effective policies. The
/// gate is stateless: every check re-resolves, so a rename or a policy
/// change is visible to the next call.
pub struct AccessControl {
	users: Arc<dyn UserStore>,
	policies: Arc<dyn PolicyStore>,
}

impl AccessControl {
	/// Create a gate over the given stores.
	pub fn new(users: Arc<dyn UserStore>, policies: Arc<dyn PolicyStore>) -> Self {
		Self { users, policies }
	}

	/// Resolve a caller to its user record and effective policies: the
	/// union of policies attached to every group the user belongs to.
	///
	/// Duplicates are harmless — evaluation is set-semantic.
	#[instrument(skip(self))]
	pub async fn effective_policies(
		&self,
		external_id: &str,
	) -> Result<(User, Vec<Policy>), AuthzError> {
		let user = self
			.users
			.get_user_by_external_id(external_id)
			.await?
			.ok_or_else(|| AuthzError::CallerNotFound(external_id.to_string()))?;

		let groups = self.users.get_groups_by_user_id(&user.id).await?;
		let mut policies = Vec::new();
		for group in &groups {
			policies.extend(self.policies.get_attached_policies(&group.id).await?);
		}

		tracing::debug!(
			external_id,
			groups = groups.len(),
			policies = policies.len(),
			"effective policies resolved"
		);
		Ok((user, policies))
	}

	/// Point check: may the caller perform `action` on `resource_urn`?
	///
	/// Deny and NotApplicable both fail; only an explicit allow (with no
	/// applicable deny) passes.
	#[instrument(skip(self, request), fields(external_id = %request.identifier, admin = request.admin))]
	pub async fn authorize(
		&self,
		request: &RequestInfo,
		action: &str,
		resource_urn: &str,
	) -> Result<(), AuthzError> {
		if request.admin {
			return Ok(());
		}

		let (_, policies) = self.effective_policies(&request.identifier).await?;
		let statements = collect_statements(&policies);

		match evaluate(action, resource_urn, &statements) {
			Decision::Allow => Ok(()),
			Decision::Deny | Decision::NotApplicable => {
				tracing::debug!(action, resource_urn, "access denied");
				Err(AuthzError::NotAllowed {
					external_id: request.identifier.clone(),
					urn: resource_urn.to_string(),
				})
			}
		}
	}

	/// List filter: the subset of `urns` the caller may perform `action`
	/// on.
	///
	/// An empty subset is still a success as long as the caller holds some
	/// allow for this action overlapping the namespace prefix; a caller
	/// with no grant anywhere under `prefix_urn` fails outright, naming
	/// the wildcard URN.
	#[instrument(skip(self, request, urns), fields(external_id = %request.identifier, admin = request.admin, candidates = urns.len()))]
	pub async fn authorize_list(
		&self,
		request: &RequestInfo,
		action: &str,
		prefix_urn: &str,
		urns: Vec<String>,
	) -> Result<Vec<String>, AuthzError> {
		if request.admin {
			return Ok(urns);
		}

		let (_, policies) = self.effective_policies(&request.identifier).await?;
		let statements = collect_statements(&policies);

		let allowed = filter_allowed(action, urns, &statements);
		if allowed.is_empty() && !has_allow_in_namespace(action, prefix_urn, &statements) {
			return Err(AuthzError::NotAllowed {
				external_id: request.identifier.clone(),
				urn: prefix_urn.to_string(),
			});
		}
		Ok(allowed)
	}
}

fn collect_statements(policies: &[Policy]) -> Vec<Statement> {
	policies.iter().flat_map(|p| p.statements.clone()).collect()
}

/// Whether any allow statement for `action` covers some URN under the
/// namespace prefix.
fn has_allow_in_namespace(action: &str, prefix_urn: &str, statements: &[Statement]) -> bool {
	statements.iter().any(|s| {
		s.effect == Effect::Allow
			&& s.actions.iter().any(|a| urn::matches(a, action))
			&& s.resources
				.iter()
				.any(|r| urn::patterns_overlap(r, prefix_urn))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use warden_core::action::*;
	use warden_core::{Effect, Group, ResourceType, Statement};
	use warden_db::testing::create_test_pool;
	use warden_db::{GroupRepository, GroupStore, PolicyRepository, UserRepository};

	struct Fixture {
		users: UserRepository,
		groups: GroupRepository,
		policies: PolicyRepository,
		access: AccessControl,
	}

	async fn fixture() -> Fixture {
		let pool = create_test_pool().await;
		let users = UserRepository::new(pool.clone());
		let groups = GroupRepository::new(pool.clone());
		let policies = PolicyRepository::new(pool);
		let access = AccessControl::new(
			Arc::new(users.clone()) as Arc<dyn UserStore>,
			Arc::new(policies.clone()) as Arc<dyn PolicyStore>,
		);
		Fixture {
			users,
			groups,
			policies,
			access,
		}
	}

	/// Create a user belonging to one group holding one policy with the
	/// given statements.
	async fn seed_caller(f: &Fixture, external_id: &str, statements: Vec<Statement>) {
		let user = User::new(external_id, "/path/");
		let group = Group::new("org1", format!("group-{external_id}"), "/path/");
		let policy = Policy::new(
			"org1",
			format!("policy-{external_id}"),
			"/path/",
			statements,
		);

		f.users.add_user(&user).await.unwrap();
		f.groups.add_group(&group).await.unwrap();
		f.policies.add_policy(&policy).await.unwrap();
		f.groups.add_member(&user.id, &group.id).await.unwrap();
		f.policies.attach_policy(&group.id, &policy.id).await.unwrap();
	}

	fn group_urn(path: &str, name: &str) -> String {
		urn::compose("org1", ResourceType::Group, path, name)
	}

	#[tokio::test]
	async fn admin_bypasses_everything() {
		let f = fixture().await;
		let admin = RequestInfo::new("root", true);

		// No user record exists for "root"; the admin flag alone decides.
		f.access
			.authorize(&admin, GROUP_ACTION_CREATE_GROUP, &group_urn("/x/", "g"))
			.await
			.unwrap();

		let urns = vec![group_urn("/x/", "a"), group_urn("/x/", "b")];
		let listed = f
			.access
			.authorize_list(
				&admin,
				GROUP_ACTION_LIST_GROUPS,
				"urn:iws:iam:org1:group/x/*",
				urns.clone(),
			)
			.await
			.unwrap();
		assert_eq!(listed, urns);
	}

	#[tokio::test]
	async fn missing_caller_is_unauthorized() {
		let f = fixture().await;
		let request = RequestInfo::new("123456", false);

		let err = f
			.access
			.authorize(&request, GROUP_ACTION_CREATE_GROUP, &group_urn("/x/", "g"))
			.await
			.unwrap_err();
		assert_eq!(
			err.to_string(),
			"Authenticated user with externalId 123456 not found. Unable to retrieve permissions."
		);
	}

	#[tokio::test]
	async fn allow_through_group_policy() {
		let f = fixture().await;
		seed_caller(
			&f,
			"alice",
			vec![Statement::new(
				Effect::Allow,
				[GROUP_ACTION_CREATE_GROUP],
				["urn:iws:iam:org1:group/example/*"],
			)],
		)
		.await;

		let request = RequestInfo::new("alice", false);
		f.access
			.authorize(
				&request,
				GROUP_ACTION_CREATE_GROUP,
				&group_urn("/example/", "group1"),
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn deny_beats_allow_at_the_gate() {
		let f = fixture().await;
		seed_caller(
			&f,
			"bob",
			vec![
				Statement::new(
					Effect::Allow,
					[GROUP_ACTION_CREATE_GROUP],
					["urn:iws:iam:org1:group/test/*"],
				),
				Statement::new(
					Effect::Deny,
					[GROUP_ACTION_CREATE_GROUP],
					["urn:iws:iam:org1:group/test/asd*"],
				),
			],
		)
		.await;

		let request = RequestInfo::new("bob", false);
		let err = f
			.access
			.authorize(
				&request,
				GROUP_ACTION_CREATE_GROUP,
				&group_urn("/test/asd/", "g"),
			)
			.await
			.unwrap_err();
		assert!(err
			.to_string()
			.contains("urn:iws:iam:org1:group/test/asd/g"));

		// Outside the denied subtree the allow still holds.
		f.access
			.authorize(
				&request,
				GROUP_ACTION_CREATE_GROUP,
				&group_urn("/test/ok/", "g"),
			)
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn not_applicable_is_unauthorized() {
		let f = fixture().await;
		seed_caller(&f, "carol", vec![]).await;

		let request = RequestInfo::new("carol", false);
		let err = f
			.access
			.authorize(&request, GROUP_ACTION_GET_GROUP, &group_urn("/x/", "g"))
			.await
			.unwrap_err();
		assert!(matches!(err, AuthzError::NotAllowed { .. }));
	}

	#[tokio::test]
	async fn list_filter_returns_visible_subset() {
		let f = fixture().await;
		seed_caller(
			&f,
			"dave",
			vec![Statement::new(
				Effect::Allow,
				[GROUP_ACTION_LIST_GROUPS],
				["urn:iws:iam:org1:group/path/*"],
			)],
		)
		.await;

		let request = RequestInfo::new("dave", false);
		let urns = vec![
			group_urn("/path/", "a"),
			group_urn("/elsewhere/", "b"),
			group_urn("/path/", "c"),
		];
		let listed = f
			.access
			.authorize_list(
				&request,
				GROUP_ACTION_LIST_GROUPS,
				"urn:iws:iam:org1:group/*",
				urns,
			)
			.await
			.unwrap();
		assert_eq!(listed, vec![group_urn("/path/", "a"), group_urn("/path/", "c")]);
	}

	#[tokio::test]
	async fn empty_subset_succeeds_when_namespace_overlaps() {
		let f = fixture().await;
		seed_caller(
			&f,
			"erin",
			vec![Statement::new(
				Effect::Allow,
				[GROUP_ACTION_LIST_GROUPS],
				["urn:iws:iam:org1:group/path/deep/*"],
			)],
		)
		.await;

		let request = RequestInfo::new("erin", false);
		// Candidates all live outside the caller's subtree, but the grant
		// overlaps the listed namespace, so this is an empty page, not a
		// failure.
		let listed = f
			.access
			.authorize_list(
				&request,
				GROUP_ACTION_LIST_GROUPS,
				"urn:iws:iam:org1:group/path/*",
				vec![group_urn("/path/other/", "x")],
			)
			.await
			.unwrap();
		assert!(listed.is_empty());
	}

	#[tokio::test]
	async fn fully_blocked_namespace_fails_with_wildcard_urn() {
		let f = fixture().await;
		seed_caller(
			&f,
			"frank",
			vec![Statement::new(
				Effect::Allow,
				[GROUP_ACTION_LIST_GROUPS],
				["urn:iws:iam:org2:group/*"],
			)],
		)
		.await;

		let request = RequestInfo::new("frank", false);
		let err = f
			.access
			.authorize_list(
				&request,
				GROUP_ACTION_LIST_GROUPS,
				"urn:iws:iam:org1:group/path/*",
				vec![group_urn("/path/", "a")],
			)
			.await
			.unwrap_err();
		assert!(err.to_string().contains("urn:iws:iam:org1:group/path/*"));
	}

	#[tokio::test]
	async fn policies_union_across_groups() {
		let f = fixture().await;

		let user = User::new("grace", "/path/");
		f.users.add_user(&user).await.unwrap();

		for (i, resource) in ["urn:iws:iam:org1:group/a/*", "urn:iws:iam:org1:group/b/*"]
			.iter()
			.enumerate()
		{
			let group = Group::new("org1", format!("g{i}"), "/path/");
			let policy = Policy::new(
				"org1",
				format!("p{i}"),
				"/path/",
				vec![Statement::new(
					Effect::Allow,
					[GROUP_ACTION_GET_GROUP],
					[*resource],
				)],
			);
			f.groups.add_group(&group).await.unwrap();
			f.policies.add_policy(&policy).await.unwrap();
			f.groups.add_member(&user.id, &group.id).await.unwrap();
			f.policies.attach_policy(&group.id, &policy.id).await.unwrap();
		}

		let request = RequestInfo::new("grace", false);
		f.access
			.authorize(&request, GROUP_ACTION_GET_GROUP, &group_urn("/a/", "x"))
			.await
			.unwrap();
		f.access
			.authorize(&request, GROUP_ACTION_GET_GROUP, &group_urn("/b/", "y"))
			.await
			.unwrap();
	}
}
