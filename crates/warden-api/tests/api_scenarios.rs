// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end scenarios for the gated resource API over in-memory SQLite.

use std::sync::Arc;

use async_trait::async_trait;

use warden_api::{ApiErrorCode, GroupApi, PolicyApi, UserApi};
use warden_authz::AccessControl;
use warden_core::action::*;
use warden_core::{Effect, Filter, Group, Policy, RequestInfo, Statement, User, UserId};
use warden_db::testing::create_test_pool;
use warden_db::{
	DbError, GroupRepository, GroupStore, PolicyRepository, PolicyStore, UserRepository, UserStore,
};

struct TestApp {
	users_repo: UserRepository,
	groups_repo: GroupRepository,
	policies_repo: PolicyRepository,
	users: UserApi,
	groups: GroupApi,
	policies: PolicyApi,
}

impl TestApp {
	async fn new() -> Self {
		let pool = create_test_pool().await;
		let users_repo = UserRepository::new(pool.clone());
		let groups_repo = GroupRepository::new(pool.clone());
		let policies_repo = PolicyRepository::new(pool);

		let users_store: Arc<dyn UserStore> = Arc::new(users_repo.clone());
		let groups_store: Arc<dyn GroupStore> = Arc::new(groups_repo.clone());
		let policies_store: Arc<dyn PolicyStore> = Arc::new(policies_repo.clone());

		let access = Arc::new(AccessControl::new(
			Arc::clone(&users_store),
			Arc::clone(&policies_store),
		));

		Self {
			users_repo,
			groups_repo,
			policies_repo,
			users: UserApi::new(Arc::clone(&users_store), Arc::clone(&access)),
			groups: GroupApi::new(
				Arc::clone(&users_store),
				Arc::clone(&groups_store),
				Arc::clone(&policies_store),
				Arc::clone(&access),
			),
			policies: PolicyApi::new(Arc::clone(&policies_store), access),
		}
	}

	/// Seed a non-admin caller whose single group holds a policy with the
	/// given statements.
	async fn seed_caller(&self, external_id: &str, statements: Vec<Statement>) {
		let user = User::new(external_id, "/callers/");
		let group = Group::new("callers", format!("group-{external_id}"), "/callers/");
		let policy = Policy::new(
			"callers",
			format!("policy-{external_id}"),
			"/callers/",
			statements,
		);

		self.users_repo.add_user(&user).await.unwrap();
		self.groups_repo.add_group(&group).await.unwrap();
		self.policies_repo.add_policy(&policy).await.unwrap();
		self.groups_repo.add_member(&user.id, &group.id).await.unwrap();
		self.policies_repo
			.attach_policy(&group.id, &policy.id)
			.await
			.unwrap();
	}
}

fn admin() -> RequestInfo {
	RequestInfo::new("123456", true)
}

fn caller(external_id: &str) -> RequestInfo {
	RequestInfo::new(external_id, false)
}

fn allow(actions: &[&str], resources: &[&str]) -> Statement {
	Statement::new(Effect::Allow, actions.iter().copied(), resources.iter().copied())
}

fn deny(actions: &[&str], resources: &[&str]) -> Statement {
	Statement::new(Effect::Deny, actions.iter().copied(), resources.iter().copied())
}

// ============================================================================
// Group scenarios
// ============================================================================

#[tokio::test]
async fn admin_creates_group() {
	let app = TestApp::new().await;

	let group = app
		.groups
		.add_group(&admin(), "org1", "group1", "/example/")
		.await
		.unwrap();

	assert_eq!(group.org, "org1");
	assert_eq!(group.name, "group1");
	assert_eq!(group.path, "/example/");
	assert_eq!(group.urn, "urn:iws:iam:org1:group/example/group1");
}

#[tokio::test]
async fn non_admin_with_allow_creates_group() {
	let app = TestApp::new().await;
	app.seed_caller(
		"alice",
		vec![allow(
			&[GROUP_ACTION_CREATE_GROUP],
			&["urn:iws:iam:org1:group/example/*"],
		)],
	)
	.await;

	let group = app
		.groups
		.add_group(&caller("alice"), "org1", "group1", "/example/")
		.await
		.unwrap();
	assert_eq!(group.urn, "urn:iws:iam:org1:group/example/group1");
}

#[tokio::test]
async fn explicit_deny_beats_allow() {
	let app = TestApp::new().await;
	app.seed_caller(
		"bob",
		vec![
			allow(
				&[GROUP_ACTION_CREATE_GROUP],
				&["urn:iws:iam:org1:group/test/*"],
			),
			deny(
				&[GROUP_ACTION_CREATE_GROUP],
				&["urn:iws:iam:org1:group/test/asd*"],
			),
		],
	)
	.await;

	let err = app
		.groups
		.add_group(&caller("bob"), "org1", "g", "/test/asd/")
		.await
		.unwrap_err();

	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
	assert!(
		err.message.contains("urn:iws:iam:org1:group/test/asd/g"),
		"got: {}",
		err.message
	);
}

#[tokio::test]
async fn missing_caller_is_unauthorized_with_fixed_message() {
	let app = TestApp::new().await;

	let err = app
		.groups
		.add_group(&caller("123456"), "org1", "group1", "/example/")
		.await
		.unwrap_err();

	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
	assert_eq!(
		err.message,
		"Authenticated user with externalId 123456 not found. Unable to retrieve permissions."
	);
}

#[tokio::test]
async fn duplicate_group_reports_already_exist() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "group1", "/example/")
		.await
		.unwrap();

	let err = app
		.groups
		.add_group(&admin(), "org1", "group1", "/example/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::GroupAlreadyExist);
	assert_eq!(
		err.message,
		"Unable to create group, group with org org1 and name group1 already exists"
	);
}

#[tokio::test]
async fn existence_check_precedes_authorization() {
	// Error precedence: the already-exists check fires before caller
	// resolution, so an unknown caller probing a taken name sees the
	// conflict, not the authorization failure.
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "taken", "/example/")
		.await
		.unwrap();

	let err = app
		.groups
		.add_group(&caller("ghost"), "org1", "taken", "/example/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::GroupAlreadyExist);
}

#[tokio::test]
async fn rename_collision_reports_already_exist() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "g1", "/old/")
		.await
		.unwrap();
	app.groups
		.add_group(&admin(), "org1", "g2", "/old/")
		.await
		.unwrap();

	let err = app
		.groups
		.update_group(&admin(), "org1", "g1", "g2", "/new/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::GroupAlreadyExist);
}

#[tokio::test]
async fn rename_to_same_name_is_not_a_collision() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "g1", "/old/")
		.await
		.unwrap();

	let updated = app
		.groups
		.update_group(&admin(), "org1", "g1", "g1", "/new/")
		.await
		.unwrap();
	assert_eq!(updated.urn, "urn:iws:iam:org1:group/new/g1");
}

#[tokio::test]
async fn rename_requires_permission_on_both_urns() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "g1", "/from/")
		.await
		.unwrap();

	// Grant covers the current URN only; the prospective URN is outside.
	app.seed_caller(
		"carol",
		vec![allow(
			&[GROUP_ACTION_UPDATE_GROUP],
			&["urn:iws:iam:org1:group/from/*"],
		)],
	)
	.await;

	let err = app
		.groups
		.update_group(&caller("carol"), "org1", "g1", "g1", "/to/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
	assert!(
		err.message.contains("urn:iws:iam:org1:group/to/g1"),
		"got: {}",
		err.message
	);

	// With the grant covering both sides the rename goes through.
	app.seed_caller(
		"dan",
		vec![allow(
			&[GROUP_ACTION_UPDATE_GROUP],
			&["urn:iws:iam:org1:group/*"],
		)],
	)
	.await;
	let updated = app
		.groups
		.update_group(&caller("dan"), "org1", "g1", "g1", "/to/")
		.await
		.unwrap();
	assert_eq!(updated.urn, "urn:iws:iam:org1:group/to/g1");
}

#[tokio::test]
async fn unauthorized_rename_wins_over_collision() {
	// Error precedence: permission checks fire before the rename-collision
	// precondition.
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "g1", "/x/")
		.await
		.unwrap();
	app.groups
		.add_group(&admin(), "org1", "g2", "/x/")
		.await
		.unwrap();
	app.seed_caller("eve", vec![]).await;

	let err = app
		.groups
		.update_group(&caller("eve"), "org1", "g1", "g2", "/x/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
}

#[tokio::test]
async fn rename_rewrites_urn_for_later_decisions() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "movable", "/before/")
		.await
		.unwrap();

	// The caller may only read groups under /before/.
	app.seed_caller(
		"frank",
		vec![allow(
			&[GROUP_ACTION_GET_GROUP],
			&["urn:iws:iam:org1:group/before/*"],
		)],
	)
	.await;

	app.groups
		.get_group_by_name(&caller("frank"), "org1", "movable")
		.await
		.unwrap();

	app.groups
		.update_group(&admin(), "org1", "movable", "movable", "/after/")
		.await
		.unwrap();

	// Next call evaluates against the regenerated URN and fails.
	let err = app
		.groups
		.get_group_by_name(&caller("frank"), "org1", "movable")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
}

#[tokio::test]
async fn list_groups_returns_only_visible_subset() {
	let app = TestApp::new().await;
	for (name, path) in [("a", "/path/"), ("b", "/path/"), ("c", "/hidden/")] {
		app.groups
			.add_group(&admin(), "org1", name, path)
			.await
			.unwrap();
	}

	app.seed_caller(
		"grace",
		vec![allow(
			&[GROUP_ACTION_LIST_GROUPS],
			&["urn:iws:iam:org1:group/path/*"],
		)],
	)
	.await;

	let filter = Filter::default().with_org("org1");
	let (identities, total) = app
		.groups
		.list_groups(&caller("grace"), &filter)
		.await
		.unwrap();

	let names: Vec<&str> = identities.iter().map(|g| g.name.as_str()).collect();
	assert_eq!(names, vec!["a", "b"]);
	assert_eq!(total, identities.len());
}

#[tokio::test]
async fn list_groups_fails_when_namespace_fully_blocked() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "a", "/path/")
		.await
		.unwrap();

	// Grants exist, but nowhere near org1's group namespace.
	app.seed_caller(
		"heidi",
		vec![allow(
			&[GROUP_ACTION_LIST_GROUPS],
			&["urn:iws:iam:org2:group/*"],
		)],
	)
	.await;

	let filter = Filter::default().with_org("org1");
	let err = app
		.groups
		.list_groups(&caller("heidi"), &filter)
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
	assert!(
		err.message.contains("urn:iws:iam:org1:group/*"),
		"got: {}",
		err.message
	);
}

#[tokio::test]
async fn invalid_path_is_rejected_with_literal_message() {
	let app = TestApp::new().await;

	let err = app
		.groups
		.add_group(&admin(), "org1", "group1", "/**%%/*123")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::InvalidParameterError);
	assert_eq!(err.message, "Invalid parameter: path /**%%/*123");
}

#[tokio::test]
async fn invalid_name_and_org_are_rejected() {
	let app = TestApp::new().await;

	let err = app
		.groups
		.add_group(&admin(), "org1", "*%~#@|", "/example/")
		.await
		.unwrap_err();
	assert_eq!(err.message, "Invalid parameter: name *%~#@|");

	let err = app
		.groups
		.add_group(&admin(), "*%~#@|", "n1", "/example/")
		.await
		.unwrap_err();
	assert_eq!(err.message, "Invalid parameter: org *%~#@|");
}

#[tokio::test]
async fn remove_group_cascades_and_revokes_derived_permissions() {
	let app = TestApp::new().await;

	// ivan's only permissions flow through the group that is removed.
	app.seed_caller(
		"ivan",
		vec![allow(&["iam:*"], &["urn:iws:iam:org1:group/*"])],
	)
	.await;
	app.groups
		.add_group(&admin(), "org1", "target", "/x/")
		.await
		.unwrap();

	app.groups
		.get_group_by_name(&caller("ivan"), "org1", "target")
		.await
		.unwrap();

	app.groups
		.remove_group(&admin(), "callers", "group-ivan")
		.await
		.unwrap();

	let err = app
		.groups
		.get_group_by_name(&caller("ivan"), "org1", "target")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
}

// ============================================================================
// Membership scenarios
// ============================================================================

#[tokio::test]
async fn membership_lifecycle() {
	let app = TestApp::new().await;
	app.users.add_user(&admin(), "member1", "/people/").await.unwrap();
	app.groups
		.add_group(&admin(), "org1", "team", "/x/")
		.await
		.unwrap();

	app.groups
		.add_member(&admin(), "member1", "team", "org1")
		.await
		.unwrap();

	let err = app
		.groups
		.add_member(&admin(), "member1", "team", "org1")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UserIsAlreadyAMemberOfGroup);

	let filter = Filter::default().with_org("org1").with_group_name("team");
	let (members, total) = app.groups.list_members(&admin(), &filter).await.unwrap();
	assert_eq!(members, vec!["member1".to_string()]);
	assert_eq!(total, 1);

	app.groups
		.remove_member(&admin(), "member1", "team", "org1")
		.await
		.unwrap();

	let err = app
		.groups
		.remove_member(&admin(), "member1", "team", "org1")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UserIsNotAMemberOfGroup);
}

#[tokio::test]
async fn add_member_requires_existing_group_and_user() {
	let app = TestApp::new().await;
	app.users.add_user(&admin(), "member1", "/people/").await.unwrap();

	let err = app
		.groups
		.add_member(&admin(), "member1", "nogroup", "org1")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::GroupByOrgAndNameNotFound);

	app.groups
		.add_group(&admin(), "org1", "team", "/x/")
		.await
		.unwrap();
	let err = app
		.groups
		.add_member(&admin(), "nobody", "team", "org1")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UserByExternalIdNotFound);
}

#[tokio::test]
async fn remove_member_needs_read_on_the_member() {
	let app = TestApp::new().await;
	app.users.add_user(&admin(), "victim", "/people/").await.unwrap();
	app.groups
		.add_group(&admin(), "org1", "team", "/x/")
		.await
		.unwrap();
	app.groups
		.add_member(&admin(), "victim", "team", "org1")
		.await
		.unwrap();

	// Group-side permission only; no iam:GetUser on the member's URN.
	app.seed_caller(
		"judy",
		vec![allow(
			&[GROUP_ACTION_REMOVE_MEMBER],
			&["urn:iws:iam:org1:group/x/*"],
		)],
	)
	.await;

	let err = app
		.groups
		.remove_member(&caller("judy"), "victim", "team", "org1")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnauthorizedResourcesError);
	assert!(
		err.message.contains("urn:iws:iam::user/people/victim"),
		"got: {}",
		err.message
	);

	app.seed_caller(
		"kim",
		vec![
			allow(
				&[GROUP_ACTION_REMOVE_MEMBER],
				&["urn:iws:iam:org1:group/x/*"],
			),
			allow(&[USER_ACTION_GET_USER], &["urn:iws:iam::user/people/*"]),
		],
	)
	.await;
	app.groups
		.remove_member(&caller("kim"), "victim", "team", "org1")
		.await
		.unwrap();
}

#[tokio::test]
async fn list_members_rejects_over_limit() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "team", "/x/")
		.await
		.unwrap();

	let filter = Filter::default()
		.with_org("org1")
		.with_group_name("team")
		.with_page(10000, 0);
	let err = app.groups.list_members(&admin(), &filter).await.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::InvalidParameterError);
	assert_eq!(
		err.message,
		"Invalid parameter: limit 10000, max limit allowed: 1000"
	);
}

// ============================================================================
// Attachment scenarios
// ============================================================================

#[tokio::test]
async fn attachment_lifecycle() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "team", "/x/")
		.await
		.unwrap();
	app.policies
		.add_policy(
			&admin(),
			"perms",
			"/iam/",
			"org1",
			vec![allow(
				&[GROUP_ACTION_GET_GROUP],
				&["urn:iws:iam:org1:group/*"],
			)],
		)
		.await
		.unwrap();

	app.groups
		.attach_policy_to_group(&admin(), "org1", "team", "perms")
		.await
		.unwrap();

	let err = app
		.groups
		.attach_policy_to_group(&admin(), "org1", "team", "perms")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::PolicyIsAlreadyAttachedToGroup);

	let filter = Filter::default().with_org("org1").with_group_name("team");
	let (attached, total) = app
		.groups
		.list_attached_group_policies(&admin(), &filter)
		.await
		.unwrap();
	assert_eq!(total, 1);
	assert_eq!(attached[0].name, "perms");

	let (holders, total) = app
		.policies
		.list_attached_groups(&admin(), "org1", "perms", &Filter::default())
		.await
		.unwrap();
	assert_eq!(total, 1);
	assert_eq!(holders[0].name, "team");

	app.groups
		.detach_policy_from_group(&admin(), "org1", "team", "perms")
		.await
		.unwrap();

	let err = app
		.groups
		.detach_policy_from_group(&admin(), "org1", "team", "perms")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::PolicyIsNotAttachedToGroup);
}

#[tokio::test]
async fn attach_requires_existing_policy() {
	let app = TestApp::new().await;
	app.groups
		.add_group(&admin(), "org1", "team", "/x/")
		.await
		.unwrap();

	let err = app
		.groups
		.attach_policy_to_group(&admin(), "org1", "team", "nopolicy")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::PolicyByOrgAndNameNotFound);
}

// ============================================================================
// User scenarios
// ============================================================================

#[tokio::test]
async fn user_lifecycle() {
	let app = TestApp::new().await;

	let user = app
		.users
		.add_user(&admin(), "user@example.com", "/people/")
		.await
		.unwrap();
	assert_eq!(user.urn, "urn:iws:iam::user/people/user@example.com");

	let err = app
		.users
		.add_user(&admin(), "user@example.com", "/elsewhere/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UserAlreadyExist);

	let fetched = app
		.users
		.get_user_by_external_id(&admin(), "user@example.com")
		.await
		.unwrap();
	assert_eq!(fetched.id, user.id);

	let moved = app
		.users
		.update_user(&admin(), "user@example.com", "/moved/")
		.await
		.unwrap();
	assert_eq!(moved.urn, "urn:iws:iam::user/moved/user@example.com");

	app.users
		.remove_user(&admin(), "user@example.com")
		.await
		.unwrap();
	let err = app
		.users
		.get_user_by_external_id(&admin(), "user@example.com")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UserByExternalIdNotFound);
	assert_eq!(err.message, "User with externalId user@example.com not found");
}

#[tokio::test]
async fn list_users_filters_to_visible_subset() {
	let app = TestApp::new().await;
	app.users.add_user(&admin(), "u1", "/staff/").await.unwrap();
	app.users.add_user(&admin(), "u2", "/staff/").await.unwrap();
	app.users.add_user(&admin(), "u3", "/bots/").await.unwrap();

	app.seed_caller(
		"lena",
		vec![allow(&[USER_ACTION_LIST_USERS], &["urn:iws:iam::user/staff/*"])],
	)
	.await;

	let filter = Filter::default().with_path_prefix("/staff/");
	let (ids, total) = app.users.list_users(&caller("lena"), &filter).await.unwrap();
	assert_eq!(ids, vec!["u1".to_string(), "u2".to_string()]);
	assert_eq!(total, 2);
}

#[tokio::test]
async fn list_groups_by_user_pages_with_full_total() {
	let app = TestApp::new().await;
	app.users.add_user(&admin(), "joiner", "/people/").await.unwrap();
	for name in ["g1", "g2", "g3"] {
		app.groups
			.add_group(&admin(), "org1", name, "/x/")
			.await
			.unwrap();
		app.groups
			.add_member(&admin(), "joiner", name, "org1")
			.await
			.unwrap();
	}

	let filter = Filter::default().with_page(2, 0);
	let (identities, total) = app
		.users
		.list_groups_by_user(&admin(), "joiner", &filter)
		.await
		.unwrap();
	assert_eq!(identities.len(), 2);
	assert_eq!(total, 3);
}

// ============================================================================
// Policy scenarios
// ============================================================================

#[tokio::test]
async fn policy_lifecycle() {
	let app = TestApp::new().await;

	let policy = app
		.policies
		.add_policy(
			&admin(),
			"creators",
			"/iam/",
			"org1",
			vec![allow(
				&[GROUP_ACTION_CREATE_GROUP],
				&["urn:iws:iam:org1:group/example/*"],
			)],
		)
		.await
		.unwrap();
	assert_eq!(policy.urn, "urn:iws:iam:org1:policy/iam/creators");

	let err = app
		.policies
		.add_policy(&admin(), "creators", "/iam/", "org1", vec![])
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::PolicyAlreadyExist);

	let updated = app
		.policies
		.update_policy(
			&admin(),
			"org1",
			"creators",
			"creators-v2",
			"/iam/",
			vec![deny(&["iam:*"], &["urn:iws:iam:org1:group/secret/*"])],
		)
		.await
		.unwrap();
	assert_eq!(updated.urn, "urn:iws:iam:org1:policy/iam/creators-v2");
	assert_eq!(updated.statements[0].effect, Effect::Deny);

	app.policies
		.remove_policy(&admin(), "org1", "creators-v2")
		.await
		.unwrap();
	let err = app
		.policies
		.get_policy_by_name(&admin(), "org1", "creators-v2")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::PolicyByOrgAndNameNotFound);
}

#[tokio::test]
async fn add_policy_rejects_malformed_statements() {
	let app = TestApp::new().await;

	let err = app
		.policies
		.add_policy(
			&admin(),
			"bad",
			"/iam/",
			"org1",
			vec![allow(&["CreateGroup"], &["urn:iws:iam:org1:group/*"])],
		)
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::InvalidParameterError);
	assert_eq!(err.message, "Invalid parameter: action CreateGroup");
}

#[tokio::test]
async fn policy_rename_collision_reports_already_exist() {
	let app = TestApp::new().await;
	app.policies
		.add_policy(&admin(), "p1", "/iam/", "org1", vec![])
		.await
		.unwrap();
	app.policies
		.add_policy(&admin(), "p2", "/iam/", "org1", vec![])
		.await
		.unwrap();

	let err = app
		.policies
		.update_policy(&admin(), "org1", "p1", "p2", "/iam/", vec![])
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::PolicyAlreadyExist);
}

// ============================================================================
// Storage faults
// ============================================================================

/// A user store whose every operation fails, standing in for a broken
/// database.
struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
	async fn add_user(&self, _user: &User) -> Result<(), DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
	async fn get_user_by_external_id(&self, _external_id: &str) -> Result<Option<User>, DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
	async fn get_user_by_id(&self, _id: &UserId) -> Result<Option<User>, DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
	async fn update_user(&self, _user: &User) -> Result<(), DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
	async fn remove_user(&self, _id: &UserId) -> Result<(), DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
	async fn get_users_filtered(
		&self,
		_path_prefix: Option<&str>,
		_limit: i64,
		_offset: i64,
	) -> Result<(Vec<User>, i64), DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
	async fn get_groups_by_user_id(&self, _id: &UserId) -> Result<Vec<Group>, DbError> {
		Err(DbError::Internal("storage offline".to_string()))
	}
}

#[tokio::test]
async fn storage_fault_surfaces_as_unknown_api_error() {
	let pool = create_test_pool().await;
	let groups_repo = GroupRepository::new(pool.clone());
	let policies_repo = PolicyRepository::new(pool);

	let users_store: Arc<dyn UserStore> = Arc::new(FailingUserStore);
	let policies_store: Arc<dyn PolicyStore> = Arc::new(policies_repo);
	let access = Arc::new(AccessControl::new(
		Arc::clone(&users_store),
		Arc::clone(&policies_store),
	));
	let groups = GroupApi::new(
		users_store,
		Arc::new(groups_repo) as Arc<dyn GroupStore>,
		policies_store,
		access,
	);

	let err = groups
		.add_group(&caller("anyone"), "org1", "g", "/x/")
		.await
		.unwrap_err();
	assert_eq!(err.code, ApiErrorCode::UnknownApiError);
}
