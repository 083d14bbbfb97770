// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared application state for the HTTP routes.

use std::sync::Arc;

use sqlx::sqlite::SqlitePool;

use warden_api::{GroupApi, PolicyApi, UserApi};
use warden_authz::AccessControl;
use warden_config::ServerConfig;
use warden_db::{
	GroupRepository, GroupStore, PolicyRepository, PolicyStore, UserRepository, UserStore,
};

use crate::authenticator::{Authenticator, HeaderAuthenticator};

/// Everything a route handler needs: the resource APIs and the
/// authenticator. Cheap to clone; all members are shared.
#[derive(Clone)]
pub struct AppState {
	pub users: Arc<UserApi>,
	pub groups: Arc<GroupApi>,
	pub policies: Arc<PolicyApi>,
	pub authenticator: Arc<dyn Authenticator>,
}

/// Wire the repositories, gate and APIs over a database pool.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	let users_store: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
	let groups_store: Arc<dyn GroupStore> = Arc::new(GroupRepository::new(pool.clone()));
	let policies_store: Arc<dyn PolicyStore> = Arc::new(PolicyRepository::new(pool));

	let access = Arc::new(AccessControl::new(
		Arc::clone(&users_store),
		Arc::clone(&policies_store),
	));

	AppState {
		users: Arc::new(UserApi::new(Arc::clone(&users_store), Arc::clone(&access))),
		groups: Arc::new(GroupApi::new(
			Arc::clone(&users_store),
			Arc::clone(&groups_store),
			Arc::clone(&policies_store),
			Arc::clone(&access),
		)),
		policies: Arc::new(PolicyApi::new(policies_store, access)),
		authenticator: Arc::new(HeaderAuthenticator::new(
			config.auth.admin_external_ids.clone(),
		)),
	}
}
