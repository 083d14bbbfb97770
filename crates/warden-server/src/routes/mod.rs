// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route table and shared request plumbing.

use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::Deserialize;

use warden_core::Filter;

use crate::state::AppState;

pub mod groups;
pub mod policies;
pub mod users;

/// Build the full route table over the application state.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		// Users
		.route("/api/v1/users", post(users::create_user))
		.route("/api/v1/users", get(users::list_users))
		.route("/api/v1/users/{external_id}", get(users::get_user))
		.route("/api/v1/users/{external_id}", put(users::update_user))
		.route("/api/v1/users/{external_id}", delete(users::delete_user))
		.route(
			"/api/v1/users/{external_id}/groups",
			get(users::list_user_groups),
		)
		// Groups
		.route(
			"/api/v1/organizations/{org}/groups",
			post(groups::create_group),
		)
		.route(
			"/api/v1/organizations/{org}/groups",
			get(groups::list_groups),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}",
			get(groups::get_group),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}",
			put(groups::update_group),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}",
			delete(groups::delete_group),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}/users",
			get(groups::list_members),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}/users/{external_id}",
			post(groups::add_member),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}/users/{external_id}",
			delete(groups::remove_member),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}/policies",
			get(groups::list_attached_policies),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}/policies/{policy}",
			post(groups::attach_policy),
		)
		.route(
			"/api/v1/organizations/{org}/groups/{group}/policies/{policy}",
			delete(groups::detach_policy),
		)
		// Policies
		.route(
			"/api/v1/organizations/{org}/policies",
			post(policies::create_policy),
		)
		.route(
			"/api/v1/organizations/{org}/policies",
			get(policies::list_policies),
		)
		.route(
			"/api/v1/organizations/{org}/policies/{policy}",
			get(policies::get_policy),
		)
		.route(
			"/api/v1/organizations/{org}/policies/{policy}",
			put(policies::update_policy),
		)
		.route(
			"/api/v1/organizations/{org}/policies/{policy}",
			delete(policies::delete_policy),
		)
		.route(
			"/api/v1/organizations/{org}/policies/{policy}/groups",
			get(policies::list_attached_groups),
		)
		.with_state(state)
}

/// Query parameters shared by the list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
	pub path_prefix: Option<String>,
	pub limit: Option<usize>,
	pub offset: Option<usize>,
}

impl ListQuery {
	/// Convert into the core [`Filter`], leaving entity fields unset.
	pub fn into_filter(self) -> Filter {
		Filter {
			path_prefix: self.path_prefix,
			limit: self.limit.unwrap_or(0),
			offset: self.offset.unwrap_or(0),
			..Filter::default()
		}
	}
}
