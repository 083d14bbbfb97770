// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use warden_api::GroupIdentity;

use crate::api_response::{unauthenticated, ApiFailure};
use crate::routes::ListQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
	pub external_id: String,
	pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
	pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
	pub external_ids: Vec<String>,
	pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct UserGroupsResponse {
	pub groups: Vec<GroupIdentity>,
	pub total: usize,
}

pub async fn create_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<CreateUserRequest>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.users
		.add_user(&request, &payload.external_id, &payload.path)
		.await
	{
		Ok(user) => (StatusCode::CREATED, Json(user)).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn get_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(external_id): Path<String>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.users
		.get_user_by_external_id(&request, &external_id)
		.await
	{
		Ok(user) => Json(user).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_users(
	State(state): State<AppState>,
	headers: HeaderMap,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter();
	match state.users.list_users(&request, &filter).await {
		Ok((external_ids, total)) => Json(UsersResponse {
			external_ids,
			total,
		})
		.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn update_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(external_id): Path<String>,
	Json(payload): Json<UpdateUserRequest>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.users
		.update_user(&request, &external_id, &payload.path)
		.await
	{
		Ok(user) => Json(user).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn delete_user(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(external_id): Path<String>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state.users.remove_user(&request, &external_id).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_user_groups(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(external_id): Path<String>,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter();
	match state
		.users
		.list_groups_by_user(&request, &external_id, &filter)
		.await
	{
		Ok((groups, total)) => Json(UserGroupsResponse { groups, total }).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}
