// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Group route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use warden_api::{GroupIdentity, PolicyIdentity};

use crate::api_response::{unauthenticated, ApiFailure};
use crate::routes::ListQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
	pub name: String,
	pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupRequest {
	pub name: String,
	pub path: String,
}

#[derive(Debug, Serialize)]
pub struct GroupsResponse {
	pub groups: Vec<GroupIdentity>,
	pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct MembersResponse {
	pub members: Vec<String>,
	pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AttachedPoliciesResponse {
	pub policies: Vec<PolicyIdentity>,
	pub total: usize,
}

pub async fn create_group(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(org): Path<String>,
	Json(payload): Json<CreateGroupRequest>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.groups
		.add_group(&request, &org, &payload.name, &payload.path)
		.await
	{
		Ok(group) => (StatusCode::CREATED, Json(group)).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn get_group(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group)): Path<(String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state.groups.get_group_by_name(&request, &org, &group).await {
		Ok(group) => Json(group).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_groups(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(org): Path<String>,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter().with_org(org);
	match state.groups.list_groups(&request, &filter).await {
		Ok((groups, total)) => Json(GroupsResponse { groups, total }).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn update_group(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group)): Path<(String, String)>,
	Json(payload): Json<UpdateGroupRequest>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.groups
		.update_group(&request, &org, &group, &payload.name, &payload.path)
		.await
	{
		Ok(group) => Json(group).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn delete_group(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group)): Path<(String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state.groups.remove_group(&request, &org, &group).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_members(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group)): Path<(String, String)>,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter().with_org(org).with_group_name(group);
	match state.groups.list_members(&request, &filter).await {
		Ok((members, total)) => Json(MembersResponse { members, total }).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn add_member(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group, external_id)): Path<(String, String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.groups
		.add_member(&request, &external_id, &group, &org)
		.await
	{
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn remove_member(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group, external_id)): Path<(String, String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.groups
		.remove_member(&request, &external_id, &group, &org)
		.await
	{
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_attached_policies(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group)): Path<(String, String)>,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter().with_org(org).with_group_name(group);
	match state
		.groups
		.list_attached_group_policies(&request, &filter)
		.await
	{
		Ok((policies, total)) => Json(AttachedPoliciesResponse { policies, total }).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn attach_policy(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group, policy)): Path<(String, String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.groups
		.attach_policy_to_group(&request, &org, &group, &policy)
		.await
	{
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn detach_policy(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, group, policy)): Path<(String, String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.groups
		.detach_policy_from_group(&request, &org, &group, &policy)
		.await
	{
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}
