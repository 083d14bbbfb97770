// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use warden_api::{GroupIdentity, PolicyIdentity};
use warden_core::Statement;

use crate::api_response::{unauthenticated, ApiFailure};
use crate::routes::ListQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePolicyRequest {
	pub name: String,
	pub path: String,
	#[serde(default)]
	pub statements: Vec<Statement>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePolicyRequest {
	pub name: String,
	pub path: String,
	#[serde(default)]
	pub statements: Vec<Statement>,
}

#[derive(Debug, Serialize)]
pub struct PoliciesResponse {
	pub policies: Vec<PolicyIdentity>,
	pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct AttachedGroupsResponse {
	pub groups: Vec<GroupIdentity>,
	pub total: usize,
}

pub async fn create_policy(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(org): Path<String>,
	Json(payload): Json<CreatePolicyRequest>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.policies
		.add_policy(
			&request,
			&payload.name,
			&payload.path,
			&org,
			payload.statements,
		)
		.await
	{
		Ok(policy) => (StatusCode::CREATED, Json(policy)).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn get_policy(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, policy)): Path<(String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.policies
		.get_policy_by_name(&request, &org, &policy)
		.await
	{
		Ok(policy) => Json(policy).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_policies(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path(org): Path<String>,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter().with_org(org);
	match state.policies.list_policies(&request, &filter).await {
		Ok((policies, total)) => Json(PoliciesResponse { policies, total }).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn update_policy(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, policy)): Path<(String, String)>,
	Json(payload): Json<UpdatePolicyRequest>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state
		.policies
		.update_policy(
			&request,
			&org,
			&policy,
			&payload.name,
			&payload.path,
			payload.statements,
		)
		.await
	{
		Ok(policy) => Json(policy).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn delete_policy(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, policy)): Path<(String, String)>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	match state.policies.remove_policy(&request, &org, &policy).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}

pub async fn list_attached_groups(
	State(state): State<AppState>,
	headers: HeaderMap,
	Path((org, policy)): Path<(String, String)>,
	Query(query): Query<ListQuery>,
) -> Response {
	let Some(request) = state.authenticator.retrieve_request_info(&headers) else {
		return unauthenticated();
	};
	let filter = query.into_filter();
	match state
		.policies
		.list_attached_groups(&request, &org, &policy, &filter)
		.await
	{
		Ok((groups, total)) => Json(AttachedGroupsResponse { groups, total }).into_response(),
		Err(err) => ApiFailure(err).into_response(),
	}
}
