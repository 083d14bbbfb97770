// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! API error responses.
//!
//! The taxonomy → status-code mapping happens here, once, for every
//! route.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use warden_api::{ApiError, ApiErrorCode};

/// Map an API error code to its HTTP status.
pub fn status_for(code: ApiErrorCode) -> StatusCode {
	match code {
		ApiErrorCode::InvalidParameterError => StatusCode::BAD_REQUEST,
		ApiErrorCode::UnauthorizedResourcesError => StatusCode::FORBIDDEN,
		ApiErrorCode::UserByExternalIdNotFound
		| ApiErrorCode::GroupByOrgAndNameNotFound
		| ApiErrorCode::PolicyByOrgAndNameNotFound
		| ApiErrorCode::UserIsNotAMemberOfGroup
		| ApiErrorCode::PolicyIsNotAttachedToGroup => StatusCode::NOT_FOUND,
		ApiErrorCode::UserAlreadyExist
		| ApiErrorCode::GroupAlreadyExist
		| ApiErrorCode::PolicyAlreadyExist
		| ApiErrorCode::UserIsAlreadyAMemberOfGroup
		| ApiErrorCode::PolicyIsAlreadyAttachedToGroup => StatusCode::CONFLICT,
		ApiErrorCode::UnknownApiError => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

/// Wrapper turning an [`ApiError`] into an HTTP response.
pub struct ApiFailure(pub ApiError);

impl IntoResponse for ApiFailure {
	fn into_response(self) -> Response {
		let status = status_for(self.0.code);
		if status == StatusCode::INTERNAL_SERVER_ERROR {
			tracing::error!(code = %self.0.code, message = %self.0.message, "internal error");
		}
		(status, Json(self.0)).into_response()
	}
}

/// Response for requests carrying no usable caller identity.
pub fn unauthenticated() -> Response {
	let err = ApiError::new(
		ApiErrorCode::UnauthorizedResourcesError,
		"Unable to retrieve caller identity from request",
	);
	(StatusCode::FORBIDDEN, Json(err)).into_response()
}
