// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP edge for the warden IAM service.
//!
//! This crate is a thin adapter: it extracts the caller identity from the
//! request, dispatches to the gated resource API, and maps the error
//! taxonomy onto HTTP status codes exactly once. No authorization logic
//! lives here.

pub mod api_response;
pub mod authenticator;
pub mod routes;
pub mod state;

pub use authenticator::{Authenticator, HeaderAuthenticator, EXTERNAL_ID_HEADER};
pub use routes::create_router;
pub use state::AppState;
