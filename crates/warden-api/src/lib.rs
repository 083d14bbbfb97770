// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The authorization-gated resource API.
//!
//! Every administrative operation follows one recipe:
//!
//! 1. validate inputs (lexical rules, pagination limits)
//! 2. resolve the target entity (or check the name is free, for creates)
//! 3. authorize the caller via the gate (admins skip this)
//! 4. check state preconditions (membership, attachment, rename collisions)
//! 5. persist, mapping storage errors onto the fixed error taxonomy
//!
//! Failures are first-class values of [`ApiError`]; no operation raises
//! anything out-of-band. The HTTP adapter maps the taxonomy to status
//! codes once, at the edge.

pub mod error;
pub mod group;
mod pagination;
pub mod policy;
pub mod response;
pub mod user;

pub use error::{ApiError, ApiErrorCode};
pub use group::GroupApi;
pub use policy::PolicyApi;
pub use response::{GroupIdentity, PolicyIdentity};
pub use user::UserApi;
