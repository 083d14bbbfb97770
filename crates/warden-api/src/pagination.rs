// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pagination shared by the list operations.

use warden_core::validation::{DEFAULT_LIMIT, MAX_LIMIT};
use warden_core::Filter;

use crate::error::ApiError;

/// Resolve a filter's pagination into an effective `(limit, offset)`.
///
/// `limit = 0` selects the server default; limits above the maximum are an
/// `INVALID_PARAMETER_ERROR`.
pub(crate) fn page_params(filter: &Filter) -> Result<(usize, usize), ApiError> {
	if filter.limit > MAX_LIMIT {
		return Err(ApiError::invalid_limit(filter.limit, MAX_LIMIT));
	}
	let limit = if filter.limit == 0 {
		DEFAULT_LIMIT
	} else {
		filter.limit
	};
	Ok((limit, filter.offset))
}

/// Take one page out of an in-memory list.
pub(crate) fn paginate<T: Clone>(items: &[T], limit: usize, offset: usize) -> Vec<T> {
	items.iter().skip(offset).take(limit).cloned().collect()
}
