// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pure policy-statement evaluation.
//!
//! A statement applies to an `(action, resource)` pair when any of its
//! action patterns matches the action **and** any of its resource patterns
//! matches the resource URN. The decision is a fold over applicable
//! effects: any deny ⇒ Deny, else any allow ⇒ Allow, else NotApplicable.

use warden_core::policy::{Effect, Statement};
use warden_core::urn;

/// Outcome of evaluating a statement set against an action and resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
	/// At least one allow applies and no deny does.
	Allow,
	/// At least one deny applies.
	Deny,
	/// No statement applies; the gate treats this the same as Deny.
	NotApplicable,
}

fn statement_applies(statement: &Statement, action: &str, resource_urn: &str) -> bool {
	statement.actions.iter().any(|a| urn::matches(a, action))
		&& statement
			.resources
			.iter()
			.any(|r| urn::matches(r, resource_urn))
}

/// Evaluate a statement set against an action and a resource URN.
///
/// Order-independent: the statements form a set, and an applicable deny
/// defeats every applicable allow regardless of pattern specificity.
pub fn evaluate(action: &str, resource_urn: &str, statements: &[Statement]) -> Decision {
	let mut allowed = false;
	for statement in statements {
		if !statement_applies(statement, action, resource_urn) {
			continue;
		}
		match statement.effect {
			Effect::Deny => return Decision::Deny,
			Effect::Allow => allowed = true,
		}
	}
	if allowed {
		Decision::Allow
	} else {
		Decision::NotApplicable
	}
}

/// Return the subset of URNs the statement set allows the action on.
///
/// Used by listing operations: unauthorized elements are silently dropped
/// rather than failing the whole request.
pub fn filter_allowed(action: &str, urns: Vec<String>, statements: &[Statement]) -> Vec<String> {
	urns.into_iter()
		.filter(|u| evaluate(action, u, statements) == Decision::Allow)
		.collect()
}
