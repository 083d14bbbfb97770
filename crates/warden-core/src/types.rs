// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! ID newtypes for the IAM entities.
//!
//! Type-safe wrappers around UUIDs preventing accidental mixing of user,
//! group and policy identifiers. All ID types serialize transparently as
//! UUID strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			/// Create a new ID from a UUID.
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			/// Generate a new random ID.
			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			/// Get the inner UUID value.
			pub fn into_inner(self) -> Uuid {
				self.0
			}

			/// Get a reference to the inner UUID.
			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(UserId, "Unique identifier for a user.");
define_id_type!(GroupId, "Unique identifier for a group.");
define_id_type!(PolicyId, "Unique identifier for a policy.");

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn user_id_roundtrips() {
		let uuid = Uuid::new_v4();
		let user_id = UserId::new(uuid);
		assert_eq!(user_id.into_inner(), uuid);
	}

	#[test]
	fn ids_generate_unique() {
		assert_ne!(UserId::generate(), UserId::generate());
		assert_ne!(GroupId::generate(), GroupId::generate());
		assert_ne!(PolicyId::generate(), PolicyId::generate());
	}

	#[test]
	fn group_id_serializes_as_uuid() {
		let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
		let group_id = GroupId::new(uuid);
		let json = serde_json::to_string(&group_id).unwrap();
		assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
	}

	proptest! {
			#[test]
			fn policy_id_roundtrip_any_uuid(
					a: u128
			) {
					let uuid = Uuid::from_u128(a);
					let policy_id = PolicyId::new(uuid);
					prop_assert_eq!(policy_id.into_inner(), uuid);
					prop_assert_eq!(Uuid::from(policy_id), uuid);
			}

			#[test]
			fn user_id_display_matches_uuid(
					a: u128
			) {
					let uuid = Uuid::from_u128(a);
					let user_id = UserId::new(uuid);
					prop_assert_eq!(user_id.to_string(), uuid.to_string());
			}
	}
}
