//! Actor identity and wallet types used for authorization and refunds.

use serde::{Deserialize, Serialize};

/// Role an actor holds within the commerce system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// A shopping customer; owns orders and return requests.
	Customer,
	/// Back-office staff; decides returns and drives manual transitions.
	Staff,
	/// System administrator; may run consistency repairs.
	Admin,
}

/// A resolved actor identity.
///
/// Authorization inside the workflows is a parameter check against the
/// resolved roles, not a transport-layer concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
	/// Unique actor identifier.
	pub id: String,
	/// Roles granted to this actor.
	pub roles: Vec<Role>,
}

impl Actor {
	/// Returns true when the actor holds the given role.
	pub fn has_role(&self, role: Role) -> bool {
		self.roles.contains(&role)
	}

	/// Returns true when the actor may process return requests.
	pub fn is_staff(&self) -> bool {
		self.has_role(Role::Staff) || self.has_role(Role::Admin)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn admin_counts_as_staff() {
		let admin = Actor {
			id: "a1".into(),
			roles: vec![Role::Admin],
		};
		assert!(admin.is_staff());

		let customer = Actor {
			id: "c1".into(),
			roles: vec![Role::Customer],
		};
		assert!(!customer.is_staff());
	}
}
