//! Order transition rule table and validator.
//!
//! The rule table is a static directed graph mapping each order status to
//! its permitted successors. The validator is a pure function over two
//! statuses and that table; it holds no state and is safe to call from any
//! number of tasks without synchronization.

use once_cell::sync::Lazy;
use orderflow_types::OrderStatus;
use std::collections::{HashMap, HashSet};

/// Static transition table - each status maps to its allowed next statuses.
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	use OrderStatus::*;

	let mut m = HashMap::new();
	m.insert(Pending, HashSet::from([Confirmed, Cancelled]));
	m.insert(Confirmed, HashSet::from([Shipping, Cancelled]));
	m.insert(Shipping, HashSet::from([AwaitingConfirmation, Cancelled]));
	m.insert(AwaitingConfirmation, HashSet::from([Delivered, Cancelled]));
	m.insert(Delivered, HashSet::from([ConfirmedByCustomer]));
	m.insert(ConfirmedByCustomer, HashSet::new()); // terminal
	m.insert(Cancelled, HashSet::new()); // terminal
	m
});

/// Returns the permitted successor statuses for a status, sorted.
///
/// Never panics; terminal statuses yield an empty vector.
pub fn valid_transitions(status: OrderStatus) -> Vec<OrderStatus> {
	let mut next: Vec<OrderStatus> = TRANSITIONS
		.get(&status)
		.map(|set| set.iter().copied().collect())
		.unwrap_or_default();
	next.sort();
	next
}

/// Checks if a transition between two statuses is permitted.
pub fn is_valid(from: OrderStatus, to: OrderStatus) -> bool {
	TRANSITIONS.get(&from).is_some_and(|set| set.contains(&to))
}

/// Startup self-check: asserts every status variant has a table entry.
///
/// The builder treats a failure as fatal, so a status added to the enum
/// without a corresponding row can never be silently unreachable.
pub fn validate_configuration() -> Result<(), String> {
	let missing: Vec<OrderStatus> = OrderStatus::all()
		.filter(|status| !TRANSITIONS.contains_key(status))
		.collect();
	if missing.is_empty() {
		Ok(())
	} else {
		Err(format!(
			"transition table is missing entries for: {:?}",
			missing
		))
	}
}

/// Outcome of validating one proposed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionCheck {
	/// True when the transition is permitted.
	pub ok: bool,
	/// Human-readable rejection message naming both statuses.
	pub error: Option<String>,
	/// Permitted successors of the current status, for rendering options.
	pub alternatives: Vec<OrderStatus>,
}

impl TransitionCheck {
	fn accepted() -> Self {
		Self {
			ok: true,
			error: None,
			alternatives: Vec::new(),
		}
	}
}

/// Validates a proposed transition against the rule table.
///
/// On rejection the check carries the valid alternatives so a caller can
/// render an actionable message without consulting the table itself.
pub fn validate(current: OrderStatus, proposed: OrderStatus) -> TransitionCheck {
	if is_valid(current, proposed) {
		return TransitionCheck::accepted();
	}
	let alternatives = valid_transitions(current);
	TransitionCheck {
		ok: false,
		error: Some(format!(
			"cannot transition from '{}' to '{}'; valid transitions: {}",
			current,
			proposed,
			describe_alternatives(&alternatives)
		)),
		alternatives,
	}
}

/// Renders a list of alternatives for error messages.
///
/// An empty list renders as "none (final state)".
pub fn describe_alternatives(alternatives: &[OrderStatus]) -> String {
	if alternatives.is_empty() {
		"none (final state)".to_string()
	} else {
		alternatives
			.iter()
			.map(|s| s.label())
			.collect::<Vec<_>>()
			.join(", ")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use OrderStatus::*;

	#[test]
	fn table_covers_every_status() {
		validate_configuration().unwrap();
	}

	#[test]
	fn validate_agrees_with_table_for_all_pairs() {
		for from in OrderStatus::all() {
			for to in OrderStatus::all() {
				let check = validate(from, to);
				assert_eq!(
					check.ok,
					valid_transitions(from).contains(&to),
					"mismatch for {from:?} -> {to:?}"
				);
			}
		}
	}

	#[test]
	fn terminal_statuses_have_no_successors() {
		for status in OrderStatus::all().filter(OrderStatus::is_final) {
			assert!(valid_transitions(status).is_empty(), "{status:?}");
		}
	}

	#[test]
	fn rejection_carries_alternatives() {
		// Pending -> Shipping is not an edge.
		let check = validate(Pending, Shipping);
		assert!(!check.ok);
		assert_eq!(check.alternatives, vec![Confirmed, Cancelled]);
		let message = check.error.unwrap();
		assert!(message.contains("Pending confirmation"));
		assert!(message.contains("Shipping"));
	}

	#[test]
	fn final_state_alternatives_render_as_none() {
		let check = validate(Cancelled, Pending);
		assert!(!check.ok);
		assert!(check.error.unwrap().contains("none (final state)"));
	}

	#[test]
	fn happy_path_edges_accepted() {
		for (from, to) in [
			(Pending, Confirmed),
			(Confirmed, Shipping),
			(Shipping, AwaitingConfirmation),
			(AwaitingConfirmation, Delivered),
			(Delivered, ConfirmedByCustomer),
		] {
			assert!(validate(from, to).ok, "{from:?} -> {to:?}");
		}
	}
}
