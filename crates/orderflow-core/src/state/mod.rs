//! Order state machine: transition rules and the status manager.

pub mod manager;
pub mod rules;

pub use manager::{OrderStatusError, OrderStatusManager};
pub use rules::{validate, valid_transitions, TransitionCheck};
