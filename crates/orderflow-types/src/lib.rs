//! Common types module for the orderflow lifecycle system.
//!
//! This module defines the core data types and structures shared by the
//! lifecycle workflows and their collaborator services. It provides a
//! centralized location for shared types to ensure consistency across
//! all workspace crates.

/// Actor identity and wallet types used for authorization and refunds.
pub mod account;
/// Delivery-confirmation types gating order finalization.
pub mod confirmation;
/// Notification event types emitted on accepted transitions.
pub mod events;
/// Order entity and order-status types.
pub mod order;
/// Return/refund request types.
pub mod returns;
/// Storage namespace keys for persisted collections.
pub mod storage;
/// Derived synchronization/consistency report types.
pub mod sync;
/// Append-only audit timeline types.
pub mod timeline;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;
/// Registry trait for self-registering implementations.
pub mod registry;

// Re-export all types for convenient access
pub use account::*;
pub use confirmation::*;
pub use events::*;
pub use order::*;
pub use registry::*;
pub use returns::*;
pub use storage::*;
pub use sync::*;
pub use timeline::*;
pub use validation::*;
