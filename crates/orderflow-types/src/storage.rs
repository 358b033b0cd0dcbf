//! Storage-related types for the lifecycle system.

use std::str::FromStr;

/// Storage keys for different data collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed namespace variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for storing order data.
	Orders,
	/// Key for storing per-order timeline entry lists.
	Timelines,
	/// Key for storing return requests.
	ReturnRequests,
	/// Key for mapping return codes to return request IDs.
	ReturnByCode,
	/// Key for mapping order IDs to their open return request ID.
	ReturnByOrder,
	/// Key for storing delivery confirmations, keyed by order ID.
	Confirmations,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Timelines => "timelines",
			StorageKey::ReturnRequests => "return_requests",
			StorageKey::ReturnByCode => "return_by_code",
			StorageKey::ReturnByOrder => "return_by_order",
			StorageKey::Confirmations => "confirmations",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::Timelines,
			Self::ReturnRequests,
			Self::ReturnByCode,
			Self::ReturnByOrder,
			Self::Confirmations,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"timelines" => Ok(Self::Timelines),
			"return_requests" => Ok(Self::ReturnRequests),
			"return_by_code" => Ok(Self::ReturnByCode),
			"return_by_order" => Ok(Self::ReturnByOrder),
			"confirmations" => Ok(Self::Confirmations),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
