//! File-based storage backend implementation for the lifecycle system.
//!
//! This module provides a persistent implementation of the StorageInterface
//! trait, storing each value as one JSON file under a configurable base
//! directory. Keys of the form `namespace:id` map to
//! `<base>/<namespace>/<id>.json`, which makes prefix listing a directory
//! read.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use orderflow_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory all namespaces live under.
	base_dir: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage rooted at the given directory.
	///
	/// The directory is created on first write if it does not exist.
	pub fn new(base_dir: impl Into<PathBuf>) -> Self {
		Self {
			base_dir: base_dir.into(),
		}
	}

	/// Maps a `namespace:id` key to its file path.
	///
	/// Path separators in either part are rejected so a crafted id can
	/// never escape the base directory.
	fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
		let (namespace, id) = key
			.split_once(':')
			.ok_or_else(|| StorageError::Backend(format!("Malformed key: {}", key)))?;
		if namespace.contains(['/', '\\']) || id.contains(['/', '\\']) {
			return Err(StorageError::Backend(format!("Invalid key: {}", key)));
		}
		Ok(self.base_dir.join(namespace).join(format!("{}.json", id)))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.path_for(key)?;
		match fs::read(&path).await {
			Ok(bytes) => Ok(bytes),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.path_for(key)?;
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		// Write to a temp file then rename so readers never observe a
		// partially written value.
		let tmp = path.with_extension("json.tmp");
		fs::write(&tmp, &value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&tmp, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		Ok(())
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.path_for(key)?;
		match fs::remove_file(&path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.path_for(key)?;
		Ok(fs::try_exists(&path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?)
	}

	async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
		let namespace = prefix.strip_suffix(':').unwrap_or(prefix);
		let dir = self.base_dir.join(namespace);
		if !dir.is_dir() {
			return Ok(Vec::new());
		}

		let mut keys = Vec::new();
		let mut entries = fs::read_dir(&dir)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let name = entry.file_name();
			let name = name.to_string_lossy();
			if let Some(id) = name.strip_suffix(".json") {
				keys.push(format!("{}:{}", namespace, id));
			}
		}
		Ok(keys)
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("storage_path", FieldType::String)],
			vec![],
		);
		schema.validate(config)
	}
}

/// Registry entry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = crate::StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl crate::StorageRegistry for Registry {}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path` (required): base directory for all namespaces
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;
	let path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.ok_or_else(|| StorageError::Configuration("storage_path is required".into()))?;
	Ok(Box::new(FileStorage::new(Path::new(path))))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_round_trip_and_delete() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path());

		storage
			.set_bytes("orders:o1", b"{\"id\":\"o1\"}".to_vec())
			.await
			.unwrap();
		assert!(storage.exists("orders:o1").await.unwrap());
		assert_eq!(
			storage.get_bytes("orders:o1").await.unwrap(),
			b"{\"id\":\"o1\"}".to_vec()
		);

		storage.delete("orders:o1").await.unwrap();
		assert!(!storage.exists("orders:o1").await.unwrap());
		assert!(matches!(
			storage.get_bytes("orders:o1").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_list_keys_per_namespace() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path());

		storage.set_bytes("orders:a", b"1".to_vec()).await.unwrap();
		storage.set_bytes("orders:b", b"2".to_vec()).await.unwrap();
		storage
			.set_bytes("confirmations:a", b"3".to_vec())
			.await
			.unwrap();

		let mut keys = storage.list_keys("orders:").await.unwrap();
		keys.sort();
		assert_eq!(keys, vec!["orders:a".to_string(), "orders:b".to_string()]);
	}

	#[tokio::test]
	async fn test_rejects_path_escape() {
		let dir = tempfile::tempdir().unwrap();
		let storage = FileStorage::new(dir.path());

		let result = storage.set_bytes("orders:../evil", b"x".to_vec()).await;
		assert!(matches!(result, Err(StorageError::Backend(_))));
	}

	#[tokio::test]
	async fn test_factory_requires_storage_path() {
		let config: toml::Value = toml::from_str("").unwrap();
		assert!(create_storage(&config).is_err());

		let config: toml::Value = toml::from_str("storage_path = \"/tmp/orderflow\"").unwrap();
		assert!(create_storage(&config).is_ok());
	}
}
