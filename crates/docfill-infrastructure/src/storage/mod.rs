//! File-backed storage for startup configuration.

mod secret_storage;

pub use secret_storage::{SecretStorage, SecretStorageError};
