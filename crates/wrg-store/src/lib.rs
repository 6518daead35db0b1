//! Key-value storage boundary for the order core.
//!
//! This crate defines **only** the store trait, its error type, and the
//! in-process implementation used by the daemon and by tests. No domain
//! logic belongs here: key layout, record shapes, and consistency between
//! keys are the repository layer's concern.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

mod memory;

pub use memory::MemoryKvStore;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors a [`KvStore`] implementation may return.
#[derive(Debug)]
pub enum StoreError {
    /// The backing store is unavailable or rejected the operation.
    Backend(String),
    /// A stored payload could not be encoded or decoded.
    Codec(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Backend(msg) => write!(f, "store backend error: {msg}"),
            StoreError::Codec(msg) => write!(f, "store codec error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

// ---------------------------------------------------------------------------
// KvStore trait
// ---------------------------------------------------------------------------

/// A generic mapping from string key to JSON value.
///
/// # Contract
/// - Each method call is individually atomic; **no** cross-call transaction
///   or locking is offered. Callers that need read-modify-write atomicity
///   across calls (e.g. the order index) must serialize those sequences
///   themselves.
/// - [`mget`](KvStore::mget) returns exactly one slot per requested key, in
///   request order, with `None` for absent keys. Readers rely on this to
///   tolerate index entries whose record is gone.
/// - [`del`](KvStore::del) of an absent key succeeds as a no-op; existence
///   checks belong to the caller.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<Value>>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn del(&self, key: &str) -> Result<(), StoreError>;
}
