//! Core trait for the durable cache tier.
//!
//! The `CacheStore` trait is the seam between the coordinator and whatever
//! shared key-value service backs the primary tier. Production uses Redis;
//! tests substitute stores that fail or record calls.
//!
//! # Design Principles
//!
//! - **String keys**: derived keys are printable, so they show up as-is in logs
//! - **Vec<u8> values**: raw bytes, no serialization opinions imposed
//! - **TTL on write**: every entry carries its own lifetime, chosen by the caller
//! - **Dyn-compatible**: uses `Pin<Box<dyn Future>>` for trait object support

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Errors raised by a cache tier.
///
/// These never reach gateway callers; the coordinator turns them into a
/// fallback to the local tier.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer within its deadline.
    #[error("Cache store timed out after {0:?}")]
    Timeout(Duration),

    /// The store answered with an error.
    #[error("Cache store command failed: {0}")]
    Command(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Durable key-value store with per-entry TTL.
///
/// An `Err` means the store itself is unhealthy. A key that is simply not
/// present is `Ok(None)`, and the coordinator treats the two very differently.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one store can be shared by
/// every in-flight request through an `Arc<dyn CacheStore>`.
pub trait CacheStore: Send + Sync {
    /// Short backend name for logs and stats.
    fn name(&self) -> &'static str;

    /// Retrieve a value by key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the key exists and has not expired
    /// - `Ok(None)` if the key is not found
    /// - `Err(_)` if the store is unavailable
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>>;

    /// Store a value that expires after `ttl`.
    ///
    /// If the key already exists, the value and its lifetime are replaced.
    fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Remove every entry.
    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>>;

    /// Approximate number of stored entries.
    fn entry_count(&self) -> BoxFuture<'_, Result<u64, StoreError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(
            format!("{}", err),
            "Cache store unavailable: connection refused"
        );

        let err = StoreError::Timeout(Duration::from_secs(2));
        assert!(format!("{}", err).contains("2s"));
    }
}
