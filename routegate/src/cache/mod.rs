//! Two-tier response cache.
//!
//! Results are cached first in a durable shared store (Redis) and, only while
//! that store is unreachable, in a bounded process-local fallback.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  CacheCoordinator                   │
//! │  get/set: store first, local tier on store failure  │
//! └───────────────┬──────────────────────┬──────────────┘
//!                 │                      │
//!        ┌────────▼────────┐    ┌────────▼────────┐
//!        │ dyn CacheStore  │    │   LocalCache    │
//!        │ (RedisStore)    │    │ (moka, LRU+TTL) │
//!        └─────────────────┘    └─────────────────┘
//! ```
//!
//! Keys come from [`derive_key`], a pure function of the query's content.

mod coordinator;
mod key;
mod local;
mod redis;
mod traits;

pub use coordinator::{CacheBackend, CacheCoordinator, CacheStats};
pub use key::{derive_key, derive_reachability_key, CacheKey, REACHABILITY_TAG};
pub use local::{LocalCache, DEFAULT_LOCAL_MAX_ENTRIES};
pub use self::redis::{RedisStore, DEFAULT_STORE_TIMEOUT};
pub use traits::{BoxFuture, CacheStore, StoreError};
