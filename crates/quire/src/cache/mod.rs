//! Cache backend implementations and the typed cache store.
//!
//! The backends implement the byte-level `quire_core::cache::Cache` trait and
//! are selected at compile time via feature flags. [`CacheStore`] layers typed
//! values and absolute expiry on top of whichever backend is active.
//!
//! # Feature Flags
//!
//! - `memory` (default): In-process LRU cache
//! - `redis`: Redis cache using the redis crate
//!
//! These features are mutually exclusive - only one cache backend can be
//! enabled at a time.

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!(
    "Features 'memory' and 'redis' are mutually exclusive. \
    Enable only one cache backend at a time."
);

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p quire --features memory"
);

mod store;

// The memory backend also backs unit tests regardless of the active feature.
#[cfg(any(feature = "memory", test))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use store::CacheStore;

#[cfg(any(feature = "memory", test))]
#[allow(unused_imports)]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
#[allow(unused_imports)]
pub use redis_impl::RedisCache;
