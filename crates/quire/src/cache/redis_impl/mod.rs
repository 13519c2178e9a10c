//! Redis cache backend implementation.
//!
//! Provides a shared cache for multi-instance deployments.

mod cache;
mod error;

pub use cache::RedisCache;
