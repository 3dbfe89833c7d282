//! A thread-safe, capacity-bounded LRU cache.
//!
//! The cache is split into `2^buckets_exp` shards, each guarded by its own lock and evicting in
//! exact least-recently-used order within its slice of the total capacity. Calls on different
//! shards never contend with each other.
//!
//! # Features
//!
//! - Thread-safe by default - no need for explicit synchronization
//! - O(1) lookups, inserts and evictions backed by an index-based recency list
//! - Optional shard hints to co-locate related keys or pin keys to a known shard
//! - Atomic `put_if_absent` that reports whether this call performed the insert
//! - No unsafe code
//!
//! # Insert semantics
//!
//! [`Cache::insert`] never overwrites: if the key is already cached, the new value is dropped and
//! the entry keeps its position in the recency order. [`Cache::put_if_absent`] follows the same
//! rule but tells the caller which value ended up in the cache.
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```rust
//! use sharded_lru::Cache;
//!
//! // 1000 entries spread across 16 shards
//! let cache = Cache::with_capacity(1000);
//!
//! cache.insert("key1", "value1");
//! assert_eq!(cache.get("key1"), Some("value1"));
//!
//! // The first value wins
//! cache.insert("key1", "value2");
//! assert_eq!(cache.get("key1"), Some("value1"));
//! ```
//!
//! Insert exactly once:
//!
//! ```rust
//! use sharded_lru::{Cache, PutResult};
//!
//! let cache = Cache::new(64, 2);
//!
//! assert_eq!(cache.put_if_absent("key1", 1), PutResult::Inserted);
//! assert_eq!(cache.put_if_absent("key1", 2), PutResult::Present(1));
//! ```
//!
//! Pinning keys to a shard with hints:
//!
//! ```rust
//! use sharded_lru::Cache;
//!
//! let cache = Cache::new(64, 2);
//!
//! let user_id = 42;
//! cache.insert_with_hint("user:42:name", "alice", user_id);
//! cache.insert_with_hint("user:42:mail", "alice@example.com", user_id);
//!
//! assert!(cache.contains_with_hint("user:42:name", user_id));
//! assert_eq!(cache.get_with_hint("user:42:mail", user_id), Some("alice@example.com"));
//! ```
//!
//! Thread-safe usage across multiple threads:
//!
//! ```rust
//! use sharded_lru::Cache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(Cache::with_capacity(100));
//! cache.insert("key1", "value1");
//!
//! let cache_in_arc = Arc::clone(&cache);
//! let handle = thread::spawn(move || {
//!     cache_in_arc.insert("key2", "value2");
//! });
//!
//! handle.join().unwrap();
//!
//! assert_eq!(cache.get("key1"), Some("value1"));
//! assert_eq!(cache.get("key2"), Some("value2"));
//! ```
//!
//! Invalid configurations are rejected rather than clamped:
//!
//! ```rust
//! use sharded_lru::{Cache, ConfigError};
//!
//! let result = Cache::<u64, u64>::try_new(16, 4);
//! assert!(matches!(result, Err(ConfigError::CapacityTooSmall { .. })));
//! ```

#![forbid(unsafe_code)]
pub mod cache;
pub mod error;

pub use cache::stats::Stats;
pub use cache::{Cache, DEFAULT_BUCKETS_EXP, PutResult};
pub use error::ConfigError;
