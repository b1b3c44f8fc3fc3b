//! # Lapse Core
//!
//! An expiring key-value store contract, with a concurrent in-memory
//! reference backend.
//!
//! ## Features
//!
//! - [`Store`] trait: put/get with TTLs, atomic increment, expiry
//!   postponement, transient (read-once) mode, and client-side expiry
//!   accuracy
//! - Typed payloads through serde ([`StoreExt`]); type conflicts surface as
//!   [`StoreError::TypeMismatch`]
//! - [`MemoryStore`]: thread-safe backend using `DashMap` (lock-free
//!   concurrent access) with a per-store background sweep task
//!
//! ## Example
//!
//! ```rust,no_run
//! use lapse_core::{MemoryStore, Store, StoreExt};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!
//!     // Store a value with a 60 second TTL
//!     store.put("user:123", &"John Doe", Duration::from_secs(60)).unwrap();
//!
//!     // Retrieve it, typed
//!     let name: String = store.get("user:123").unwrap();
//!
//!     // Keep it alive a while longer without rewriting it
//!     store.postpone("user:123", Duration::from_secs(120)).unwrap();
//!
//!     // Atomic counters, safe under concurrent callers
//!     let seen = store.increment("user:123:visits", 1).unwrap();
//!     assert_eq!(seen, 1);
//!
//!     store.delete("user:123").unwrap();
//! }
//! ```

mod config;
mod entry;
mod error;
mod memory;
mod store;

pub use config::StoreConfig;
pub use entry::Entry;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::{Store, StoreExt};
