//! # Lapse Conformance
//!
//! A reusable, backend-agnostic battery that exercises any implementation
//! of the `lapse_core::Store` contract: atomic mutation, expiration timing,
//! value round-tripping, key-collision overwrites, expiry postponement,
//! transient read-once behavior, and type-mismatch reporting.
//!
//! The [`env`] module models disposable backing-service environments
//! (containers and the like) behind a small trait, with skip-vs-fail setup
//! outcomes and a reverse-order [`CleanupStack`] so teardown runs on every
//! exit path.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lapse_conformance::{battery, CleanupStack, InProcess, Readiness, prepare};
//! use lapse_core::{MemoryStore, Store};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut cleanup = CleanupStack::new();
//!     match prepare(InProcess::new(), &mut cleanup).unwrap() {
//!         Readiness::Skipped(reason) => eprintln!("skipped: {reason}"),
//!         Readiness::Ready { .. } => {
//!             let store = MemoryStore::new();
//!             battery::check_atomic(&store);
//!             store.flush().unwrap();
//!             battery::check_expiration(&store);
//!         }
//!     }
//! }
//! ```

pub mod battery;
pub mod bench;
mod env;

pub use env::{CleanupStack, EnvError, Environment, InProcess, Readiness, prepare};
