//! autoscaler-state — policy persistence for the autoscaler API.
//!
//! Backed by [redb](https://docs.rs/redb), stores one autoscaling policy
//! document per application, keyed by `app_id`.
//!
//! # Architecture
//!
//! Policy records are JSON-serialized into redb's `&[u8]` value column.
//! Callers talk to the store through [`PolicyRepository`], which exposes the
//! find-or-create and conditional-update primitives the upsert route is
//! built on.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod repository;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use repository::PolicyRepository;
pub use store::StateStore;
pub use types::*;
