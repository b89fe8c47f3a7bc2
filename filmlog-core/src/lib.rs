//! # filmlog-core
//!
//! Dispatch-and-aggregation layer for per-user film interactions: bookmark
//! toggles, playback progress, and ratings with a derived per-film
//! (count, average) aggregate.
//!
//! ## Architecture
//!
//! - [`storage::ports`] defines the persistence gateway contract the core
//!   writes through. The storage engine behind it is opaque.
//! - [`storage::postgres`] and [`storage::memory`] are the two gateway
//!   implementations.
//! - [`domain`] holds the dispatchers (write side) and read services
//!   (query side). Dispatchers validate action shape and delegate the
//!   durable effect to the gateway; for ratings the gateway primitive is
//!   atomic per film so the aggregate can never diverge from the set of
//!   individual ratings.

pub mod domain;
pub mod error;
pub mod storage;

pub use error::{Result, UgcError};
