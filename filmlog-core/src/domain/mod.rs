//! Dispatchers (write side) and read services (query side).
//!
//! Each pair is wired explicitly with an `Arc`'d gateway port; there is no
//! runtime service locator. Dispatchers validate action shape before any
//! I/O and delegate the durable effect to the gateway; read paths bypass
//! the dispatchers entirely.

pub mod bookmarks;
pub mod progress;
pub mod ratings;

pub use bookmarks::{BookmarkDispatcher, BookmarkService};
pub use progress::{ProgressDispatcher, ProgressService};
pub use ratings::{FilmRatingService, RatingDispatcher};
