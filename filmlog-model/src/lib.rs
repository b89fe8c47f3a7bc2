//! Shared data models for the filmlog UGC service.
//!
//! Everything a user attaches to a film lives here: bookmark membership,
//! playback progress, individual ratings, and the derived per-film rating
//! aggregate. The types are storage-agnostic; `filmlog-core` decides how they
//! are persisted.

mod ids;
mod ugc;

pub use ids::{FilmId, UserId};
pub use ugc::{
    FilmRatingAggregate, ProgressRecord, RATING_MAX, RATING_MIN, Rating,
};
