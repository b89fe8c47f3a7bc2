use async_trait::async_trait;
use filmlog_model::{FilmId, FilmRatingAggregate, ProgressRecord, UserId};

use crate::error::Result;

#[cfg(test)]
use mockall::automock;

/// Bookmark membership keyed by (user, film). Membership is a set:
/// adding an existing bookmark or removing a missing one are no-ops.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    async fn set_bookmark(
        &self,
        user_id: UserId,
        film_id: FilmId,
        bookmarked: bool,
    ) -> Result<()>;

    async fn list_bookmarks(&self, user_id: UserId) -> Result<Vec<FilmId>>;
}

/// Playback progress keyed by (user, film), full-overwrite semantics.
/// The gateway stamps `updated_at` on write; writes for the same key apply
/// in arrival order (last-write-wins).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
        viewed_frame: u64,
    ) -> Result<ProgressRecord>;

    async fn get_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
    ) -> Result<Option<ProgressRecord>>;
}

/// Individual ratings plus the derived per-film aggregate.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Record or replace the user's rating and fold it into the film's
    /// (count, sum) aggregate in one atomic unit: a new rating increments
    /// the count, a replacement adjusts the sum by the score delta.
    ///
    /// Atomic with respect to other concurrent raters of the *same* film;
    /// ratings for different films never contend. Either the full effect
    /// lands (rating row and aggregate together) or neither does.
    async fn upsert_rating_and_aggregate(
        &self,
        film_id: FilmId,
        user_id: UserId,
        score: u8,
    ) -> Result<FilmRatingAggregate>;

    /// Current aggregate, or `None` when the film has no ratings.
    /// Never yields a zero-count record.
    async fn get_aggregate(
        &self,
        film_id: FilmId,
    ) -> Result<Option<FilmRatingAggregate>>;
}
