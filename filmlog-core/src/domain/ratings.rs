use std::{fmt, sync::Arc};

use filmlog_model::{FilmId, FilmRatingAggregate, RATING_MAX, RATING_MIN, UserId};
use tracing::info;

use crate::error::{Result, UgcError};
use crate::storage::ports::RatingRepository;

/// Records or replaces a user's rating and returns the refreshed per-film
/// aggregate.
///
/// The externally meaningful effect of rating a film is its new aggregate
/// score, so that is what callers get back, not the individual rating.
#[derive(Clone)]
pub struct RatingDispatcher {
    repo: Arc<dyn RatingRepository>,
}

impl fmt::Debug for RatingDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RatingDispatcher").finish_non_exhaustive()
    }
}

impl RatingDispatcher {
    pub fn new(repo: Arc<dyn RatingRepository>) -> Self {
        Self { repo }
    }

    pub async fn rate_film(
        &self,
        film_id: FilmId,
        user_id: UserId,
        score: u8,
    ) -> Result<FilmRatingAggregate> {
        // Shape check before any persistence call. The lower bound is
        // enforced by the unsigned type.
        if score > RATING_MAX {
            return Err(UgcError::InvalidInput(format!(
                "rating score {score} outside valid range \
                 [{RATING_MIN}, {RATING_MAX}]"
            )));
        }

        let aggregate = self
            .repo
            .upsert_rating_and_aggregate(film_id, user_id, score)
            .await?;
        info!(
            %film_id,
            count = aggregate.count,
            average = aggregate.average(),
            "film rating recorded"
        );
        Ok(aggregate)
    }
}

/// Query-side counterpart of [`RatingDispatcher`].
#[derive(Clone)]
pub struct FilmRatingService {
    repo: Arc<dyn RatingRepository>,
}

impl fmt::Debug for FilmRatingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilmRatingService").finish_non_exhaustive()
    }
}

impl FilmRatingService {
    pub fn new(repo: Arc<dyn RatingRepository>) -> Self {
        Self { repo }
    }

    /// Current aggregate, or [`UgcError::NotFound`] when nobody has rated
    /// the film yet. Callers can always tell "average of zero" apart from
    /// "not rated".
    pub async fn get_film_rating(
        &self,
        film_id: FilmId,
    ) -> Result<FilmRatingAggregate> {
        self.repo.get_aggregate(film_id).await?.ok_or_else(|| {
            UgcError::NotFound(format!("no ratings for film {film_id}"))
        })
    }
}
