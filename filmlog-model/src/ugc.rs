use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{FilmId, UserId};

/// Lowest accepted rating score.
pub const RATING_MIN: u8 = 0;

/// Highest accepted rating score.
pub const RATING_MAX: u8 = 10;

/// Last-viewed playback position for a (user, film) pair.
///
/// One record per pair; a new write fully replaces the prior frame.
/// `viewed_frame == 0` is a meaningful stored value ("started but not
/// advanced") and is distinct from no record existing at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: UserId,
    pub film_id: FilmId,
    pub viewed_frame: u64,
    /// Stamped by the persistence gateway at write time, not by the client.
    pub updated_at: DateTime<Utc>,
}

/// A single user's rating for a film. At most one per (user, film);
/// re-rating replaces the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub film_id: FilmId,
    pub score: u8,
}

/// Derived per-film rating summary.
///
/// Kept as exact integers (count, sum) so replacement deltas never drift;
/// the average is computed on read. An aggregate with `count == 0` is never
/// handed out — "no ratings yet" is signaled by absence instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilmRatingAggregate {
    pub film_id: FilmId,
    pub count: u64,
    pub sum: u64,
}

impl FilmRatingAggregate {
    /// Mean of all current ratings. `count` is non-zero by construction.
    pub fn average(&self) -> f64 {
        self.sum as f64 / self.count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_exact_mean() {
        let aggregate = FilmRatingAggregate {
            film_id: FilmId::new(),
            count: 4,
            sum: 26,
        };
        assert_eq!(aggregate.average(), 6.5);
    }
}
