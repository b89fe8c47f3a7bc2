//! In-memory gateway backend.
//!
//! Used by tests and as the storage fallback when no database is
//! configured. Bookmarks and progress are partitioned by their
//! (user, film) key and need no cross-request coordination; the rating
//! path guards each film's (multiset, aggregate) pair with a per-film
//! mutex so the derived view can never be observed inconsistent with the
//! individual scores.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use filmlog_model::{FilmId, FilmRatingAggregate, ProgressRecord, UserId};

use crate::error::Result;
use crate::storage::ports::{
    BookmarkRepository, ProgressRepository, RatingRepository,
};

#[derive(Debug, Default)]
pub struct MemoryUgcStore {
    bookmarks: DashMap<UserId, HashSet<FilmId>>,
    progress: DashMap<(UserId, FilmId), ProgressRecord>,
    ratings: DashMap<FilmId, Mutex<HashMap<UserId, u8>>>,
}

impl MemoryUgcStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn aggregate_of(
        film_id: FilmId,
        scores: &HashMap<UserId, u8>,
    ) -> Option<FilmRatingAggregate> {
        if scores.is_empty() {
            return None;
        }
        Some(FilmRatingAggregate {
            film_id,
            count: scores.len() as u64,
            sum: scores.values().map(|s| u64::from(*s)).sum(),
        })
    }
}

#[async_trait]
impl BookmarkRepository for MemoryUgcStore {
    async fn set_bookmark(
        &self,
        user_id: UserId,
        film_id: FilmId,
        bookmarked: bool,
    ) -> Result<()> {
        if bookmarked {
            self.bookmarks.entry(user_id).or_default().insert(film_id);
        } else if let Some(mut films) = self.bookmarks.get_mut(&user_id) {
            films.remove(&film_id);
        }
        Ok(())
    }

    async fn list_bookmarks(&self, user_id: UserId) -> Result<Vec<FilmId>> {
        Ok(self
            .bookmarks
            .get(&user_id)
            .map(|films| films.iter().copied().collect())
            .unwrap_or_default())
    }
}

#[async_trait]
impl ProgressRepository for MemoryUgcStore {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
        viewed_frame: u64,
    ) -> Result<ProgressRecord> {
        let record = ProgressRecord {
            user_id,
            film_id,
            viewed_frame,
            updated_at: Utc::now(),
        };
        self.progress.insert((user_id, film_id), record.clone());
        Ok(record)
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
    ) -> Result<Option<ProgressRecord>> {
        Ok(self
            .progress
            .get(&(user_id, film_id))
            .map(|record| record.value().clone()))
    }
}

#[async_trait]
impl RatingRepository for MemoryUgcStore {
    async fn upsert_rating_and_aggregate(
        &self,
        film_id: FilmId,
        user_id: UserId,
        score: u8,
    ) -> Result<FilmRatingAggregate> {
        let entry = self.ratings.entry(film_id).or_default();
        // Per-film lock: the upsert and the derived (count, sum) are one
        // unit with respect to other raters of this film.
        let mut scores = entry.lock().unwrap();
        scores.insert(user_id, score);
        Ok(FilmRatingAggregate {
            film_id,
            count: scores.len() as u64,
            sum: scores.values().map(|s| u64::from(*s)).sum(),
        })
    }

    async fn get_aggregate(
        &self,
        film_id: FilmId,
    ) -> Result<Option<FilmRatingAggregate>> {
        Ok(self.ratings.get(&film_id).and_then(|entry| {
            let scores = entry.lock().unwrap();
            Self::aggregate_of(film_id, &scores)
        }))
    }
}
