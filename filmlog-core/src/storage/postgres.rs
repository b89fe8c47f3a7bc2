//! PostgreSQL gateway backend.
//!
//! Bookmarks and progress are plain `ON CONFLICT` upserts keyed by
//! (user_id, film_id); Postgres applies same-key writes in arrival order,
//! which is exactly the last-write-wins contract. The rating path runs in
//! one transaction so the individual rating row and the per-film aggregate
//! row move together; the row lock on the aggregate serializes concurrent
//! raters of the same film without contending across films.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use filmlog_model::{FilmId, FilmRatingAggregate, ProgressRecord, UserId};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, UgcError};
use crate::storage::ports::{
    BookmarkRepository, ProgressRepository, RatingRepository,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS film_bookmarks (
    user_id     UUID        NOT NULL,
    film_id     UUID        NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, film_id)
);

CREATE TABLE IF NOT EXISTS film_progress (
    user_id      UUID        NOT NULL,
    film_id      UUID        NOT NULL,
    viewed_frame BIGINT      NOT NULL,
    updated_at   TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (user_id, film_id)
);

CREATE TABLE IF NOT EXISTS film_ratings (
    user_id    UUID        NOT NULL,
    film_id    UUID        NOT NULL,
    score      SMALLINT    NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    PRIMARY KEY (user_id, film_id)
);

CREATE INDEX IF NOT EXISTS idx_film_ratings_film
    ON film_ratings (film_id);

CREATE TABLE IF NOT EXISTS film_rating_aggregates (
    film_id      UUID   PRIMARY KEY,
    rating_count BIGINT NOT NULL,
    rating_sum   BIGINT NOT NULL
);
"#;

#[derive(Clone, Debug)]
pub struct PostgresUgcStore {
    pool: PgPool,
}

impl PostgresUgcStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| {
                UgcError::Unavailable(format!(
                    "Failed to connect to PostgreSQL: {}",
                    e
                ))
            })?;
        Ok(Self::new(pool))
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the UGC tables if they do not exist yet.
    pub async fn initialize_schema(&self) -> Result<()> {
        for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
            sqlx::query(statement)
                .execute(self.pool())
                .await
                .map_err(|e| {
                    UgcError::Unavailable(format!(
                        "Failed to initialize schema: {}",
                        e
                    ))
                })?;
        }
        info!("UGC schema initialized");
        Ok(())
    }
}

#[async_trait]
impl BookmarkRepository for PostgresUgcStore {
    async fn set_bookmark(
        &self,
        user_id: UserId,
        film_id: FilmId,
        bookmarked: bool,
    ) -> Result<()> {
        if bookmarked {
            sqlx::query(
                r#"
                INSERT INTO film_bookmarks (user_id, film_id)
                VALUES ($1, $2)
                ON CONFLICT (user_id, film_id) DO NOTHING
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(film_id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| {
                UgcError::Unavailable(format!(
                    "Failed to add bookmark: {}",
                    e
                ))
            })?;
        } else {
            sqlx::query(
                r#"
                DELETE FROM film_bookmarks
                WHERE user_id = $1 AND film_id = $2
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(film_id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(|e| {
                UgcError::Unavailable(format!(
                    "Failed to remove bookmark: {}",
                    e
                ))
            })?;
        }
        Ok(())
    }

    async fn list_bookmarks(&self, user_id: UserId) -> Result<Vec<FilmId>> {
        let rows = sqlx::query(
            r#"
            SELECT film_id FROM film_bookmarks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!("Failed to list bookmarks: {}", e))
        })?;

        Ok(rows
            .into_iter()
            .map(|row| FilmId::from_uuid(row.get::<Uuid, _>("film_id")))
            .collect())
    }
}

#[async_trait]
impl ProgressRepository for PostgresUgcStore {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
        viewed_frame: u64,
    ) -> Result<ProgressRecord> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO film_progress (user_id, film_id, viewed_frame, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, film_id) DO UPDATE SET
                viewed_frame = EXCLUDED.viewed_frame,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(film_id.as_uuid())
        .bind(viewed_frame as i64)
        .bind(now)
        .execute(self.pool())
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to upsert progress: {}",
                e
            ))
        })?;

        Ok(ProgressRecord {
            user_id,
            film_id,
            viewed_frame,
            updated_at: now,
        })
    }

    async fn get_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
    ) -> Result<Option<ProgressRecord>> {
        let row = sqlx::query(
            r#"
            SELECT viewed_frame, updated_at FROM film_progress
            WHERE user_id = $1 AND film_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(film_id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!("Failed to get progress: {}", e))
        })?;

        Ok(row.map(|row| ProgressRecord {
            user_id,
            film_id,
            viewed_frame: row.get::<i64, _>("viewed_frame") as u64,
            updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
        }))
    }
}

#[async_trait]
impl RatingRepository for PostgresUgcStore {
    async fn upsert_rating_and_aggregate(
        &self,
        film_id: FilmId,
        user_id: UserId,
        score: u8,
    ) -> Result<FilmRatingAggregate> {
        let now = Utc::now();

        let mut tx = self.pool().begin().await.map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to start transaction: {}",
                e
            ))
        })?;

        // Serialize raters of this film up front: create the aggregate row
        // on first use and take its row lock either way. Raters of other
        // films touch other rows and never contend.
        sqlx::query(
            r#"
            INSERT INTO film_rating_aggregates (film_id, rating_count, rating_sum)
            VALUES ($1, 0, 0)
            ON CONFLICT (film_id) DO UPDATE SET film_id = EXCLUDED.film_id
            "#,
        )
        .bind(film_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to lock rating aggregate: {}",
                e
            ))
        })?;

        let prior: Option<i16> = sqlx::query_scalar(
            r#"
            SELECT score FROM film_ratings
            WHERE user_id = $1 AND film_id = $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(film_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to read prior rating: {}",
                e
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO film_ratings (user_id, film_id, score, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, film_id) DO UPDATE SET
                score = EXCLUDED.score,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(film_id.as_uuid())
        .bind(i16::from(score))
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!("Failed to upsert rating: {}", e))
        })?;

        // Delta update under the lock taken above: new rating bumps the
        // count, replacement only moves the sum by the score difference.
        let count_delta: i64 = if prior.is_none() { 1 } else { 0 };
        let sum_delta: i64 =
            i64::from(score) - i64::from(prior.unwrap_or(0));

        let row = sqlx::query(
            r#"
            UPDATE film_rating_aggregates SET
                rating_count = rating_count + $2,
                rating_sum = rating_sum + $3
            WHERE film_id = $1
            RETURNING rating_count, rating_sum
            "#,
        )
        .bind(film_id.as_uuid())
        .bind(count_delta)
        .bind(sum_delta)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to update rating aggregate: {}",
                e
            ))
        })?;

        tx.commit().await.map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to commit transaction: {}",
                e
            ))
        })?;

        Ok(FilmRatingAggregate {
            film_id,
            count: row.get::<i64, _>("rating_count") as u64,
            sum: row.get::<i64, _>("rating_sum") as u64,
        })
    }

    async fn get_aggregate(
        &self,
        film_id: FilmId,
    ) -> Result<Option<FilmRatingAggregate>> {
        let row = sqlx::query(
            r#"
            SELECT rating_count, rating_sum FROM film_rating_aggregates
            WHERE film_id = $1
            "#,
        )
        .bind(film_id.as_uuid())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            UgcError::Unavailable(format!(
                "Failed to get rating aggregate: {}",
                e
            ))
        })?;

        Ok(row
            .map(|row| FilmRatingAggregate {
                film_id,
                count: row.get::<i64, _>("rating_count") as u64,
                sum: row.get::<i64, _>("rating_sum") as u64,
            })
            .filter(|aggregate| aggregate.count > 0))
    }
}
