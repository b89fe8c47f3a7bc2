//! UGC route handlers: bookmarks, playback progress, and film ratings.
//!
//! Handlers stay thin: resolve identity, parse the payload, call the
//! dispatcher or read service, and map the outcome to a status code.
//! Writes acknowledge with `202 Accepted` once the durable effect landed.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filmlog_core::UgcError;
use filmlog_model::{FilmId, FilmRatingAggregate};

use crate::auth::CurrentUser;
use crate::errors::AppResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrackProgressRequest {
    pub viewed_frame: u64,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub film_id: FilmId,
    pub viewed_frame: u64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RateFilmRequest {
    pub rating: u8,
}

#[derive(Debug, Serialize)]
pub struct FilmRatingResponse {
    pub film_id: FilmId,
    pub count: u64,
    pub average: f64,
}

impl From<FilmRatingAggregate> for FilmRatingResponse {
    fn from(aggregate: FilmRatingAggregate) -> Self {
        Self {
            film_id: aggregate.film_id,
            count: aggregate.count,
            average: aggregate.average(),
        }
    }
}

/// `PUT /films/{film_id}/bookmark` - bookmark a film for the caller.
pub async fn add_film_bookmark(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(film_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .bookmark_dispatcher
        .switch_bookmark(user_id, FilmId::from_uuid(film_id), true)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// `DELETE /films/{film_id}/bookmark` - drop the caller's bookmark.
pub async fn delete_film_bookmark(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(film_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .bookmark_dispatcher
        .switch_bookmark(user_id, FilmId::from_uuid(film_id), false)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// `GET /users/me/bookmarks` - every film the caller has bookmarked.
pub async fn get_user_films_bookmarks(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> AppResult<Json<Vec<FilmId>>> {
    let bookmarks =
        state.bookmark_service.get_user_bookmarks(user_id).await?;
    Ok(Json(bookmarks))
}

/// `POST /films/{film_id}/progress` - overwrite the last-viewed frame.
pub async fn track_film_progress(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(film_id): Path<Uuid>,
    Json(request): Json<TrackProgressRequest>,
) -> AppResult<StatusCode> {
    state
        .progress_dispatcher
        .track_progress(
            user_id,
            FilmId::from_uuid(film_id),
            request.viewed_frame,
        )
        .await?;
    Ok(StatusCode::ACCEPTED)
}

/// `GET /films/{film_id}/progress` - the caller's stored progress, 404
/// when none was ever tracked.
pub async fn get_film_progress(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(film_id): Path<Uuid>,
) -> AppResult<Json<ProgressResponse>> {
    let record = state
        .progress_service
        .get_user_film_progress(user_id, FilmId::from_uuid(film_id))
        .await?;
    Ok(Json(ProgressResponse {
        film_id: record.film_id,
        viewed_frame: record.viewed_frame,
        updated_at: record.updated_at,
    }))
}

/// `POST /films/{film_id}/rating` - rate the film, answering with the
/// refreshed aggregate.
pub async fn add_film_rating(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(film_id): Path<Uuid>,
    Json(request): Json<RateFilmRequest>,
) -> AppResult<(StatusCode, Json<FilmRatingResponse>)> {
    let aggregate = state
        .rating_dispatcher
        .rate_film(FilmId::from_uuid(film_id), user_id, request.rating)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(aggregate.into())))
}

/// `GET /films/{film_id}/rating` - current aggregate; `204 No Content`
/// distinguishes "not rated yet" from an average of zero.
pub async fn get_film_rating(
    State(state): State<AppState>,
    Path(film_id): Path<Uuid>,
) -> AppResult<Response> {
    match state
        .rating_service
        .get_film_rating(FilmId::from_uuid(film_id))
        .await
    {
        Ok(aggregate) => {
            Ok(Json(FilmRatingResponse::from(aggregate)).into_response())
        }
        Err(UgcError::NotFound(_)) => {
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_response_carries_the_gateway_timestamp() {
        let response = ProgressResponse {
            film_id: FilmId::new(),
            viewed_frame: 42,
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["viewed_frame"], 42);
        assert!(json["updated_at"].is_string());
    }

    #[test]
    fn rating_response_exposes_the_derived_average() {
        let response = FilmRatingResponse::from(FilmRatingAggregate {
            film_id: FilmId::new(),
            count: 4,
            sum: 26,
        });
        assert_eq!(response.average, 6.5);
    }
}
