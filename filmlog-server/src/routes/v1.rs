use axum::Router;
use axum::routing::{get, post, put};

use crate::handlers::ugc;
use crate::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/users/me/bookmarks", get(ugc::get_user_films_bookmarks))
        .route(
            "/films/{film_id}/bookmark",
            put(ugc::add_film_bookmark).delete(ugc::delete_film_bookmark),
        )
        .route(
            "/films/{film_id}/progress",
            post(ugc::track_film_progress).get(ugc::get_film_progress),
        )
        .route(
            "/films/{film_id}/rating",
            post(ugc::add_film_rating).get(ugc::get_film_rating),
        )
}
