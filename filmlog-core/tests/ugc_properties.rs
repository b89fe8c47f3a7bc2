//! End-to-end properties of the dispatch-and-aggregation layer, exercised
//! through the dispatchers and read services against the in-memory gateway.

use std::sync::Arc;

use filmlog_core::UgcError;
use filmlog_core::domain::{
    BookmarkDispatcher, BookmarkService, FilmRatingService,
    ProgressDispatcher, ProgressService, RatingDispatcher,
};
use filmlog_core::storage::MemoryUgcStore;
use filmlog_model::{FilmId, UserId};

struct Ugc {
    bookmark_dispatcher: BookmarkDispatcher,
    bookmark_service: BookmarkService,
    progress_dispatcher: ProgressDispatcher,
    progress_service: ProgressService,
    rating_dispatcher: RatingDispatcher,
    rating_service: FilmRatingService,
}

fn ugc() -> Ugc {
    let store = Arc::new(MemoryUgcStore::new());
    Ugc {
        bookmark_dispatcher: BookmarkDispatcher::new(store.clone()),
        bookmark_service: BookmarkService::new(store.clone()),
        progress_dispatcher: ProgressDispatcher::new(store.clone()),
        progress_service: ProgressService::new(store.clone()),
        rating_dispatcher: RatingDispatcher::new(store.clone()),
        rating_service: FilmRatingService::new(store),
    }
}

#[tokio::test]
async fn bookmark_toggles_are_idempotent_in_both_directions() {
    let ugc = ugc();
    let user = UserId::new();
    let film = FilmId::new();

    ugc.bookmark_dispatcher
        .switch_bookmark(user, film, true)
        .await
        .unwrap();
    ugc.bookmark_dispatcher
        .switch_bookmark(user, film, true)
        .await
        .unwrap();
    assert_eq!(
        ugc.bookmark_service.get_user_bookmarks(user).await.unwrap(),
        vec![film]
    );

    // Removing twice, the second on an already-absent bookmark, is fine.
    ugc.bookmark_dispatcher
        .switch_bookmark(user, film, false)
        .await
        .unwrap();
    ugc.bookmark_dispatcher
        .switch_bookmark(user, film, false)
        .await
        .unwrap();
    assert!(
        ugc.bookmark_service
            .get_user_bookmarks(user)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn progress_is_overwritten_never_merged() {
    let ugc = ugc();
    let user = UserId::new();
    let film = FilmId::new();

    ugc.progress_dispatcher
        .track_progress(user, film, 10)
        .await
        .unwrap();
    ugc.progress_dispatcher
        .track_progress(user, film, 3)
        .await
        .unwrap();

    let record = ugc
        .progress_service
        .get_user_film_progress(user, film)
        .await
        .unwrap();
    // A lower frame wins: delivery, not maximum-tracking.
    assert_eq!(record.viewed_frame, 3);
}

#[tokio::test]
async fn absent_progress_is_signaled_not_zeroed() {
    let ugc = ugc();
    let err = ugc
        .progress_service
        .get_user_film_progress(UserId::new(), FilmId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, UgcError::NotFound(_)));
}

#[tokio::test]
async fn aggregate_matches_the_mean_over_distinct_raters() {
    let ugc = ugc();
    let film = FilmId::new();
    let scores = [2u8, 4, 6, 8, 10];

    for score in scores {
        ugc.rating_dispatcher
            .rate_film(film, UserId::new(), score)
            .await
            .unwrap();
    }

    let aggregate = ugc.rating_service.get_film_rating(film).await.unwrap();
    assert_eq!(aggregate.count, scores.len() as u64);
    assert_eq!(aggregate.average(), 6.0);
}

#[tokio::test]
async fn re_rating_replaces_the_score_without_growing_the_count() {
    let ugc = ugc();
    let film = FilmId::new();
    let user = UserId::new();
    let other = UserId::new();

    ugc.rating_dispatcher
        .rate_film(film, other, 3)
        .await
        .unwrap();
    ugc.rating_dispatcher.rate_film(film, user, 5).await.unwrap();

    let aggregate =
        ugc.rating_dispatcher.rate_film(film, user, 9).await.unwrap();
    assert_eq!(aggregate.count, 2);
    assert_eq!(aggregate.sum, 12); // 9 replaced 5 next to the 3
}

#[tokio::test]
async fn unrated_film_signals_no_ratings_not_a_zero_aggregate() {
    let ugc = ugc();
    let err = ugc
        .rating_service
        .get_film_rating(FilmId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, UgcError::NotFound(_)));
}

#[tokio::test]
async fn rejected_score_leaves_no_trace() {
    let ugc = ugc();
    let film = FilmId::new();

    let err = ugc
        .rating_dispatcher
        .rate_film(film, UserId::new(), 11)
        .await
        .unwrap_err();
    assert!(matches!(err, UgcError::InvalidInput(_)));

    // No aggregate was created and no rating stored.
    let err = ugc.rating_service.get_film_rating(film).await.unwrap_err();
    assert!(matches!(err, UgcError::NotFound(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_raters_lose_no_updates() {
    let ugc = Arc::new(ugc());
    let film = FilmId::new();
    let raters = 64u64;

    let mut handles = Vec::new();
    for i in 0..raters {
        let ugc = ugc.clone();
        let score = (i % 11) as u8;
        handles.push(tokio::spawn(async move {
            ugc.rating_dispatcher
                .rate_film(film, UserId::new(), score)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let expected_sum: u64 = (0..raters).map(|i| i % 11).sum();
    let aggregate = ugc.rating_service.get_film_rating(film).await.unwrap();
    assert_eq!(aggregate.count, raters);
    assert_eq!(aggregate.sum, expected_sum);
    assert_eq!(
        aggregate.average(),
        expected_sum as f64 / raters as f64
    );
}

#[tokio::test]
async fn ratings_for_different_films_do_not_interfere() {
    let ugc = ugc();
    let user = UserId::new();
    let first = FilmId::new();
    let second = FilmId::new();

    ugc.rating_dispatcher.rate_film(first, user, 2).await.unwrap();
    ugc.rating_dispatcher.rate_film(second, user, 8).await.unwrap();

    let a = ugc.rating_service.get_film_rating(first).await.unwrap();
    let b = ugc.rating_service.get_film_rating(second).await.unwrap();
    assert_eq!((a.count, a.sum), (1, 2));
    assert_eq!((b.count, b.sum), (1, 8));
}
