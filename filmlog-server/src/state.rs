use std::{fmt, sync::Arc};

use filmlog_core::domain::{
    BookmarkDispatcher, BookmarkService, FilmRatingService,
    ProgressDispatcher, ProgressService, RatingDispatcher,
};
use filmlog_core::storage::{
    BookmarkRepository, ProgressRepository, RatingRepository,
};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub bookmark_dispatcher: Arc<BookmarkDispatcher>,
    pub bookmark_service: Arc<BookmarkService>,
    pub progress_dispatcher: Arc<ProgressDispatcher>,
    pub progress_service: Arc<ProgressService>,
    pub rating_dispatcher: Arc<RatingDispatcher>,
    pub rating_service: Arc<FilmRatingService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire every dispatcher and read service against one gateway.
    pub fn new(
        config: Arc<Config>,
        bookmarks: Arc<dyn BookmarkRepository>,
        progress: Arc<dyn ProgressRepository>,
        ratings: Arc<dyn RatingRepository>,
    ) -> Self {
        Self {
            config,
            bookmark_dispatcher: Arc::new(BookmarkDispatcher::new(
                bookmarks.clone(),
            )),
            bookmark_service: Arc::new(BookmarkService::new(bookmarks)),
            progress_dispatcher: Arc::new(ProgressDispatcher::new(
                progress.clone(),
            )),
            progress_service: Arc::new(ProgressService::new(progress)),
            rating_dispatcher: Arc::new(RatingDispatcher::new(
                ratings.clone(),
            )),
            rating_service: Arc::new(FilmRatingService::new(ratings)),
        }
    }
}
