use std::{fmt, sync::Arc};

use filmlog_model::{FilmId, UserId};
use tracing::debug;

use crate::error::Result;
use crate::storage::ports::BookmarkRepository;

/// Toggles bookmark membership for the authenticated user.
///
/// Both directions are idempotent: the gateway's set semantics make a
/// redundant add or remove a no-op, never an error.
#[derive(Clone)]
pub struct BookmarkDispatcher {
    repo: Arc<dyn BookmarkRepository>,
}

impl fmt::Debug for BookmarkDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkDispatcher").finish_non_exhaustive()
    }
}

impl BookmarkDispatcher {
    pub fn new(repo: Arc<dyn BookmarkRepository>) -> Self {
        Self { repo }
    }

    pub async fn switch_bookmark(
        &self,
        user_id: UserId,
        film_id: FilmId,
        bookmarked: bool,
    ) -> Result<()> {
        self.repo.set_bookmark(user_id, film_id, bookmarked).await?;
        debug!(%user_id, %film_id, bookmarked, "bookmark switched");
        Ok(())
    }
}

/// Query-side counterpart of [`BookmarkDispatcher`].
#[derive(Clone)]
pub struct BookmarkService {
    repo: Arc<dyn BookmarkRepository>,
}

impl fmt::Debug for BookmarkService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookmarkService").finish_non_exhaustive()
    }
}

impl BookmarkService {
    pub fn new(repo: Arc<dyn BookmarkRepository>) -> Self {
        Self { repo }
    }

    /// All films currently bookmarked by the user, order-insignificant.
    pub async fn get_user_bookmarks(
        &self,
        user_id: UserId,
    ) -> Result<Vec<FilmId>> {
        self.repo.list_bookmarks(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UgcError;
    use crate::storage::ports::MockBookmarkRepository;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn switch_forwards_the_requested_direction() {
        let user = UserId::new();
        let film = FilmId::new();

        let mut repo = MockBookmarkRepository::new();
        repo.expect_set_bookmark()
            .with(eq(user), eq(film), eq(false))
            .once()
            .returning(|_, _, _| Ok(()));

        let dispatcher = BookmarkDispatcher::new(Arc::new(repo));
        dispatcher
            .switch_bookmark(user, film, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn storage_failure_is_surfaced_not_swallowed() {
        let mut repo = MockBookmarkRepository::new();
        repo.expect_set_bookmark().returning(|_, _, _| {
            Err(UgcError::Unavailable("connection refused".into()))
        });

        let dispatcher = BookmarkDispatcher::new(Arc::new(repo));
        let err = dispatcher
            .switch_bookmark(UserId::new(), FilmId::new(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, UgcError::Unavailable(_)));
    }

    #[test]
    fn debug_output_does_not_expose_the_gateway() {
        let dispatcher = BookmarkDispatcher::new(Arc::new(
            MockBookmarkRepository::new(),
        ));
        let service =
            BookmarkService::new(Arc::new(MockBookmarkRepository::new()));
        assert_eq!(
            format!("{dispatcher:?}"),
            "BookmarkDispatcher { .. }"
        );
        assert_eq!(format!("{service:?}"), "BookmarkService { .. }");
    }

    #[tokio::test]
    async fn service_returns_the_gateway_set() {
        let user = UserId::new();
        let films = vec![FilmId::new(), FilmId::new()];
        let expected = films.clone();

        let mut repo = MockBookmarkRepository::new();
        repo.expect_list_bookmarks()
            .with(eq(user))
            .returning(move |_| Ok(films.clone()));

        let service = BookmarkService::new(Arc::new(repo));
        assert_eq!(service.get_user_bookmarks(user).await.unwrap(), expected);
    }
}
