use std::{fmt, sync::Arc};

use filmlog_model::{FilmId, ProgressRecord, UserId};
use tracing::debug;

use crate::error::{Result, UgcError};
use crate::storage::ports::ProgressRepository;

/// Records the last-viewed playback offset for a (user, film) pair.
///
/// Always a full overwrite: the client is the source of truth for playback
/// position, so the dispatcher delivers, it does not reconcile. Overlapping
/// concurrent updates for the same pair resolve to whichever write the
/// gateway observes last.
#[derive(Clone)]
pub struct ProgressDispatcher {
    repo: Arc<dyn ProgressRepository>,
}

impl fmt::Debug for ProgressDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressDispatcher").finish_non_exhaustive()
    }
}

impl ProgressDispatcher {
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    pub async fn track_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
        viewed_frame: u64,
    ) -> Result<ProgressRecord> {
        let record =
            self.repo.upsert_progress(user_id, film_id, viewed_frame).await?;
        debug!(%user_id, %film_id, viewed_frame, "progress tracked");
        Ok(record)
    }
}

/// Query-side counterpart of [`ProgressDispatcher`].
#[derive(Clone)]
pub struct ProgressService {
    repo: Arc<dyn ProgressRepository>,
}

impl fmt::Debug for ProgressService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressService").finish_non_exhaustive()
    }
}

impl ProgressService {
    pub fn new(repo: Arc<dyn ProgressRepository>) -> Self {
        Self { repo }
    }

    /// Stored record for the pair, or [`UgcError::NotFound`] when the user
    /// never tracked progress for this film. Frame 0 is a stored value,
    /// not this absence signal.
    pub async fn get_user_film_progress(
        &self,
        user_id: UserId,
        film_id: FilmId,
    ) -> Result<ProgressRecord> {
        self.repo
            .get_progress(user_id, film_id)
            .await?
            .ok_or_else(|| {
                UgcError::NotFound(format!(
                    "no progress recorded for film {film_id}"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ports::MockProgressRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    #[tokio::test]
    async fn track_passes_the_frame_through_unchanged() {
        let user = UserId::new();
        let film = FilmId::new();

        let mut repo = MockProgressRepository::new();
        repo.expect_upsert_progress()
            .with(eq(user), eq(film), eq(0u64))
            .once()
            .returning(|user_id, film_id, viewed_frame| {
                Ok(ProgressRecord {
                    user_id,
                    film_id,
                    viewed_frame,
                    updated_at: Utc::now(),
                })
            });

        let dispatcher = ProgressDispatcher::new(Arc::new(repo));
        let record =
            dispatcher.track_progress(user, film, 0).await.unwrap();
        assert_eq!(record.viewed_frame, 0);
    }

    #[test]
    fn debug_output_does_not_expose_the_gateway() {
        let dispatcher = ProgressDispatcher::new(Arc::new(
            MockProgressRepository::new(),
        ));
        let service =
            ProgressService::new(Arc::new(MockProgressRepository::new()));
        assert_eq!(
            format!("{dispatcher:?}"),
            "ProgressDispatcher { .. }"
        );
        assert_eq!(format!("{service:?}"), "ProgressService { .. }");
    }

    #[tokio::test]
    async fn missing_record_becomes_not_found() {
        let mut repo = MockProgressRepository::new();
        repo.expect_get_progress().returning(|_, _| Ok(None));

        let service = ProgressService::new(Arc::new(repo));
        let err = service
            .get_user_film_progress(UserId::new(), FilmId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, UgcError::NotFound(_)));
    }
}
