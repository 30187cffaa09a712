//! Admin selection service.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::ports::{SelectionRepository, SelectionRepositoryError};
use crate::domain::{AdminPolicy, DesignId, DomainError, Identity, Selection, SelectionChange};

/// Marks and unmarks designs for the next iteration.
#[derive(Clone)]
pub struct SelectionService<S> {
    repo: Arc<S>,
    admins: AdminPolicy,
    clock: Arc<dyn Clock>,
}

impl<S> SelectionService<S> {
    /// Create a service; `admins` decides who may change selections.
    pub fn new(repo: Arc<S>, admins: AdminPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            admins,
            clock,
        }
    }

    /// Whether `identity` may change selections.
    pub fn is_admin(&self, identity: Option<&Identity>) -> bool {
        identity.is_some_and(|who| self.admins.is_admin(who))
    }

    fn require_admin<'a>(&self, identity: Option<&'a Identity>) -> Result<&'a Identity, DomainError> {
        let who = identity.ok_or_else(|| DomainError::unauthorized("sign in to curate designs"))?;
        if self.admins.is_admin(who) {
            Ok(who)
        } else {
            Err(DomainError::forbidden("only admins may curate designs"))
        }
    }
}

fn map_selection_error(error: SelectionRepositoryError) -> DomainError {
    match error {
        SelectionRepositoryError::Connection { message } => {
            DomainError::service_unavailable(format!("selection store unavailable: {message}"))
        }
        SelectionRepositoryError::Query { message } => {
            DomainError::internal(format!("selection store error: {message}"))
        }
        SelectionRepositoryError::Decode { message } => {
            DomainError::internal(format!("selection store payload unreadable: {message}"))
        }
    }
}

impl<S> SelectionService<S>
where
    S: SelectionRepository,
{
    /// Every selection, newest first.
    pub async fn list(&self) -> Result<Vec<Selection>, DomainError> {
        self.repo.list().await.map_err(map_selection_error)
    }

    /// Ids of every selected design.
    pub async fn selected_ids(&self) -> Result<HashSet<DesignId>, DomainError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|selection| selection.design)
            .collect())
    }

    /// Mark `design` selected.
    ///
    /// Already selected designs succeed without a write. When the caller
    /// already holds the selected set it is consulted instead of the store.
    pub async fn select(
        &self,
        identity: Option<&Identity>,
        design: &DesignId,
        known: Option<&HashSet<DesignId>>,
    ) -> Result<SelectionChange, DomainError> {
        let admin = self.require_admin(identity)?;
        let already = match known {
            Some(selected) => selected.contains(design),
            None => self
                .repo
                .is_selected(design)
                .await
                .map_err(map_selection_error)?,
        };
        if already {
            return Ok(SelectionChange::Unchanged);
        }

        self.repo
            .insert(&Selection {
                design: design.clone(),
                selected_by: admin.user_id.clone(),
                selected_at: self.clock.utc(),
            })
            .await
            .map_err(map_selection_error)?;
        info!(%design, admin = %admin.user_id, "design selected");
        Ok(SelectionChange::Changed)
    }

    /// Remove the selection of `design`.
    pub async fn unselect(
        &self,
        identity: Option<&Identity>,
        design: &DesignId,
    ) -> Result<SelectionChange, DomainError> {
        let admin = self.require_admin(identity)?;
        let removed = self
            .repo
            .delete(design)
            .await
            .map_err(map_selection_error)?;
        if removed {
            info!(%design, admin = %admin.user_id, "design unselected");
            Ok(SelectionChange::Changed)
        } else {
            Ok(SelectionChange::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSelectionRepository;
    use crate::domain::{ErrorCode, UserId};
    use chrono::{TimeZone, Utc};
    use mockable::MockClock;
    use rstest::{fixture, rstest};

    fn design() -> DesignId {
        DesignId::parse("theme2/poster.jpg").expect("valid id")
    }

    fn admin() -> Identity {
        let mut identity = Identity::new(UserId::random());
        identity.email = Some("Lead@Example.com".to_owned());
        identity
    }

    fn reviewer() -> Identity {
        let mut identity = Identity::new(UserId::random());
        identity.email = Some("someone@example.com".to_owned());
        identity
    }

    #[fixture]
    fn clock() -> Arc<dyn Clock> {
        let mut clock = MockClock::new();
        clock
            .expect_utc()
            .returning(|| Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid time"));
        Arc::new(clock)
    }

    fn service(repo: MockSelectionRepository, clock: Arc<dyn Clock>) -> SelectionService<MockSelectionRepository> {
        SelectionService::new(
            Arc::new(repo),
            AdminPolicy::from_comma_separated("lead@example.com"),
            clock,
        )
    }

    #[rstest]
    #[tokio::test]
    async fn admin_selection_inserts_a_row(clock: Arc<dyn Clock>) {
        let who = admin();
        let expected_by = who.user_id.clone();
        let mut repo = MockSelectionRepository::new();
        repo.expect_is_selected().times(1).return_once(|_| Ok(false));
        repo.expect_insert()
            .withf(move |selection| selection.selected_by == expected_by)
            .times(1)
            .return_once(|_| Ok(()));

        let change = service(repo, clock)
            .select(Some(&who), &design(), None)
            .await
            .expect("selected");
        assert_eq!(change, SelectionChange::Changed);
    }

    #[rstest]
    #[tokio::test]
    async fn known_selection_skips_the_store(clock: Arc<dyn Clock>) {
        let mut repo = MockSelectionRepository::new();
        repo.expect_is_selected().times(0);
        repo.expect_insert().times(0);
        let known: HashSet<_> = [design()].into_iter().collect();

        let change = service(repo, clock)
            .select(Some(&admin()), &design(), Some(&known))
            .await
            .expect("no-op");
        assert_eq!(change, SelectionChange::Unchanged);
    }

    #[rstest]
    #[case::signed_out(None, ErrorCode::Unauthorized)]
    #[case::not_admin(Some(reviewer()), ErrorCode::Forbidden)]
    #[tokio::test]
    async fn non_admins_are_refused(
        clock: Arc<dyn Clock>,
        #[case] identity: Option<Identity>,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockSelectionRepository::new();
        repo.expect_insert().times(0);
        repo.expect_delete().times(0);
        let service = service(repo, clock);

        let error = service
            .select(identity.as_ref(), &design(), None)
            .await
            .expect_err("refused");
        assert_eq!(error.code(), expected);
        let error = service
            .unselect(identity.as_ref(), &design())
            .await
            .expect_err("refused");
        assert_eq!(error.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unselecting_missing_row_is_unchanged(clock: Arc<dyn Clock>) {
        let mut repo = MockSelectionRepository::new();
        repo.expect_delete().times(1).return_once(|_| Ok(false));

        let change = service(repo, clock)
            .unselect(Some(&admin()), &design())
            .await
            .expect("no-op");
        assert_eq!(change, SelectionChange::Unchanged);
    }

    #[rstest]
    #[tokio::test]
    async fn store_outage_maps_to_service_unavailable(clock: Arc<dyn Clock>) {
        let mut repo = MockSelectionRepository::new();
        repo.expect_list()
            .times(1)
            .return_once(|| Err(SelectionRepositoryError::connection("refused")));

        let error = service(repo, clock).list().await.expect_err("outage");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
