//! In-memory selection table.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{SelectionRepository, SelectionRepositoryError};
use crate::domain::{DesignId, Selection};

/// Selection repository holding rows in process memory.
#[derive(Debug, Default)]
pub struct InMemorySelectionRepository {
    rows: Mutex<Vec<Selection>>,
    unavailable: AtomicBool,
}

impl InMemorySelectionRepository {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with a connection error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Selection>>, SelectionRepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SelectionRepositoryError::connection(
                "in-memory store marked unavailable",
            ));
        }
        self.rows
            .lock()
            .map_err(|_| SelectionRepositoryError::query("selection table lock poisoned"))
    }
}

#[async_trait]
impl SelectionRepository for InMemorySelectionRepository {
    async fn list(&self) -> Result<Vec<Selection>, SelectionRepositoryError> {
        let mut rows = self.lock()?.clone();
        rows.sort_by(|a, b| b.selected_at.cmp(&a.selected_at));
        Ok(rows)
    }

    async fn is_selected(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        Ok(self.lock()?.iter().any(|row| &row.design == design))
    }

    async fn insert(&self, selection: &Selection) -> Result<(), SelectionRepositoryError> {
        let mut rows = self.lock()?;
        if !rows.iter().any(|row| row.design == selection.design) {
            rows.push(selection.clone());
        }
        Ok(())
    }

    async fn delete(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|row| &row.design != design);
        Ok(rows.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;
    use chrono::{Duration, TimeZone, Utc};

    #[tokio::test]
    async fn lists_newest_first_and_deletes() {
        let repo = InMemorySelectionRepository::new();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().expect("time");
        for (offset, name) in [(0, "a.png"), (5, "b.png")] {
            repo.insert(&Selection {
                design: DesignId::from_parts("theme1", name).expect("id"),
                selected_by: UserId::random(),
                selected_at: start + Duration::minutes(offset),
            })
            .await
            .expect("insert");
        }

        let names: Vec<_> = repo
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|row| row.design.filename().to_owned())
            .collect();
        assert_eq!(names, ["b.png", "a.png"]);

        let first = DesignId::from_parts("theme1", "a.png").expect("id");
        assert!(repo.delete(&first).await.expect("delete"));
        assert!(!repo.delete(&first).await.expect("delete"));
        assert!(!repo.is_selected(&first).await.expect("lookup"));
    }
}
