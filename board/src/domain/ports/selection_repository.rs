//! Port for the admin selection table.

use async_trait::async_trait;

use crate::domain::{DesignId, Selection};

use super::define_port_error;

define_port_error! {
    /// Errors raised by selection repository adapters.
    pub enum SelectionRepositoryError {
        /// The store could not be reached.
        Connection { message: String } =>
            "selection store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "selection store query failed: {message}",
        /// The store answered with rows the adapter could not read.
        Decode { message: String } =>
            "selection store returned an unreadable payload: {message}",
    }
}

/// Port for reading and toggling design selections.
///
/// A design is selected exactly when a row exists for it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SelectionRepository: Send + Sync {
    /// Every selection, newest first.
    async fn list(&self) -> Result<Vec<Selection>, SelectionRepositoryError>;

    /// Whether `design` has a selection row.
    async fn is_selected(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError>;

    /// Insert a selection row.
    async fn insert(&self, selection: &Selection) -> Result<(), SelectionRepositoryError>;

    /// Delete the selection row of `design`; `false` when none existed.
    async fn delete(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError>;
}

/// Fixture implementation: nothing is selected and writes are discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSelectionRepository;

#[async_trait]
impl SelectionRepository for FixtureSelectionRepository {
    async fn list(&self) -> Result<Vec<Selection>, SelectionRepositoryError> {
        Ok(Vec::new())
    }

    async fn is_selected(&self, _design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        Ok(false)
    }

    async fn insert(&self, _selection: &Selection) -> Result<(), SelectionRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        Ok(false)
    }
}
