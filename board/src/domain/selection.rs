//! Admin-curated selection of designs for the next iteration.

use chrono::{DateTime, Utc};

use super::{DesignId, UserId};

/// One selected design; existence of the row means "selected".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The selected design.
    pub design: DesignId,
    /// Admin who selected it.
    pub selected_by: UserId,
    /// When it was selected.
    pub selected_at: DateTime<Utc>,
}

/// Result of a select or unselect request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// A row was written or removed.
    Changed,
    /// The design was already in the requested state.
    Unchanged,
}
