//! In-memory feedback table.
//!
//! Mirrors the hosted table closely enough for demos and tests, including
//! the at-most-one-vote uniqueness rule enforced by the shipped schema.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    CommentSelector, FeedbackRepository, FeedbackRepositoryError, NewComment, NewVote, StoredVote,
};
use crate::domain::{
    ANONYMOUS_USERNAME, DesignId, FeedbackBody, FeedbackRecord, FeedbackRecordId, UserId,
    VoteKind, Voter,
};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<FeedbackRecord>,
    next_id: i64,
}

impl Table {
    fn push(&mut self, mut record: FeedbackRecord) -> FeedbackRecord {
        self.next_id += 1;
        record.id = FeedbackRecordId(self.next_id);
        self.rows.push(record.clone());
        record
    }

    fn newest_first<'a>(rows: impl Iterator<Item = &'a FeedbackRecord>) -> Vec<FeedbackRecord> {
        let mut selected: Vec<FeedbackRecord> = rows.cloned().collect();
        selected.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        selected
    }
}

fn vote_of(record: &FeedbackRecord) -> Option<VoteKind> {
    match record.body {
        FeedbackBody::Vote(kind) => Some(kind),
        FeedbackBody::Comment(_) => None,
    }
}

fn is_vote_by(record: &FeedbackRecord, design: &DesignId, user: &UserId) -> bool {
    vote_of(record).is_some() && &record.design == design && record.user.as_ref() == Some(user)
}

/// Feedback repository holding rows in process memory.
pub struct InMemoryFeedbackRepository {
    table: Mutex<Table>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
}

impl InMemoryFeedbackRepository {
    /// Empty table stamping rows with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(Table::default()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every call fail with a connection error until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert a row as-is apart from its id; returns the stored row.
    ///
    /// Used to seed legacy rows such as anonymous votes.
    pub fn seed(&self, record: FeedbackRecord) -> Result<FeedbackRecord, FeedbackRepositoryError> {
        Ok(self.lock()?.push(record))
    }

    /// Snapshot of every row in insertion order.
    pub fn rows(&self) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        Ok(self.lock()?.rows.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Table>, FeedbackRepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(FeedbackRepositoryError::connection("in-memory store marked unavailable"));
        }
        self.table
            .lock()
            .map_err(|_| FeedbackRepositoryError::query("feedback table lock poisoned"))
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        let table = self.lock()?;
        Ok(Table::newest_first(table.rows.iter()))
    }

    async fn fetch_design(
        &self,
        design: &DesignId,
    ) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        let table = self.lock()?;
        Ok(Table::newest_first(
            table.rows.iter().filter(|row| &row.design == design),
        ))
    }

    async fn find_vote(
        &self,
        design: &DesignId,
        user: &UserId,
    ) -> Result<Option<StoredVote>, FeedbackRepositoryError> {
        let table = self.lock()?;
        Ok(table
            .rows
            .iter()
            .filter(|row| is_vote_by(row, design, user))
            .filter_map(|row| vote_of(row).map(|kind| StoredVote { id: row.id, kind }))
            .next())
    }

    async fn insert_vote(&self, vote: &NewVote) -> Result<(), FeedbackRepositoryError> {
        let mut table = self.lock()?;
        if table
            .rows
            .iter()
            .any(|row| is_vote_by(row, &vote.design, &vote.user))
        {
            return Err(FeedbackRepositoryError::conflict(format!(
                "user {} already voted on {}",
                vote.user, vote.design
            )));
        }
        table.push(FeedbackRecord {
            id: FeedbackRecordId(0),
            design: vote.design.clone(),
            user: Some(vote.user.clone()),
            body: FeedbackBody::Vote(vote.kind),
            username: vote.username.clone(),
            created_at: self.clock.utc(),
        });
        Ok(())
    }

    async fn update_vote(
        &self,
        id: FeedbackRecordId,
        kind: VoteKind,
        username: &str,
    ) -> Result<(), FeedbackRepositoryError> {
        let mut table = self.lock()?;
        if let Some(row) = table
            .rows
            .iter_mut()
            .find(|row| row.id == id && vote_of(row).is_some())
        {
            row.body = FeedbackBody::Vote(kind);
            username.clone_into(&mut row.username);
        }
        Ok(())
    }

    async fn delete_vote(&self, id: FeedbackRecordId) -> Result<(), FeedbackRepositoryError> {
        let mut table = self.lock()?;
        table
            .rows
            .retain(|row| !(row.id == id && vote_of(row).is_some()));
        Ok(())
    }

    async fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> Result<FeedbackRecord, FeedbackRepositoryError> {
        let mut table = self.lock()?;
        Ok(table.push(FeedbackRecord {
            id: FeedbackRecordId(0),
            design: comment.design.clone(),
            user: Some(comment.user.clone()),
            body: FeedbackBody::Comment(comment.text.to_string()),
            username: comment.username.clone(),
            created_at: self.clock.utc(),
        }))
    }

    async fn delete_comment(
        &self,
        selector: &CommentSelector,
    ) -> Result<u64, FeedbackRepositoryError> {
        let mut table = self.lock()?;
        let before = table.rows.len();
        table.rows.retain(|row| {
            let FeedbackBody::Comment(text) = &row.body else {
                return true;
            };
            let matches = match selector {
                CommentSelector::ById { id, user } => {
                    row.id == *id && row.user.as_ref() == Some(user)
                }
                CommentSelector::ByContent {
                    design,
                    user,
                    text: wanted,
                } => &row.design == design && row.user.as_ref() == Some(user) && text == wanted,
            };
            !matches
        });
        Ok((before - table.rows.len()) as u64)
    }

    async fn voters(&self, design: &DesignId) -> Result<Vec<Voter>, FeedbackRepositoryError> {
        let table = self.lock()?;
        Ok(Table::newest_first(
            table.rows.iter().filter(|row| &row.design == design),
        )
        .into_iter()
        .filter_map(|row| {
            vote_of(&row).map(|kind| Voter {
                username: row.username,
                kind,
                created_at: row.created_at,
            })
        })
        .collect())
    }

    async fn claim_anonymous_votes(
        &self,
        user: &UserId,
        username: &str,
    ) -> Result<u64, FeedbackRepositoryError> {
        let mut table = self.lock()?;
        let mut updated = 0;
        for row in table.rows.iter_mut().filter(|row| {
            vote_of(row).is_some()
                && row.user.as_ref() == Some(user)
                && row.username == ANONYMOUS_USERNAME
        }) {
            username.clone_into(&mut row.username);
            updated += 1;
        }
        Ok(updated)
    }
}
