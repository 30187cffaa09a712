//! Test doubles shared by unit tests (in `src/`) and integration tests (in
//! `tests/`).
//!
//! Compiled for `cfg(test)` and with the `test-support` feature only.

use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gallery_builder::BadgeKind;
use mockable::{Clock, DefaultClock};
use tokio::sync::Notify;

use crate::domain::ports::{
    CommentSelector, CommentView, FeedbackRepository, FeedbackRepositoryError, ImmediateSleeper,
    LightboxView, NewComment, NewVote, Notice, RenderSurface, SelectionRepository,
    SelectionRepositoryError, StoredVote, ThemeStatsView,
};
use crate::domain::{
    AdminPolicy, DesignId, FeedbackRecord, FeedbackRecordId, FeedbackService, Gallery, Identity,
    Selection, SelectionService, Theme, UserId, VoteCounts, VoteKind, Voter,
};
use crate::inbound::ui::{BoardController, BoardPorts};
use crate::outbound::memory::{
    InMemoryAuthSession, InMemoryFeedbackRepository, InMemorySelectionRepository,
};

/// One call made on a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// `set_badge`.
    Badge(DesignId, BadgeKind, u32),
    /// `set_vote_highlight`.
    Highlight(DesignId, Option<VoteKind>),
    /// `set_lightbox_votes`.
    LightboxVotes(VoteCounts, Option<VoteKind>),
    /// `set_processing`.
    Processing(DesignId, bool),
    /// `show_lightbox`.
    Lightbox(LightboxView),
    /// `patch_comments`.
    Comments(DesignId, Vec<CommentView>),
    /// `close_lightbox`.
    Closed,
    /// `set_theme_stats`.
    ThemeStats(String, ThemeStatsView),
    /// `set_identity`.
    Identity(Option<Identity>),
    /// `set_selected`.
    Selected(DesignId, bool),
    /// `notify`.
    Notice(Notice),
    /// `confirm`, with the prompt shown.
    Confirm(String),
}

/// Render surface that records every call and answers confirmations from a
/// preset.
#[derive(Debug)]
pub struct RecordingSurface {
    events: RefCell<Vec<SurfaceEvent>>,
    confirm_answer: Cell<bool>,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            confirm_answer: Cell::new(true),
        }
    }
}

impl RecordingSurface {
    /// Surface that confirms every prompt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer future confirmations with `answer`.
    pub fn answer_confirm(&self, answer: bool) {
        self.confirm_answer.set(answer);
    }

    /// Every recorded call, oldest first.
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.borrow().clone()
    }

    /// Forget recorded calls.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Last value written to the `kind` badge of `design`.
    pub fn badge(&self, design: &DesignId, kind: BadgeKind) -> Option<u32> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            SurfaceEvent::Badge(target, badge, value) if target == design && *badge == kind => {
                Some(*value)
            }
            _ => None,
        })
    }

    /// Last highlight drawn on `design`; `None` when never drawn.
    pub fn highlight(&self, design: &DesignId) -> Option<Option<VoteKind>> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            SurfaceEvent::Highlight(target, vote) if target == design => Some(*vote),
            _ => None,
        })
    }

    /// Last lightbox drawn.
    pub fn lightbox(&self) -> Option<LightboxView> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            SurfaceEvent::Lightbox(view) => Some(view.clone()),
            _ => None,
        })
    }

    /// Last comment list patched in for `design`.
    pub fn comments(&self, design: &DesignId) -> Option<Vec<CommentView>> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            SurfaceEvent::Comments(target, comments) if target == design => Some(comments.clone()),
            _ => None,
        })
    }

    /// Last statistics written for `theme`.
    pub fn theme_stats(&self, theme: &str) -> Option<ThemeStatsView> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            SurfaceEvent::ThemeStats(target, stats) if target == theme => Some(stats.clone()),
            _ => None,
        })
    }

    /// Last selection mark drawn on `design`.
    pub fn selected(&self, design: &DesignId) -> Option<bool> {
        self.events.borrow().iter().rev().find_map(|event| match event {
            SurfaceEvent::Selected(target, selected) if target == design => Some(*selected),
            _ => None,
        })
    }

    /// Notices raised so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Notice(notice) => Some(*notice),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SurfaceEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl RenderSurface for RecordingSurface {
    fn set_badge(&self, design: &DesignId, kind: BadgeKind, value: u32) {
        self.record(SurfaceEvent::Badge(design.clone(), kind, value));
    }

    fn set_vote_highlight(&self, design: &DesignId, vote: Option<VoteKind>) {
        self.record(SurfaceEvent::Highlight(design.clone(), vote));
    }

    fn set_lightbox_votes(&self, counts: VoteCounts, vote: Option<VoteKind>) {
        self.record(SurfaceEvent::LightboxVotes(counts, vote));
    }

    fn set_processing(&self, design: &DesignId, processing: bool) {
        self.record(SurfaceEvent::Processing(design.clone(), processing));
    }

    fn show_lightbox(&self, view: &LightboxView) {
        self.record(SurfaceEvent::Lightbox(view.clone()));
    }

    fn patch_comments(&self, design: &DesignId, comments: &[CommentView]) {
        self.record(SurfaceEvent::Comments(design.clone(), comments.to_vec()));
    }

    fn close_lightbox(&self) {
        self.record(SurfaceEvent::Closed);
    }

    fn set_theme_stats(&self, theme: &str, stats: &ThemeStatsView) {
        self.record(SurfaceEvent::ThemeStats(theme.to_owned(), stats.clone()));
    }

    fn set_identity(&self, identity: Option<&Identity>) {
        self.record(SurfaceEvent::Identity(identity.cloned()));
    }

    fn set_selected(&self, design: &DesignId, selected: bool) {
        self.record(SurfaceEvent::Selected(design.clone(), selected));
    }

    fn notify(&self, notice: Notice) {
        self.record(SurfaceEvent::Notice(notice));
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.record(SurfaceEvent::Confirm(prompt.to_owned()));
        self.confirm_answer.get()
    }
}

/// Switch that holds adapter calls until a test lets them through.
#[derive(Debug, Default)]
pub struct Gate {
    closed: AtomicBool,
    waiters: Notify,
}

impl Gate {
    /// Hold subsequent calls.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Let every held call through and reopen.
    ///
    /// Only calls already waiting are woken, so release after the racing
    /// futures have been polled once.
    pub fn release(&self) {
        self.closed.store(false, Ordering::SeqCst);
        self.waiters.notify_waiters();
    }

    async fn pass(&self) {
        if self.closed.load(Ordering::SeqCst) {
            self.waiters.notified().await;
        }
    }
}

/// Feedback repository whose vote lookups and comment writes can be held.
///
/// Votes and comments have separate gates, so a test can keep one vote write
/// in flight while comments pass, or race two comment writes.
pub struct GatedFeedbackRepository<R> {
    inner: R,
    votes: Gate,
    comments: Gate,
}

impl<R> GatedFeedbackRepository<R> {
    /// Open gates over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            votes: Gate::default(),
            comments: Gate::default(),
        }
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Gate in front of `find_vote`, the first call of every vote write.
    pub fn votes(&self) -> &Gate {
        &self.votes
    }

    /// Gate in front of `insert_comment` and `delete_comment`.
    pub fn comments(&self) -> &Gate {
        &self.comments
    }
}

#[async_trait]
impl<R: FeedbackRepository> FeedbackRepository for GatedFeedbackRepository<R> {
    async fn fetch_all(&self) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        self.inner.fetch_all().await
    }

    async fn fetch_design(
        &self,
        design: &DesignId,
    ) -> Result<Vec<FeedbackRecord>, FeedbackRepositoryError> {
        self.inner.fetch_design(design).await
    }

    async fn find_vote(
        &self,
        design: &DesignId,
        user: &UserId,
    ) -> Result<Option<StoredVote>, FeedbackRepositoryError> {
        self.votes.pass().await;
        self.inner.find_vote(design, user).await
    }

    async fn insert_vote(&self, vote: &NewVote) -> Result<(), FeedbackRepositoryError> {
        self.inner.insert_vote(vote).await
    }

    async fn update_vote(
        &self,
        id: FeedbackRecordId,
        kind: VoteKind,
        username: &str,
    ) -> Result<(), FeedbackRepositoryError> {
        self.inner.update_vote(id, kind, username).await
    }

    async fn delete_vote(&self, id: FeedbackRecordId) -> Result<(), FeedbackRepositoryError> {
        self.inner.delete_vote(id).await
    }

    async fn insert_comment(
        &self,
        comment: &NewComment,
    ) -> Result<FeedbackRecord, FeedbackRepositoryError> {
        self.comments.pass().await;
        self.inner.insert_comment(comment).await
    }

    async fn delete_comment(
        &self,
        selector: &CommentSelector,
    ) -> Result<u64, FeedbackRepositoryError> {
        self.comments.pass().await;
        self.inner.delete_comment(selector).await
    }

    async fn voters(&self, design: &DesignId) -> Result<Vec<Voter>, FeedbackRepositoryError> {
        self.inner.voters(design).await
    }

    async fn claim_anonymous_votes(
        &self,
        user: &UserId,
        username: &str,
    ) -> Result<u64, FeedbackRepositoryError> {
        self.inner.claim_anonymous_votes(user, username).await
    }
}

/// Selection repository whose inserts and deletes can be held.
pub struct GatedSelectionRepository<R> {
    inner: R,
    writes: Gate,
}

impl<R> GatedSelectionRepository<R> {
    /// Open gate over `inner`.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            writes: Gate::default(),
        }
    }

    /// The wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Gate in front of `insert` and `delete`.
    pub fn writes(&self) -> &Gate {
        &self.writes
    }
}

#[async_trait]
impl<R: SelectionRepository> SelectionRepository for GatedSelectionRepository<R> {
    async fn list(&self) -> Result<Vec<Selection>, SelectionRepositoryError> {
        self.inner.list().await
    }

    async fn is_selected(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        self.inner.is_selected(design).await
    }

    async fn insert(&self, selection: &Selection) -> Result<(), SelectionRepositoryError> {
        self.writes.pass().await;
        self.inner.insert(selection).await
    }

    async fn delete(&self, design: &DesignId) -> Result<bool, SelectionRepositoryError> {
        self.writes.pass().await;
        self.inner.delete(design).await
    }
}

/// Feedback store used by [`TestBoard`].
pub type TestFeedbackStore = GatedFeedbackRepository<InMemoryFeedbackRepository>;

/// Selection store used by [`TestBoard`].
pub type TestSelectionStore = GatedSelectionRepository<InMemorySelectionRepository>;

/// Controller wired to in-memory adapters and a recording surface.
pub type TestController =
    BoardController<TestFeedbackStore, TestSelectionStore, InMemoryAuthSession>;

/// A board over in-memory adapters, with handles on every double.
pub struct TestBoard {
    /// The controller under test.
    pub controller: TestController,
    /// Recorded page updates.
    pub surface: Arc<RecordingSurface>,
    /// Feedback rows.
    pub feedback: Arc<TestFeedbackStore>,
    /// Selection rows.
    pub selections: Arc<TestSelectionStore>,
    /// Session.
    pub auth: Arc<InMemoryAuthSession>,
}

impl TestBoard {
    /// Board over `gallery`; `admins` may toggle selections.
    pub fn new(gallery: Gallery, identity: Option<Identity>, admins: AdminPolicy) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
        let feedback = Arc::new(GatedFeedbackRepository::new(
            InMemoryFeedbackRepository::new(Arc::clone(&clock)),
        ));
        let selections = Arc::new(GatedSelectionRepository::new(
            InMemorySelectionRepository::new(),
        ));
        let auth = Arc::new(InMemoryAuthSession::new(identity));
        let surface = Arc::new(RecordingSurface::new());

        let controller = BoardController::new(
            BoardPorts {
                feedback: FeedbackService::new(Arc::clone(&feedback)),
                selections: SelectionService::new(Arc::clone(&selections), admins, clock),
                auth: Arc::clone(&auth),
                surface: Arc::clone(&surface) as Arc<dyn RenderSurface>,
                sleeper: Arc::new(ImmediateSleeper),
            },
            gallery,
            Duration::from_millis(100),
        );

        Self {
            controller,
            surface,
            feedback,
            selections,
            auth,
        }
    }
}

/// Design id from a `theme/file` string.
///
/// # Panics
/// Panics on an invalid id; test inputs are literals.
pub fn design(raw: &str) -> DesignId {
    DesignId::parse(raw).expect("valid design id")
}

/// Gallery with the designs of each `(folder, files)` pair in order.
pub fn gallery(themes: &[(&str, &[&str])]) -> Gallery {
    Gallery::new(
        themes
            .iter()
            .map(|(folder, files)| {
                Theme::new(
                    *folder,
                    files
                        .iter()
                        .map(|file| design(&format!("{folder}/{file}")))
                        .collect(),
                )
            })
            .collect(),
    )
}

/// Signed-in reviewer with a fresh id and the given display names.
pub fn reviewer(email: &str, full_name: &str) -> Identity {
    let mut identity = Identity::new(UserId::random());
    identity.email = Some(email.to_owned());
    identity.full_name = Some(full_name.to_owned());
    identity
}
