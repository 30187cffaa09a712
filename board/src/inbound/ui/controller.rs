//! Board controller: page events in, cache updates and backend calls out.
//!
//! The controller runs on one thread. Handlers interleave only at awaits, so
//! state lives in a [`RefCell`] that is borrowed between awaits and never
//! across one. Per-design [`InFlight`] guards serialise votes, comment writes
//! and selection toggles on the same design.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use gallery_builder::BadgeKind;
use tracing::{debug, warn};
use url::Url;

use super::view::{comment_views, from_map, lightbox_view, theme_stat_views};
use crate::domain::ports::{
    AuthSession, FeedbackRepository, Notice, RenderSurface, SelectionRepository, Sleeper,
};
use crate::domain::{
    AggregatedFeedback, CommentText, DesignId, FeedbackCache, FeedbackService, Gallery, Identity,
    InFlight, SelectionChange, SelectionService, Slideshow, UserId, VoteCommand, VoteKind,
    VoteSnapshot,
};

/// Prompt shown before a comment is deleted.
pub const DELETE_COMMENT_PROMPT: &str = "Are you sure you want to delete this comment?";

/// OAuth provider used for sign-in.
pub const SIGN_IN_PROVIDER: &str = "google";

/// What became of one user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action took effect.
    Applied,
    /// Nothing to do: no open design, blank input or unknown target.
    Ignored,
    /// The same kind of action is still running for this design.
    Busy,
    /// A signed-in reviewer is needed.
    SignInRequired,
    /// The reviewer may not do this.
    NotPermitted,
    /// The reviewer declined the confirmation.
    Cancelled,
    /// The backend call failed; local state was restored.
    Failed,
}

/// Keys the board reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardKey {
    /// Previous design.
    ArrowLeft,
    /// Next design.
    ArrowRight,
    /// Close the lightbox.
    Escape,
}

/// Collaborators of a [`BoardController`].
pub struct BoardPorts<F, S, A> {
    /// Feedback service.
    pub feedback: FeedbackService<F>,
    /// Selection service.
    pub selections: SelectionService<S>,
    /// Auth session.
    pub auth: Arc<A>,
    /// Page the controller draws on.
    pub surface: Arc<dyn RenderSurface>,
    /// Delay source for the statistics refresh.
    pub sleeper: Arc<dyn Sleeper>,
}

#[derive(Default)]
struct BoardState {
    cache: FeedbackCache,
    identity: Option<Identity>,
    slideshow: Option<Slideshow>,
    selected: HashSet<DesignId>,
}

/// Drives one page of the board.
pub struct BoardController<F, S, A> {
    feedback: FeedbackService<F>,
    selections: SelectionService<S>,
    auth: Arc<A>,
    surface: Arc<dyn RenderSurface>,
    sleeper: Arc<dyn Sleeper>,
    gallery: Gallery,
    stats_delay: Duration,
    state: RefCell<BoardState>,
    vote_guards: InFlight<DesignId>,
    comment_guards: InFlight<DesignId>,
    selection_guards: InFlight<DesignId>,
    stats_generation: Cell<u64>,
    auth_epoch: Cell<u64>,
}

impl<F, S, A> BoardController<F, S, A>
where
    F: FeedbackRepository,
    S: SelectionRepository,
    A: AuthSession,
{
    /// Controller for `gallery`; statistics refresh `stats_delay` after a vote.
    pub fn new(ports: BoardPorts<F, S, A>, gallery: Gallery, stats_delay: Duration) -> Self {
        Self {
            feedback: ports.feedback,
            selections: ports.selections,
            auth: ports.auth,
            surface: ports.surface,
            sleeper: ports.sleeper,
            gallery,
            stats_delay,
            state: RefCell::new(BoardState::default()),
            vote_guards: InFlight::new(),
            comment_guards: InFlight::new(),
            selection_guards: InFlight::new(),
            stats_generation: Cell::new(0),
            auth_epoch: Cell::new(0),
        }
    }

    /// Designs shown on the page.
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Cached feedback for `design`, zero when unknown.
    pub fn feedback(&self, design: &DesignId) -> AggregatedFeedback {
        self.state.borrow().cache.get(design)
    }

    /// The reviewer's cached vote on `design`.
    pub fn own_vote(&self, design: &DesignId) -> Option<VoteKind> {
        self.state.borrow().cache.own_vote(design)
    }

    /// The signed-in reviewer.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// Design open in the lightbox.
    pub fn current_design(&self) -> Option<DesignId> {
        self.state
            .borrow()
            .slideshow
            .as_ref()
            .map(|show| show.current().clone())
    }

    /// Position of the open design within its theme.
    pub fn current_position(&self) -> Option<usize> {
        self.state.borrow().slideshow.as_ref().map(Slideshow::position)
    }

    /// Whether `design` is selected for the next iteration.
    pub fn is_selected(&self, design: &DesignId) -> bool {
        self.state.borrow().selected.contains(design)
    }

    /// Resolve the session, load selections, then bulk-load feedback.
    pub async fn initialize(&self) {
        let identity = match self.auth.current_identity().await {
            Ok(identity) => identity,
            Err(error) => {
                warn!(%error, "could not resolve session; continuing signed out");
                None
            }
        };
        self.state.borrow_mut().identity.clone_from(&identity);
        self.surface.set_identity(identity.as_ref());

        self.load_selections().await;
        self.bulk_load().await;
    }

    /// Replace the cache with one fetch of every feedback row.
    ///
    /// On failure the previous contents stay and are treated as current.
    pub async fn bulk_load(&self) {
        let viewer = self.viewer_id();
        match self.feedback.fetch_all(viewer.as_ref()).await {
            Ok(aggregates) => {
                debug!(designs = aggregates.len(), "feedback cache loaded");
                self.state.borrow_mut().cache.replace_all(aggregates);
                self.render_all_designs();
                self.render_theme_stats_from_cache();
            }
            Err(error) => warn!(%error, "bulk feedback load failed"),
        }
    }

    async fn load_selections(&self) {
        match self.selections.selected_ids().await {
            Ok(selected) => {
                for design in self.gallery.designs() {
                    self.surface.set_selected(design, selected.contains(design));
                }
                self.state.borrow_mut().selected = selected;
            }
            Err(error) => warn!(%error, "loading selections failed"),
        }
    }

    /// React to sign-in or sign-out.
    ///
    /// Sign-out forgets own votes but keeps public counts. Sign-in claims the
    /// reviewer's anonymous votes and reloads everything.
    pub async fn on_auth_changed(&self, identity: Option<Identity>) {
        self.auth_epoch.set(self.auth_epoch.get().wrapping_add(1));
        self.state.borrow_mut().identity.clone_from(&identity);
        self.surface.set_identity(identity.as_ref());

        match identity {
            None => {
                self.state.borrow_mut().cache.clear_own_votes();
                self.render_all_designs();
                self.render_lightbox();
            }
            Some(who) => {
                if let Err(error) = self.feedback.claim_anonymous_votes(&who).await {
                    warn!(%error, "anonymous votes left unclaimed");
                }
                self.bulk_load().await;
                self.render_lightbox();
            }
        }
    }

    /// URL that starts the OAuth flow, returning to `redirect_to`.
    pub fn sign_in_url(&self, redirect_to: &Url) -> Option<Url> {
        self.auth
            .sign_in_url(SIGN_IN_PROVIDER, redirect_to)
            .inspect_err(|error| warn!(%error, "could not build sign-in URL"))
            .ok()
    }

    /// End the session and clear identity-dependent state.
    pub async fn sign_out(&self) {
        if let Err(error) = self.auth.sign_out().await {
            warn!(%error, "sign-out request failed; clearing local session anyway");
        }
        self.on_auth_changed(None).await;
    }

    /// Open the lightbox at `design` within its theme.
    pub async fn open_design(&self, design: &DesignId) -> ActionOutcome {
        let Some(theme) = self.gallery.theme_of(design) else {
            debug!(%design, "ignoring open for a design not on the page");
            return ActionOutcome::Ignored;
        };
        let Some(slideshow) = Slideshow::open(theme.designs().to_vec(), design) else {
            return ActionOutcome::Ignored;
        };
        self.state.borrow_mut().slideshow = Some(slideshow);
        self.render_lightbox();
        self.augment_lightbox().await;
        ActionOutcome::Applied
    }

    /// Step to the next design of the theme, wrapping around.
    pub async fn next(&self) -> ActionOutcome {
        self.step(Slideshow::next).await
    }

    /// Step to the previous design of the theme, wrapping around.
    pub async fn previous(&self) -> ActionOutcome {
        self.step(Slideshow::previous).await
    }

    async fn step(&self, advance: fn(&mut Slideshow) -> &DesignId) -> ActionOutcome {
        {
            let mut state = self.state.borrow_mut();
            let Some(slideshow) = state.slideshow.as_mut() else {
                return ActionOutcome::Ignored;
            };
            advance(slideshow);
        }
        self.render_lightbox();
        self.augment_lightbox().await;
        ActionOutcome::Applied
    }

    /// Close the lightbox.
    pub fn close(&self) {
        self.state.borrow_mut().slideshow = None;
        self.surface.close_lightbox();
    }

    /// Keyboard navigation; returns whether the key was handled.
    ///
    /// Nothing happens while a text input has focus. Arrows only act on an
    /// open lightbox.
    pub async fn handle_key(&self, key: BoardKey, text_input_focused: bool) -> bool {
        if text_input_focused {
            return false;
        }
        match key {
            BoardKey::Escape => {
                self.close();
                true
            }
            BoardKey::ArrowRight => self.next().await == ActionOutcome::Applied,
            BoardKey::ArrowLeft => self.previous().await == ActionOutcome::Applied,
        }
    }

    /// Like or dislike `design` optimistically.
    ///
    /// The click is applied to the cache and drawn before the backend write.
    /// A failed write restores the previous vote and counts and raises a
    /// notice. Either way theme statistics are refreshed shortly after.
    ///
    /// When the session changed while the write was pending, the restore
    /// leaves the new session's own votes alone and only reverts counts that
    /// nothing else has replaced.
    pub async fn click_vote(&self, design: &DesignId, clicked: VoteKind) -> ActionOutcome {
        let outcome = {
            let Some(_guard) = self.vote_guards.try_acquire(design) else {
                debug!(%design, "vote already in flight");
                return ActionOutcome::Busy;
            };
            let Some(identity) = self.identity() else {
                self.surface.notify(Notice::SignInRequired);
                return ActionOutcome::SignInRequired;
            };

            let epoch = self.auth_epoch.get();
            let command = {
                let mut state = self.state.borrow_mut();
                let before = state.cache.vote_snapshot(design);
                let command = VoteCommand::plan(design.clone(), before, clicked);
                state.cache.apply_vote_snapshot(design, command.after());
                command
            };
            self.surface.set_processing(design, true);
            self.render_design(design);

            let result = self
                .feedback
                .submit_vote(&identity, design, command.target())
                .await;
            let outcome = match result {
                Ok(()) => ActionOutcome::Applied,
                Err(error) => {
                    warn!(
                        %design,
                        %error,
                        transient = error.code().is_transient(),
                        "vote write failed; rolling back"
                    );
                    self.roll_back_vote(&command, self.auth_epoch.get() == epoch);
                    self.render_design(design);
                    self.surface.notify(Notice::VoteFailed);
                    ActionOutcome::Failed
                }
            };
            self.surface.set_processing(design, false);
            outcome
        };

        self.schedule_theme_stats().await;
        outcome
    }

    fn roll_back_vote(&self, command: &VoteCommand, same_session: bool) {
        let design = command.design();
        let mut state = self.state.borrow_mut();
        let current = state.cache.vote_snapshot(design);
        if same_session && current == command.after() {
            state.cache.apply_vote_snapshot(design, command.rollback());
        } else if current.counts == command.after().counts {
            let restored = VoteSnapshot {
                own_vote: current.own_vote,
                counts: command.rollback().counts,
            };
            state.cache.apply_vote_snapshot(design, restored);
        } else {
            debug!(%design, "cache replaced while the vote was pending; keeping it");
        }
    }

    /// Add a comment to the open design.
    pub async fn submit_comment(&self, raw: &str) -> ActionOutcome {
        let Some(design) = self.current_design() else {
            return ActionOutcome::Ignored;
        };
        let Ok(text) = CommentText::new(raw) else {
            return ActionOutcome::Ignored;
        };
        let Some(identity) = self.identity() else {
            self.surface.notify(Notice::SignInRequired);
            return ActionOutcome::SignInRequired;
        };
        let Some(_guard) = self.comment_guards.try_acquire(&design) else {
            return ActionOutcome::Busy;
        };

        match self.feedback.submit_comment(&identity, &design, text).await {
            Ok(comment) => {
                self.state
                    .borrow_mut()
                    .cache
                    .append_comment(&design, comment);
                self.render_design(&design);
                self.patch_comments(&design);
                ActionOutcome::Applied
            }
            Err(error) => {
                warn!(%design, %error, "comment write failed");
                self.surface.notify(Notice::CommentFailed);
                ActionOutcome::Failed
            }
        }
    }

    /// Delete the comment shown at `display_index` on the open design.
    pub async fn delete_comment(&self, display_index: usize) -> ActionOutcome {
        let Some(design) = self.current_design() else {
            return ActionOutcome::Ignored;
        };
        let Some(identity) = self.identity() else {
            self.surface.notify(Notice::SignInRequired);
            return ActionOutcome::SignInRequired;
        };
        let Some(comment) = self
            .state
            .borrow()
            .cache
            .comment_at_display_index(&design, display_index)
            .cloned()
        else {
            return ActionOutcome::Ignored;
        };
        if !comment.is_authored_by(&identity.user_id) {
            self.surface.notify(Notice::NotPermitted);
            return ActionOutcome::NotPermitted;
        }
        if !self.surface.confirm(DELETE_COMMENT_PROMPT) {
            return ActionOutcome::Cancelled;
        }
        let Some(_guard) = self.comment_guards.try_acquire(&design) else {
            return ActionOutcome::Busy;
        };

        if let Err(error) = self
            .feedback
            .delete_comment(&identity, &design, &comment)
            .await
        {
            warn!(%design, %error, "comment delete failed");
            self.surface.notify(Notice::CommentDeleteFailed);
            return ActionOutcome::Failed;
        }

        {
            let mut state = self.state.borrow_mut();
            let index = if state
                .cache
                .comment_at_display_index(&design, display_index)
                == Some(&comment)
            {
                Some(display_index)
            } else {
                state
                    .cache
                    .get_cached(&design)
                    .and_then(|feedback| {
                        feedback
                            .comments_newest_first()
                            .position(|candidate| candidate == &comment)
                    })
            };
            if let Some(index) = index {
                state.cache.remove_comment_at_display_index(&design, index);
            }
        }
        self.render_design(&design);
        self.patch_comments(&design);
        ActionOutcome::Applied
    }

    /// Select or unselect `design` (admins only).
    pub async fn toggle_selection(&self, design: &DesignId) -> ActionOutcome {
        let identity = self.identity();
        if identity.is_none() {
            self.surface.notify(Notice::SignInRequired);
            return ActionOutcome::SignInRequired;
        }
        if !self.selections.is_admin(identity.as_ref()) {
            self.surface.notify(Notice::NotPermitted);
            return ActionOutcome::NotPermitted;
        }
        let Some(_guard) = self.selection_guards.try_acquire(design) else {
            return ActionOutcome::Busy;
        };

        let (currently_selected, known) = {
            let state = self.state.borrow();
            (state.selected.contains(design), state.selected.clone())
        };
        let result = if currently_selected {
            self.selections.unselect(identity.as_ref(), design).await
        } else {
            self.selections
                .select(identity.as_ref(), design, Some(&known))
                .await
        };

        match result {
            Ok(change) => {
                let selected = !currently_selected;
                {
                    let mut state = self.state.borrow_mut();
                    if selected {
                        state.selected.insert(design.clone());
                    } else {
                        state.selected.remove(design);
                    }
                }
                if change == SelectionChange::Unchanged {
                    debug!(%design, selected, "selection already in requested state");
                }
                self.surface.set_selected(design, selected);
                ActionOutcome::Applied
            }
            Err(error) => {
                warn!(%design, %error, "selection toggle failed");
                self.surface.notify(Notice::SelectionFailed);
                ActionOutcome::Failed
            }
        }
    }

    /// Recompute theme statistics from a fresh fetch.
    ///
    /// Failures keep the statistics already shown.
    pub async fn refresh_theme_stats(&self) {
        let viewer = self.viewer_id();
        match self.feedback.fetch_all(viewer.as_ref()).await {
            Ok(aggregates) => {
                for (theme, view) in theme_stat_views(&self.gallery, from_map(&aggregates)) {
                    self.surface.set_theme_stats(theme, &view);
                }
            }
            Err(error) => warn!(%error, "theme statistics refresh failed"),
        }
    }

    async fn schedule_theme_stats(&self) {
        let generation = self.stats_generation.get().wrapping_add(1);
        self.stats_generation.set(generation);
        self.sleeper.sleep(self.stats_delay).await;
        if self.stats_generation.get() != generation {
            debug!("theme statistics refresh superseded");
            return;
        }
        self.refresh_theme_stats().await;
    }

    fn render_theme_stats_from_cache(&self) {
        let views = {
            let state = self.state.borrow();
            theme_stat_views(&self.gallery, |design| state.cache.get_cached(design).cloned())
        };
        for (theme, view) in views {
            self.surface.set_theme_stats(theme, &view);
        }
    }

    fn viewer_id(&self) -> Option<UserId> {
        self.state
            .borrow()
            .identity
            .as_ref()
            .map(|who| who.user_id.clone())
    }

    fn render_all_designs(&self) {
        for design in self.gallery.designs() {
            self.render_design(design);
        }
    }

    /// Badges and highlight of `design`, plus the sidebar when it is open.
    fn render_design(&self, design: &DesignId) {
        let (feedback, is_current) = {
            let state = self.state.borrow();
            let is_current = state
                .slideshow
                .as_ref()
                .is_some_and(|show| show.current() == design);
            (state.cache.get(design), is_current)
        };
        self.surface
            .set_badge(design, BadgeKind::Like, feedback.counts.likes);
        self.surface
            .set_badge(design, BadgeKind::Dislike, feedback.counts.dislikes);
        self.surface
            .set_badge(design, BadgeKind::Comments, feedback.comment_count);
        self.surface.set_vote_highlight(design, feedback.user_vote);
        if is_current {
            self.surface
                .set_lightbox_votes(feedback.counts, feedback.user_vote);
        }
    }

    /// Draw the lightbox from the cache alone; delete affordances follow later.
    fn render_lightbox(&self) {
        let view = {
            let state = self.state.borrow();
            state.slideshow.as_ref().map(|show| {
                let feedback = state.cache.get(show.current());
                lightbox_view(show, &feedback, None)
            })
        };
        if let Some(view) = view {
            self.surface.show_lightbox(&view);
        }
    }

    /// Asynchronous follow-up after the lightbox moved.
    ///
    /// Fetches designs missing from the cache, then resolves the session and
    /// patches in delete affordances, skipping either step when the reviewer
    /// has moved on in the meantime.
    async fn augment_lightbox(&self) {
        let Some(design) = self.current_design() else {
            return;
        };

        if !self.state.borrow().cache.contains(&design) {
            let viewer = self.viewer_id();
            match self.feedback.fetch_design(&design, viewer.as_ref()).await {
                Ok(feedback) => {
                    self.state
                        .borrow_mut()
                        .cache
                        .insert(design.clone(), feedback);
                    self.render_design(&design);
                    if self.current_design().as_ref() == Some(&design) {
                        self.render_lightbox();
                    }
                }
                Err(error) => debug!(%design, %error, "single design fetch failed"),
            }
        }

        let session = match self.auth.current_identity().await {
            Ok(identity) => identity,
            Err(error) => {
                debug!(%error, "session lookup failed; using cached identity");
                self.identity()
            }
        };
        if self.current_design().as_ref() != Some(&design) {
            return;
        }
        let comments = {
            let state = self.state.borrow();
            comment_views(
                &state.cache.get(&design),
                session.as_ref().map(|who| &who.user_id),
            )
        };
        self.surface.patch_comments(&design, &comments);
    }

    /// Redraw the open lightbox's comments when it shows `design`.
    fn patch_comments(&self, design: &DesignId) {
        let comments = {
            let state = self.state.borrow();
            let is_current = state
                .slideshow
                .as_ref()
                .is_some_and(|show| show.current() == design);
            is_current.then(|| {
                comment_views(
                    &state.cache.get(design),
                    state.identity.as_ref().map(|who| &who.user_id),
                )
            })
        };
        if let Some(comments) = comments {
            self.surface.patch_comments(design, &comments);
        }
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
