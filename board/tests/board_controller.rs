//! Integration tests for the board controller over in-memory adapters.
//!
//! Each test drives the controller the way page events would and asserts on
//! the recorded render surface plus the rows left in the stores.

use board::domain::ports::Notice;
use board::domain::{
    ANONYMOUS_USERNAME, AdminPolicy, FeedbackBody, FeedbackRecord, FeedbackRecordId, Identity,
    VoteCounts, VoteKind,
};
use board::inbound::ui::{ActionOutcome, BoardKey, DELETE_COMMENT_PROMPT};
use board::test_support::{SurfaceEvent, TestBoard, design, gallery, reviewer};
use chrono::Utc;
use gallery_builder::BadgeKind;
use rstest::{fixture, rstest};

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

#[fixture]
fn sam() -> Identity {
    reviewer("sam@example.com", "Sam Lee")
}

fn board_for(identity: Option<Identity>, admins: AdminPolicy) -> TestBoard {
    TestBoard::new(
        gallery(&[
            ("theme1", &["a.png", "b.png", "c.png"]),
            ("solo", &["only.png"]),
        ]),
        identity,
        admins,
    )
}

fn seed(board: &TestBoard, raw: &str, user: Option<&Identity>, body: FeedbackBody, name: &str) {
    board
        .feedback
        .inner()
        .seed(FeedbackRecord {
            id: FeedbackRecordId(0),
            design: design(raw),
            user: user.map(|who| who.user_id.clone()),
            body,
            username: name.to_owned(),
            created_at: Utc::now(),
        })
        .expect("seeded row");
}

fn shown_comments(board: &TestBoard, raw: &str) -> Vec<(String, bool)> {
    board
        .surface
        .comments(&design(raw))
        .expect("comments patched")
        .into_iter()
        .map(|view| (view.text, view.deletable))
        .collect()
}

// -----------------------------------------------------------------------------
// Loading
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn initial_load_renders_badges_and_own_votes(sam: Identity) {
    let board = board_for(Some(sam.clone()), AdminPolicy::default());
    seed(&board, "theme1/a.png", Some(&sam), FeedbackBody::Vote(VoteKind::Like), "Sam Lee");
    seed(&board, "theme1/a.png", None, FeedbackBody::Vote(VoteKind::Dislike), ANONYMOUS_USERNAME);
    seed(&board, "theme1/b.png", None, FeedbackBody::Comment("hi".into()), ANONYMOUS_USERNAME);

    board.controller.initialize().await;

    let a = design("theme1/a.png");
    assert_eq!(board.surface.badge(&a, BadgeKind::Like), Some(1));
    assert_eq!(board.surface.badge(&a, BadgeKind::Dislike), Some(1));
    assert_eq!(board.surface.highlight(&a), Some(Some(VoteKind::Like)));
    assert_eq!(
        board.surface.badge(&design("theme1/b.png"), BadgeKind::Comments),
        Some(1)
    );
    assert_eq!(
        board.surface.badge(&design("theme1/c.png"), BadgeKind::Like),
        Some(0)
    );
    assert!(board.surface.events().contains(&SurfaceEvent::Identity(Some(sam))));
}

#[rstest]
#[tokio::test]
async fn failed_bulk_load_keeps_page_usable(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.feedback.inner().set_unavailable(true);

    board.controller.initialize().await;

    assert!(board.surface.notices().is_empty());
    assert_eq!(
        board.controller.feedback(&design("theme1/a.png")),
        Default::default()
    );
}

#[rstest]
#[tokio::test]
async fn opening_an_uncached_design_fetches_it(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    seed(&board, "theme1/b.png", None, FeedbackBody::Vote(VoteKind::Like), ANONYMOUS_USERNAME);

    let outcome = board.controller.open_design(&design("theme1/b.png")).await;

    assert_eq!(outcome, ActionOutcome::Applied);
    let view = board.surface.lightbox().expect("lightbox shown");
    assert_eq!(view.counts, VoteCounts::new(1, 0));
    assert_eq!(view.title, "B");
    assert_eq!((view.position, view.total), (1, 3));
}

// -----------------------------------------------------------------------------
// Navigation
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn navigation_wraps_within_the_theme(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;

    board.controller.open_design(&design("theme1/c.png")).await;
    assert!(board.controller.handle_key(BoardKey::ArrowRight, false).await);
    assert_eq!(board.controller.current_design(), Some(design("theme1/a.png")));

    assert!(board.controller.handle_key(BoardKey::ArrowLeft, false).await);
    assert_eq!(board.controller.current_design(), Some(design("theme1/c.png")));
    assert_eq!(board.controller.current_position(), Some(2));
}

#[rstest]
#[tokio::test]
async fn keys_are_ignored_while_typing_or_closed(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;

    assert!(!board.controller.handle_key(BoardKey::ArrowRight, false).await);

    board.controller.open_design(&design("theme1/a.png")).await;
    assert!(!board.controller.handle_key(BoardKey::ArrowRight, true).await);
    assert_eq!(board.controller.current_design(), Some(design("theme1/a.png")));

    assert!(board.controller.handle_key(BoardKey::Escape, false).await);
    assert_eq!(board.controller.current_design(), None);
    assert!(board.surface.events().contains(&SurfaceEvent::Closed));
}

#[rstest]
#[tokio::test]
async fn single_design_theme_navigates_to_itself(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    let only = design("solo/only.png");

    board.controller.open_design(&only).await;
    board.controller.next().await;

    assert_eq!(board.controller.current_design(), Some(only));
}

// -----------------------------------------------------------------------------
// Comments
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn comments_show_newest_first_and_delete_by_display_index(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    let a = design("theme1/a.png");
    board.controller.open_design(&a).await;

    assert_eq!(board.controller.submit_comment("first").await, ActionOutcome::Applied);
    assert_eq!(board.controller.submit_comment("second").await, ActionOutcome::Applied);
    assert_eq!(
        shown_comments(&board, "theme1/a.png"),
        [("second".to_owned(), true), ("first".to_owned(), true)]
    );
    assert_eq!(board.surface.badge(&a, BadgeKind::Comments), Some(2));

    assert_eq!(board.controller.delete_comment(0).await, ActionOutcome::Applied);

    assert_eq!(
        shown_comments(&board, "theme1/a.png"),
        [("first".to_owned(), true)]
    );
    assert_eq!(board.surface.badge(&a, BadgeKind::Comments), Some(1));
    assert!(
        board
            .surface
            .events()
            .contains(&SurfaceEvent::Confirm(DELETE_COMMENT_PROMPT.to_owned()))
    );
    let stored: Vec<_> = board
        .feedback
        .inner()
        .rows()
        .expect("rows readable")
        .into_iter()
        .map(|row| row.body)
        .collect();
    assert_eq!(stored, [FeedbackBody::Comment("first".into())]);
}

#[rstest]
#[tokio::test]
async fn declined_confirmation_keeps_the_comment(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    board.controller.open_design(&design("theme1/a.png")).await;
    board.controller.submit_comment("keep me").await;
    board.surface.answer_confirm(false);

    let outcome = board.controller.delete_comment(0).await;

    assert_eq!(outcome, ActionOutcome::Cancelled);
    assert_eq!(
        board.controller.feedback(&design("theme1/a.png")).comment_count,
        1
    );
}

#[rstest]
#[tokio::test]
async fn other_reviewers_comments_cannot_be_deleted(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    let someone = reviewer("alex@example.com", "Alex");
    seed(&board, "theme1/a.png", Some(&someone), FeedbackBody::Comment("mine".into()), "Alex");
    board.controller.initialize().await;
    board.controller.open_design(&design("theme1/a.png")).await;

    assert_eq!(
        shown_comments(&board, "theme1/a.png"),
        [("mine".to_owned(), false)]
    );
    assert_eq!(board.controller.delete_comment(0).await, ActionOutcome::NotPermitted);
    assert_eq!(board.surface.notices(), [Notice::NotPermitted]);
}

#[rstest]
#[case::blank("   ")]
#[case::empty("")]
#[tokio::test]
async fn blank_comments_are_ignored(sam: Identity, #[case] text: &str) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    board.controller.open_design(&design("theme1/a.png")).await;

    assert_eq!(board.controller.submit_comment(text).await, ActionOutcome::Ignored);
    assert!(board.feedback.inner().rows().expect("rows readable").is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_comment_write_raises_a_notice(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    board.controller.open_design(&design("theme1/a.png")).await;
    board.feedback.inner().set_unavailable(true);

    assert_eq!(board.controller.submit_comment("hello").await, ActionOutcome::Failed);
    assert_eq!(board.surface.notices(), [Notice::CommentFailed]);
    assert_eq!(
        board.controller.feedback(&design("theme1/a.png")).comment_count,
        0
    );
}

// -----------------------------------------------------------------------------
// Theme statistics
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn votes_refresh_theme_statistics(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    seed(&board, "theme1/c.png", None, FeedbackBody::Vote(VoteKind::Dislike), ANONYMOUS_USERNAME);
    board.controller.initialize().await;

    board
        .controller
        .click_vote(&design("theme1/b.png"), VoteKind::Like)
        .await;

    let stats = board.surface.theme_stats("theme1").expect("stats drawn");
    assert_eq!(stats.most_liked.as_deref(), Some("B"));
    assert_eq!(stats.most_disliked.as_deref(), Some("C"));
    assert!(board.surface.theme_stats("solo").is_none());
}

// -----------------------------------------------------------------------------
// Session changes
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn sign_out_clears_own_votes_but_keeps_counts(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::default());
    board.controller.initialize().await;
    let a = design("theme1/a.png");
    board.controller.click_vote(&a, VoteKind::Like).await;

    board.controller.sign_out().await;

    assert_eq!(board.controller.identity(), None);
    assert_eq!(board.controller.own_vote(&a), None);
    assert_eq!(board.controller.feedback(&a).counts, VoteCounts::new(1, 0));
    assert_eq!(board.surface.highlight(&a), Some(None));
    assert!(board.surface.events().contains(&SurfaceEvent::Identity(None)));
}

#[rstest]
#[tokio::test]
async fn sign_in_claims_anonymous_votes_and_reloads(sam: Identity) {
    let board = board_for(None, AdminPolicy::default());
    let a = design("theme1/a.png");
    seed(&board, "theme1/a.png", Some(&sam), FeedbackBody::Vote(VoteKind::Like), ANONYMOUS_USERNAME);
    board.controller.initialize().await;
    assert_eq!(board.controller.own_vote(&a), None);

    board.auth.set_identity(Some(sam.clone()));
    board.controller.on_auth_changed(Some(sam)).await;

    assert_eq!(board.controller.own_vote(&a), Some(VoteKind::Like));
    assert_eq!(board.surface.highlight(&a), Some(Some(VoteKind::Like)));
    let names: Vec<_> = board
        .feedback
        .inner()
        .rows()
        .expect("rows readable")
        .into_iter()
        .map(|row| row.username)
        .collect();
    assert_eq!(names, ["Sam Lee"]);
}

#[tokio::test]
async fn sign_in_url_points_back_to_the_page() {
    let board = board_for(None, AdminPolicy::default());
    let page = url::Url::parse("https://review.example.com/").expect("valid url");

    let url = board.controller.sign_in_url(&page).expect("url built");

    assert!(url.as_str().starts_with("https://review.example.com/"));
    assert!(url.query_pairs().any(|(key, value)| key == "provider" && value == "google"));
}

// -----------------------------------------------------------------------------
// Selections
// -----------------------------------------------------------------------------

#[rstest]
#[tokio::test]
async fn admins_toggle_selections(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::new(["SAM@example.com"]));
    board.controller.initialize().await;
    let a = design("theme1/a.png");

    assert_eq!(board.controller.toggle_selection(&a).await, ActionOutcome::Applied);
    assert!(board.controller.is_selected(&a));
    assert_eq!(board.surface.selected(&a), Some(true));

    assert_eq!(board.controller.toggle_selection(&a).await, ActionOutcome::Applied);
    assert!(!board.controller.is_selected(&a));
    assert_eq!(board.surface.selected(&a), Some(false));
}

#[rstest]
#[tokio::test]
async fn non_admins_cannot_select(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::new(["lead@example.com"]));
    board.controller.initialize().await;

    let outcome = board
        .controller
        .toggle_selection(&design("theme1/a.png"))
        .await;

    assert_eq!(outcome, ActionOutcome::NotPermitted);
    assert_eq!(board.surface.notices(), [Notice::NotPermitted]);
}

#[rstest]
#[tokio::test]
async fn failed_selection_leaves_state_unchanged(sam: Identity) {
    let board = board_for(Some(sam), AdminPolicy::new(["sam@example.com"]));
    board.controller.initialize().await;
    board.selections.inner().set_unavailable(true);
    let a = design("theme1/a.png");

    assert_eq!(board.controller.toggle_selection(&a).await, ActionOutcome::Failed);
    assert!(!board.controller.is_selected(&a));
    assert_eq!(board.surface.notices(), [Notice::SelectionFailed]);
}
