//! Feedback domain, backend adapters and UI controller for the design review
//! board.
//!
//! Reviewers like, dislike and comment on designs shown on a page generated
//! by `gallery-builder`. The [`domain`] module owns the typed identifiers, the
//! page-lifetime feedback cache and the optimistic vote protocol; ports under
//! [`domain::ports`] abstract storage, the auth session, delays and the page
//! itself. [`outbound`] holds the hosted (PostgREST over HTTP) and in-memory
//! adapters, and [`inbound::ui`] drives everything from page events.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
