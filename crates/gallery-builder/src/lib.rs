//! Static page generation for the design review board.
//!
//! The builder walks an assets directory containing one folder per theme,
//! reads a JSON page configuration (descriptions, tags, extensions, naming
//! rule, title, sort flags) and writes a single HTML document in which every
//! design owns independently addressable like, dislike and comment badges.
//!
//! The naming and addressing helpers are shared with the board client so the
//! generated markup and the runtime agree on labels and element ids.
//!
//! # Example
//!
//! ```
//! use gallery_builder::{GalleryConfig, ThemeFolder, render_page};
//!
//! let themes = vec![ThemeFolder {
//!     folder: "theme1".to_owned(),
//!     images: vec!["hero-shot.png".to_owned()],
//! }];
//! let page = render_page(&themes, &GalleryConfig::default(), "assets");
//!
//! assert!(page.contains(r#"id="like-theme1/hero-shot.png""#));
//! assert!(page.contains("Hero Shot"));
//! ```

mod atomic_io;
mod config;
mod error;
mod markup;
mod naming;
mod pipeline;
mod render;
mod scan;

pub use config::{BuildFlags, GalleryConfig, ThemeNameFormat};
pub use error::{BuildError, ConfigError};
pub use markup::{BadgeKind, badge_element_id, escape_html, theme_stat_element_id};
pub use naming::{format_design_name, format_theme_name};
pub use pipeline::{
    BuildOptions, BuildOutcome, BuildReport, DEFAULT_ASSETS_DIR, DEFAULT_OUTPUT, run_build,
};
pub use render::{MOST_DISLIKED_STAT, MOST_LIKED_STAT, render_page};
pub use scan::{ThemeFolder, scan_assets};
