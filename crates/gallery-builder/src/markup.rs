//! Addressing scheme shared by the generated page and the board client.
//!
//! Every design carries one badge per feedback kind. The badge element id is
//! the kind prefix joined to the design id (`like-theme1/hero.png`), which
//! keeps the controls of every design independently addressable.

use std::fmt;

/// The feedback kinds that own a badge on every design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    /// Like count badge.
    Like,
    /// Dislike count badge.
    Dislike,
    /// Comment count badge.
    Comments,
}

impl BadgeKind {
    /// Element id prefix for this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Comments => "comments",
        }
    }
}

impl fmt::Display for BadgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Element id of the badge for `kind` on the design `design_id`.
///
/// # Examples
///
/// ```
/// use gallery_builder::{BadgeKind, badge_element_id};
///
/// assert_eq!(badge_element_id(BadgeKind::Comments, "theme1/a.png"), "comments-theme1/a.png");
/// ```
#[must_use]
pub fn badge_element_id(kind: BadgeKind, design_id: &str) -> String {
    format!("{}-{design_id}", kind.prefix())
}

/// Element id of a per-theme statistic placeholder.
#[must_use]
pub fn theme_stat_element_id(stat: &str, theme_folder: &str) -> String {
    format!("{stat}-{theme_folder}")
}

/// Escape text for use in HTML content and double- or single-quoted
/// attributes.
///
/// # Examples
///
/// ```
/// use gallery_builder::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;");
/// ```
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
