//! Display-name formatting for themes and designs.
//!
//! Both the page builder and the board client label things with these rules,
//! so they live here rather than in the renderer.

use crate::config::ThemeNameFormat;

/// Format a theme folder name for display.
///
/// The optional rewrite rule runs first (`theme3` becomes `Theme 3` with the
/// default rule). A space is then inserted before every ASCII capital, the
/// first character is upper-cased and the result is trimmed.
///
/// # Examples
///
/// ```
/// use gallery_builder::{GalleryConfig, format_theme_name};
///
/// let config = GalleryConfig::default();
/// let rule = config.theme_name_format();
/// assert_eq!(format_theme_name("theme3", rule), "Theme 3");
/// assert_eq!(format_theme_name("darkMode", rule), "Dark Mode");
/// assert_eq!(format_theme_name("darkMode", None), "Dark Mode");
/// ```
#[must_use]
pub fn format_theme_name(folder_name: &str, rule: Option<&ThemeNameFormat>) -> String {
    let rewritten = rule.map_or_else(|| folder_name.to_owned(), |r| r.apply(folder_name));

    let mut spaced = String::with_capacity(rewritten.len() + 4);
    for ch in rewritten.chars() {
        if ch.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(ch);
    }

    let mut chars = spaced.chars();
    let capitalised = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    capitalised.trim().to_owned()
}

/// Format a design file name (or `theme/file` id) for display.
///
/// Only the part after the last `/` is used. The extension is removed unless
/// `show_extension` is set, runs of `-` and `_` collapse to a single space and
/// the first letter or digit of every word is upper-cased.
///
/// # Examples
///
/// ```
/// use gallery_builder::format_design_name;
///
/// assert_eq!(format_design_name("theme1/my-design_v2.png", false), "My Design V2");
/// assert_eq!(format_design_name("hero.png", true), "Hero.Png");
/// ```
#[must_use]
pub fn format_design_name(file_name: &str, show_extension: bool) -> String {
    let base = file_name
        .rsplit_once('/')
        .map_or(file_name, |(_, tail)| tail);
    let stem = if show_extension {
        base
    } else {
        strip_extension(base)
    };

    let mut out = String::with_capacity(stem.len());
    let mut previous_separator = false;
    for ch in stem.chars() {
        if ch == '-' || ch == '_' {
            if !previous_separator {
                out.push(' ');
            }
            previous_separator = true;
        } else {
            out.push(ch);
            previous_separator = false;
        }
    }
    capitalise_words(&out)
}

/// Remove a trailing `.ext` when `ext` is non-empty.
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => stem,
        _ => name,
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Upper-case every word character that starts a word.
fn capitalise_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_word = false;
    for ch in text.chars() {
        let word = is_word_char(ch);
        if word && !previous_word {
            out.push(ch.to_ascii_uppercase());
        } else {
            out.push(ch);
        }
        previous_word = word;
    }
    out
}
