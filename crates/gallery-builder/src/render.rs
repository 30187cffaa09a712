//! Static page rendering.
//!
//! Rendering is a pure function of the scanned themes and the configuration,
//! so identical inputs always produce byte-identical documents.

use crate::config::GalleryConfig;
use crate::markup::{BadgeKind, badge_element_id, escape_html, theme_stat_element_id};
use crate::naming::{format_design_name, format_theme_name};
use crate::scan::ThemeFolder;

/// Element id prefix of the "most liked" placeholder of a theme.
pub const MOST_LIKED_STAT: &str = "most-liked";
/// Element id prefix of the "most disliked" placeholder of a theme.
pub const MOST_DISLIKED_STAT: &str = "most-disliked";

/// Render the complete review page.
///
/// `asset_base` is the URL prefix under which theme folders are served,
/// normally the assets directory relative to the output file.
#[must_use]
pub fn render_page(themes: &[ThemeFolder], config: &GalleryConfig, asset_base: &str) -> String {
    let sections = themes
        .iter()
        .map(|theme| render_theme(theme, config, asset_base))
        .collect::<Vec<_>>()
        .join("\n");
    let title = escape_html(config.page_title());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>{title}</title>
    <link rel="stylesheet" href="style.css" />
  </head>
  <body>
    <div id="authContainer" class="auth-container"></div>
{sections}
{lightbox}
    <script src="board.js"></script>
  </body>
</html>
"#,
        lightbox = LIGHTBOX,
    )
}

fn render_theme(theme: &ThemeFolder, config: &GalleryConfig, asset_base: &str) -> String {
    let folder = escape_html(&theme.folder);
    let name = escape_html(&format_theme_name(&theme.folder, config.theme_name_format()));
    let description = escape_html(config.description_for(&theme.folder));
    let count = theme.images.len();
    let noun = if count == 1 { "design" } else { "designs" };

    let stats = if count > 1 {
        format!(
            r#" | <small>Most liked: <span class="design-most-liked" id="{liked}">-</span></small> | <small>Most disliked: <span class="design-least-liked" id="{disliked}">-</span></small>"#,
            liked = escape_html(&theme_stat_element_id(MOST_LIKED_STAT, &theme.folder)),
            disliked = escape_html(&theme_stat_element_id(MOST_DISLIKED_STAT, &theme.folder)),
        )
    } else {
        String::new()
    };

    let tags = config.tags_for(&theme.folder);
    let tags_html = if tags.is_empty() {
        String::new()
    } else {
        let items = tags
            .iter()
            .map(|tag| format!(r#"            <div class="tag">{}</div>"#, escape_html(tag)))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n          <div class=\"tags\">\n            <span>Tags:</span>\n{items}\n          </div>")
    };

    let items = theme
        .images
        .iter()
        .map(|image| render_design(theme, image, config, asset_base))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"    <div class="theme" data-theme="{folder}">
      <div class="theme-details">
        <h2>{name}</h2>
        <div class="stats">
          <small><span class="design-count">{count}</span> {noun}</small>{stats}
        </div>
      </div>
      <div class="design-wrapper">
        <div class="theme-description">
          <h3>{description}</h3>{tags_html}
        </div>
        <div class="design-grid">
{items}
        </div>
      </div>
    </div>"#
    )
}

fn render_design(
    theme: &ThemeFolder,
    image: &str,
    config: &GalleryConfig,
    asset_base: &str,
) -> String {
    let design_id = theme.design_id(image);
    let id = escape_html(&design_id);
    let src = escape_html(&format!("{asset_base}/{design_id}"));
    let alt = escape_html(image);
    let label = escape_html(&format_design_name(image, config.build().show_extensions));
    let like = escape_html(&badge_element_id(BadgeKind::Like, &design_id));
    let dislike = escape_html(&badge_element_id(BadgeKind::Dislike, &design_id));
    let comments = escape_html(&badge_element_id(BadgeKind::Comments, &design_id));

    format!(
        r#"          <div class="design-item">
            <p class="design-name">{label}</p>
            <img src="{src}" alt="{alt}" class="thumbnail" data-design="{id}" />
            <div class="feedback-icons">
              <div class="icon-wrapper">
                <i class="fa-regular fa-thumbs-up" data-type="like" data-design="{id}"></i>
                <span class="badge" id="{like}">0</span>
              </div>
              <div class="icon-wrapper">
                <i class="fa-regular fa-thumbs-down" data-type="dislike" data-design="{id}"></i>
                <span class="badge" id="{dislike}">0</span>
              </div>
              <div class="icon-wrapper comment-trigger" data-design="{id}">
                <i class="fa-regular fa-pen-to-square"></i>
                <span class="badge" id="{comments}">0</span>
              </div>
            </div>
          </div>"#
    )
}

const LIGHTBOX: &str = r#"    <div id="lightbox">
      <div class="lightbox-content">
        <div class="image-wrapper">
          <div class="lightbox-header">
            <button id="lightboxClose" title="Close"><i class="fa-solid fa-xmark"></i></button>
          </div>
          <button id="prevButton" class="nav-button prev-button" title="Previous"><i class="fa-solid fa-chevron-left"></i></button>
          <img id="fullImage" src="" alt="Full View" />
          <button id="nextButton" class="nav-button next-button" title="Next"><i class="fa-solid fa-chevron-right"></i></button>
          <div class="lightbox-feedback">
            <button id="lightboxLike" class="feedback-btn like-btn" title="Like"><i class="fa-regular fa-thumbs-up"></i></button>
            <button id="lightboxDislike" class="feedback-btn dislike-btn" title="Dislike"><i class="fa-regular fa-thumbs-down"></i></button>
          </div>
        </div>
        <div id="commentSidebar">
          <div class="sidebar-header">
            <h4 id="designTitle">Comments</h4>
            <div class="sidebar-voting">
              <div class="vote-item">
                <i class="fa-regular fa-thumbs-up sidebar-vote-icon" id="sidebarLike"></i>
                <span class="sidebar-vote-count" id="sidebarLikeCount">0</span>
              </div>
              <div class="vote-item">
                <i class="fa-regular fa-thumbs-down sidebar-vote-icon" id="sidebarDislike"></i>
                <span class="sidebar-vote-count" id="sidebarDislikeCount">0</span>
              </div>
            </div>
          </div>
          <div id="commentList"></div>
          <div class="sidebar-footer">
            <textarea id="commentInputSidebar" placeholder="Add a comment..."></textarea>
            <button id="submitCommentSidebar">Send</button>
          </div>
        </div>
      </div>
    </div>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn theme(folder: &str, images: &[&str]) -> ThemeFolder {
        ThemeFolder {
            folder: folder.to_owned(),
            images: images.iter().map(|i| (*i).to_owned()).collect(),
        }
    }

    #[test]
    fn renders_badges_for_every_design() {
        let page = render_page(
            &[theme("theme1", &["a.png", "b-c.png"])],
            &GalleryConfig::default(),
            "assets",
        );

        for id in ["theme1/a.png", "theme1/b-c.png"] {
            assert!(page.contains(&format!(r#"id="like-{id}""#)));
            assert!(page.contains(&format!(r#"id="dislike-{id}""#)));
            assert!(page.contains(&format!(r#"id="comments-{id}""#)));
            assert!(page.contains(&format!(r#"src="assets/{id}""#)));
        }
        assert!(page.contains("<h2>Theme 1</h2>"));
        assert!(page.contains(r#"<p class="design-name">B C</p>"#));
        assert!(page.contains("<span class=\"design-count\">2</span> designs"));
        assert!(page.contains(r#"id="most-liked-theme1""#));
    }

    #[test]
    fn single_design_theme_has_no_stats() {
        let page = render_page(&[theme("solo", &["only.png"])], &GalleryConfig::default(), "assets");

        assert!(page.contains("<span class=\"design-count\">1</span> design</small>"));
        assert!(!page.contains("Most liked"));
    }

    #[test]
    fn escapes_configured_text() {
        let config = GalleryConfig::from_json(
            r#"{"pageTitle": "A & B", "themeDescriptions": {"t": "<b>bold</b>"}, "themeTags": {"t": ["x\"y"]}}"#,
        )
        .expect("valid config");
        let page = render_page(&[theme("t", &["a.png"])], &config, "assets");

        assert!(page.contains("<title>A &amp; B</title>"));
        assert!(page.contains("<h3>&lt;b&gt;bold&lt;/b&gt;</h3>"));
        assert!(page.contains(r#"<div class="tag">x&quot;y</div>"#));
    }

    #[test]
    fn rendering_is_deterministic() {
        let themes = [theme("theme1", &["a.png"]), theme("theme2", &["b.png", "c.png"])];
        let config = GalleryConfig::default();

        assert_eq!(
            render_page(&themes, &config, "assets"),
            render_page(&themes, &config, "assets")
        );
    }
}
