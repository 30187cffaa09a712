//! Pure builders turning cached feedback into render-surface views.

use std::collections::HashMap;

use crate::domain::ports::{CommentView, LightboxView, ThemeStatsView};
use crate::domain::{
    AggregatedFeedback, DesignId, DesignTally, Gallery, Slideshow, UserId, theme_stats,
};

/// Comment rows in display order; delete affordances only for `viewer`'s own.
pub(crate) fn comment_views(
    feedback: &AggregatedFeedback,
    viewer: Option<&UserId>,
) -> Vec<CommentView> {
    feedback
        .comments_newest_first()
        .enumerate()
        .map(|(display_index, comment)| CommentView {
            display_index,
            text: comment.text.clone(),
            username: comment.username.clone(),
            created_at: comment.created_at,
            deletable: viewer.is_some_and(|who| comment.is_authored_by(who)),
        })
        .collect()
}

/// Lightbox view for the slideshow's current design.
pub(crate) fn lightbox_view(
    slideshow: &Slideshow,
    feedback: &AggregatedFeedback,
    viewer: Option<&UserId>,
) -> LightboxView {
    let design = slideshow.current().clone();
    LightboxView {
        title: design.label(),
        design,
        position: slideshow.position(),
        total: slideshow.len(),
        counts: feedback.counts,
        comment_count: feedback.comment_count,
        own_vote: feedback.user_vote,
        comments: comment_views(feedback, viewer),
    }
}

/// Statistic labels per theme folder, skipping themes too small to rank.
pub(crate) fn theme_stat_views<'a, F>(gallery: &'a Gallery, lookup: F) -> Vec<(&'a str, ThemeStatsView)>
where
    F: Fn(&DesignId) -> Option<AggregatedFeedback>,
{
    gallery
        .themes()
        .iter()
        .filter_map(|theme| {
            let tallies: Vec<DesignTally> = theme
                .designs()
                .iter()
                .map(|design| DesignTally {
                    design: design.clone(),
                    counts: lookup(design).map(|feedback| feedback.counts).unwrap_or_default(),
                })
                .collect();
            let stats = theme_stats(&tallies)?;
            Some((
                theme.folder(),
                ThemeStatsView {
                    most_liked: stats.most_liked.as_ref().map(DesignId::label),
                    most_disliked: stats.most_disliked.as_ref().map(DesignId::label),
                },
            ))
        })
        .collect()
}

/// Lookup closure over a fetched aggregate map.
pub(crate) fn from_map(
    aggregates: &HashMap<DesignId, AggregatedFeedback>,
) -> impl Fn(&DesignId) -> Option<AggregatedFeedback> + '_ {
    move |design: &DesignId| aggregates.get(design).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Comment, Theme, VoteCounts};
    use chrono::Utc;

    fn design(theme: &str, name: &str) -> DesignId {
        DesignId::from_parts(theme, name).expect("valid id")
    }

    #[test]
    fn comments_render_newest_first_with_owner_affordances() {
        let me = UserId::random();
        let feedback = AggregatedFeedback {
            comments: vec![
                Comment {
                    id: None,
                    text: "C1".into(),
                    username: "me".into(),
                    user: Some(me.clone()),
                    created_at: Utc::now(),
                },
                Comment {
                    id: None,
                    text: "C2".into(),
                    username: "them".into(),
                    user: Some(UserId::random()),
                    created_at: Utc::now(),
                },
            ],
            comment_count: 2,
            ..AggregatedFeedback::default()
        };

        let views = comment_views(&feedback, Some(&me));
        let shown: Vec<_> = views.iter().map(|v| (v.display_index, v.text.as_str(), v.deletable)).collect();
        assert_eq!(shown, [(0, "C2", false), (1, "C1", true)]);
        assert!(comment_views(&feedback, None).iter().all(|v| !v.deletable));
    }

    #[test]
    fn stats_skip_single_design_themes_and_use_labels() {
        let gallery = Gallery::new(vec![
            Theme::new("theme1", vec![design("theme1", "blue-hero.png"), design("theme1", "red.png")]),
            Theme::new("solo", vec![design("solo", "only.png")]),
        ]);
        let mut aggregates = HashMap::new();
        aggregates.insert(
            design("theme1", "blue-hero.png"),
            AggregatedFeedback {
                counts: VoteCounts::new(2, 0),
                ..AggregatedFeedback::default()
            },
        );
        aggregates.insert(
            design("theme1", "red.png"),
            AggregatedFeedback {
                counts: VoteCounts::new(0, 1),
                ..AggregatedFeedback::default()
            },
        );

        let views = theme_stat_views(&gallery, from_map(&aggregates));
        assert_eq!(
            views,
            [(
                "theme1",
                ThemeStatsView {
                    most_liked: Some("Blue Hero".to_owned()),
                    most_disliked: Some("Red".to_owned()),
                }
            )]
        );
    }
}
