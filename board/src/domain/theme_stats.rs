//! Most liked and most disliked design per theme.

use super::{DesignId, VoteCounts};

/// Counts of one design within a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignTally {
    /// The design.
    pub design: DesignId,
    /// Its counts.
    pub counts: VoteCounts,
}

/// Statistic labels for one theme; `None` renders as `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeStats {
    /// Design with the most likes, shown only with at least one like.
    pub most_liked: Option<DesignId>,
    /// Design with the most dislikes among the others, shown only with at
    /// least one dislike.
    pub most_disliked: Option<DesignId>,
}

/// Compute theme statistics from tallies in page order.
///
/// Returns `None` for themes with fewer than two designs. Ties go to the
/// design met first. The most-liked design is never also most disliked.
///
/// # Examples
/// ```
/// use board::domain::{DesignId, DesignTally, VoteCounts, theme_stats};
///
/// let tally = |name: &str, likes, dislikes| DesignTally {
///     design: DesignId::from_parts("t", name).expect("valid id"),
///     counts: VoteCounts::new(likes, dislikes),
/// };
/// let stats = theme_stats(&[tally("a", 5, 1), tally("b", 5, 0), tally("c", 2, 3)])
///     .expect("theme has several designs");
///
/// assert_eq!(stats.most_liked.map(|d| d.filename().to_owned()), Some("a".into()));
/// assert_eq!(stats.most_disliked.map(|d| d.filename().to_owned()), Some("c".into()));
/// ```
pub fn theme_stats(tallies: &[DesignTally]) -> Option<ThemeStats> {
    if tallies.len() < 2 {
        return None;
    }
    let first = tallies.first()?;

    let most_liked = tallies.iter().fold(first, |best, tally| {
        if tally.counts.likes > best.counts.likes {
            tally
        } else {
            best
        }
    });

    let mut others = tallies
        .iter()
        .filter(|tally| tally.design != most_liked.design);
    let most_disliked = match others.next() {
        Some(seed) => Some(others.fold(seed, |best, tally| {
            if tally.counts.dislikes > best.counts.dislikes {
                tally
            } else {
                best
            }
        })),
        None => None,
    };

    Some(ThemeStats {
        most_liked: (most_liked.counts.likes > 0).then(|| most_liked.design.clone()),
        most_disliked: most_disliked
            .filter(|tally| tally.counts.dislikes > 0)
            .map(|tally| tally.design.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tally(name: &str, likes: u32, dislikes: u32) -> DesignTally {
        DesignTally {
            design: DesignId::from_parts("theme1", name).expect("valid id"),
            counts: VoteCounts::new(likes, dislikes),
        }
    }

    fn names(stats: &ThemeStats) -> (Option<&str>, Option<&str>) {
        (
            stats.most_liked.as_ref().map(DesignId::filename),
            stats.most_disliked.as_ref().map(DesignId::filename),
        )
    }

    #[rstest]
    #[case::tied_likes(vec![tally("A", 5, 1), tally("B", 5, 0), tally("C", 2, 3)], (Some("A"), Some("C")))]
    #[case::no_votes(vec![tally("A", 0, 0), tally("B", 0, 0)], (None, None))]
    #[case::liked_is_also_most_disliked(vec![tally("A", 3, 9), tally("B", 1, 2)], (Some("A"), Some("B")))]
    #[case::only_dislikes(vec![tally("A", 0, 0), tally("B", 0, 4)], (None, Some("B")))]
    #[case::others_without_dislikes(vec![tally("A", 2, 5), tally("B", 1, 0)], (Some("A"), None))]
    fn picks_labels(#[case] tallies: Vec<DesignTally>, #[case] expected: (Option<&str>, Option<&str>)) {
        let stats = theme_stats(&tallies).expect("several designs");
        assert_eq!(names(&stats), expected);
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::single(vec![tally("A", 9, 9)])]
    fn small_themes_have_no_stats(#[case] tallies: Vec<DesignTally>) {
        assert!(theme_stats(&tallies).is_none());
    }
}
