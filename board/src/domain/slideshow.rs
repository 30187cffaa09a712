//! Circular navigation through the designs of one theme.

use super::DesignId;

/// Ordered designs of the open theme and the current design.
///
/// Never empty: construction fails without a design to show.
///
/// # Examples
/// ```
/// use board::domain::{DesignId, Slideshow};
///
/// let ids: Vec<_> = ["t/a.png", "t/b.png", "t/c.png"]
///     .into_iter()
///     .map(|raw| DesignId::parse(raw).expect("valid id"))
///     .collect();
/// let mut show = Slideshow::open(ids.clone(), &ids[2]).expect("design in theme");
///
/// assert_eq!(show.next(), &ids[0]);
/// assert_eq!(show.previous(), &ids[2]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slideshow {
    designs: Vec<DesignId>,
    position: usize,
    current: DesignId,
}

impl Slideshow {
    /// Open at `start`; `None` when `start` is not among `designs`.
    pub fn open(designs: Vec<DesignId>, start: &DesignId) -> Option<Self> {
        let position = designs.iter().position(|design| design == start)?;
        Some(Self {
            designs,
            position,
            current: start.clone(),
        })
    }

    /// The design being shown.
    pub fn current(&self) -> &DesignId {
        &self.current
    }

    /// Current position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of designs in the theme.
    pub fn len(&self) -> usize {
        self.designs.len()
    }

    /// Always `false`; a slideshow holds at least one design.
    pub fn is_empty(&self) -> bool {
        self.designs.is_empty()
    }

    /// Designs in order.
    pub fn designs(&self) -> &[DesignId] {
        &self.designs
    }

    /// Advance, wrapping from the last design to the first.
    pub fn next(&mut self) -> &DesignId {
        self.move_to(self.position.saturating_add(1));
        self.current()
    }

    /// Step back, wrapping from the first design to the last.
    pub fn previous(&mut self) -> &DesignId {
        let target = self
            .position
            .checked_sub(1)
            .unwrap_or_else(|| self.designs.len().saturating_sub(1));
        self.move_to(target);
        self.current()
    }

    fn move_to(&mut self, target: usize) {
        let Some(position) = target.checked_rem(self.designs.len()) else {
            return;
        };
        if let Some(design) = self.designs.get(position) {
            self.position = position;
            self.current = design.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn designs() -> Vec<DesignId> {
        ["t/a.png", "t/b.png", "t/c.png"]
            .into_iter()
            .map(|raw| DesignId::parse(raw).expect("valid id"))
            .collect()
    }

    #[rstest]
    fn next_wraps_to_start(designs: Vec<DesignId>) {
        let first = designs.first().cloned().expect("non-empty");
        let last = designs.last().cloned().expect("non-empty");
        let mut show = Slideshow::open(designs, &last).expect("open");

        assert_eq!(show.next(), &first);
        assert_eq!(show.position(), 0);
        assert_eq!(show.current(), &first);
    }

    #[rstest]
    fn previous_wraps_to_end(designs: Vec<DesignId>) {
        let first = designs.first().cloned().expect("non-empty");
        let last = designs.last().cloned().expect("non-empty");
        let mut show = Slideshow::open(designs, &first).expect("open");

        assert_eq!(show.previous(), &last);
        assert_eq!(show.position(), 2);
        assert_eq!(show.current(), &last);
    }

    #[test]
    fn single_design_navigates_to_itself() {
        let only = DesignId::parse("t/only.png").expect("valid id");
        let mut show = Slideshow::open(vec![only.clone()], &only).expect("open");

        assert_eq!(show.next(), &only);
        assert_eq!(show.previous(), &only);
    }

    #[rstest]
    fn unknown_start_is_rejected(designs: Vec<DesignId>) {
        let stray = DesignId::parse("t/zzz.png").expect("valid id");
        assert!(Slideshow::open(designs, &stray).is_none());
    }
}
