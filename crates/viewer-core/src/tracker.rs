//! Continuous-mode page tracking.
//!
//! The host observes every page of the strip and reports how much of each is
//! inside the viewport. The tracker keeps the latest fraction per page and
//! picks the page with the strictly greatest one. A programmatic scroll
//! suppresses selection until its settle timer releases it, so the scroll
//! cannot bounce the index through the pages it passes.

/// Identifies one observation session. A new id is issued every time the
/// strip is built; reports tagged with an older id are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub page_index: usize,
    /// Visible share of the page's own area, in `[0, 1]`.
    pub fraction: f64,
}

impl VisibilityEntry {
    pub fn new(page_index: usize, fraction: f64) -> Self {
        Self { page_index, fraction }
    }
}

#[derive(Debug, Clone)]
pub struct ContinuousTracker {
    subscription: SubscriptionId,
    fractions: Vec<f64>,
    suppressed_by: Option<u64>,
}

impl ContinuousTracker {
    pub fn new(subscription: SubscriptionId, page_count: usize) -> Self {
        Self { subscription, fractions: vec![0.0; page_count], suppressed_by: None }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed_by.is_some()
    }

    pub fn fractions(&self) -> &[f64] {
        &self.fractions
    }

    /// Starts suppression on behalf of the programmatic scroll `epoch`.
    pub fn suppress(&mut self, epoch: u64) {
        self.suppressed_by = Some(epoch);
    }

    /// Ends suppression if `epoch` is the scroll that started it. Returns
    /// whether suppression was lifted.
    pub fn release(&mut self, epoch: u64) -> bool {
        if self.suppressed_by != Some(epoch) {
            return false;
        }

        self.suppressed_by = None;
        true
    }

    /// Merges a visibility report and returns the page that should become
    /// current, if it differs from `current`.
    pub fn observe(&mut self, entries: &[VisibilityEntry], current: usize) -> Option<usize> {
        for entry in entries {
            if let Some(slot) = self.fractions.get_mut(entry.page_index) {
                *slot =
                    if entry.fraction.is_finite() { entry.fraction.clamp(0.0, 1.0) } else { 0.0 };
            }
        }

        if self.is_suppressed() {
            tracing::trace!(entries = entries.len(), "visibility report while scroll settles");
            return None;
        }

        most_visible(&self.fractions).filter(|index| *index != current)
    }
}

/// Index of the strictly greatest positive fraction. Ties for the maximum and
/// all-zero input yield `None`; non-finite fractions are skipped.
pub fn most_visible(fractions: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    let mut tied = false;

    for (index, fraction) in fractions.iter().copied().enumerate() {
        if !fraction.is_finite() || fraction <= 0.0 {
            continue;
        }

        match best {
            Some((_, best_fraction)) if fraction < best_fraction => {}
            Some((_, best_fraction)) if fraction == best_fraction => tied = true,
            _ => {
                best = Some((index, fraction));
                tied = false;
            }
        }
    }

    if tied {
        return None;
    }

    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn largest_fraction_wins() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 4);

        let selected =
            tracker.observe(&[VisibilityEntry::new(1, 0.6), VisibilityEntry::new(2, 0.4)], 0);

        assert_eq!(selected, Some(1));
    }

    #[test]
    fn tie_keeps_current_page() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 4);

        let selected =
            tracker.observe(&[VisibilityEntry::new(1, 0.5), VisibilityEntry::new(2, 0.5)], 0);

        assert_eq!(selected, None);
    }

    #[test]
    fn greater_fraction_after_tie_breaks_it() {
        assert_eq!(most_visible(&[0.5, 0.5, 0.7]), Some(2));
        assert_eq!(most_visible(&[0.7, 0.5, 0.5]), Some(0));
        assert_eq!(most_visible(&[0.0, 0.0]), None);
    }

    #[test]
    fn partial_reports_are_merged() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 3);
        tracker.observe(&[VisibilityEntry::new(0, 0.8), VisibilityEntry::new(1, 0.2)], 0);

        let selected = tracker.observe(&[VisibilityEntry::new(1, 0.9)], 0);

        assert_eq!(selected, Some(1));
        assert_eq!(tracker.fractions(), &[0.8, 0.9, 0.0]);
    }

    #[test]
    fn suppression_blocks_selection_but_records_fractions() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 3);
        tracker.suppress(7);

        let selected = tracker.observe(&[VisibilityEntry::new(2, 1.0)], 0);

        assert_eq!(selected, None);
        assert_eq!(tracker.fractions()[2], 1.0);
    }

    #[test]
    fn only_latest_scroll_releases_suppression() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 3);
        tracker.suppress(1);
        tracker.suppress(2);

        assert!(!tracker.release(1));
        assert!(tracker.is_suppressed());
        assert!(tracker.release(2));
        assert!(!tracker.is_suppressed());
    }

    #[test]
    fn non_finite_fractions_count_as_hidden() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 3);

        let selected = tracker.observe(
            &[VisibilityEntry::new(0, f64::NAN), VisibilityEntry::new(1, 0.3)],
            2,
        );

        assert_eq!(selected, Some(1));
        assert_eq!(tracker.fractions()[0], 0.0);
        assert_eq!(tracker.observe(&[VisibilityEntry::new(2, f64::INFINITY)], 1), None);
        assert_eq!(most_visible(&[f64::NAN, 0.2, f64::NAN]), Some(1));
    }

    #[test]
    fn unknown_pages_are_ignored() {
        let mut tracker = ContinuousTracker::new(SubscriptionId(1), 2);

        assert_eq!(tracker.observe(&[VisibilityEntry::new(9, 1.0)], 0), None);
    }
}
