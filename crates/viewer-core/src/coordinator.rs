//! Mode and layout toggles, and their persistence.
//!
//! Interactive toggles and startup restoration go through the same
//! transitions, so whatever derived state a toggle sets up (the strip, the
//! observation subscription, a reset transform) exists after startup too.

use crate::effects::Effect;
use crate::geometry::strip_load_order;
use crate::surface::Display;
use crate::tracker::{ContinuousTracker, SubscriptionId};
use crate::viewer::{ListResize, Viewer};
use doc_model::{Layout, Preferences, ViewMode};

impl Viewer {
    pub fn set_continuous(&mut self, enabled: bool) {
        let target = if enabled { ViewMode::Continuous } else { ViewMode::Paged };
        if self.state.mode == target {
            self.sync_toggles();
            return;
        }

        match target {
            ViewMode::Continuous => self.enter_continuous(),
            ViewMode::Paged => self.leave_continuous(),
        }

        self.sync_toggles();
        self.persist();
    }

    /// Turning fit-width on clears lock-zoom. In paged mode the transform is
    /// reset and the viewport scrolls back to the top; the continuous strip
    /// keeps its position.
    pub fn set_fit_width(&mut self, enabled: bool) {
        if enabled {
            self.state.lock_zoom = false;
        }
        self.state.fit_width = enabled;

        tracing::debug!(enabled, "fit width toggled");

        if self.state.mode == ViewMode::Paged {
            self.state.transform.reset();
            self.sync_transform();
            self.effects.push(Effect::ScrollViewportTo { top: 0.0 });
        }

        self.sync_toggles();
        self.persist();
    }

    /// Turning lock-zoom on clears fit-width.
    pub fn set_lock_zoom(&mut self, enabled: bool) {
        if enabled {
            self.state.fit_width = false;
        }
        self.state.lock_zoom = enabled;

        tracing::debug!(enabled, "lock zoom toggled");

        self.sync_toggles();
        self.persist();
    }

    pub fn toggle_sidebar(&mut self) {
        let collapsed = !self.state.sidebar_collapsed;
        self.set_sidebar_collapsed(collapsed);
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) {
        self.state.sidebar_collapsed = collapsed;
        self.sync_toggles();
        self.persist();
    }

    /// Starts dragging the thumbnail list's resize handle.
    pub fn begin_page_list_resize(&mut self, pointer_y: f64, current_height: f64) {
        self.list_resize = Some(ListResize { start_y: pointer_y, start_height: current_height });
    }

    pub fn drag_page_list_resize(&mut self, pointer_y: f64) {
        let Some(resize) = self.list_resize else {
            return;
        };

        let height = (resize.start_height + (pointer_y - resize.start_y))
            .max(self.config.page_list_min_height);
        self.surface.page_list_height = Some(height);
    }

    pub fn end_page_list_resize(&mut self) {
        self.list_resize = None;
    }

    fn enter_continuous(&mut self) {
        let current = self.state.index.current();
        tracing::info!(page = current, "entering continuous mode");

        self.state.mode = ViewMode::Continuous;
        self.state.transform.reset();
        self.sync_transform();
        self.loader.invalidate();

        self.next_subscription += 1;
        let subscription = SubscriptionId(self.next_subscription);
        self.tracker = Some(ContinuousTracker::new(subscription, self.page_count()));

        let sources: Vec<String> = self.pages.iter().map(|page| page.src.clone()).collect();
        self.surface.display = Display::Strip { sources: sources.clone() };

        self.effects.push(Effect::BuildStrip {
            sources,
            load_order: strip_load_order(current, self.page_count()),
        });
        self.effects.push(Effect::ObserveVisibility { subscription });

        self.scroll_to_page(current);
    }

    fn leave_continuous(&mut self) {
        let current = self.state.index.current();
        tracing::info!(page = current, "leaving continuous mode");

        self.state.transform.reset();

        if let Some(tracker) = self.tracker.take() {
            self.effects.push(Effect::StopObserving { subscription: tracker.subscription() });
        }
        self.effects.push(Effect::TearDownStrip);

        self.state.mode = ViewMode::Paged;
        self.surface.display = Display::Paged { image_src: None, loading: None };
        self.show(current);
    }

    fn persist(&mut self) {
        if !self.persist_enabled {
            return;
        }

        let preferences = self.state.preferences();
        tracing::debug!(?preferences, "preferences changed");
        self.effects.push(Effect::SavePreferences(preferences));
    }

    /// Re-applies stored toggles: layout first, then mode. Writes nothing
    /// back unless the stored record had to be normalized.
    pub(crate) fn apply_startup_preferences(&mut self, stored: Preferences) {
        let target = stored.normalized();
        self.persist_enabled = false;

        self.set_sidebar_collapsed(target.sidebar_collapsed);
        match target.layout() {
            Layout::FitWidth => self.set_fit_width(true),
            Layout::LockZoom => self.set_lock_zoom(true),
            Layout::Normal => {}
        }

        match target.mode() {
            ViewMode::Continuous => self.set_continuous(true),
            ViewMode::Paged => self.show(0),
        }

        self.sync_toggles();
        self.persist_enabled = true;

        if target != stored {
            tracing::debug!(?stored, "normalizing stored preferences");
            self.persist();
        }
    }
}
