use doc_model::ViewMode;
use std::time::Duration;

/// Engine tunables. `Default` carries the values the viewer ships with.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// How long a page load may stay unresolved before the raw source is shown.
    pub load_timeout: Duration,
    /// Delay after a programmatic strip scroll before visibility tracking resumes.
    pub scroll_settle: Duration,
    pub zoom_in_step: f64,
    pub zoom_out_step: f64,
    pub max_zoom: f64,
    pub paged_min_zoom: f64,
    pub continuous_min_zoom: f64,
    /// Per-move distance on either axis above which a press becomes a drag.
    pub drag_threshold_px: f64,
    pub page_list_min_height: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(15),
            scroll_settle: Duration::from_millis(100),
            zoom_in_step: 1.15,
            zoom_out_step: 0.85,
            max_zoom: 8.0,
            paged_min_zoom: 1.0,
            continuous_min_zoom: 0.2,
            drag_threshold_px: 2.0,
            page_list_min_height: 60.0,
        }
    }
}

impl ViewerConfig {
    pub fn min_zoom(&self, mode: ViewMode) -> f64 {
        match mode {
            ViewMode::Paged => self.paged_min_zoom,
            ViewMode::Continuous => self.continuous_min_zoom,
        }
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }
}
