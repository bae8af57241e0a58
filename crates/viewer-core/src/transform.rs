//! Zoom factor and pan offset of the rendered content.
//!
//! Pan is measured in screen pixels from the centered position. Zooming is
//! anchored on the cursor: the content point under the cursor stays put.

use crate::config::ViewerConfig;
use doc_model::ViewMode;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pan {
    pub x: f64,
    pub y: f64,
}

impl Pan {
    pub const ZERO: Pan = Pan { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel ticks scrolling down zoom out.
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            Self::Out
        } else {
            Self::In
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    zoom: f64,
    pan: Pan,
}

impl Default for Transform {
    fn default() -> Self {
        Self { zoom: 1.0, pan: Pan::ZERO }
    }
}

impl Transform {
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan(&self) -> Pan {
        self.pan
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoom > 1.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn reset_pan(&mut self) {
        self.pan = Pan::ZERO;
    }

    pub fn set_pan(&mut self, pan: Pan) {
        self.pan = pan;
    }

    /// Applies one wheel tick of zoom around `cursor`, given as an offset from
    /// the viewport center.
    pub fn zoom_at(
        &mut self,
        config: &ViewerConfig,
        mode: ViewMode,
        cursor: (f64, f64),
        direction: ZoomDirection,
    ) {
        let min_zoom = config.min_zoom(mode);
        let step = match direction {
            ZoomDirection::In => config.zoom_in_step,
            ZoomDirection::Out => config.zoom_out_step,
        };

        let old_zoom = self.zoom;
        let new_zoom = (old_zoom * step).clamp(min_zoom, config.max_zoom);
        self.zoom = new_zoom;

        let rest_zoom = match mode {
            ViewMode::Paged => 1.0_f64.max(min_zoom),
            ViewMode::Continuous => min_zoom,
        };

        if new_zoom <= rest_zoom {
            self.pan = Pan::ZERO;
            return;
        }

        let ratio = new_zoom / old_zoom;
        let (cx, cy) = cursor;
        self.pan = Pan { x: cx - (cx - self.pan.x) * ratio, y: cy - (cy - self.pan.y) * ratio };
    }

    /// Moves the content. In paged mode this only works while zoomed in; in
    /// continuous mode only the horizontal axis is panned because the strip
    /// scrolls natively on the vertical one. Returns whether pan changed.
    pub fn pan_by(&mut self, mode: ViewMode, dx: f64, dy: f64) -> bool {
        match mode {
            ViewMode::Paged if self.is_zoomed() => {
                self.pan.x += dx;
                self.pan.y += dy;
                true
            }
            ViewMode::Paged => false,
            ViewMode::Continuous => {
                self.pan.x += dx;
                dx != 0.0
            }
        }
    }
}
