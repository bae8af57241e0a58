//! Viewport geometry: image fitting, strip layout, and visible fractions.

use crate::tracker::VisibilityEntry;
use doc_model::Layout;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point { x: self.width / 2.0, y: self.height / 2.0 }
    }

    fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

pub fn fit_width_scale(viewport: Size, image: Size) -> f64 {
    if viewport.width <= 0.0 || image.width <= 0.0 {
        return 1.0;
    }

    viewport.width / image.width
}

pub fn fit_page_scale(viewport: Size, image: Size) -> f64 {
    if viewport.is_empty() || image.is_empty() {
        return 1.0;
    }

    let width = viewport.width / image.width;
    let height = viewport.height / image.height;

    width.min(height)
}

/// Height of a decoded page at zoom 1 once laid out in the viewport.
pub fn displayed_height(layout: Layout, viewport: Size, image: Size) -> f64 {
    let scale = match layout {
        Layout::FitWidth => fit_width_scale(viewport, image),
        Layout::Normal | Layout::LockZoom => fit_page_scale(viewport, image),
    };

    image.height * scale
}

/// Order in which strip images are requested: the current page first, then
/// its neighbours fanning outward.
pub fn strip_load_order(current: usize, total: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }

    let current = current.min(total - 1);
    let mut order = vec![current];

    for offset in 1..total {
        if let Some(lower) = current.checked_sub(offset) {
            order.push(lower);
        }

        let upper = current + offset;
        if upper < total {
            order.push(upper);
        }

        if order.len() == total {
            break;
        }
    }

    order
}

/// Vertical layout of the continuous strip, in viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct StripLayout {
    pub page_heights: Vec<f64>,
    pub page_spacing: f64,
    pub viewport_height: f64,
}

impl StripLayout {
    pub fn uniform(
        page_count: usize,
        page_height: f64,
        page_spacing: f64,
        viewport_height: f64,
    ) -> Self {
        Self { page_heights: vec![page_height; page_count], page_spacing, viewport_height }
    }

    pub fn page_count(&self) -> usize {
        self.page_heights.len()
    }

    pub fn content_height(&self) -> f64 {
        let pages: f64 = self.page_heights.iter().sum();
        let gaps = self.page_spacing * self.page_heights.len().saturating_sub(1) as f64;
        pages + gaps
    }

    pub fn max_scroll(&self) -> f64 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    pub fn clamp_scroll(&self, offset: f64) -> f64 {
        offset.clamp(0.0, self.max_scroll())
    }

    /// Scroll offset that brings the top of `page_index` to the top of the
    /// viewport, clamped to the scrollable range.
    pub fn page_start_offset(&self, page_index: usize) -> f64 {
        let mut cursor = 0.0;

        for (index, page_height) in self.page_heights.iter().enumerate() {
            if index == page_index {
                return self.clamp_scroll(cursor);
            }
            cursor += page_height + self.page_spacing;
        }

        self.clamp_scroll(cursor)
    }

    /// Fraction of every page's own height that lies inside the viewport.
    pub fn visibility(&self, scroll_offset: f64) -> Vec<VisibilityEntry> {
        let top = scroll_offset;
        let bottom = scroll_offset + self.viewport_height;
        let mut cursor = 0.0;

        self.page_heights
            .iter()
            .enumerate()
            .map(|(page_index, page_height)| {
                let start = cursor;
                let end = cursor + page_height;
                cursor = end + self.page_spacing;

                let visible = (end.min(bottom) - start.max(top)).max(0.0);
                let fraction = if *page_height > 0.0 { visible / page_height } else { 0.0 };

                VisibilityEntry { page_index, fraction }
            })
            .collect()
    }
}
