//! Everything the host renders, as plain data.
//!
//! The engine rewrites the relevant fields on every state change; the host
//! reads [`SurfaceModel`] after each event and mirrors it onto its widgets.

use crate::transform::Pan;

pub const NO_IMAGES_MESSAGE: &str = "No images found. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Pointer,
    Grab,
    Grabbing,
}

/// The two page-number inputs. Keyboard shortcuts are off while either has
/// focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageInput {
    Jump,
    Mini,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Display {
    Paged { image_src: Option<String>, loading: Option<String> },
    Strip { sources: Vec<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceModel {
    pub title: Option<String>,
    pub total: usize,
    pub current_page: usize,
    pub jump_value: String,
    pub mini_value: String,
    pub highlighted_thumbnail: usize,
    pub continuous_checked: bool,
    pub fit_width_checked: bool,
    pub lock_zoom_checked: bool,
    pub sidebar_collapsed: bool,
    pub page_list_height: Option<f64>,
    pub display: Display,
    pub zoom: f64,
    pub pan: Pan,
    pub cursor: Cursor,
    pub focus: Option<PageInput>,
}

impl SurfaceModel {
    pub(crate) fn new(title: Option<String>, total: usize) -> Self {
        Self {
            title,
            total,
            current_page: 1,
            jump_value: "1".to_owned(),
            mini_value: "1".to_owned(),
            highlighted_thumbnail: 0,
            continuous_checked: false,
            fit_width_checked: false,
            lock_zoom_checked: false,
            sidebar_collapsed: false,
            page_list_height: None,
            display: Display::Paged { image_src: None, loading: None },
            zoom: 1.0,
            pan: Pan::ZERO,
            cursor: Cursor::Pointer,
            focus: None,
        }
    }

    pub fn counter_text(&self) -> String {
        format!("{}/{}", self.current_page, self.total)
    }

    pub fn sidebar_glyph(&self) -> &'static str {
        if self.sidebar_collapsed {
            "←"
        } else {
            "→"
        }
    }

    pub fn image_src(&self) -> Option<&str> {
        match &self.display {
            Display::Paged { image_src, .. } => image_src.as_deref(),
            Display::Strip { .. } => None,
        }
    }

    pub fn loading_text(&self) -> Option<&str> {
        match &self.display {
            Display::Paged { loading, .. } => loading.as_deref(),
            Display::Strip { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading_text().is_some()
    }

    pub fn strip_sources(&self) -> Option<&[String]> {
        match &self.display {
            Display::Strip { sources } => Some(sources),
            Display::Paged { .. } => None,
        }
    }

    pub(crate) fn set_loading(&mut self, text: String) {
        match &mut self.display {
            Display::Paged { loading, .. } => *loading = Some(text),
            Display::Strip { .. } => {
                self.display = Display::Paged { image_src: None, loading: Some(text) };
            }
        }
    }

    pub(crate) fn set_image(&mut self, src: String) {
        self.display = Display::Paged { image_src: Some(src), loading: None };
    }
}
