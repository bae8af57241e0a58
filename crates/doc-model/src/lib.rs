use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: String,
    pub src: String,
    #[serde(default)]
    pub label: String,
}

impl PageRecord {
    pub fn new(id: impl Into<String>, src: impl Into<String>, label: impl Into<String>) -> Self {
        Self { id: id.into(), src: src.into(), label: label.into() }
    }
}

/// The one-shot delivery of page data that opens a viewer session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(default)]
    pub images: Vec<PageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl PagePayload {
    pub fn new(images: Vec<PageRecord>, title: Option<String>) -> Self {
        Self { images, title }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.images.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Paged,
    Continuous,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    Normal,
    FitWidth,
    LockZoom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub continuous: bool,
    pub fit_width: bool,
    pub lock_zoom: bool,
    pub sidebar_collapsed: bool,
}

impl Preferences {
    pub fn mode(&self) -> ViewMode {
        if self.continuous {
            ViewMode::Continuous
        } else {
            ViewMode::Paged
        }
    }

    /// Lock-zoom wins when a stored record carries both layout flags, matching
    /// the order in which they are re-applied at startup.
    pub fn layout(&self) -> Layout {
        if self.lock_zoom {
            Layout::LockZoom
        } else if self.fit_width {
            Layout::FitWidth
        } else {
            Layout::Normal
        }
    }

    pub fn normalized(self) -> Self {
        let layout = self.layout();
        Self {
            fit_width: layout == Layout::FitWidth,
            lock_zoom: layout == Layout::LockZoom,
            ..self
        }
    }
}
