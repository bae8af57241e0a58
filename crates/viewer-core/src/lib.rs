//! Headless page viewer engine.
//!
//! A [`Viewer`] owns one viewing session over an ordered list of page images:
//! the current page, the zoom/pan transform, paged or continuous display, and
//! the layout toggles. It never touches a window, the network, or the disk.
//! Hosts feed it events and carry out the [`Effect`]s it queues.

mod config;
mod coordinator;
mod effects;
mod geometry;
mod input;
mod loader;
mod navigation;
mod surface;
mod tracker;
mod transform;
mod viewer;

#[cfg(test)]
mod test_support;

pub use config::ViewerConfig;
pub use effects::{Disposition, Effect, Timer};
pub use geometry::{
    displayed_height, fit_page_scale, fit_width_scale, strip_load_order, Point, Size, StripLayout,
};
pub use input::{InputRouter, Key, Modifiers, PointerButton, WheelEvent};
pub use loader::{LoadController, LoadOutcome, LoadRequest, LoadToken};
pub use navigation::{page_input_to_index, parse_page_number, PageIndex};
pub use surface::{Cursor, Display, PageInput, SurfaceModel, NO_IMAGES_MESSAGE};
pub use tracker::{most_visible, ContinuousTracker, SubscriptionId, VisibilityEntry};
pub use transform::{Pan, Transform, ZoomDirection};
pub use viewer::{SessionError, ViewState, Viewer};

pub use doc_model::{Layout, PagePayload, PageRecord, Preferences, ViewMode};
