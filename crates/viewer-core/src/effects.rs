use crate::loader::LoadToken;
use crate::tracker::SubscriptionId;
use doc_model::Preferences;
use std::time::Duration;

/// Deferred callbacks the engine asks its host to schedule. Each one comes
/// back through `Viewer::on_timer` carrying the identity it was issued with,
/// so a timer that outlived its purpose is recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    LoadTimeout(LoadToken),
    ReleaseScrollSuppression(u64),
}

/// Instructions from the engine to its host, drained with
/// `Viewer::take_effects` in the order they were issued.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchImage { token: LoadToken, page_index: usize, src: String },
    ScheduleTimer { timer: Timer, after: Duration },
    BuildStrip { sources: Vec<String>, load_order: Vec<usize> },
    TearDownStrip,
    ObserveVisibility { subscription: SubscriptionId },
    StopObserving { subscription: SubscriptionId },
    ScrollStripTo { page_index: usize },
    ScrollViewportTo { top: f64 },
    ScrollViewportBy { dy: f64 },
    ScrollThumbnailIntoView { page_index: usize },
    /// Best effort; the host ignores failures.
    RequestFullscreen,
    SavePreferences(Preferences),
}

/// Whether the host should suppress the native default for an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Consumed,
    PassThrough,
}

impl Disposition {
    pub fn is_consumed(self) -> bool {
        self == Self::Consumed
    }
}
