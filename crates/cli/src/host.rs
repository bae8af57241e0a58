//! A headless host for the viewer engine.
//!
//! Carries out the engine's effects against the local filesystem and a
//! simulated clock: images are probed from disk, timers fire when the clock
//! is advanced, and the continuous strip is a uniform [`StripLayout`] whose
//! visibility is reported back after every scroll.

use std::path::{Path, PathBuf};
use std::time::Duration;
use storage::{save_preferences, KeyValueStore};
use viewer_core::{Effect, LoadToken, Size, StripLayout, SubscriptionId, Timer, Viewer};

const STRIP_PAGE_SPACING: f64 = 8.0;

#[derive(Debug)]
struct PendingTimer {
    due: Duration,
    seq: u64,
    timer: Timer,
}

#[derive(Debug)]
struct Strip {
    layout: StripLayout,
    scroll: f64,
    subscription: Option<SubscriptionId>,
}

enum Completion {
    Loaded(LoadToken, Size),
    Failed(LoadToken),
}

pub struct SimulatedHost<S> {
    viewer: Viewer,
    store: S,
    base_dir: PathBuf,
    page_height: f64,
    now: Duration,
    next_seq: u64,
    timers: Vec<PendingTimer>,
    strip: Option<Strip>,
    viewport_scroll: f64,
    thumbnail_in_view: usize,
    fullscreen_requests: usize,
    saves: usize,
}

impl<S: KeyValueStore> SimulatedHost<S> {
    /// Wraps a freshly started viewer and runs the effects of its startup.
    pub fn new(viewer: Viewer, store: S, base_dir: impl Into<PathBuf>, page_height: f64) -> Self {
        let mut host = Self {
            viewer,
            store,
            base_dir: base_dir.into(),
            page_height,
            now: Duration::ZERO,
            next_seq: 0,
            timers: Vec::new(),
            strip: None,
            viewport_scroll: 0.0,
            thumbnail_in_view: 0,
            fullscreen_requests: 0,
            saves: 0,
        };
        host.pump();
        host
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn strip_scroll(&self) -> Option<f64> {
        self.strip.as_ref().map(|strip| strip.scroll)
    }

    pub fn viewport_scroll(&self) -> f64 {
        self.viewport_scroll
    }

    pub fn thumbnail_in_view(&self) -> usize {
        self.thumbnail_in_view
    }

    pub fn fullscreen_requests(&self) -> usize {
        self.fullscreen_requests
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Runs `f` against the viewer, then carries out whatever it queued.
    pub fn with_viewer<R>(&mut self, f: impl FnOnce(&mut Viewer) -> R) -> R {
        let result = f(&mut self.viewer);
        self.pump();
        result
    }

    /// Advances the clock, firing due timers in deadline order.
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.now + by;

        while let Some(position) = self.next_due(deadline) {
            let pending = self.timers.swap_remove(position);
            self.now = pending.due;
            tracing::trace!(timer = ?pending.timer, at_ms = self.now.as_millis(), "timer fired");
            self.viewer.on_timer(pending.timer);
            self.pump();
        }

        self.now = deadline;
    }

    fn next_due(&self, deadline: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, pending)| pending.due <= deadline)
            .min_by_key(|(_, pending)| (pending.due, pending.seq))
            .map(|(position, _)| position)
    }

    /// A user scroll: moves the strip in continuous mode, the page viewport
    /// otherwise.
    pub fn scroll_to(&mut self, offset: f64) {
        if let Some(strip) = self.strip.as_mut() {
            strip.scroll = strip.layout.clamp_scroll(offset);
            self.report_visibility();
        } else {
            self.viewport_scroll = offset.max(0.0);
        }
        self.pump();
    }

    fn pump(&mut self) {
        loop {
            let effects = self.viewer.take_effects();
            if effects.is_empty() {
                break;
            }

            let mut completions = Vec::new();
            for effect in effects {
                self.apply(effect, &mut completions);
            }

            for completion in completions {
                match completion {
                    Completion::Loaded(token, size) => self.viewer.on_image_loaded(token, size),
                    Completion::Failed(token) => self.viewer.on_image_failed(token),
                }
            }
        }
    }

    fn apply(&mut self, effect: Effect, completions: &mut Vec<Completion>) {
        match effect {
            Effect::FetchImage { token, page_index, src } => {
                if is_remote(&src) {
                    tracing::debug!(page = page_index, %src, "remote source left pending");
                    return;
                }

                match probe_image(&self.base_dir, &src) {
                    Some(size) => completions.push(Completion::Loaded(token, size)),
                    None => completions.push(Completion::Failed(token)),
                }
            }
            Effect::ScheduleTimer { timer, after } => {
                self.next_seq += 1;
                self.timers.push(PendingTimer { due: self.now + after, seq: self.next_seq, timer });
            }
            Effect::BuildStrip { sources, load_order } => {
                tracing::debug!(pages = sources.len(), ?load_order, "building strip");
                let layout = StripLayout::uniform(
                    sources.len(),
                    self.page_height,
                    STRIP_PAGE_SPACING,
                    self.viewer.viewport().height,
                );
                self.strip = Some(Strip { layout, scroll: 0.0, subscription: None });
            }
            Effect::TearDownStrip => {
                self.strip = None;
                self.viewport_scroll = 0.0;
            }
            Effect::ObserveVisibility { subscription } => {
                if let Some(strip) = self.strip.as_mut() {
                    strip.subscription = Some(subscription);
                }
                self.report_visibility();
            }
            Effect::StopObserving { subscription } => {
                if let Some(strip) = self.strip.as_mut() {
                    if strip.subscription == Some(subscription) {
                        strip.subscription = None;
                    }
                }
            }
            Effect::ScrollStripTo { page_index } => {
                if let Some(strip) = self.strip.as_mut() {
                    strip.scroll = strip.layout.page_start_offset(page_index);
                }
                self.report_visibility();
            }
            Effect::ScrollViewportTo { top } => self.scroll_viewport(|_| top),
            Effect::ScrollViewportBy { dy } => self.scroll_viewport(|current| current + dy),
            Effect::ScrollThumbnailIntoView { page_index } => self.thumbnail_in_view = page_index,
            Effect::RequestFullscreen => self.fullscreen_requests += 1,
            Effect::SavePreferences(preferences) => {
                match save_preferences(&mut self.store, &preferences) {
                    Ok(()) => self.saves += 1,
                    Err(error) => tracing::warn!(%error, "failed to persist preferences"),
                }
            }
        }
    }

    fn scroll_viewport(&mut self, target: impl FnOnce(f64) -> f64) {
        match self.strip.as_mut() {
            Some(strip) => {
                strip.scroll = strip.layout.clamp_scroll(target(strip.scroll));
                self.report_visibility();
            }
            None => self.viewport_scroll = target(self.viewport_scroll).max(0.0),
        }
    }

    fn report_visibility(&mut self) {
        let Some(strip) = self.strip.as_ref() else {
            return;
        };
        let Some(subscription) = strip.subscription else {
            return;
        };

        let entries = strip.layout.visibility(strip.scroll);
        self.viewer.on_visibility(subscription, &entries);
    }
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Reads the natural size of a local image. `None` stands for a decode error.
pub fn probe_image(base_dir: &Path, src: &str) -> Option<Size> {
    let path = base_dir.join(src);

    match image::image_dimensions(&path) {
        Ok((width, height)) => Some(Size::new(f64::from(width), f64::from(height))),
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "image could not be decoded");
            None
        }
    }
}

pub fn source_kind(src: &str) -> &'static str {
    if is_remote(src) {
        "remote"
    } else {
        "file"
    }
}
