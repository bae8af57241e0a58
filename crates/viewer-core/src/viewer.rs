use crate::config::ViewerConfig;
use crate::effects::{Effect, Timer};
use crate::geometry::{displayed_height, Size};
use crate::input::InputRouter;
use crate::loader::{LoadController, LoadOutcome, LoadToken};
use crate::navigation::{page_input_to_index, PageIndex};
use crate::surface::{Cursor, PageInput, SurfaceModel};
use crate::tracker::{ContinuousTracker, SubscriptionId, VisibilityEntry};
use crate::transform::{Pan, Transform};
use doc_model::{Layout, PagePayload, PageRecord, Preferences, ViewMode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("no images found")]
    NoImages,
}

/// The mutable view state of one session. Page loads, strip scrolls,
/// visibility reports, and input all move `index` and `transform`; the
/// layout and mode flags change only through the coordinator toggles.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub index: PageIndex,
    pub transform: Transform,
    pub mode: ViewMode,
    pub fit_width: bool,
    pub lock_zoom: bool,
    pub sidebar_collapsed: bool,
}

impl ViewState {
    fn new(total: usize) -> Self {
        Self {
            index: PageIndex::new(total),
            transform: Transform::default(),
            mode: ViewMode::Paged,
            fit_width: false,
            lock_zoom: false,
            sidebar_collapsed: false,
        }
    }

    pub fn layout(&self) -> Layout {
        if self.lock_zoom {
            Layout::LockZoom
        } else if self.fit_width {
            Layout::FitWidth
        } else {
            Layout::Normal
        }
    }

    /// Whether unzoomed content scrolls natively instead of being panned.
    pub fn scrolls_natively(&self) -> bool {
        self.mode == ViewMode::Continuous || self.fit_width
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            continuous: self.mode == ViewMode::Continuous,
            fit_width: self.fit_width,
            lock_zoom: self.lock_zoom,
            sidebar_collapsed: self.sidebar_collapsed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ListResize {
    pub(crate) start_y: f64,
    pub(crate) start_height: f64,
}

/// One viewing session over a fixed sequence of pages.
///
/// The viewer is a single-threaded state machine. Host events go in through
/// the `on_*` methods and the interactive operations; instructions for the
/// host come out of [`Viewer::take_effects`]; the rendered state is
/// [`Viewer::surface`].
#[derive(Debug)]
pub struct Viewer {
    pub(crate) config: ViewerConfig,
    pub(crate) pages: Vec<PageRecord>,
    pub(crate) state: ViewState,
    pub(crate) loader: LoadController,
    pub(crate) tracker: Option<ContinuousTracker>,
    pub(crate) input: InputRouter,
    pub(crate) list_resize: Option<ListResize>,
    pub(crate) surface: SurfaceModel,
    pub(crate) viewport: Size,
    pub(crate) effects: Vec<Effect>,
    pub(crate) next_subscription: u64,
    pub(crate) scroll_epoch: u64,
    pub(crate) persist_enabled: bool,
}

impl Viewer {
    /// Opens a session from the delivered page data and the stored
    /// preferences. An empty payload never produces a viewer; the host shows
    /// [`crate::NO_IMAGES_MESSAGE`] instead.
    pub fn start(
        payload: PagePayload,
        preferences: Preferences,
        viewport: Size,
        config: ViewerConfig,
    ) -> Result<Self, SessionError> {
        if payload.is_empty() {
            tracing::warn!("page payload carried no images");
            return Err(SessionError::NoImages);
        }

        let total = payload.page_count();
        tracing::info!(pages = total, title = ?payload.title, "starting viewer session");

        let mut viewer = Self {
            config,
            surface: SurfaceModel::new(payload.title, total),
            pages: payload.images,
            state: ViewState::new(total),
            loader: LoadController::new(),
            tracker: None,
            input: InputRouter::default(),
            list_resize: None,
            viewport,
            effects: Vec::new(),
            next_subscription: 0,
            scroll_epoch: 0,
            persist_enabled: false,
        };

        viewer.apply_startup_preferences(preferences);
        Ok(viewer)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn current_index(&self) -> usize {
        self.state.index.current()
    }

    pub fn mode(&self) -> ViewMode {
        self.state.mode
    }

    pub fn transform(&self) -> Transform {
        self.state.transform
    }

    pub fn preferences(&self) -> Preferences {
        self.state.preferences()
    }

    pub fn surface(&self) -> &SurfaceModel {
        &self.surface
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn loader(&self) -> &LoadController {
        &self.loader
    }

    pub fn tracker(&self) -> Option<&ContinuousTracker> {
        self.tracker.as_ref()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Shows page `index`. Out-of-range indices are ignored. In continuous
    /// mode this scrolls the strip instead of loading.
    pub fn show(&mut self, index: usize) {
        if !self.state.index.contains(index) {
            return;
        }

        if self.state.mode == ViewMode::Continuous {
            self.scroll_to_page(index);
            return;
        }

        self.state.index.set(index);
        let token = self.loader.begin(index);

        if self.state.lock_zoom {
            self.state.transform.reset_pan();
        } else {
            self.state.transform.reset();
        }

        self.sync_page_mirrors();
        self.sync_transform();
        self.surface.set_loading(format!("Page {} / {}", index + 1, self.page_count()));

        tracing::debug!(page = index, token = token.raw(), "showing page");

        let src = self.pages[index].src.clone();
        self.effects.push(Effect::FetchImage { token, page_index: index, src });
        self.effects.push(Effect::ScheduleTimer {
            timer: Timer::LoadTimeout(token),
            after: self.config.load_timeout,
        });
    }

    pub fn next(&mut self) {
        if let Some(index) = self.state.index.next_index() {
            self.show(index);
        }
    }

    pub fn prev(&mut self) {
        if let Some(index) = self.state.index.previous_index() {
            self.show(index);
        }
    }

    pub fn set_page_input(&mut self, input: PageInput, value: &str) {
        match input {
            PageInput::Jump => self.surface.jump_value = value.to_owned(),
            PageInput::Mini => self.surface.mini_value = value.to_owned(),
        }
    }

    pub fn focus_page_input(&mut self, input: Option<PageInput>) {
        self.surface.focus = input;
    }

    /// Jumps to the page typed in the jump input. Invalid text is ignored and
    /// the input keeps focus.
    pub fn go(&mut self) {
        if let Some(index) = page_input_to_index(&self.surface.jump_value, self.page_count()) {
            self.show(index);
        }
    }

    /// Submits the collapsed-sidebar input. It gives up focus either way.
    pub fn go_mini(&mut self) {
        if let Some(index) = page_input_to_index(&self.surface.mini_value, self.page_count()) {
            self.show(index);
        }
        self.surface.focus = None;
    }

    pub fn click_thumbnail(&mut self, index: usize) {
        self.show(index);
    }

    pub fn reset_zoom(&mut self) {
        self.state.transform.reset();
        self.sync_transform();
    }

    pub fn on_image_loaded(&mut self, token: LoadToken, natural_size: Size) {
        self.resolve_load(token, LoadOutcome::Decoded(natural_size));
    }

    pub fn on_image_failed(&mut self, token: LoadToken) {
        self.resolve_load(token, LoadOutcome::Failed);
    }

    pub fn on_timer(&mut self, timer: Timer) {
        match timer {
            Timer::LoadTimeout(token) => self.resolve_load(token, LoadOutcome::TimedOut),
            Timer::ReleaseScrollSuppression(epoch) => {
                let released = self.tracker.as_mut().is_some_and(|tracker| tracker.release(epoch));
                if !released {
                    tracing::trace!(epoch, "stale scroll-settle timer");
                }
            }
        }
    }

    fn resolve_load(&mut self, token: LoadToken, outcome: LoadOutcome) {
        let Some(page_index) = self.loader.resolve(token) else {
            return;
        };

        tracing::debug!(page = page_index, token = token.raw(), ?outcome, "page load resolved");

        let src = self.pages[page_index].src.clone();
        match outcome {
            LoadOutcome::Decoded(size) => self.apply_image(src, Some(size)),
            LoadOutcome::TimedOut => self.apply_image(src, None),
            LoadOutcome::Failed => self.surface.set_image(src),
        }
    }

    fn apply_image(&mut self, src: String, natural_size: Option<Size>) {
        self.surface.set_image(src);

        if self.state.lock_zoom && self.state.transform.is_zoomed() {
            let zoom = self.state.transform.zoom();
            let height = natural_size
                .map(|size| displayed_height(self.state.layout(), self.viewport, size))
                .unwrap_or(0.0);
            let overflow = height * zoom - self.viewport.height;
            let y = if overflow > 0.0 { overflow / 2.0 } else { 0.0 };

            self.state.transform.set_pan(Pan { x: 0.0, y });
            self.sync_transform();
        }

        if self.state.fit_width {
            self.effects.push(Effect::ScrollViewportTo { top: 0.0 });
        }
    }

    /// Scrolls the continuous strip to page `index` and makes it current.
    /// Visibility reports cannot move the index until the scroll settles.
    /// Does nothing in paged mode.
    pub fn scroll_to_page(&mut self, index: usize) {
        if !self.state.index.contains(index) {
            return;
        }

        let Some(tracker) = self.tracker.as_mut() else {
            return;
        };

        self.scroll_epoch += 1;
        let epoch = self.scroll_epoch;
        tracker.suppress(epoch);

        self.state.index.set(index);
        self.sync_page_mirrors();

        self.effects.push(Effect::ScrollStripTo { page_index: index });
        self.effects.push(Effect::ScheduleTimer {
            timer: Timer::ReleaseScrollSuppression(epoch),
            after: self.config.scroll_settle,
        });
    }

    pub fn on_visibility(&mut self, subscription: SubscriptionId, entries: &[VisibilityEntry]) {
        let current = self.state.index.current();
        let Some(tracker) = self.tracker.as_mut() else {
            tracing::trace!(?subscription, "visibility report outside continuous mode");
            return;
        };

        if tracker.subscription() != subscription {
            tracing::trace!(?subscription, "visibility report from stale subscription");
            return;
        }

        if let Some(index) = tracker.observe(entries, current) {
            tracing::debug!(from = current, to = index, "current page follows visibility");
            self.state.index.set(index);
            self.sync_page_mirrors();
        }
    }

    pub(crate) fn sync_page_mirrors(&mut self) {
        let index = self.state.index;
        let number = index.page_number().to_string();

        self.surface.current_page = index.page_number();
        self.surface.jump_value = number.clone();
        self.surface.mini_value = number;
        self.surface.highlighted_thumbnail = index.current();

        self.effects.push(Effect::ScrollThumbnailIntoView { page_index: index.current() });
    }

    pub(crate) fn sync_transform(&mut self) {
        self.surface.zoom = self.state.transform.zoom();
        self.surface.pan = self.state.transform.pan();
        self.surface.cursor = self.cursor();
    }

    pub(crate) fn sync_toggles(&mut self) {
        self.surface.continuous_checked = self.state.mode == ViewMode::Continuous;
        self.surface.fit_width_checked = self.state.fit_width;
        self.surface.lock_zoom_checked = self.state.lock_zoom;
        self.surface.sidebar_collapsed = self.state.sidebar_collapsed;
        self.surface.cursor = self.cursor();
    }

    fn cursor(&self) -> Cursor {
        let grab = if self.input.is_dragging() { Cursor::Grabbing } else { Cursor::Grab };
        let fit_width_paged = self.state.mode == ViewMode::Paged && self.state.fit_width;

        if self.state.transform.is_zoomed() || fit_width_paged {
            grab
        } else if self.state.mode == ViewMode::Paged {
            Cursor::Pointer
        } else {
            Cursor::Default
        }
    }
}
