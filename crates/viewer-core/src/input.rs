//! Input handling for zoom, pan, and click navigation.
//!
//! Pointer, wheel, and keyboard events are resolved into transform changes
//! and navigation actions:
//! - Wheel with the zoom modifier zooms around the cursor
//! - Wheel without it pans, or is left to native scrolling
//! - Drag pans (or scrolls), a click without drag turns the page
//!
//! Every handler reports a [`Disposition`] telling the host whether to
//! suppress the native default.

use crate::config::ViewerConfig;
use crate::effects::{Disposition, Effect};
use crate::geometry::{Point, Size};
use crate::transform::ZoomDirection;
use crate::viewer::{ViewState, Viewer};
use doc_model::ViewMode;

/// Modifier keys held during a wheel event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub zoom: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Pointer position relative to the viewport's top-left corner.
    pub position: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    pub modifiers: Modifiers,
}

impl WheelEvent {
    pub fn new(position: Point, delta_x: f64, delta_y: f64, modifiers: Modifiers) -> Self {
        Self { position, delta_x, delta_y, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Keys are identified physically, so letter keys match regardless of case
/// or keyboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    Character(char),
    Other,
}

impl Key {
    /// Parses a key name as hosts commonly report it (`ArrowRight`, `Space`,
    /// `KeyD`, or a single character).
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "Space" | " " => Self::Space,
            "Escape" | "Esc" => Self::Escape,
            _ => {
                let letter = name.strip_prefix("Key").unwrap_or(name);
                let mut chars = letter.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum InputAction {
    Next,
    Prev,
    ResetZoom,
    RequestFullscreen,
    ScrollViewport(f64),
    TransformChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Routed {
    pub(crate) disposition: Disposition,
    pub(crate) actions: Vec<InputAction>,
}

impl Routed {
    fn consumed(actions: Vec<InputAction>) -> Self {
        Self { disposition: Disposition::Consumed, actions }
    }

    fn pass_through() -> Self {
        Self { disposition: Disposition::PassThrough, actions: Vec::new() }
    }
}

/// Drag tracking for the viewer surface.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    dragging: bool,
    did_drag: bool,
    last: Point,
}

impl InputRouter {
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub(crate) fn wheel(
        &mut self,
        state: &mut ViewState,
        config: &ViewerConfig,
        viewport: Size,
        event: WheelEvent,
    ) -> Routed {
        if event.modifiers.zoom {
            let center = viewport.center();
            let cursor = (event.position.x - center.x, event.position.y - center.y);
            let direction = ZoomDirection::from_wheel_delta(event.delta_y);
            state.transform.zoom_at(config, state.mode, cursor, direction);
            return Routed::consumed(vec![InputAction::TransformChanged]);
        }

        let zoomed = state.transform.is_zoomed();
        if !zoomed && state.scrolls_natively() {
            return Routed::pass_through();
        }
        if !zoomed {
            return Routed::consumed(Vec::new());
        }

        let (dx, dy) = if event.modifiers.shift {
            (event.delta_y, 0.0)
        } else {
            (event.delta_x, event.delta_y)
        };

        let mut actions = Vec::new();
        match state.mode {
            ViewMode::Paged => {
                if state.transform.pan_by(ViewMode::Paged, -dx, -dy) {
                    actions.push(InputAction::TransformChanged);
                }
            }
            ViewMode::Continuous => {
                if state.transform.pan_by(ViewMode::Continuous, -dx, 0.0) {
                    actions.push(InputAction::TransformChanged);
                }
                if dy != 0.0 {
                    actions.push(InputAction::ScrollViewport(dy));
                }
            }
        }

        Routed::consumed(actions)
    }

    /// Only the primary button starts a drag candidate.
    pub(crate) fn press(&mut self, button: PointerButton, position: Point) -> Routed {
        if button != PointerButton::Primary {
            return Routed::pass_through();
        }

        self.dragging = true;
        self.did_drag = false;
        self.last = position;
        Routed::consumed(vec![InputAction::TransformChanged])
    }

    pub(crate) fn move_to(
        &mut self,
        state: &mut ViewState,
        config: &ViewerConfig,
        position: Point,
    ) -> Routed {
        if !self.dragging {
            return Routed::pass_through();
        }

        let dx = position.x - self.last.x;
        let dy = position.y - self.last.y;
        self.last = position;

        if dx.abs() > config.drag_threshold_px || dy.abs() > config.drag_threshold_px {
            self.did_drag = true;
        }

        let mut actions = Vec::new();
        if state.transform.is_zoomed() {
            match state.mode {
                ViewMode::Paged => {
                    if state.transform.pan_by(ViewMode::Paged, dx, dy) {
                        actions.push(InputAction::TransformChanged);
                    }
                }
                ViewMode::Continuous => {
                    if state.transform.pan_by(ViewMode::Continuous, dx, 0.0) {
                        actions.push(InputAction::TransformChanged);
                    }
                    actions.push(InputAction::ScrollViewport(-dy));
                }
            }
        } else if state.scrolls_natively() {
            actions.push(InputAction::ScrollViewport(-dy));
        }

        Routed::consumed(actions)
    }

    pub(crate) fn release(&mut self, state: &ViewState, viewport: Size, position: Point) -> Routed {
        if !self.dragging {
            return Routed::pass_through();
        }

        self.dragging = false;
        let mut actions = vec![InputAction::TransformChanged];

        if !self.did_drag && state.mode == ViewMode::Paged {
            if position.x > viewport.width / 2.0 {
                actions.push(InputAction::Next);
            } else {
                actions.push(InputAction::Prev);
            }
        }

        Routed::consumed(actions)
    }

    pub(crate) fn key(&self, key: Key, input_focused: bool) -> Routed {
        if input_focused {
            return Routed::pass_through();
        }

        let action = match key {
            Key::ArrowRight | Key::Space => InputAction::Next,
            Key::ArrowLeft => InputAction::Prev,
            Key::Escape => InputAction::ResetZoom,
            Key::Character(c) => match c.to_ascii_lowercase() {
                'd' => InputAction::Next,
                'a' => InputAction::Prev,
                'f' => InputAction::RequestFullscreen,
                _ => return Routed::pass_through(),
            },
            Key::Other => return Routed::pass_through(),
        };

        Routed::consumed(vec![action])
    }
}

impl Viewer {
    pub fn on_wheel(&mut self, event: WheelEvent) -> Disposition {
        let routed = self.input.wheel(&mut self.state, &self.config, self.viewport, event);
        self.apply_input(routed)
    }

    pub fn on_pointer_down(&mut self, button: PointerButton, position: Point) -> Disposition {
        let routed = self.input.press(button, position);
        self.apply_input(routed)
    }

    pub fn on_pointer_move(&mut self, position: Point) -> Disposition {
        let routed = self.input.move_to(&mut self.state, &self.config, position);
        self.apply_input(routed)
    }

    pub fn on_pointer_up(&mut self, position: Point) -> Disposition {
        let routed = self.input.release(&self.state, self.viewport, position);
        self.apply_input(routed)
    }

    pub fn on_key(&mut self, key: Key) -> Disposition {
        let routed = self.input.key(key, self.surface.focus.is_some());
        self.apply_input(routed)
    }

    /// The viewer surface never shows the native context menu.
    pub fn on_context_menu(&mut self) -> Disposition {
        Disposition::Consumed
    }

    fn apply_input(&mut self, routed: Routed) -> Disposition {
        for action in routed.actions {
            match action {
                InputAction::Next => self.next(),
                InputAction::Prev => self.prev(),
                InputAction::ResetZoom => self.reset_zoom(),
                InputAction::RequestFullscreen => self.effects.push(Effect::RequestFullscreen),
                InputAction::ScrollViewport(dy) => {
                    self.effects.push(Effect::ScrollViewportBy { dy })
                }
                InputAction::TransformChanged => self.sync_transform(),
            }
        }

        routed.disposition
    }
}
