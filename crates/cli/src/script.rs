//! Replay scripts: one viewer interaction per line.

use anyhow::{bail, Context, Result};
use std::str::FromStr;
use std::time::Duration;
use storage::KeyValueStore;
use viewer_core::{Key, Modifiers, PageInput, Point, PointerButton, WheelEvent};

use crate::host::SimulatedHost;

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Next,
    Prev,
    Jump(String),
    MiniJump(String),
    /// 1-based page number.
    Thumb(usize),
    Continuous(bool),
    FitWidth(bool),
    LockZoom(bool),
    Sidebar,
    Wheel { x: f64, y: f64, delta_y: f64, modifiers: Modifiers },
    Press(Point),
    Move(Point),
    Release(Point),
    Click(Point),
    Key(String),
    Scroll(f64),
    Wait(Duration),
    ResizeList { start_height: f64, start_y: f64, y: f64 },
}

impl FromStr for ScriptCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("next", []) => Self::Next,
            ("prev", []) => Self::Prev,
            ("jump", [value]) => Self::Jump((*value).to_owned()),
            ("jump", []) => Self::Jump(String::new()),
            ("mini-jump", [value]) => Self::MiniJump((*value).to_owned()),
            ("thumb", [page]) => {
                let page: usize = page.parse().with_context(|| format!("invalid page `{page}`"))?;
                if page == 0 {
                    bail!("thumb takes a 1-based page number");
                }
                Self::Thumb(page)
            }
            ("continuous", [flag]) => Self::Continuous(parse_switch(flag)?),
            ("fit-width", [flag]) => Self::FitWidth(parse_switch(flag)?),
            ("lock-zoom", [flag]) => Self::LockZoom(parse_switch(flag)?),
            ("sidebar", []) => Self::Sidebar,
            ("wheel", [x, y, delta_y, flags @ ..]) => {
                let mut modifiers = Modifiers::default();
                for flag in flags {
                    match *flag {
                        "ctrl" | "meta" => modifiers.zoom = true,
                        "shift" => modifiers.shift = true,
                        other => bail!("unknown wheel modifier `{other}`"),
                    }
                }
                Self::Wheel { x: number(x)?, y: number(y)?, delta_y: number(delta_y)?, modifiers }
            }
            ("press", [x, y]) => Self::Press(point(x, y)?),
            ("move", [x, y]) => Self::Move(point(x, y)?),
            ("release", [x, y]) => Self::Release(point(x, y)?),
            ("click", [x, y]) => Self::Click(point(x, y)?),
            ("key", [key]) => Self::Key((*key).to_owned()),
            ("scroll", [offset]) => Self::Scroll(number(offset)?),
            ("wait", [ms]) => {
                let ms: u64 = ms.parse().with_context(|| format!("invalid duration `{ms}`"))?;
                Self::Wait(Duration::from_millis(ms))
            }
            ("resize-list", [start_height, start_y, y]) => Self::ResizeList {
                start_height: number(start_height)?,
                start_y: number(start_y)?,
                y: number(y)?,
            },
            _ => bail!("unrecognized command `{line}`"),
        };

        Ok(command)
    }
}

fn parse_switch(value: &str) -> Result<bool> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("expected `on` or `off`, got `{other}`"),
    }
}

fn number(value: &str) -> Result<f64> {
    value.parse().with_context(|| format!("invalid number `{value}`"))
}

fn point(x: &str, y: &str) -> Result<Point> {
    Ok(Point::new(number(x)?, number(y)?))
}

/// Parses a whole script, skipping blank lines and `#` comments.
pub fn parse_script(source: &str) -> Result<Vec<ScriptCommand>> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line_number, line)| {
            line.parse().with_context(|| format!("script line {line_number}"))
        })
        .collect()
}

pub fn execute<S: KeyValueStore>(host: &mut SimulatedHost<S>, command: &ScriptCommand) {
    tracing::debug!(?command, "replaying");

    match command {
        ScriptCommand::Next => host.with_viewer(|viewer| viewer.next()),
        ScriptCommand::Prev => host.with_viewer(|viewer| viewer.prev()),
        ScriptCommand::Jump(value) => host.with_viewer(|viewer| {
            viewer.focus_page_input(Some(PageInput::Jump));
            viewer.set_page_input(PageInput::Jump, value);
            viewer.go();
            viewer.focus_page_input(None);
        }),
        ScriptCommand::MiniJump(value) => host.with_viewer(|viewer| {
            viewer.focus_page_input(Some(PageInput::Mini));
            viewer.set_page_input(PageInput::Mini, value);
            viewer.go_mini();
        }),
        ScriptCommand::Thumb(page) => host.with_viewer(|viewer| viewer.click_thumbnail(page - 1)),
        ScriptCommand::Continuous(on) => host.with_viewer(|viewer| viewer.set_continuous(*on)),
        ScriptCommand::FitWidth(on) => host.with_viewer(|viewer| viewer.set_fit_width(*on)),
        ScriptCommand::LockZoom(on) => host.with_viewer(|viewer| viewer.set_lock_zoom(*on)),
        ScriptCommand::Sidebar => host.with_viewer(|viewer| viewer.toggle_sidebar()),
        ScriptCommand::Wheel { x, y, delta_y, modifiers } => {
            let event = WheelEvent::new(Point::new(*x, *y), 0.0, *delta_y, *modifiers);
            host.with_viewer(|viewer| {
                viewer.on_wheel(event);
            });
        }
        ScriptCommand::Press(at) => host.with_viewer(|viewer| {
            viewer.on_pointer_down(PointerButton::Primary, *at);
        }),
        ScriptCommand::Move(to) => host.with_viewer(|viewer| {
            viewer.on_pointer_move(*to);
        }),
        ScriptCommand::Release(at) => host.with_viewer(|viewer| {
            viewer.on_pointer_up(*at);
        }),
        ScriptCommand::Click(at) => host.with_viewer(|viewer| {
            viewer.on_pointer_down(PointerButton::Primary, *at);
            viewer.on_pointer_up(*at);
        }),
        ScriptCommand::Key(name) => host.with_viewer(|viewer| {
            viewer.on_key(Key::from_name(name));
        }),
        ScriptCommand::Scroll(offset) => host.scroll_to(*offset),
        ScriptCommand::Wait(duration) => host.advance(*duration),
        ScriptCommand::ResizeList { start_height, start_y, y } => host.with_viewer(|viewer| {
            viewer.begin_page_list_resize(*start_y, *start_height);
            viewer.drag_page_list_resize(*y);
            viewer.end_page_list_resize();
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_skips_comments() {
        let script = "# warm up\nnext\n\n  wheel 10 20 -1 ctrl\ncontinuous on\nwait 150\n";

        let commands = parse_script(script).expect("script should parse");

        assert_eq!(
            commands,
            vec![
                ScriptCommand::Next,
                ScriptCommand::Wheel {
                    x: 10.0,
                    y: 20.0,
                    delta_y: -1.0,
                    modifiers: Modifiers { zoom: true, shift: false },
                },
                ScriptCommand::Continuous(true),
                ScriptCommand::Wait(Duration::from_millis(150)),
            ]
        );
    }

    #[test]
    fn jump_keeps_raw_text() {
        let command = "jump 3abc".parse::<ScriptCommand>().ok();

        assert_eq!(command, Some(ScriptCommand::Jump("3abc".to_owned())));
    }

    #[test]
    fn errors_name_the_line() {
        let error = parse_script("next\nfly away\n").expect_err("script should fail");

        assert!(format!("{error:#}").contains("script line 2"));
    }

    #[test]
    fn rejects_bad_switch_and_zero_thumb() {
        assert!("continuous maybe".parse::<ScriptCommand>().is_err());
        assert!("thumb 0".parse::<ScriptCommand>().is_err());
    }
}
