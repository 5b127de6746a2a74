//! Logical draw lists
//!
//! The game never touches pixels. Each frame it produces a [`DrawList`] of
//! primitives in world coordinates and the frontend rasterises them.

use glam::Vec2;

use crate::sim::{Aabb, ControlMode, GameState};
use crate::tuning::Tuning;
use crate::ui::ControllerPanel;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Colors for game elements
pub mod colors {
    use super::Rgb;

    pub const SKY: Rgb = Rgb(135, 206, 250);
    pub const PIPE: Rgb = Rgb(0, 255, 0);
    pub const SETPOINT: Rgb = Rgb(255, 0, 0);
    pub const SLIDER_BAR: Rgb = Rgb(180, 180, 180);
    pub const KNOB: Rgb = Rgb(255, 0, 0);
    pub const TEXT_DARK: Rgb = Rgb(0, 0, 0);
    pub const SCREEN_BG: Rgb = Rgb(0, 0, 0);
    pub const TEXT_LIGHT: Rgb = Rgb(255, 255, 255);
    pub const TEXT_HINT: Rgb = Rgb(200, 200, 200);
    pub const GAME_OVER: Rgb = Rgb(255, 0, 0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSize {
    Normal,
    Large,
}

/// Images the frontend knows how to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sprite {
    Bird,
}

/// A single draw primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Clear the whole world area
    Fill(Rgb),
    Rect { rect: Aabb, color: Rgb },
    /// Image scaled into `rect`
    Sprite { sprite: Sprite, rect: Aabb },
    Line { from: Vec2, to: Vec2, color: Rgb },
    Circle { center: Vec2, radius: f32, color: Rgb },
    /// Text with its top-left corner at `pos`
    Text {
        pos: Vec2,
        text: String,
        size: TextSize,
        color: Rgb,
    },
}

/// Ordered primitives for one frame, back to front
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn fill(&mut self, color: Rgb) {
        self.push(DrawCmd::Fill(color));
    }

    pub fn rect(&mut self, rect: Aabb, color: Rgb) {
        self.push(DrawCmd::Rect { rect, color });
    }

    pub fn sprite(&mut self, sprite: Sprite, rect: Aabb) {
        self.push(DrawCmd::Sprite { sprite, rect });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, color: Rgb) {
        self.push(DrawCmd::Line { from, to, color });
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Rgb) {
        self.push(DrawCmd::Circle {
            center,
            radius,
            color,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, color: Rgb) {
        self.push(DrawCmd::Text {
            pos,
            text: text.into(),
            size: TextSize::Normal,
            color,
        });
    }

    pub fn text_large(&mut self, pos: Vec2, text: impl Into<String>, color: Rgb) {
        self.push(DrawCmd::Text {
            pos,
            text: text.into(),
            size: TextSize::Large,
            color,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawCmd> {
        self.cmds.iter()
    }

    /// All text strings, in draw order
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|cmd| match cmd {
            DrawCmd::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Dash length and period of the setpoint marker
const DASH_LEN: f32 = 10.0;
const DASH_PERIOD: usize = 20;

/// Mode selection screen
pub fn menu_scene() -> DrawList {
    let mut list = DrawList::default();
    list.fill(colors::SCREEN_BG);
    list.text(Vec2::new(120.0, 150.0), "Flappy Bird", colors::TEXT_LIGHT);
    list.text(Vec2::new(10.0, 250.0), "Press [m] for Manual Mode", colors::TEXT_LIGHT);
    list.text(
        Vec2::new(10.0, 300.0),
        "Press [p] for P-Controller Mode",
        colors::TEXT_LIGHT,
    );
    list
}

/// Live run: sky, setpoint marker, bird, pipes, score and (autopilot only)
/// the tuning sliders
pub fn run_scene(state: &GameState, panel: &ControllerPanel, tuning: &Tuning) -> DrawList {
    let mut list = DrawList::default();
    list.fill(colors::SKY);

    if let Some(decision) = state.last_decision {
        setpoint_marker(&mut list, state.bird.x, decision.setpoint, tuning);
    }

    list.sprite(Sprite::Bird, state.bird.aabb());

    for pipe in state.field.iter() {
        list.rect(pipe.top_rect(tuning), colors::PIPE);
        list.rect(pipe.bottom_rect(tuning), colors::PIPE);
    }

    list.text(
        Vec2::new(10.0, 10.0),
        format!("Score: {}", state.score),
        colors::TEXT_DARK,
    );

    if state.mode == ControlMode::Autopilot {
        panel.draw(&state.controller, &mut list);
    }
    list
}

/// Final score with restart / menu / quit hints
pub fn game_over_scene(score: u32) -> DrawList {
    let mut list = DrawList::default();
    list.fill(colors::SCREEN_BG);
    list.text_large(Vec2::new(100.0, 180.0), "Game Over", colors::GAME_OVER);
    list.text(
        Vec2::new(120.0, 260.0),
        format!("Final Score: {score}"),
        colors::TEXT_LIGHT,
    );
    list.text(Vec2::new(60.0, 320.0), "Press [r] to Restart", colors::TEXT_HINT);
    list.text(Vec2::new(60.0, 380.0), "Press [m] for Main Menu", colors::TEXT_HINT);
    list.text(Vec2::new(60.0, 440.0), "Press [q] to Quit", colors::TEXT_HINT);
    list
}

/// Red dashes from the bird to the right edge at the autopilot's aim height
fn setpoint_marker(list: &mut DrawList, from_x: f32, setpoint: f32, tuning: &Tuning) {
    let start = from_x as i32;
    let end = tuning.world_width as i32;
    for x in (start..end).step_by(DASH_PERIOD) {
        let x = x as f32;
        list.line(
            Vec2::new(x, setpoint),
            Vec2::new(x + DASH_LEN, setpoint),
            colors::SETPOINT,
        );
    }
}
