//! Horizontal value slider

use glam::Vec2;

use crate::render::{DrawList, colors};
use crate::sim::Aabb;

pub const KNOB_RADIUS: f32 = 8.0;
/// Label sits this far above the bar
pub const LABEL_OFFSET: f32 = 30.0;

/// Mouse state sampled once per frame, in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub pos: Vec2,
    pub left_down: bool,
}

/// A labelled bar mapping horizontal position to `[min, max]`
#[derive(Debug, Clone)]
pub struct Slider {
    pub bar: Aabb,
    pub min: f32,
    pub max: f32,
    pub label: &'static str,
}

impl Slider {
    pub fn new(bar: Aabb, min: f32, max: f32, label: &'static str) -> Self {
        debug_assert!(min < max);
        Self {
            bar,
            min,
            max,
            label,
        }
    }

    /// Knob x for a value
    pub fn knob_x(&self, value: f32) -> f32 {
        self.bar.min.x + (value - self.min) / (self.max - self.min) * self.bar.width()
    }

    /// Value under a pointer x, clamped to the bar
    pub fn value_at(&self, x: f32) -> f32 {
        let w = self.bar.width();
        let rel = (x - self.bar.min.x).clamp(0.0, w);
        (self.min + rel / w * (self.max - self.min)).clamp(self.min, self.max)
    }

    /// Apply a drag: while the left button is down over the bar, move the
    /// value to the pointer. Returns true if the value was written.
    pub fn drag(&self, pointer: &PointerState, value: &mut f32) -> bool {
        if !pointer.left_down || !self.bar.contains_point(pointer.pos) {
            return false;
        }
        *value = self.value_at(pointer.pos.x);
        true
    }

    pub fn label_text(&self, value: f32) -> String {
        format!("{}: {:.2}", self.label, value)
    }

    pub fn draw(&self, value: f32, list: &mut DrawList) {
        list.rect(self.bar, colors::SLIDER_BAR);
        let knob = Vec2::new(self.knob_x(value), self.bar.center().y);
        list.circle(knob, KNOB_RADIUS, colors::KNOB);
        list.text(
            Vec2::new(self.bar.min.x, self.bar.min.y - LABEL_OFFSET),
            self.label_text(value),
            colors::TEXT_DARK,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn kc_slider() -> Slider {
        Slider::new(
            Aabb::new(Vec2::new(20.0, 580.0), Vec2::new(150.0, 10.0)),
            -0.5,
            1.0,
            "Kc",
        )
    }

    fn press(x: f32, y: f32) -> PointerState {
        PointerState {
            pos: Vec2::new(x, y),
            left_down: true,
        }
    }

    #[test]
    fn test_knob_mapping() {
        let s = kc_slider();
        assert_eq!(s.knob_x(-0.5), 20.0);
        assert_eq!(s.knob_x(1.0), 170.0);
        assert!((s.knob_x(0.5) - 120.0).abs() < 1e-4);
    }

    #[test]
    fn test_drag_sets_value() {
        let s = kc_slider();
        let mut kc = 0.5;
        assert!(s.drag(&press(95.0, 585.0), &mut kc));
        assert!((kc - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_drag_requires_button_and_bar() {
        let s = kc_slider();
        let mut kc = 0.5;

        let hover = PointerState {
            pos: Vec2::new(95.0, 585.0),
            left_down: false,
        };
        assert!(!s.drag(&hover, &mut kc));
        assert!(!s.drag(&press(95.0, 500.0), &mut kc));
        assert!(!s.drag(&press(170.0, 585.0), &mut kc));
        assert_eq!(kc, 0.5);
    }

    #[test]
    fn test_label() {
        assert_eq!(kc_slider().label_text(0.5), "Kc: 0.50");
    }

    #[test]
    fn test_draw_emits_bar_knob_label() {
        let mut list = DrawList::default();
        kc_slider().draw(0.5, &mut list);
        assert_eq!(list.iter().count(), 3);
        assert!(list.texts().any(|t| t == "Kc: 0.50"));
    }

    proptest! {
        #[test]
        fn value_always_clamped(x in -1000.0f32..1000.0) {
            let s = kc_slider();
            let v = s.value_at(x);
            prop_assert!(v >= s.min && v <= s.max);
        }
    }
}
