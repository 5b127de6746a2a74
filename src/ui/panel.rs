//! Autopilot tuning panel: one slider for the gain, one for the setpoint

use glam::Vec2;

use super::slider::{PointerState, Slider};
use crate::render::DrawList;
use crate::sim::{Aabb, ControllerState};
use crate::tuning::Tuning;

const SLIDER_SIZE: Vec2 = Vec2::new(150.0, 10.0);
const KC_X: f32 = 20.0;
const SP_X: f32 = 200.0;
/// Bars sit this far above the bottom of the world
const BOTTOM_OFFSET: f32 = 20.0;

#[derive(Debug, Clone)]
pub struct ControllerPanel {
    pub kc: Slider,
    pub sp: Slider,
}

impl ControllerPanel {
    pub fn new(tuning: &Tuning) -> Self {
        let y = tuning.world_height - BOTTOM_OFFSET;
        Self {
            kc: Slider::new(
                Aabb::new(Vec2::new(KC_X, y), SLIDER_SIZE),
                tuning.kc_min,
                tuning.kc_max,
                "Kc",
            ),
            sp: Slider::new(
                Aabb::new(Vec2::new(SP_X, y), SLIDER_SIZE),
                tuning.sp_min,
                tuning.sp_max,
                "SP (%)",
            ),
        }
    }

    /// Feed this frame's pointer into both sliders
    pub fn apply(&self, pointer: &PointerState, controller: &mut ControllerState, tuning: &Tuning) {
        let mut kc = controller.kc;
        if self.kc.drag(pointer, &mut kc) {
            controller.set_kc(kc, tuning);
        }
        let mut sp = controller.sp;
        if self.sp.drag(pointer, &mut sp) {
            controller.set_sp(sp, tuning);
        }
    }

    pub fn draw(&self, controller: &ControllerState, list: &mut DrawList) {
        self.kc.draw(controller.kc, list);
        self.sp.draw(controller.sp, list);
    }
}
