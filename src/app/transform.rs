use eframe::egui::{Pos2, Vec2, pos2, vec2};

pub(in crate::app) const MIN_SCALE: f32 = 0.1;
pub(in crate::app) const MAX_SCALE: f32 = 5.0;

/// Affine map between world space and surface space:
/// `surface = world * scale + pan`.
///
/// Surface coordinates are relative to the top-left corner of the drawing
/// area, not to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pan: Vec2,
    scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    #[cfg(test)]
    pub(in crate::app) fn new(pan: Vec2, scale: f32) -> Self {
        Self {
            pan,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    pub(in crate::app) fn pan(&self) -> Vec2 {
        self.pan
    }

    pub(in crate::app) fn scale(&self) -> f32 {
        self.scale
    }

    pub(in crate::app) fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.pan) / self.scale
    }

    pub(in crate::app) fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (world * self.scale + self.pan).to_pos2()
    }

    /// Rescales around `cursor` so the world point under it stays put.
    pub(in crate::app) fn zoom_at(&mut self, cursor: Pos2, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let world_before = self.screen_to_world(cursor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.pan = cursor.to_vec2() - world_before * self.scale;
    }

    pub(in crate::app) fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub(in crate::app) fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Centers the bounding box of `positions` on the surface at scale 1.
    pub(in crate::app) fn fit_to_bounds(
        &mut self,
        positions: impl IntoIterator<Item = Vec2>,
        surface_size: Vec2,
    ) {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for position in positions {
            min = min.min(position);
            max = max.max(position);
        }

        let bounds_center = if min.x <= max.x && min.y <= max.y {
            (min + max) * 0.5
        } else {
            Vec2::ZERO
        };

        self.scale = 1.0;
        self.pan = surface_size * 0.5 - bounds_center;
    }

    /// Keeps the current scale and moves `world` to the surface center.
    pub(in crate::app) fn center_on(&mut self, world: Vec2, surface_size: Vec2) {
        self.pan = surface_size * 0.5 - world * self.scale;
    }

    pub(in crate::app) fn surface_center_world(&self, surface_size: Vec2) -> Vec2 {
        self.screen_to_world(pos2(surface_size.x * 0.5, surface_size.y * 0.5))
    }
}
