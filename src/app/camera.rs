use eframe::egui::{Pos2, Vec2};

use super::graph::SimGraph;

pub(in crate::app) const MIN_ZOOM: f32 = 0.1;
pub(in crate::app) const MAX_ZOOM: f32 = 5.0;

const FIT_MAX_ZOOM: f32 = 1.6;
const FIT_PADDING: f32 = 48.0;

/// Affine world → screen mapping: `screen = pan + world * zoom`, uniform in
/// both axes. Screen coordinates are local to the graph canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ViewTransform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    /// Identity zoom with the world origin on the surface center.
    pub fn centered(surface: Vec2) -> Self {
        Self {
            pan: surface * 0.5,
            zoom: 1.0,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (self.pan + world * self.zoom).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.pan) / self.zoom
    }

    /// Rescales around `pointer` so the world point under it stays put.
    pub fn zoom_toward(&mut self, pointer: Pos2, factor: f32) {
        let next = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let scale = next / self.zoom;
        self.pan = pointer.to_vec2() - (pointer.to_vec2() - self.pan) * scale;
        self.zoom = next;
    }

    /// Recomputes pan and zoom so every node circle fits the surface,
    /// aspect-preserving, never zooming in past `FIT_MAX_ZOOM`.
    pub fn fit_to_view(&mut self, graph: &SimGraph, surface: Vec2) {
        let Some(first) = graph.nodes.first() else {
            *self = Self::centered(surface);
            return;
        };

        let mut min = first.pos - Vec2::splat(first.radius);
        let mut max = first.pos + Vec2::splat(first.radius);
        for node in &graph.nodes[1..] {
            min = min.min(node.pos - Vec2::splat(node.radius));
            max = max.max(node.pos + Vec2::splat(node.radius));
        }

        let extent = (max - min).max(Vec2::splat(1.0));
        let avail = (surface - Vec2::splat(FIT_PADDING * 2.0)).max(Vec2::splat(1.0));
        self.zoom = (avail.x / extent.x)
            .min(avail.y / extent.y)
            .clamp(MIN_ZOOM, FIT_MAX_ZOOM);
        self.pan = surface * 0.5 - (min + max) * 0.5 * self.zoom;
    }
}
