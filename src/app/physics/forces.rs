use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

/// Inverse-square repulsion for one unordered pair, returned as the push on
/// the `a` side (the `b` side gets the negation). Coincident nodes are
/// separated along a direction derived from their indices and the distance
/// is clamped to 1 so the force stays finite.
pub(super) fn pair_repulsion(
    a: Vec2,
    b: Vec2,
    index_a: usize,
    index_b: usize,
    strength: f32,
) -> Vec2 {
    let delta = a - b;
    let mut distance = delta.length();
    let direction = if distance < 1.0 {
        distance = 1.0;
        let angle = ((index_a as f32) * 0.618_034 + (index_b as f32) * 0.414_214) * TAU;
        vec2(angle.cos(), angle.sin())
    } else {
        delta / distance
    };

    direction * (strength / (distance * distance))
}

/// Hooke spring toward the rest length, returned as the force pulling the
/// `a` endpoint toward `b` when stretched (callers subtract it on the `a`
/// side and add it on the `b` side).
pub(super) fn spring_force(a: Vec2, b: Vec2, rest_length: f32, strength: f32) -> Vec2 {
    let delta = a - b;
    let distance = delta.length().max(1.0);
    let direction = delta / distance;

    direction * ((distance - rest_length) * strength)
}
