use eframe::egui::{Vec2, vec2};

/// Separations below this are treated as this for the inverse-square law.
pub(super) const MIN_DISTANCE: f32 = 1.0;
/// Distance from the center past which the centering pull grows linearly.
const CENTER_FALLOFF: f32 = 200.0;

/// Pull toward `center`, proportional to the offset and stiffening once the
/// node is further than `CENTER_FALLOFF` away.
pub(super) fn centering_force(position: Vec2, center: Vec2, strength: f32) -> Vec2 {
    let offset = center - position;
    let boost = (offset.length() / CENTER_FALLOFF).max(1.0);
    offset * strength * boost
}

/// Direction used to separate two nodes sitting on exactly the same spot.
/// Antisymmetric in `(index, other)` so the pair is pushed apart.
fn coincident_direction(index: usize, other: usize) -> Vec2 {
    let (low, high) = if index < other {
        (index, other)
    } else {
        (other, index)
    };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * std::f32::consts::TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if index < other { direction } else { -direction }
}

/// Inverse-square push on the node at `point` away from the node at `other`.
pub(super) fn repulsion_between(
    point: Vec2,
    other: Vec2,
    strength: f32,
    index: usize,
    other_index: usize,
) -> Vec2 {
    let delta = point - other;
    let distance = delta.length();
    let direction = if distance > 0.0001 {
        delta / distance
    } else {
        coincident_direction(index, other_index)
    };
    let distance = distance.max(MIN_DISTANCE);
    direction * (strength / (distance * distance))
}

/// Hookean spring force on `from`, pointing toward `to` when stretched past
/// `rest_length` and away from it when compressed.
pub(super) fn spring_force(from: Vec2, to: Vec2, rest_length: f32, stiffness: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= 0.0001 {
        return Vec2::ZERO;
    }
    delta / distance * ((distance - rest_length) * stiffness)
}
