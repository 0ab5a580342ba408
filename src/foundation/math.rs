use glam::{DQuat, DVec3, EulerRot};

pub(crate) fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Rotation from yaw (around +Z), pitch (around +Y) and roll (around +X), in degrees.
pub fn rotation_from_euler_deg(yaw: f64, pitch: f64, roll: f64) -> DQuat {
    DQuat::from_euler(
        EulerRot::ZYX,
        yaw.to_radians(),
        pitch.to_radians(),
        roll.to_radians(),
    )
}

/// Interpolate a position/rotation pair. Rotations take the shortest arc.
pub(crate) fn lerp_transform(
    from: (DVec3, DQuat),
    to: (DVec3, DQuat),
    t: f64,
) -> (DVec3, DQuat) {
    (from.0.lerp(to.0, t), from.1.slerp(to.1, t))
}

/// Discrete values switch over at the halfway point of a blend.
pub(crate) fn flips_at(t: f64) -> bool {
    t >= 0.5
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
