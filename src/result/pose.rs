use bitflags::bitflags;
use glam::{DQuat, DVec3};

use crate::foundation::math::lerp_f64;

bitflags! {
    /// Bit-set of pose fields written since the last [`CameraPose::clear_changed`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct PoseFields: u8 {
        const POSITION = 1 << 0;
        const ROTATION = 1 << 1;
        const FIELD_OF_VIEW = 1 << 2;
        const ASPECT_RATIO = 1 << 3;
        const NEAR_CLIP = 1 << 4;
        const FAR_CLIP = 1 << 5;
    }
}

/// Camera transform and projection parameters, each with its own changed flag.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPose {
    position: DVec3,
    rotation: DQuat,
    field_of_view: f64,
    aspect_ratio: f64,
    near_clip_plane: f64,
    far_clip_plane: f64,
    changed: PoseFields,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            field_of_view: 90.0,
            aspect_ratio: 16.0 / 9.0,
            near_clip_plane: 10.0,
            far_clip_plane: 0.0, // infinite
            changed: PoseFields::empty(),
        }
    }
}

impl CameraPose {
    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn rotation(&self) -> DQuat {
        self.rotation
    }

    /// Horizontal field of view in degrees.
    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn near_clip_plane(&self) -> f64 {
        self.near_clip_plane
    }

    pub fn far_clip_plane(&self) -> f64 {
        self.far_clip_plane
    }

    pub fn changed(&self) -> PoseFields {
        self.changed
    }

    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
        self.changed.insert(PoseFields::POSITION);
    }

    pub fn set_rotation(&mut self, rotation: DQuat) {
        self.rotation = rotation.normalize();
        self.changed.insert(PoseFields::ROTATION);
    }

    pub fn set_field_of_view(&mut self, degrees: f64) {
        self.field_of_view = degrees;
        self.changed.insert(PoseFields::FIELD_OF_VIEW);
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f64) {
        self.aspect_ratio = aspect_ratio;
        self.changed.insert(PoseFields::ASPECT_RATIO);
    }

    pub fn set_near_clip_plane(&mut self, near: f64) {
        self.near_clip_plane = near;
        self.changed.insert(PoseFields::NEAR_CLIP);
    }

    pub fn set_far_clip_plane(&mut self, far: f64) {
        self.far_clip_plane = far;
        self.changed.insert(PoseFields::FAR_CLIP);
    }

    pub fn clear_changed(&mut self) {
        self.changed = PoseFields::empty();
    }

    /// Copy only the fields `other` flags as changed.
    pub fn override_changed(&mut self, other: &CameraPose) {
        let c = other.changed;
        if c.contains(PoseFields::POSITION) {
            self.set_position(other.position);
        }
        if c.contains(PoseFields::ROTATION) {
            self.set_rotation(other.rotation);
        }
        if c.contains(PoseFields::FIELD_OF_VIEW) {
            self.set_field_of_view(other.field_of_view);
        }
        if c.contains(PoseFields::ASPECT_RATIO) {
            self.set_aspect_ratio(other.aspect_ratio);
        }
        if c.contains(PoseFields::NEAR_CLIP) {
            self.set_near_clip_plane(other.near_clip_plane);
        }
        if c.contains(PoseFields::FAR_CLIP) {
            self.set_far_clip_plane(other.far_clip_plane);
        }
    }

    /// Interpolate every field towards `to`. Changed flags are merged.
    pub fn lerp(&mut self, to: &CameraPose, t: f64) {
        if t <= 0.0 {
            return;
        }
        let t = t.min(1.0);
        self.position = self.position.lerp(to.position, t);
        self.rotation = self.rotation.slerp(to.rotation, t).normalize();
        self.field_of_view = lerp_f64(self.field_of_view, to.field_of_view, t);
        self.aspect_ratio = lerp_f64(self.aspect_ratio, to.aspect_ratio, t);
        self.near_clip_plane = lerp_f64(self.near_clip_plane, to.near_clip_plane, t);
        self.far_clip_plane = lerp_f64(self.far_clip_plane, to.far_clip_plane, t);
        self.changed.insert(to.changed);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/result/pose.rs"]
mod tests;
