use glam::{DQuat, DVec3};

use crate::foundation::math::{flips_at, lerp_transform};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigJoint {
    pub name: String,
    pub position: DVec3,
    pub rotation: DQuat,
}

/// Named joints a rig exposes alongside its pose (pivots, boom ends, look-at targets).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RigJoints {
    joints: Vec<RigJoint>,
}

impl RigJoints {
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn get(&self, name: &str) -> Option<&RigJoint> {
        self.joints.iter().find(|j| j.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RigJoint> {
        self.joints.iter()
    }

    /// Add or replace the joint with the same name.
    pub fn set(&mut self, joint: RigJoint) {
        match self.joints.iter_mut().find(|j| j.name == joint.name) {
            Some(existing) => *existing = joint,
            None => self.joints.push(joint),
        }
    }

    pub fn reset(&mut self) {
        self.joints.clear();
    }

    pub fn override_all(&mut self, other: &RigJoints) {
        self.joints.clone_from(&other.joints);
    }

    /// Joints present on both sides are interpolated; incoming-only joints appear halfway in.
    pub fn lerp_all(&mut self, other: &RigJoints, t: f64) {
        if t <= 0.0 {
            return;
        }
        let t = t.min(1.0);
        for incoming in &other.joints {
            match self.joints.iter_mut().find(|j| j.name == incoming.name) {
                Some(joint) => {
                    let (position, rotation) = lerp_transform(
                        (joint.position, joint.rotation),
                        (incoming.position, incoming.rotation),
                        t,
                    );
                    joint.position = position;
                    joint.rotation = rotation;
                }
                None if flips_at(t) => self.joints.push(incoming.clone()),
                None => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/result/joints.rs"]
mod tests;
