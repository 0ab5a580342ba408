use crate::result::joints::RigJoints;
use crate::result::pose::CameraPose;
use crate::result::post_process::PostProcessSettings;
use crate::result::variables::{VariableFilter, VariableTable};

/// Output of evaluating one rig (or of a whole stack).
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvaluationResult {
    pub pose: CameraPose,
    pub variables: VariableTable,
    pub joints: RigJoints,
    pub post_process: PostProcessSettings,
    pub is_valid: bool,
    pub is_camera_cut: bool,
}

impl EvaluationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A valid result with a default pose, as a context hands out once it is ready.
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Field-wise copy of `other`. Private variables are only copied when asked.
    pub fn override_all(&mut self, other: &EvaluationResult, include_private: bool) {
        self.pose = other.pose.clone();
        self.variables.override_all(&other.variables, include_private);
        self.joints.override_all(&other.joints);
        self.post_process.override_all(&other.post_process);
        self.is_valid = other.is_valid;
        self.is_camera_cut = other.is_camera_cut;
    }

    /// Blend every field towards `other` by `t`.
    pub fn lerp_all(&mut self, other: &EvaluationResult, t: f64) {
        if t <= 0.0 {
            return;
        }
        self.pose.lerp(&other.pose, t);
        self.variables
            .lerp_filtered(&other.variables, VariableFilter::ALL_PUBLIC, t);
        self.joints.lerp_all(&other.joints, t);
        self.post_process.lerp_all(&other.post_process, t);
        self.is_valid |= other.is_valid;
        self.is_camera_cut |= other.is_camera_cut;
    }

    /// Clear per-frame tracking: pose changed flags and variable written-this-frame flags.
    pub fn clear_frame_flags(&mut self) {
        self.pose.clear_changed();
        self.variables.clear_written_this_frame();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/result/evaluation.rs"]
mod tests;
