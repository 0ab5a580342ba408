use glam::DVec3;

use crate::foundation::error::CamStackResult;
use crate::foundation::ids::VariableId;
use crate::foundation::math::rotation_from_euler_deg;
use crate::node::evaluator::{InitializeParams, NodeEvaluator, NodeFlags, NodeParams};
use crate::node::registry::NodeRegistry;
use crate::result::evaluation::EvaluationResult;
use crate::result::joints::RigJoint;
use crate::result::pose::CameraPose;
use crate::result::variables::{VariableTable, VariableValue};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OffsetSpace {
    #[default]
    World,
    /// Offset is rotated by the current camera rotation.
    Camera,
}

/// Description of a rig's node graph. Each variant builds one evaluator.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum NodeDef {
    /// Runs its children in order.
    Sequence(Vec<NodeDef>),
    Offset {
        offset: DVec3,
        #[serde(default)]
        space: OffsetSpace,
    },
    /// Absolute rotation, in degrees.
    Orientation { yaw: f64, pitch: f64, roll: f64 },
    FieldOfView { degrees: f64 },
    FieldOfViewFromVariable { variable: VariableId },
    SetVariable {
        variable: VariableId,
        value: VariableValue,
    },
    /// Rig parameter: provides `value` as an input variable unless something upstream already
    /// wrote it this frame. Evaluated before blending.
    InputValue {
        variable: VariableId,
        value: VariableValue,
    },
    PostProcess { setting: String, value: f64 },
    /// Publishes the current camera transform as a named joint.
    Joint { name: String },
    /// Starts from the pose of the rig that was active when this one got pushed.
    InheritPreviousPose,
    /// Host-defined node resolved through the [`NodeRegistry`].
    Custom {
        kind: String,
        #[serde(default)]
        params: serde_json::Value,
    },
}

impl NodeDef {
    pub fn children(&self) -> &[NodeDef] {
        match self {
            Self::Sequence(children) => children,
            _ => &[],
        }
    }

    pub(crate) fn instantiate(
        &self,
        registry: &NodeRegistry,
    ) -> CamStackResult<Box<dyn NodeEvaluator>> {
        Ok(match self {
            Self::Sequence(_) => Box::new(SequenceNode),
            Self::Offset { offset, space } => Box::new(OffsetNode {
                offset: *offset,
                space: *space,
            }),
            Self::Orientation { yaw, pitch, roll } => Box::new(OrientationNode {
                yaw: *yaw,
                pitch: *pitch,
                roll: *roll,
            }),
            Self::FieldOfView { degrees } => Box::new(FieldOfViewNode { degrees: *degrees }),
            Self::FieldOfViewFromVariable { variable } => {
                Box::new(FieldOfViewFromVariableNode { variable: *variable })
            }
            Self::SetVariable { variable, value } => Box::new(SetVariableNode {
                variable: *variable,
                value: *value,
            }),
            Self::InputValue { variable, value } => Box::new(InputValueNode {
                variable: *variable,
                value: *value,
            }),
            Self::PostProcess { setting, value } => Box::new(PostProcessNode {
                setting: setting.clone(),
                value: *value,
            }),
            Self::Joint { name } => Box::new(JointNode { name: name.clone() }),
            Self::InheritPreviousPose => Box::new(InheritPreviousPoseNode::default()),
            Self::Custom { kind, params } => registry.create(kind, params)?,
        })
    }
}

#[derive(Debug)]
struct SequenceNode;

impl NodeEvaluator for SequenceNode {
    fn run(&mut self, _params: &NodeParams<'_>, _result: &mut EvaluationResult) {}
}

#[derive(Debug)]
struct OffsetNode {
    offset: DVec3,
    space: OffsetSpace,
}

impl NodeEvaluator for OffsetNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        let delta = match self.space {
            OffsetSpace::World => self.offset,
            OffsetSpace::Camera => result.pose.rotation() * self.offset,
        };
        let position = result.pose.position() + delta;
        result.pose.set_position(position);
    }

    fn debug_info(&self) -> Option<String> {
        Some(format!("offset {:?} ({:?})", self.offset, self.space))
    }
}

#[derive(Debug)]
struct OrientationNode {
    yaw: f64,
    pitch: f64,
    roll: f64,
}

impl NodeEvaluator for OrientationNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        result
            .pose
            .set_rotation(rotation_from_euler_deg(self.yaw, self.pitch, self.roll));
    }
}

#[derive(Debug)]
struct FieldOfViewNode {
    degrees: f64,
}

impl NodeEvaluator for FieldOfViewNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        result.pose.set_field_of_view(self.degrees);
    }

    fn debug_info(&self) -> Option<String> {
        Some(format!("fov {:.1}", self.degrees))
    }
}

#[derive(Debug)]
struct FieldOfViewFromVariableNode {
    variable: VariableId,
}

impl NodeEvaluator for FieldOfViewFromVariableNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        if let Some(degrees) = result.variables.get_f64(self.variable) {
            result.pose.set_field_of_view(degrees);
        }
    }
}

#[derive(Debug)]
struct SetVariableNode {
    variable: VariableId,
    value: VariableValue,
}

impl NodeEvaluator for SetVariableNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        result.variables.set(self.variable, self.value);
    }
}

#[derive(Debug)]
struct InputValueNode {
    variable: VariableId,
    value: VariableValue,
}

impl NodeEvaluator for InputValueNode {
    fn flags(&self) -> NodeFlags {
        NodeFlags::NEEDS_PARAMETER_UPDATE
    }

    fn run(&mut self, _params: &NodeParams<'_>, _result: &mut EvaluationResult) {}

    fn update_parameters(
        &mut self,
        _params: &NodeParams<'_>,
        _pose: &CameraPose,
        variables: &mut VariableTable,
    ) {
        if !variables.is_written_this_frame(self.variable) {
            variables.set_input(self.variable, self.value);
        }
    }

    fn debug_info(&self) -> Option<String> {
        Some(format!("input {:?} = {:?}", self.variable, self.value))
    }
}

#[derive(Debug)]
struct PostProcessNode {
    setting: String,
    value: f64,
}

impl NodeEvaluator for PostProcessNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        result.post_process.set(self.setting.clone(), self.value);
    }
}

#[derive(Debug)]
struct JointNode {
    name: String,
}

impl NodeEvaluator for JointNode {
    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        let joint = RigJoint {
            name: self.name.clone(),
            position: result.pose.position(),
            rotation: result.pose.rotation(),
        };
        result.joints.set(joint);
    }
}

#[derive(Debug, Default)]
struct InheritPreviousPoseNode {
    previous: Option<CameraPose>,
}

impl NodeEvaluator for InheritPreviousPoseNode {
    fn initialize(&mut self, params: &InitializeParams<'_>, _result: &mut EvaluationResult) {
        self.previous = params.last_active.map(|last| last.result.pose.clone());
    }

    fn run(&mut self, _params: &NodeParams<'_>, result: &mut EvaluationResult) {
        if let Some(previous) = &self.previous {
            result.pose.set_position(previous.position());
            result.pose.set_rotation(previous.rotation());
            result.pose.set_field_of_view(previous.field_of_view());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/builtin.rs"]
mod tests;
