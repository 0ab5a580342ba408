use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::context::arena::EvaluationContext;
use crate::result::evaluation::EvaluationResult;
use crate::result::pose::CameraPose;
use crate::result::variables::VariableTable;
use crate::rig::descriptor::RigDescriptor;

bitflags! {
    /// Optional capabilities a node evaluator opts into.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// The node computes pre-blend parameters in [`NodeEvaluator::update_parameters`].
        const NEEDS_PARAMETER_UPDATE = 1 << 0;
    }
}

/// Per-frame inputs handed to every evaluator of one entry.
#[derive(Clone, Copy, Debug)]
pub struct NodeParams<'a> {
    pub delta_time: f64,
    pub is_first_frame: bool,
    /// `None` for entries whose context is gone.
    pub context: Option<&'a EvaluationContext>,
}

/// The rig that was active when a new entry got built.
#[derive(Clone, Copy, Debug)]
pub struct LastActiveRig<'a> {
    pub rig: &'a Arc<RigDescriptor>,
    pub result: &'a EvaluationResult,
}

#[derive(Clone, Copy, Debug)]
pub struct InitializeParams<'a> {
    pub context: Option<&'a EvaluationContext>,
    pub last_active: Option<LastActiveRig<'a>>,
}

/// One node of a rig's evaluator tree.
///
/// Only `run` is mandatory. Nodes reporting [`NodeFlags::NEEDS_PARAMETER_UPDATE`] also get
/// `update_parameters` calls before blending.
pub trait NodeEvaluator: fmt::Debug {
    fn flags(&self) -> NodeFlags {
        NodeFlags::empty()
    }

    fn initialize(&mut self, _params: &InitializeParams<'_>, _result: &mut EvaluationResult) {}

    fn run(&mut self, params: &NodeParams<'_>, result: &mut EvaluationResult);

    /// Write pre-blend values into `variables`. `pose` is last frame's pose.
    fn update_parameters(
        &mut self,
        _params: &NodeParams<'_>,
        _pose: &CameraPose,
        _variables: &mut VariableTable,
    ) {
    }

    fn debug_info(&self) -> Option<String> {
        None
    }
}
