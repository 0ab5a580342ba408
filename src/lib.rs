//! camstack evaluates stacks of camera rigs once per frame and blends their outputs.
//!
//! A rig is a graph of camera-behavior nodes ([`NodeDef`]) described by a [`RigDescriptor`].
//! Hosts push rigs onto a [`BlendStack`] on behalf of an [`EvaluationContext`]; every frame the
//! stack resolves its entries, evaluates them and composites their [`EvaluationResult`]s.
//!
//! # Frame pipeline
//!
//! 1. **Resolve**: check each entry's context. Dead contexts freeze their entries.
//! 2. **Prepare**: gather pre-blend parameters and advance blends.
//! 3. **Blend parameters**: mix input variables into the aggregate.
//! 4. **Update**: run each live entry's node tree.
//! 5. **Blend results**: composite bottom to top, then trim what is fully covered.
//!
//! Two policies exist: [`TransientBlendStack`] (push/freeze, LIFO, auto-trim) and
//! [`PersistentBlendStack`] (insert/remove, additive layers).
//!
//! Evaluation is single-threaded and never fails; only construction, configuration and
//! snapshot loading return [`CamStackResult`].
#![forbid(unsafe_code)]

mod animation;
mod config;
mod context;
mod foundation;
mod node;
mod result;
mod rig;
mod stack;

pub use animation::ease::Ease;
pub use config::{BlendStackConfig, BlendStackKind, DebugConfig};
pub use context::arena::{ContextArena, ContextHandle, EvaluationContext};
pub use foundation::error::{CamStackError, CamStackResult};
pub use foundation::ids::{AssetId, EntryId, ListenerId, NodeHandle, RigId, VariableId};
pub use foundation::math::rotation_from_euler_deg;
pub use node::blend::{BlendDef, BlendEvaluator, BlendOutcome, PopBlend, SimpleBlend};
pub use node::builtin::{NodeDef, OffsetSpace};
pub use node::evaluator::{InitializeParams, LastActiveRig, NodeEvaluator, NodeFlags, NodeParams};
pub use node::registry::{NodeFactory, NodeRegistry};
pub use node::root::{EntryComparison, StackRootEvaluator};
pub use node::tree::EvaluatorTree;
pub use result::evaluation::EvaluationResult;
pub use result::joints::{RigJoint, RigJoints};
pub use result::pose::{CameraPose, PoseFields};
pub use result::post_process::PostProcessSettings;
pub use result::variables::{
    VariableAllocation, VariableDefinition, VariableEntry, VariableFilter, VariableTable,
    VariableValue,
};
pub use rig::descriptor::{CameraAsset, RigDescriptor, expand_combination};
pub use rig::transition::{TransitionCondition, TransitionMatch, TransitionRule};
pub use stack::{
    BlendStack, BlendStackCore, BlendStackDebugInfo, BlendStackEvent, BlendStackEventKind,
    BlendStackSnapshot, EntryDebugInfo, EntryFlags, EntrySnapshot, FrameParams,
    PersistentBlendStack, PushOutcome, RigEvaluationInfo, StackEntry, TransientBlendStack,
};
