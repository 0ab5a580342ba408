//! Blend stacks: ordered rig entries evaluated and composited once per frame.
//!
//! Two policies share one [`BlendStackCore`]:
//! - [`TransientBlendStack`]: push/freeze, LIFO, trims entries a newer one fully covers.
//! - [`PersistentBlendStack`]: insert/remove additive layers, never trims.

pub mod debug;
pub mod entry;
pub mod events;
pub mod persistent;
pub(crate) mod resolver;
pub mod snapshot;
pub(crate) mod store;
pub mod transient;
pub(crate) mod transition_finder;

use std::sync::Arc;

use crate::config::{BlendStackConfig, BlendStackKind, DebugConfig};
use crate::context::arena::{ContextArena, EvaluationContext};
use crate::foundation::error::CamStackResult;
use crate::foundation::ids::ListenerId;
use crate::node::evaluator::NodeParams;
use crate::node::registry::NodeRegistry;
use crate::result::evaluation::EvaluationResult;

pub use debug::{BlendStackDebugInfo, EntryDebugInfo};
pub use entry::{EntryFlags, StackEntry};
pub use events::{BlendStackEvent, BlendStackEventKind};
pub use persistent::PersistentBlendStack;
pub use snapshot::{BlendStackSnapshot, EntrySnapshot};
pub use store::RigEvaluationInfo;
pub use transient::TransientBlendStack;

use store::EntryStore;

/// Inputs of one frame tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameParams {
    /// Seconds since the previous tick.
    pub delta_time: f64,
}

impl FrameParams {
    pub fn new(delta_time: f64) -> Self {
        Self { delta_time }
    }

    pub(crate) fn node_params<'a>(
        &self,
        is_first_frame: bool,
        context: Option<&'a EvaluationContext>,
    ) -> NodeParams<'a> {
        NodeParams {
            delta_time: self.delta_time,
            is_first_frame,
            context,
        }
    }
}

/// What a push or insert did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// The rig already runs for this context; nothing changed.
    AlreadyActive,
    /// The rig was merged into the top entry.
    Merged,
    /// A new entry was added at `index`.
    Pushed { index: usize },
    /// The context was gone or the rig's evaluators could not be built.
    Rejected,
}

/// State shared by both stack policies.
#[derive(Debug)]
pub struct BlendStackCore {
    config: BlendStackConfig,
    registry: Arc<NodeRegistry>,
    pub(crate) store: EntryStore,
}

impl BlendStackCore {
    fn new(config: BlendStackConfig, registry: Arc<NodeRegistry>) -> Self {
        Self {
            config,
            registry,
            store: EntryStore::default(),
        }
    }

    pub fn config(&self) -> &BlendStackConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.entries.is_empty()
    }

    /// Entries, bottom of the stack first.
    pub fn entries(&self) -> &[StackEntry] {
        &self.store.entries
    }

    pub fn entry(&self, index: usize) -> Option<&StackEntry> {
        self.store.entries.get(index)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&BlendStackEvent<'_>) + 'static) -> ListenerId {
        self.store.events.subscribe(listener)
    }

    /// Returns whether the listener was still registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.store.events.unsubscribe(id)
    }

    /// The topmost entry that is not frozen.
    pub fn active_rig_info(&self) -> Option<RigEvaluationInfo<'_>> {
        self.store.active_rig_info()
    }

    pub(crate) fn log_context_warnings(&self) -> bool {
        self.config.log_context_warnings
    }

    pub fn debug_info(&self, config: &DebugConfig) -> BlendStackDebugInfo {
        debug::build(self, config)
    }
}

impl Drop for BlendStackCore {
    fn drop(&mut self) {
        let len = self.store.len();
        self.store.pop_below(len);
    }
}

/// A blend stack of either policy, chosen by [`BlendStackConfig::kind`].
#[derive(Debug)]
pub enum BlendStack {
    Transient(TransientBlendStack),
    Persistent(PersistentBlendStack),
}

impl BlendStack {
    pub fn new(config: BlendStackConfig, registry: Arc<NodeRegistry>) -> CamStackResult<Self> {
        config.validate()?;
        Ok(match config.kind {
            BlendStackKind::IsolatedTransient => {
                Self::Transient(TransientBlendStack::new(config, registry))
            }
            BlendStackKind::AdditivePersistent => {
                Self::Persistent(PersistentBlendStack::new(config, registry))
            }
        })
    }

    pub fn kind(&self) -> BlendStackKind {
        match self {
            Self::Transient(_) => BlendStackKind::IsolatedTransient,
            Self::Persistent(_) => BlendStackKind::AdditivePersistent,
        }
    }

    pub fn core(&self) -> &BlendStackCore {
        match self {
            Self::Transient(stack) => stack.core(),
            Self::Persistent(stack) => stack.core(),
        }
    }

    pub fn core_mut(&mut self) -> &mut BlendStackCore {
        match self {
            Self::Transient(stack) => stack.core_mut(),
            Self::Persistent(stack) => stack.core_mut(),
        }
    }

    pub fn as_transient_mut(&mut self) -> Option<&mut TransientBlendStack> {
        match self {
            Self::Transient(stack) => Some(stack),
            Self::Persistent(_) => None,
        }
    }

    pub fn as_persistent_mut(&mut self) -> Option<&mut PersistentBlendStack> {
        match self {
            Self::Transient(_) => None,
            Self::Persistent(stack) => Some(stack),
        }
    }

    pub fn run(&mut self, contexts: &ContextArena, params: &FrameParams, out: &mut EvaluationResult) {
        match self {
            Self::Transient(stack) => stack.run(contexts, params, out),
            Self::Persistent(stack) => stack.run(contexts, params, out),
        }
    }

    pub fn snapshot(&self) -> BlendStackSnapshot {
        BlendStackSnapshot::capture(self.core())
    }

    pub fn load_snapshot(&mut self, snapshot: &BlendStackSnapshot) -> CamStackResult<()> {
        snapshot.apply(self.core_mut())
    }
}
