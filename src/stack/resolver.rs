use crate::context::arena::{ContextArena, ContextHandle};
use crate::stack::entry::StackEntry;
use crate::stack::store::EntryStore;

/// One entry as seen by this frame's pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedEntry {
    pub(crate) index: usize,
    /// Live context, `None` for frozen entries.
    pub(crate) context: Option<ContextHandle>,
    /// The context is alive but its initial result is not valid yet; the entry only blends
    /// what it produced before.
    pub(crate) stale: bool,
}

impl ResolvedEntry {
    /// Entries that get prepared and re-run this frame.
    pub(crate) fn is_updatable(&self) -> bool {
        self.context.is_some() && !self.stale
    }

    /// Whether the entry has anything to composite this frame.
    ///
    /// Entries that are not re-run only offer their stored result, which stays empty until
    /// the entry has run once.
    pub(crate) fn has_result(&self, entry: &StackEntry) -> bool {
        self.is_updatable() || entry.result.is_valid
    }
}

/// Check every entry's context once for this frame, in stack order.
///
/// Entries whose context is gone are frozen here; frozen entries stay in the list since they
/// still blend.
pub(crate) fn resolve_entries(
    store: &mut EntryStore,
    contexts: &ContextArena,
    log_warnings: bool,
) -> Vec<ResolvedEntry> {
    let mut resolved = Vec::with_capacity(store.entries.len());
    for (index, entry) in store.entries.iter_mut().enumerate() {
        let mut view = ResolvedEntry {
            index,
            context: None,
            stale: false,
        };

        if entry.flags.is_frozen {
            resolved.push(view);
            continue;
        }

        let handle = entry.context;
        let Some(ctx) = handle.and_then(|h| contexts.get(h)) else {
            entry.freeze();
            if log_warnings && entry.flags.log_warnings {
                tracing::warn!(
                    rig = %entry.rig.name(),
                    index,
                    "freezing camera rig because its evaluation context is gone"
                );
                entry.flags.log_warnings = false;
            }
            resolved.push(view);
            continue;
        };

        view.context = handle;

        if !ctx.initial_result().is_valid {
            if log_warnings && entry.flags.log_warnings {
                tracing::warn!(
                    rig = %entry.rig.name(),
                    index,
                    "camera rig may hitch because its context result is not valid"
                );
                entry.flags.log_warnings = false;
            }
            entry.flags.was_context_result_valid = false;
            view.stale = true;
            resolved.push(view);
            continue;
        }

        if !entry.flags.was_context_result_valid && !entry.flags.is_first_frame {
            entry.flags.force_camera_cut = true;
        }
        entry.flags.was_context_result_valid = true;
        entry.flags.log_warnings = true;
        entry.result.clear_frame_flags();

        resolved.push(view);
    }
    resolved
}

#[cfg(test)]
#[path = "../../tests/unit/stack/resolver.rs"]
mod tests;
