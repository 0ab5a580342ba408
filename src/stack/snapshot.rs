use crate::foundation::error::{CamStackError, CamStackResult};
use crate::foundation::ids::RigId;
use crate::result::evaluation::EvaluationResult;
use crate::stack::BlendStackCore;
use crate::stack::entry::EntryFlags;

/// Saved state of one entry. Evaluators are not part of it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntrySnapshot {
    pub rig: RigId,
    pub result: EvaluationResult,
    pub flags: EntryFlags,
}

/// Record/replay hook: entry results and transient flags.
///
/// Loading only restores data into a stack holding the same rigs; it never adds, removes or
/// rebuilds entries.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlendStackSnapshot {
    pub entries: Vec<EntrySnapshot>,
}

impl BlendStackSnapshot {
    pub fn capture(core: &BlendStackCore) -> Self {
        Self {
            entries: core
                .entries()
                .iter()
                .map(|e| EntrySnapshot {
                    rig: e.rig().id(),
                    result: e.result().clone(),
                    flags: e.flags(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> CamStackResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> CamStackResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Restore into `core`. Nothing changes unless the whole snapshot fits.
    pub fn apply(&self, core: &mut BlendStackCore) -> CamStackResult<()> {
        let entries = &mut core.store.entries;
        if entries.len() != self.entries.len() {
            return Err(CamStackError::validation(format!(
                "snapshot holds {} entries but the stack has {}",
                self.entries.len(),
                entries.len()
            )));
        }
        for (index, (entry, saved)) in entries.iter().zip(&self.entries).enumerate() {
            if entry.rig.id() != saved.rig {
                return Err(CamStackError::validation(format!(
                    "snapshot entry {index} is for {:?} but the stack runs {:?}",
                    saved.rig,
                    entry.rig.id()
                )));
            }
            if entry.flags.is_frozen && !saved.flags.is_frozen {
                return Err(CamStackError::validation(format!(
                    "snapshot entry {index} is live but the stack entry is frozen"
                )));
            }
        }

        for (entry, saved) in entries.iter_mut().zip(&self.entries) {
            if saved.flags.is_frozen && !entry.flags.is_frozen {
                entry.freeze();
            }
            entry.result = saved.result.clone();
            entry.flags = saved.flags;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/snapshot.rs"]
mod tests;
