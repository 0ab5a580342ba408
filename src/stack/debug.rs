use std::fmt;

use crate::config::{BlendStackKind, DebugConfig};
use crate::result::evaluation::EvaluationResult;
use crate::rig::descriptor::RigDescriptor;
use crate::stack::BlendStackCore;
use crate::stack::entry::StackEntry;

#[derive(Clone, Debug, PartialEq)]
pub struct EntryDebugInfo {
    pub index: usize,
    pub rig: String,
    pub is_frozen: bool,
    /// Debug line of the entry's blend, if it has one.
    pub blend: Option<String>,
    pub pose: String,
    /// Content layers and their node debug lines.
    pub nodes: Vec<String>,
    pub variables: Vec<String>,
}

/// Text-only view of a stack, for overlays and logs.
#[derive(Clone, Debug, PartialEq)]
pub struct BlendStackDebugInfo {
    pub name: String,
    pub kind: BlendStackKind,
    pub entries: Vec<EntryDebugInfo>,
}

pub(crate) fn build(core: &BlendStackCore, config: &DebugConfig) -> BlendStackDebugInfo {
    BlendStackDebugInfo {
        name: core.name().to_string(),
        kind: core.config().kind,
        entries: core
            .entries()
            .iter()
            .enumerate()
            .map(|(index, entry)| entry_info(index, entry, config))
            .collect(),
    }
}

fn entry_info(index: usize, entry: &StackEntry, config: &DebugConfig) -> EntryDebugInfo {
    let (blend, nodes) = match entry.evaluators.as_ref() {
        Some(evaluators) => (
            evaluators.root.blend_evaluator().map(|b| b.debug_info()),
            evaluators.root.debug_lines(&evaluators.tree),
        ),
        None => (None, Vec::new()),
    };
    EntryDebugInfo {
        index,
        rig: entry.rig.name().to_string(),
        is_frozen: entry.flags.is_frozen,
        blend,
        pose: pose_summary(&entry.result),
        nodes,
        variables: variable_lines(&entry.rig, &entry.result, config),
    }
}

fn pose_summary(result: &EvaluationResult) -> String {
    let p = result.pose.position();
    let mut summary = format!(
        "pos ({:.2}, {:.2}, {:.2}) fov {:.1}",
        p.x,
        p.y,
        p.z,
        result.pose.field_of_view()
    );
    if !result.is_valid {
        summary.push_str(" invalid");
    }
    if result.is_camera_cut {
        summary.push_str(" cut");
    }
    summary
}

fn variable_lines(rig: &RigDescriptor, result: &EvaluationResult, config: &DebugConfig) -> Vec<String> {
    result
        .variables
        .iter()
        .filter(|(_, v)| v.written && (config.show_unchanged || v.written_this_frame))
        .map(|(id, v)| {
            let name = rig
                .allocation()
                .definitions
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.name.as_str());
            match (name, config.show_variable_ids) {
                (Some(name), true) => format!("{name} (#{}) = {:?}", id.0, v.value),
                (Some(name), false) => format!("{name} = {:?}", v.value),
                (None, _) => format!("#{} = {:?}", id.0, v.value),
            }
        })
        .collect()
}

impl fmt::Display for BlendStackDebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "blend stack '{}' ({:?}), {} entries",
            self.name,
            self.kind,
            self.entries.len()
        )?;
        for entry in &self.entries {
            write!(f, "  [{}] {}", entry.index, entry.rig)?;
            if entry.is_frozen {
                write!(f, " (frozen)")?;
            }
            writeln!(f)?;
            if let Some(blend) = &entry.blend {
                writeln!(f, "    blend: {blend}")?;
            }
            writeln!(f, "    pose: {}", entry.pose)?;
            for line in entry.nodes.iter().chain(&entry.variables) {
                writeln!(f, "    {line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/stack/debug.rs"]
mod tests;
