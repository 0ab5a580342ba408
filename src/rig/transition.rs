use crate::foundation::ids::{AssetId, RigId};
use crate::node::blend::BlendDef;
use crate::rig::descriptor::{CameraAsset, RigDescriptor};

/// What a rule is matched against when a rig replaces the active one.
#[derive(Clone, Copy, Debug)]
pub struct TransitionMatch<'a> {
    pub from_rig: &'a RigDescriptor,
    pub from_asset: Option<&'a CameraAsset>,
    pub from_frozen: bool,
    pub to_rig: &'a RigDescriptor,
    pub to_asset: Option<&'a CameraAsset>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TransitionCondition {
    /// Matches rig identities; `None` on a side matches anything.
    IsRig {
        #[serde(default)]
        from: Option<RigId>,
        #[serde(default)]
        to: Option<RigId>,
    },
    /// Matches asset identities; `None` on a side matches anything, including no asset.
    IsAsset {
        #[serde(default)]
        from: Option<AssetId>,
        #[serde(default)]
        to: Option<AssetId>,
    },
    FromFrozen(bool),
    /// Both sides belong to the same asset.
    SameAsset,
    Not(Box<TransitionCondition>),
    AnyOf(Vec<TransitionCondition>),
}

impl TransitionCondition {
    pub fn matches(&self, m: &TransitionMatch<'_>) -> bool {
        match self {
            Self::IsRig { from, to } => {
                from.is_none_or(|id| m.from_rig.id() == id) && to.is_none_or(|id| m.to_rig.id() == id)
            }
            Self::IsAsset { from, to } => {
                asset_matches(*from, m.from_asset) && asset_matches(*to, m.to_asset)
            }
            Self::FromFrozen(frozen) => m.from_frozen == *frozen,
            Self::SameAsset => match (m.from_asset, m.to_asset) {
                (Some(a), Some(b)) => a.id() == b.id(),
                _ => false,
            },
            Self::Not(inner) => !inner.matches(m),
            Self::AnyOf(conds) => conds.iter().any(|c| c.matches(m)),
        }
    }
}

fn asset_matches(expected: Option<AssetId>, actual: Option<&CameraAsset>) -> bool {
    match expected {
        None => true,
        Some(id) => actual.is_some_and(|a| a.id() == id),
    }
}

/// A blend to use between two rigs, guarded by conditions that must all hold.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionRule {
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<TransitionCondition>,
    /// `None` means an instant cut.
    #[serde(default)]
    pub blend: Option<BlendDef>,
    /// Let a rig eligible for merging share the active entry's slot instead of stacking.
    #[serde(default)]
    pub allow_rig_merging: bool,
}

impl TransitionRule {
    pub fn new(name: impl Into<String>, blend: Option<BlendDef>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            blend,
            allow_rig_merging: false,
        }
    }

    pub fn when(mut self, condition: TransitionCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn allowing_merge(mut self) -> Self {
        self.allow_rig_merging = true;
        self
    }

    /// A rule with no conditions always matches.
    pub fn all_conditions_match(&self, m: &TransitionMatch<'_>) -> bool {
        self.conditions.iter().all(|c| c.matches(m))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/transition.rs"]
mod tests;
