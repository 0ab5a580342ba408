use std::collections::BTreeMap;

use bitflags::bitflags;
use glam::DVec3;

use crate::foundation::ids::VariableId;
use crate::foundation::math::{flips_at, lerp_f64};

/// Typed value stored in a [`VariableTable`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum VariableValue {
    Bool(bool),
    Int(i32),
    Float(f64),
    Vec3(DVec3),
}

impl VariableValue {
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(v),
            Self::Int(v) => Some(f64::from(v)),
            _ => None,
        }
    }

    /// Interpolate towards `to`. Mismatched kinds and booleans switch at the halfway point.
    pub fn lerp(self, to: Self, t: f64) -> Self {
        match (self, to) {
            (Self::Float(a), Self::Float(b)) => Self::Float(lerp_f64(a, b, t)),
            (Self::Int(a), Self::Int(b)) => {
                Self::Int(lerp_f64(f64::from(a), f64::from(b), t).round() as i32)
            }
            (Self::Vec3(a), Self::Vec3(b)) => Self::Vec3(a.lerp(b, t)),
            _ => {
                if flips_at(t) {
                    to
                } else {
                    self
                }
            }
        }
    }
}

bitflags! {
    /// Subsets of a variable table selected by override and blend operations.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct VariableFilter: u8 {
        /// Public variables that feed rig inputs (the pre-blended set).
        const INPUT = 1 << 0;
        /// Public variables that are not inputs.
        const NON_INPUT = 1 << 1;
        const PRIVATE = 1 << 2;
        const ALL_PUBLIC = Self::INPUT.bits() | Self::NON_INPUT.bits();
        const ALL = Self::ALL_PUBLIC.bits() | Self::PRIVATE.bits();
    }
}

impl VariableFilter {
    fn admits(self, entry: &VariableEntry) -> bool {
        if entry.private {
            self.contains(Self::PRIVATE)
        } else if entry.input {
            self.contains(Self::INPUT)
        } else {
            self.contains(Self::NON_INPUT)
        }
    }
}

/// Declared variable, as produced by the rig build step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableDefinition {
    pub id: VariableId,
    pub name: String,
    pub default_value: VariableValue,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub input: bool,
}

/// Variable storage requirements of one rig.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableAllocation {
    pub definitions: Vec<VariableDefinition>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableEntry {
    pub value: VariableValue,
    pub private: bool,
    pub input: bool,
    /// Set once the value has been written at least once. Unwritten entries are never copied.
    pub written: bool,
    pub written_this_frame: bool,
}

/// Keyed variable storage with public, private and input subsets.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableTable {
    entries: BTreeMap<VariableId, VariableEntry>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate entries for every definition, holding their default values.
    ///
    /// Allocated entries stay unwritten until something sets them.
    pub fn initialize(&mut self, allocation: &VariableAllocation) {
        self.entries.clear();
        for def in &allocation.definitions {
            self.entries.insert(
                def.id,
                VariableEntry {
                    value: def.default_value,
                    private: def.private,
                    input: def.input,
                    written: false,
                    written_this_frame: false,
                },
            );
        }
    }

    /// Allocate definitions that have no entry yet, leaving existing entries alone.
    pub fn allocate_missing(&mut self, allocation: &VariableAllocation) {
        for def in &allocation.definitions {
            self.entries.entry(def.id).or_insert(VariableEntry {
                value: def.default_value,
                private: def.private,
                input: def.input,
                written: false,
                written_this_frame: false,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: VariableId) -> Option<&VariableEntry> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableId, &VariableEntry)> {
        self.entries.iter().map(|(id, e)| (*id, e))
    }

    /// Value of a written variable.
    pub fn get(&self, id: VariableId) -> Option<VariableValue> {
        self.entries
            .get(&id)
            .filter(|e| e.written)
            .map(|e| e.value)
    }

    pub fn get_f64(&self, id: VariableId) -> Option<f64> {
        self.get(id).and_then(VariableValue::as_f64)
    }

    /// Write a public non-input variable, allocating it if needed.
    pub fn set(&mut self, id: VariableId, value: VariableValue) {
        self.write(id, value, false, false);
    }

    /// Write a public input variable, allocating it if needed.
    pub fn set_input(&mut self, id: VariableId, value: VariableValue) {
        self.write(id, value, false, true);
    }

    pub fn set_private(&mut self, id: VariableId, value: VariableValue) {
        self.write(id, value, true, false);
    }

    fn write(&mut self, id: VariableId, value: VariableValue, private: bool, input: bool) {
        let entry = self.entries.entry(id).or_insert(VariableEntry {
            value,
            private,
            input,
            written: false,
            written_this_frame: false,
        });
        entry.value = value;
        entry.written = true;
        entry.written_this_frame = true;
    }

    pub fn is_written_this_frame(&self, id: VariableId) -> bool {
        self.entries.get(&id).is_some_and(|e| e.written_this_frame)
    }

    pub fn clear_written_this_frame(&mut self) {
        for entry in self.entries.values_mut() {
            entry.written_this_frame = false;
        }
    }

    /// Copy every written entry of `other`, private ones included when asked.
    pub fn override_all(&mut self, other: &VariableTable, include_private: bool) {
        let filter = if include_private {
            VariableFilter::ALL
        } else {
            VariableFilter::ALL_PUBLIC
        };
        self.override_filtered(other, filter);
    }

    /// Copy the written entries of `other` admitted by `filter`.
    pub fn override_filtered(&mut self, other: &VariableTable, filter: VariableFilter) {
        for (id, src) in &other.entries {
            if !src.written || !filter.admits(src) {
                continue;
            }
            self.copy_entry(*id, src, src.value);
        }
    }

    /// Blend the written entries of `other` admitted by `filter` towards their values.
    ///
    /// Entries missing here take the incoming value outright.
    pub fn lerp_filtered(&mut self, other: &VariableTable, filter: VariableFilter, t: f64) {
        if t <= 0.0 {
            return;
        }
        for (id, src) in &other.entries {
            if !src.written || !filter.admits(src) {
                continue;
            }
            let value = match self.entries.get(id) {
                Some(dst) if dst.written => dst.value.lerp(src.value, t.min(1.0)),
                _ => src.value,
            };
            self.copy_entry(*id, src, value);
        }
    }

    fn copy_entry(&mut self, id: VariableId, src: &VariableEntry, value: VariableValue) {
        let dst = self.entries.entry(id).or_insert_with(|| VariableEntry {
            written: false,
            written_this_frame: false,
            ..src.clone()
        });
        dst.value = value;
        dst.written = true;
        dst.written_this_frame |= src.written_this_frame;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/result/variables.rs"]
mod tests;
