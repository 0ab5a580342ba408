use std::collections::BTreeMap;

use crate::foundation::math::{flips_at, lerp_f64};

/// Named post-process overrides. Only settings present in the map are considered overridden.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PostProcessSettings {
    settings: BTreeMap<String, f64>,
}

impl PostProcessSettings {
    pub fn has_any_setting(&self) -> bool {
        !self.settings.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.settings.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.settings.insert(name.into(), value);
    }

    pub fn reset(&mut self) {
        self.settings.clear();
    }

    pub fn override_all(&mut self, other: &PostProcessSettings) {
        self.settings.clone_from(&other.settings);
    }

    /// Copy the settings `other` overrides, keeping ours for the rest.
    pub fn override_changed(&mut self, other: &PostProcessSettings) {
        for (name, value) in &other.settings {
            self.settings.insert(name.clone(), *value);
        }
    }

    /// Settings both sides override are interpolated; settings only `other` overrides switch
    /// over at the halfway point.
    pub fn lerp_all(&mut self, other: &PostProcessSettings, t: f64) {
        if t <= 0.0 {
            return;
        }
        let t = t.min(1.0);
        for (name, to) in &other.settings {
            match self.settings.get_mut(name) {
                Some(from) => *from = lerp_f64(*from, *to, t),
                None if flips_at(t) => {
                    self.settings.insert(name.clone(), *to);
                }
                None => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/result/post_process.rs"]
mod tests;
