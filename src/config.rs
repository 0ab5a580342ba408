use crate::foundation::error::{CamStackError, CamStackResult};

/// Which frame-evaluation policy a stack uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BlendStackKind {
    /// LIFO stack; entries fully covered by a newer one are trimmed.
    #[default]
    IsolatedTransient,
    /// Additive layers with explicit insert/remove and no trimming.
    AdditivePersistent,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BlendStackConfig {
    pub kind: BlendStackKind,
    /// Label used in logs and debug output.
    pub name: String,
    /// Warn (once per episode) when an entry's context dies or hands out an invalid result.
    pub log_context_warnings: bool,
}

impl Default for BlendStackConfig {
    fn default() -> Self {
        Self {
            kind: BlendStackKind::default(),
            name: "main".to_string(),
            log_context_warnings: true,
        }
    }
}

impl BlendStackConfig {
    pub fn transient(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn persistent(name: impl Into<String>) -> Self {
        Self {
            kind: BlendStackKind::AdditivePersistent,
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> CamStackResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CamStackResult<()> {
        if self.name.trim().is_empty() {
            return Err(CamStackError::validation("blend stack name must be non-empty"));
        }
        Ok(())
    }
}

/// Options for [`crate::BlendStackCore::debug_info`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// List variables even when they were not written this frame.
    pub show_unchanged: bool,
    /// Print variable ids next to values.
    pub show_variable_ids: bool,
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
