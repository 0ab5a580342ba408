use std::fmt;

use crate::animation::ease::Ease;
use crate::node::evaluator::{InitializeParams, NodeParams};
use crate::result::evaluation::EvaluationResult;
use crate::result::variables::{VariableFilter, VariableTable};

/// How far a blend got this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlendOutcome {
    /// The entry now fully covers everything below it.
    pub is_blend_full: bool,
    /// The blend has nothing left to do.
    pub is_blend_finished: bool,
}

impl BlendOutcome {
    pub const COMPLETE: Self = Self {
        is_blend_full: true,
        is_blend_finished: true,
    };

    pub fn is_complete(self) -> bool {
        self.is_blend_full && self.is_blend_finished
    }
}

/// Combines one entry's output into the running aggregate.
///
/// `run` advances the blend and must not rely on this frame's pose; the pose is only final by
/// the time `blend_results` is called.
pub trait BlendEvaluator: fmt::Debug {
    fn initialize(&mut self, _params: &InitializeParams<'_>) {}

    fn run(&mut self, params: &NodeParams<'_>, result: &mut EvaluationResult);

    /// Merge the entry's input variables into the aggregate table.
    fn blend_parameters(
        &mut self,
        params: &NodeParams<'_>,
        child_variables: &VariableTable,
        out: &mut VariableTable,
    );

    fn blend_results(
        &mut self,
        params: &NodeParams<'_>,
        child: &EvaluationResult,
        out: &mut EvaluationResult,
    ) -> BlendOutcome;

    fn debug_info(&self) -> String;
}

/// Blend behavior chosen by a transition rule.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum BlendDef {
    /// Instant cut.
    Pop,
    /// Time-based interpolation.
    Simple {
        duration_secs: f64,
        #[serde(default)]
        ease: Ease,
    },
}

impl BlendDef {
    pub fn build(&self) -> Box<dyn BlendEvaluator> {
        match self {
            Self::Pop => Box::new(PopBlend),
            Self::Simple {
                duration_secs,
                ease,
            } => Box::new(SimpleBlend::new(*duration_secs, *ease)),
        }
    }
}

#[derive(Debug)]
pub struct PopBlend;

impl BlendEvaluator for PopBlend {
    fn run(&mut self, _params: &NodeParams<'_>, _result: &mut EvaluationResult) {}

    fn blend_parameters(
        &mut self,
        _params: &NodeParams<'_>,
        child_variables: &VariableTable,
        out: &mut VariableTable,
    ) {
        out.override_filtered(child_variables, VariableFilter::INPUT);
    }

    fn blend_results(
        &mut self,
        _params: &NodeParams<'_>,
        child: &EvaluationResult,
        out: &mut EvaluationResult,
    ) -> BlendOutcome {
        out.override_all(child, false);
        BlendOutcome::COMPLETE
    }

    fn debug_info(&self) -> String {
        "pop".to_string()
    }
}

/// Interpolates from the aggregate towards the entry over a fixed duration.
#[derive(Debug)]
pub struct SimpleBlend {
    duration: f64,
    ease: Ease,
    elapsed: f64,
    factor: f64,
}

impl SimpleBlend {
    pub fn new(duration_secs: f64, ease: Ease) -> Self {
        let duration = duration_secs.max(0.0);
        Self {
            duration,
            ease,
            elapsed: 0.0,
            factor: ease.factor(0.0, duration),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

impl BlendEvaluator for SimpleBlend {
    fn run(&mut self, params: &NodeParams<'_>, _result: &mut EvaluationResult) {
        self.elapsed = (self.elapsed + params.delta_time.max(0.0)).min(self.duration);
        self.factor = self.ease.factor(self.elapsed, self.duration);
    }

    fn blend_parameters(
        &mut self,
        _params: &NodeParams<'_>,
        child_variables: &VariableTable,
        out: &mut VariableTable,
    ) {
        out.lerp_filtered(child_variables, VariableFilter::INPUT, self.factor);
    }

    fn blend_results(
        &mut self,
        _params: &NodeParams<'_>,
        child: &EvaluationResult,
        out: &mut EvaluationResult,
    ) -> BlendOutcome {
        if self.factor >= 1.0 {
            out.override_all(child, false);
        } else {
            out.lerp_all(child, self.factor);
        }
        BlendOutcome {
            is_blend_full: self.factor >= 1.0,
            is_blend_finished: self.is_finished(),
        }
    }

    fn debug_info(&self) -> String {
        format!(
            "simple {:?} {:.2}/{:.2}s ({:.0}%)",
            self.ease,
            self.elapsed,
            self.duration,
            self.factor * 100.0
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/blend.rs"]
mod tests;
