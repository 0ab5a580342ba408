#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use camstack::{
    BlendDef, BlendStackCore, BlendStackEventKind, ContextArena, Ease, EvaluationResult,
    FrameParams, NodeDef, RigDescriptor, RigId, TransitionRule,
};

pub const EPS: f64 = 1e-9;

/// Route `tracing` output through the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

pub fn fov_rig(id: u32, degrees: f64) -> RigDescriptor {
    RigDescriptor::new(RigId(id), format!("rig{id}"), NodeDef::FieldOfView { degrees })
}

pub fn eased(name: &str, duration_secs: f64) -> TransitionRule {
    TransitionRule::new(
        name,
        Some(BlendDef::Simple {
            duration_secs,
            ease: Ease::SmoothStep,
        }),
    )
}

pub fn frame(dt: f64) -> FrameParams {
    FrameParams::new(dt)
}

/// Run one frame into a fresh aggregate.
pub fn tick(
    run: impl FnOnce(&ContextArena, &FrameParams, &mut EvaluationResult),
    contexts: &ContextArena,
    dt: f64,
) -> EvaluationResult {
    let mut out = EvaluationResult::new();
    run(contexts, &frame(dt), &mut out);
    out
}

/// Push/pop events as `(kind, rig)` pairs, in the order they fired.
pub type EventLog = Rc<RefCell<Vec<(BlendStackEventKind, RigId)>>>;

pub fn record_events(core: &mut BlendStackCore) -> EventLog {
    let log = EventLog::default();
    let sink = Rc::clone(&log);
    core.subscribe(move |event| {
        sink.borrow_mut().push((event.kind, event.entry.rig().id()));
    });
    log
}

pub fn shared(rig: RigDescriptor) -> Arc<RigDescriptor> {
    Arc::new(rig)
}
