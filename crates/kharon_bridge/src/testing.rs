//! # Test Doubles
//!
//! Engines for exercising the bridge without a native side: a recording
//! engine with failure injection, a no-op engine for benches and demos,
//! and a stub surface token. Shipped in the crate (not behind a feature)
//! so integration tests and downstream harnesses can use them.

use std::sync::Arc;

use parking_lot::Mutex;
use raw_window_handle::{RawWindowHandle, WebWindowHandle};

use kharon_core::{BridgeError, EntryPoint, FailureSignal};

use crate::dispatcher::FatalHandler;
use crate::engine::EngineHooks;
use crate::handle::SurfaceHandle;

/// A host surface token with no real window behind it.
///
/// Uses the web-canvas handle variant because it carries a plain id
/// instead of a pointer, which keeps tests free of fabricated addresses.
#[must_use]
pub fn stub_surface() -> RawWindowHandle {
    RawWindowHandle::Web(WebWindowHandle::new(1))
}

/// A fatal handler that panics instead of aborting, so tests can observe
/// termination with `#[should_panic]` or `catch_unwind`.
#[must_use]
pub fn panicking_fatal_handler() -> FatalHandler {
    Box::new(|err: &BridgeError| panic!("{err}"))
}

/// Shared, cloneable view of the calls a [`RecordingEngine`] received.
///
/// The engine moves into the bridge; keep a clone of the log to assert on
/// afterwards.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<EntryPoint>>>,
}

impl CallLog {
    /// Every entry point reached, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<EntryPoint> {
        self.calls.lock().clone()
    }

    /// How many times one entry point was reached.
    #[must_use]
    pub fn count(&self, call: EntryPoint) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    /// Total calls that reached the engine.
    #[must_use]
    pub fn total(&self) -> usize {
        self.calls.lock().len()
    }
}

/// An engine that records every call and can inject one failure.
///
/// The failure fires on the n-th occurrence of the chosen entry point;
/// everything else returns ok. Anything recorded after a failure is a
/// bridge bug - the dispatcher must never issue another call.
pub struct RecordingEngine {
    log: CallLog,
    fail_at: Option<(EntryPoint, usize)>,
}

impl RecordingEngine {
    /// An all-ok engine recording into `log`.
    #[must_use]
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            fail_at: None,
        }
    }

    /// Makes the `occurrence`-th invocation of `call` (1-based) return a
    /// failed signal.
    #[must_use]
    pub fn fail_at(mut self, call: EntryPoint, occurrence: usize) -> Self {
        self.fail_at = Some((call, occurrence));
        self
    }

    fn record(&mut self, call: EntryPoint) -> FailureSignal {
        let occurrence = {
            let mut calls = self.log.calls.lock();
            calls.push(call);
            calls.iter().filter(|c| **c == call).count()
        };
        match self.fail_at {
            Some((target, at)) if target == call && at == occurrence => FailureSignal::Failed,
            _ => FailureSignal::Ok,
        }
    }
}

impl EngineHooks for RecordingEngine {
    fn on_create(&mut self) -> FailureSignal {
        self.record(EntryPoint::OnCreate)
    }

    fn on_destroy(&mut self) -> FailureSignal {
        self.record(EntryPoint::OnDestroy)
    }

    fn on_surface_created(&mut self) -> FailureSignal {
        self.record(EntryPoint::OnSurfaceCreated)
    }

    fn on_surface_changed(
        &mut self,
        _surface: &SurfaceHandle,
        _width: u32,
        _height: u32,
    ) -> FailureSignal {
        self.record(EntryPoint::OnSurfaceChanged)
    }

    fn on_surface_destroyed(&mut self) -> FailureSignal {
        self.record(EntryPoint::OnSurfaceDestroyed)
    }

    fn on_draw_frame(&mut self) -> FailureSignal {
        self.record(EntryPoint::OnDrawFrame)
    }
}

/// An engine that accepts everything and records nothing. For benches
/// and demos where only the bridge's own overhead matters.
pub struct NullEngine;

impl EngineHooks for NullEngine {
    fn on_create(&mut self) -> FailureSignal {
        FailureSignal::Ok
    }

    fn on_destroy(&mut self) -> FailureSignal {
        FailureSignal::Ok
    }

    fn on_surface_created(&mut self) -> FailureSignal {
        FailureSignal::Ok
    }

    fn on_surface_changed(
        &mut self,
        _surface: &SurfaceHandle,
        _width: u32,
        _height: u32,
    ) -> FailureSignal {
        FailureSignal::Ok
    }

    fn on_surface_destroyed(&mut self) -> FailureSignal {
        FailureSignal::Ok
    }

    fn on_draw_frame(&mut self) -> FailureSignal {
        FailureSignal::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_log_records_in_order() {
        let log = CallLog::default();
        let mut engine = RecordingEngine::new(&log);
        assert!(engine.on_create().is_ok());
        assert!(engine.on_draw_frame().is_ok());
        assert_eq!(
            log.calls(),
            vec![EntryPoint::OnCreate, EntryPoint::OnDrawFrame]
        );
        assert_eq!(log.total(), 2);
    }

    #[test]
    fn test_failure_injection_targets_occurrence() {
        let log = CallLog::default();
        let mut engine = RecordingEngine::new(&log).fail_at(EntryPoint::OnDrawFrame, 2);
        assert!(engine.on_draw_frame().is_ok());
        assert!(engine.on_draw_frame().is_failed());
        assert_eq!(log.count(EntryPoint::OnDrawFrame), 2);
    }
}
