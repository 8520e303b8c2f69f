//! # Bridge Dispatcher
//!
//! The single arbitration point. Every host callback maps to exactly one
//! state-machine transition plus exactly one native invocation, in a
//! fixed order:
//!
//! ```text
//! validate preconditions -> marshal handle -> invoke native
//!        -> interpret FailureSignal -> commit state -> return
//! ```
//!
//! State is committed only when the native call succeeded; a failed call
//! leaves the machines untouched and terminates the process. One
//! `parking_lot::Mutex` guards the engine, both state machines and the
//! held surface handle, shared between the host callback thread and (in
//! continuous-pull mode) the render thread - so two transitions can never
//! run concurrently against the same instance, and a teardown call on the
//! host thread waits out any in-flight draw tick before the handle is
//! discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use raw_window_handle::RawWindowHandle;
use tracing::{debug, error, info};

use kharon_core::{
    BridgeConfig, BridgeError, DriveMode, EntryPoint, FailureSignal, Lifecycle, LifecycleState,
    Surface, SurfaceChange, SurfacePhase, TransitionDenied,
};

use crate::engine::EngineHooks;
use crate::handle::SurfaceHandle;
use crate::render_loop::PullLoop;

/// What a fatal diagnostic is handed to.
///
/// The default handler aborts the process. Tests substitute a panicking
/// handler to observe termination; this is not a recovery channel - the
/// dispatcher never proceeds past a failure regardless of what the
/// handler does.
pub type FatalHandler = Box<dyn Fn(&BridgeError) + Send + Sync>;

/// Counters for the bridge's observable activity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Draw ticks that reached the native side.
    pub ticks: u64,
    /// Absent -> Live surface binds (equals the current generation).
    pub binds: u64,
    /// Live -> Live resizes, identical-dimension ones included.
    pub resizes: u64,
    /// Times the render thread parked waiting for a live surface.
    pub parks: u64,
}

/// Everything the lock guards: the engine handle and all mutable bridge
/// state. The render thread and the host thread only ever see this
/// through the mutex.
pub(crate) struct Guarded<E: EngineHooks> {
    pub(crate) engine: E,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) surface: Surface,
    pub(crate) handle: Option<SurfaceHandle>,
    pub(crate) generation: u64,
    pub(crate) surface_created_sent: bool,
    pub(crate) stopping: bool,
    pub(crate) stats: BridgeStats,
}

/// State shared between the dispatcher and the render thread.
pub(crate) struct Shared<E: EngineHooks> {
    pub(crate) guarded: Mutex<Guarded<E>>,
    /// Wakes the render thread on Absent -> Live and on stop.
    pub(crate) surface_cv: Condvar,
    /// Latch ensuring fatal termination fires exactly once.
    pub(crate) failed: AtomicBool,
    pub(crate) fatal: FatalHandler,
}

impl<E: EngineHooks> Shared<E> {
    /// Terminates the bridge. Never returns.
    ///
    /// The latch guarantees the handler runs at most once even if two
    /// threads observe failures near-simultaneously; the trailing panic
    /// stops the losing thread (and any handler that dared to return).
    pub(crate) fn raise_fatal(&self, err: &BridgeError) -> ! {
        if !self.failed.swap(true, Ordering::SeqCst) {
            error!("fatal bridge failure: {err}");
            (self.fatal)(err);
        }
        panic!("bridge terminated: {err}");
    }
}

fn default_fatal(_err: &BridgeError) {
    // Diagnostic already logged by raise_fatal; the native side's state
    // is assumed corrupted beyond safe continuation.
    std::process::abort();
}

/// The lifecycle bridge for one native engine instance.
///
/// Owns the engine exclusively, the state machines, and (in
/// continuous-pull mode) the render thread. Host callbacks map onto the
/// methods below; each returns the call's [`FailureSignal`], and a failed
/// signal terminates the process before the method returns.
///
/// ## Usage
///
/// ```rust,ignore
/// let bridge = Bridge::new(engine, BridgeConfig::default());
/// bridge.on_create();
/// bridge.on_surface_changed(window_handle, 1280, 720);
/// // ... frames tick on the render thread while the surface is live ...
/// bridge.on_surface_destroyed();
/// bridge.on_destroy();
/// ```
pub struct Bridge<E: EngineHooks> {
    shared: Arc<Shared<E>>,
    config: BridgeConfig,
    pull: Option<PullLoop<E>>,
}

impl<E: EngineHooks> Bridge<E> {
    /// Creates a bridge around `engine` with the default fatal policy
    /// (log a diagnostic, then abort the process).
    ///
    /// In continuous-pull mode the render thread starts immediately and
    /// parks until a surface goes live.
    #[must_use]
    pub fn new(engine: E, config: BridgeConfig) -> Self {
        Self::with_fatal_handler(engine, config, Box::new(default_fatal))
    }

    /// Creates a bridge with a custom fatal handler.
    ///
    /// Whatever the handler does, no bridge call proceeds past a failure;
    /// the hook exists so tests can observe termination instead of dying.
    #[must_use]
    pub fn with_fatal_handler(engine: E, config: BridgeConfig, fatal: FatalHandler) -> Self {
        let shared = Arc::new(Shared {
            guarded: Mutex::new(Guarded {
                engine,
                lifecycle: Lifecycle::new(),
                surface: Surface::new(),
                handle: None,
                generation: 0,
                surface_created_sent: false,
                stopping: false,
                stats: BridgeStats::default(),
            }),
            surface_cv: Condvar::new(),
            failed: AtomicBool::new(false),
            fatal,
        });

        let pull = config.drive_mode.has_render_thread().then(|| {
            PullLoop::spawn(
                Arc::clone(&shared),
                config.frame_interval(),
                config.teardown_timeout(),
            )
        });

        Self {
            shared,
            config,
            pull,
        }
    }

    /// Host callback: component created. `Uninitialized -> Created`.
    pub fn on_create(&self) -> FailureSignal {
        self.entry_guard(EntryPoint::OnCreate);
        let mut g = self.shared.guarded.lock();
        if let Err(denied) = g.lifecycle.check_create() {
            self.refuse(EntryPoint::OnCreate, denied);
        }
        let signal = g.engine.on_create();
        self.interpret(EntryPoint::OnCreate, signal);
        g.lifecycle.commit_create();
        info!("engine instance created");
        FailureSignal::Ok
    }

    /// Host callback: component destroyed. `Created -> Destroyed`.
    ///
    /// The surface must already be torn down; the render thread (if any)
    /// is stopped with a bounded wait before the native call runs, since
    /// the native side may release everything at that point.
    pub fn on_destroy(&mut self) -> FailureSignal {
        self.entry_guard(EntryPoint::OnDestroy);
        {
            let g = self.shared.guarded.lock();
            if let Err(denied) = g.lifecycle.check_destroy() {
                self.refuse(EntryPoint::OnDestroy, denied);
            }
            if g.surface.is_live() {
                self.refuse(EntryPoint::OnDestroy, TransitionDenied::SurfaceStillLive);
            }
        }

        // Stop the render thread first. Once the stop flag is visible it
        // issues no further ticks, so the native side may tear down.
        if let Some(pull) = self.pull.take() {
            pull.stop();
        }

        let mut g = self.shared.guarded.lock();
        let signal = g.engine.on_destroy();
        self.interpret(EntryPoint::OnDestroy, signal);
        g.lifecycle.commit_destroy();
        info!("engine instance destroyed");
        FailureSignal::Ok
    }

    /// Host callback: surface created or resized.
    /// `Absent -> Live` (new generation) or `Live -> Live` (resize).
    ///
    /// On the first bind of the instance under continuous pull, the
    /// one-time `on_surface_created` entry point is issued before the
    /// first `on_surface_changed`. Equal-dimension resizes are forwarded
    /// verbatim.
    pub fn on_surface_changed(
        &self,
        raw: RawWindowHandle,
        width: u32,
        height: u32,
    ) -> FailureSignal {
        self.entry_guard(EntryPoint::OnSurfaceChanged);
        let mut g = self.shared.guarded.lock();
        if let Err(denied) = g.lifecycle.check_created() {
            self.refuse(EntryPoint::OnSurfaceChanged, denied);
        }

        match g.surface.classify_changed() {
            SurfaceChange::Bind => {
                let generation = g.generation + 1;
                let handle = SurfaceHandle::bind(raw, generation);

                if self.config.drive_mode.has_render_thread() && !g.surface_created_sent {
                    let signal = g.engine.on_surface_created();
                    self.interpret(EntryPoint::OnSurfaceCreated, signal);
                    g.surface_created_sent = true;
                }

                let signal = g.engine.on_surface_changed(&handle, width, height);
                self.interpret(EntryPoint::OnSurfaceChanged, signal);
                g.generation = generation;
                g.handle = Some(handle);
                g.surface.commit_changed(width, height);
                g.stats.binds += 1;
                info!(generation, width, height, "surface bound");
                drop(g);
                // Wake the render thread: there are frames to pull now.
                self.shared.surface_cv.notify_all();
            }
            SurfaceChange::Resize => {
                let handle = SurfaceHandle::bind(raw, g.generation);
                let signal = g.engine.on_surface_changed(&handle, width, height);
                self.interpret(EntryPoint::OnSurfaceChanged, signal);
                g.handle = Some(handle);
                g.surface.commit_changed(width, height);
                g.stats.resizes += 1;
                debug!(width, height, "surface resized");
            }
        }
        FailureSignal::Ok
    }

    /// Host callback: surface destroyed. `Live -> Absent`.
    ///
    /// Acquiring the lock waits out any in-flight draw tick, so the
    /// native call runs - and the borrowed handle is discarded - only
    /// once the render thread can no longer touch the surface. After this
    /// returns the host is free to recycle or invalidate the handle.
    pub fn on_surface_destroyed(&self) -> FailureSignal {
        self.entry_guard(EntryPoint::OnSurfaceDestroyed);
        let mut g = self.shared.guarded.lock();
        if let Err(denied) = g.surface.check_destroyed() {
            self.refuse(EntryPoint::OnSurfaceDestroyed, denied);
        }
        let signal = g.engine.on_surface_destroyed();
        self.interpret(EntryPoint::OnSurfaceDestroyed, signal);
        g.surface.commit_destroyed();
        if let Some(handle) = g.handle.take() {
            debug!(generation = handle.generation(), "surface handle discarded");
        }
        info!("surface destroyed");
        FailureSignal::Ok
    }

    /// Host callback: produce one frame now.
    ///
    /// The host-owned tick for event-driven deployments; drawing happens
    /// synchronously as a consequence of the host's own surface events,
    /// and between those events no frames are produced. Requires a live
    /// surface - a draw request while the surface is absent is a
    /// contract violation, not a skippable no-op.
    pub fn on_draw_frame(&self) -> FailureSignal {
        self.entry_guard(EntryPoint::OnDrawFrame);
        let mut g = self.shared.guarded.lock();
        if let Err(denied) = g.lifecycle.check_created() {
            self.refuse(EntryPoint::OnDrawFrame, denied);
        }
        if let Err(denied) = g.surface.check_live() {
            self.refuse(EntryPoint::OnDrawFrame, denied);
        }
        let signal = g.engine.on_draw_frame();
        self.interpret(EntryPoint::OnDrawFrame, signal);
        g.stats.ticks += 1;
        FailureSignal::Ok
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.shared.guarded.lock().lifecycle.state()
    }

    /// Current surface phase.
    #[must_use]
    pub fn surface_phase(&self) -> SurfacePhase {
        self.shared.guarded.lock().surface.phase()
    }

    /// Last committed surface dimensions.
    #[must_use]
    pub fn surface_dimensions(&self) -> (u32, u32) {
        self.shared.guarded.lock().surface.dimensions()
    }

    /// Current surface generation (0 while nothing was ever bound).
    #[must_use]
    pub fn surface_generation(&self) -> u64 {
        self.shared.guarded.lock().generation
    }

    /// Snapshot of the activity counters.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        self.shared.guarded.lock().stats
    }

    /// Returns `true` once a fatal failure was observed.
    ///
    /// Under the default fatal policy this is unobservable (the process
    /// is gone); it exists for tests with a substituted handler.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.shared.failed.load(Ordering::SeqCst)
    }

    /// The drive mode this bridge was built with.
    #[must_use]
    pub fn drive_mode(&self) -> DriveMode {
        self.config.drive_mode
    }

    /// Refuses calls after a fatal failure. In production the process is
    /// already gone; under a test handler this enforces that no further
    /// bridge call is ever issued.
    fn entry_guard(&self, call: EntryPoint) {
        assert!(
            !self.shared.failed.load(Ordering::SeqCst),
            "bridge call {call} after fatal failure; no further calls are permitted",
        );
    }

    /// Converts a refused transition into fatal termination. A wrong-state
    /// call indicates a broken host integration, not a recoverable error.
    fn refuse(&self, call: EntryPoint, denied: TransitionDenied) -> ! {
        self.shared
            .raise_fatal(&BridgeError::ContractViolation { call, denied })
    }

    /// Interprets a native signal: ok falls through, failed terminates.
    fn interpret(&self, call: EntryPoint, signal: FailureSignal) {
        if signal.is_failed() {
            self.shared.raise_fatal(&BridgeError::NativeFailure { call });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{panicking_fatal_handler, stub_surface, CallLog, RecordingEngine};

    fn event_driven() -> BridgeConfig {
        BridgeConfig {
            drive_mode: DriveMode::EventDriven,
            ..BridgeConfig::default()
        }
    }

    fn recording_bridge() -> (Bridge<RecordingEngine>, CallLog) {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log);
        let bridge = Bridge::with_fatal_handler(engine, event_driven(), panicking_fatal_handler());
        (bridge, log)
    }

    #[test]
    fn test_create_destroy_sequence() {
        let (mut bridge, log) = recording_bridge();
        assert_eq!(bridge.lifecycle_state(), LifecycleState::Uninitialized);

        assert!(bridge.on_create().is_ok());
        assert_eq!(bridge.lifecycle_state(), LifecycleState::Created);

        assert!(bridge.on_destroy().is_ok());
        assert_eq!(bridge.lifecycle_state(), LifecycleState::Destroyed);

        assert_eq!(log.calls(), vec![EntryPoint::OnCreate, EntryPoint::OnDestroy]);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_double_create_is_fatal() {
        let (bridge, _log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        let _ = bridge.on_create();
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_destroy_before_create_is_fatal() {
        let (mut bridge, _log) = recording_bridge();
        let _ = bridge.on_destroy();
    }

    #[test]
    #[should_panic(expected = "surface still live")]
    fn test_destroy_with_live_surface_is_fatal() {
        let (mut bridge, _log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        let _ = bridge.on_destroy();
    }

    #[test]
    fn test_surface_bind_commits_state_and_generation() {
        let (bridge, _log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        assert_eq!(bridge.surface_generation(), 0);

        assert!(bridge.on_surface_changed(stub_surface(), 640, 480).is_ok());
        assert_eq!(bridge.surface_phase(), SurfacePhase::Live);
        assert_eq!(bridge.surface_dimensions(), (640, 480));
        assert_eq!(bridge.surface_generation(), 1);
    }

    #[test]
    fn test_rebind_bumps_generation() {
        let (bridge, _log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert!(bridge.on_surface_destroyed().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert_eq!(bridge.surface_generation(), 2);
        assert_eq!(bridge.stats().binds, 2);
    }

    #[test]
    fn test_identical_resize_is_forwarded_exactly_once() {
        let (bridge, log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());

        // Two native surface_changed calls: the bind and the (identical)
        // resize. The bridge does not deduplicate.
        assert_eq!(log.count(EntryPoint::OnSurfaceChanged), 2);
        assert_eq!(bridge.stats().resizes, 1);
    }

    #[test]
    fn test_event_driven_never_sends_surface_created() {
        let (bridge, log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert_eq!(log.count(EntryPoint::OnSurfaceCreated), 0);
    }

    #[test]
    #[should_panic(expected = "no live surface")]
    fn test_draw_without_surface_is_fatal() {
        let (bridge, _log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        let _ = bridge.on_draw_frame();
    }

    #[test]
    #[should_panic(expected = "not created")]
    fn test_surface_changed_before_create_is_fatal() {
        let (bridge, _log) = recording_bridge();
        let _ = bridge.on_surface_changed(stub_surface(), 1, 1);
    }

    #[test]
    #[should_panic(expected = "no live surface")]
    fn test_surface_destroyed_without_bind_is_fatal() {
        let (bridge, _log) = recording_bridge();
        assert!(bridge.on_create().is_ok());
        let _ = bridge.on_surface_destroyed();
    }

    #[test]
    fn test_failed_create_commits_nothing() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log).fail_at(EntryPoint::OnCreate, 1);
        let bridge = Bridge::with_fatal_handler(engine, event_driven(), panicking_fatal_handler());

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = bridge.on_create();
        }));
        assert!(outcome.is_err());
        assert!(bridge.has_failed());
        // The native call failed, so the lifecycle never reached Created.
        assert_eq!(bridge.lifecycle_state(), LifecycleState::Uninitialized);
        assert_eq!(log.total(), 1);
    }

    #[test]
    fn test_no_call_after_fatal_failure() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log).fail_at(EntryPoint::OnSurfaceChanged, 1);
        let bridge = Bridge::with_fatal_handler(engine, event_driven(), panicking_fatal_handler());

        assert!(bridge.on_create().is_ok());
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = bridge.on_surface_changed(stub_surface(), 100, 100);
        }));
        assert!(outcome.is_err());

        let calls_at_failure = log.total();
        // Any further bridge call is refused before reaching the engine.
        let followup = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = bridge.on_draw_frame();
        }));
        assert!(followup.is_err());
        assert_eq!(log.total(), calls_at_failure);
    }

    #[test]
    fn test_failed_resize_keeps_previous_dimensions() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log).fail_at(EntryPoint::OnSurfaceChanged, 2);
        let bridge = Bridge::with_fatal_handler(engine, event_driven(), panicking_fatal_handler());

        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = bridge.on_surface_changed(stub_surface(), 999, 999);
        }));
        assert!(outcome.is_err());
        // Atomicity: the failed resize never became visible state.
        assert_eq!(bridge.surface_dimensions(), (100, 100));
    }
}
