//! # Render Loop Driver
//!
//! Owns the render-thread timeline. Two admissible strategies, chosen per
//! deployment and never mixed within one instance:
//!
//! - **Continuous pull** ([`PullLoop`]): a dedicated thread repeatedly
//!   issues draw ticks as fast as the display pipeline accepts frames,
//!   independent of lifecycle callbacks. While the surface is absent it
//!   parks on the dispatcher's condvar without issuing ticks, and resumes
//!   promptly when a surface goes live.
//! - **Event driven**: no thread at all. The host produces frames
//!   synchronously through its own surface-event callbacks
//!   ([`crate::Bridge::on_draw_frame`]); between those events no frames
//!   exist. This file only documents that mode - there is nothing to
//!   drive.
//!
//! Ticks run under the dispatcher lock, so a host-thread teardown call
//! waits out any in-flight tick before its native call runs. The stop
//! handshake is bounded: teardown waits `teardown_timeout` for the
//! thread's acknowledgement and detaches it on expiry rather than hanging
//! the host callback.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use kharon_core::{BridgeError, EntryPoint};

use crate::dispatcher::Shared;
use crate::engine::EngineHooks;

/// The continuous-pull render thread and its stop handshake.
pub(crate) struct PullLoop<E: EngineHooks> {
    shared: Arc<Shared<E>>,
    thread: Option<JoinHandle<()>>,
    stopped_rx: Receiver<()>,
    timeout: Duration,
}

impl<E: EngineHooks> PullLoop<E> {
    /// Spawns the render thread. It starts parked: no surface is live yet.
    pub(crate) fn spawn(
        shared: Arc<Shared<E>>,
        frame_interval: Option<Duration>,
        timeout: Duration,
    ) -> Self {
        let (stopped_tx, stopped_rx) = bounded(1);
        let thread_shared = Arc::clone(&shared);
        let thread = std::thread::Builder::new()
            .name("kharon-render".to_string())
            .spawn(move || run(&thread_shared, frame_interval, &stopped_tx))
            .expect("failed to spawn render thread");

        Self {
            shared,
            thread: Some(thread),
            stopped_rx,
            timeout,
        }
    }

    /// Stops the thread before instance teardown. Once the stop flag is
    /// visible the thread issues no further ticks; the wait for its
    /// acknowledgement is bounded by the configured timeout.
    pub(crate) fn stop(mut self) {
        self.stop_impl();
    }

    fn stop_impl(&mut self) {
        if self.thread.is_none() {
            return;
        }
        {
            self.shared.guarded.lock().stopping = true;
        }
        self.shared.surface_cv.notify_all();

        match self.stopped_rx.recv_timeout(self.timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.thread.take() {
                    if handle.join().is_err() {
                        // The thread died on the fatal path; the latch
                        // already handled termination.
                        debug!("render thread exited by panic");
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "render thread did not acknowledge stop in time; detaching it"
                );
                // The stop flag is set: the thread can finish at most the
                // tick it already started, never begin another.
                drop(self.thread.take());
            }
        }
    }
}

impl<E: EngineHooks> Drop for PullLoop<E> {
    fn drop(&mut self) {
        self.stop_impl();
    }
}

/// The render thread body.
///
/// Every tick runs under the dispatcher lock: acquire, re-check that a
/// surface is live and nothing failed, invoke the native draw, release.
/// While the surface is absent the thread waits on the condvar (a park,
/// not a spin) and is woken by the next bind or by the stop flag.
fn run<E: EngineHooks>(
    shared: &Arc<Shared<E>>,
    frame_interval: Option<Duration>,
    stopped_tx: &Sender<()>,
) {
    debug!("render thread started");
    loop {
        let mut g = shared.guarded.lock();
        while !g.stopping && !g.surface.is_live() {
            g.stats.parks += 1;
            shared.surface_cv.wait(&mut g);
        }
        if g.stopping {
            break;
        }
        // A failure observed on the host thread also ends the loop: after
        // a fatal signal no native call may ever be issued again.
        if shared.failed.load(Ordering::SeqCst) {
            break;
        }

        let signal = g.engine.on_draw_frame();
        if signal.is_failed() {
            drop(g);
            shared.raise_fatal(&BridgeError::NativeFailure {
                call: EntryPoint::OnDrawFrame,
            });
        }
        g.stats.ticks += 1;
        drop(g);

        if let Some(interval) = frame_interval {
            std::thread::sleep(interval);
        }
    }
    debug!("render thread stopped");
    let _ = stopped_tx.send(());
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use kharon_core::{BridgeConfig, EntryPoint, LifecycleState, SurfacePhase};

    use crate::dispatcher::{Bridge, FatalHandler};
    use crate::testing::{panicking_fatal_handler, stub_surface, CallLog, RecordingEngine};

    fn pull_config() -> BridgeConfig {
        BridgeConfig {
            teardown_timeout_ms: 200,
            ..BridgeConfig::default()
        }
    }

    fn wait_until(deadline: Duration, mut cond: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    #[test]
    fn test_ticks_only_while_live() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log);
        let mut bridge =
            Bridge::with_fatal_handler(engine, pull_config(), panicking_fatal_handler());

        assert!(bridge.on_create().is_ok());
        // No surface yet: the thread parks without issuing ticks.
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(log.count(EntryPoint::OnDrawFrame), 0);

        assert!(bridge.on_surface_changed(stub_surface(), 320, 240).is_ok());
        assert!(wait_until(Duration::from_secs(2), || bridge.stats().ticks >= 3));

        assert!(bridge.on_surface_destroyed().is_ok());
        let drawn_at_teardown = log.count(EntryPoint::OnDrawFrame);
        std::thread::sleep(Duration::from_millis(50));
        // Not a single tick after the surface went absent.
        assert_eq!(log.count(EntryPoint::OnDrawFrame), drawn_at_teardown);

        assert!(bridge.on_destroy().is_ok());
        assert_eq!(bridge.lifecycle_state(), LifecycleState::Destroyed);

        // No draw ever follows the surface-destroyed call in the log.
        let calls = log.calls();
        let teardown_idx = calls
            .iter()
            .position(|c| *c == EntryPoint::OnSurfaceDestroyed)
            .expect("surface teardown recorded");
        assert!(calls[teardown_idx..]
            .iter()
            .all(|c| *c != EntryPoint::OnDrawFrame));
    }

    #[test]
    fn test_surface_created_once_before_first_changed() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log);
        let mut bridge =
            Bridge::with_fatal_handler(engine, pull_config(), panicking_fatal_handler());

        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert!(bridge.on_surface_destroyed().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert!(bridge.on_surface_destroyed().is_ok());
        assert!(bridge.on_destroy().is_ok());

        let calls = log.calls();
        // One-time context setup, immediately before the first changed.
        assert_eq!(log.count(EntryPoint::OnSurfaceCreated), 1);
        assert_eq!(
            &calls[..3],
            &[
                EntryPoint::OnCreate,
                EntryPoint::OnSurfaceCreated,
                EntryPoint::OnSurfaceChanged
            ]
        );
    }

    #[test]
    fn test_resumes_after_rebind() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log);
        let mut bridge =
            Bridge::with_fatal_handler(engine, pull_config(), panicking_fatal_handler());

        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());
        assert!(wait_until(Duration::from_secs(2), || bridge.stats().ticks >= 1));
        assert!(bridge.on_surface_destroyed().is_ok());
        assert_eq!(bridge.surface_phase(), SurfacePhase::Absent);

        let parked_ticks = bridge.stats().ticks;
        assert!(bridge.on_surface_changed(stub_surface(), 200, 200).is_ok());
        // Backgrounding over: ticking resumes promptly.
        assert!(wait_until(Duration::from_secs(2), || {
            bridge.stats().ticks > parked_ticks
        }));

        assert!(bridge.on_surface_destroyed().is_ok());
        assert!(bridge.on_destroy().is_ok());
    }

    #[test]
    fn test_failed_draw_terminates_exactly_once() {
        let log = CallLog::default();
        let engine = RecordingEngine::new(&log).fail_at(EntryPoint::OnDrawFrame, 1);

        let hits = Arc::new(AtomicUsize::new(0));
        let handler_hits = Arc::clone(&hits);
        let handler: FatalHandler = Box::new(move |err| {
            handler_hits.fetch_add(1, Ordering::SeqCst);
            panic!("test fatal: {err}");
        });
        let bridge = Bridge::with_fatal_handler(engine, pull_config(), handler);

        assert!(bridge.on_create().is_ok());
        assert!(bridge.on_surface_changed(stub_surface(), 100, 100).is_ok());

        assert!(wait_until(Duration::from_secs(2), || bridge.has_failed()));
        std::thread::sleep(Duration::from_millis(50));

        // The loop stopped at the failing tick and the handler fired once.
        assert_eq!(log.count(EntryPoint::OnDrawFrame), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
