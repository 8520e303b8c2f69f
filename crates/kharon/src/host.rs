//! # Scripted Host
//!
//! A host shell, reduced to the sequence of callbacks it delivers. Real
//! hosts (an activity, a windowing shell) are external collaborators; for
//! demos and tests the interesting part is only the order of lifecycle
//! and surface events, so that order is made a value.
//!
//! Replay drives an event-driven bridge: draw requests in the script are
//! the host-owned ticks of that mode. A continuous-pull bridge produces
//! frames on its own thread and is driven by real callbacks instead.

use raw_window_handle::RawWindowHandle;
use tracing::debug;

use kharon_bridge::{Bridge, EngineHooks};

/// One host callback, as delivered to the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// Component created.
    Create,
    /// Drawable surface appeared or changed size.
    SurfaceChanged {
        /// New surface width in pixels.
        width: u32,
        /// New surface height in pixels.
        height: u32,
    },
    /// The host requests this many frames, one tick each.
    DrawFrames(u32),
    /// Drawable surface is going away.
    SurfaceDestroyed,
    /// Component destroyed.
    Destroy,
}

/// Replays a script against a bridge, event by event.
///
/// Every call's signal is asserted ok - under the bridge's propagation
/// policy a failure would have terminated before returning, so a
/// non-ok signal here means the bridge itself is broken.
pub fn replay<E: EngineHooks>(
    bridge: &mut Bridge<E>,
    surface: RawWindowHandle,
    script: &[HostEvent],
) {
    for event in script {
        debug!(?event, "host event");
        match *event {
            HostEvent::Create => assert!(bridge.on_create().is_ok()),
            HostEvent::SurfaceChanged { width, height } => {
                assert!(bridge.on_surface_changed(surface, width, height).is_ok());
            }
            HostEvent::DrawFrames(count) => {
                for _ in 0..count {
                    assert!(bridge.on_draw_frame().is_ok());
                }
            }
            HostEvent::SurfaceDestroyed => assert!(bridge.on_surface_destroyed().is_ok()),
            HostEvent::Destroy => assert!(bridge.on_destroy().is_ok()),
        }
    }
}

/// The callback sequence a typical app run delivers: create, bind, a few
/// frames, a same-size change (the host re-reporting after a chrome
/// adjustment), more frames, then orderly teardown.
#[must_use]
pub fn demo_script(width: u32, height: u32) -> Vec<HostEvent> {
    vec![
        HostEvent::Create,
        HostEvent::SurfaceChanged { width, height },
        HostEvent::DrawFrames(3),
        HostEvent::SurfaceChanged { width, height },
        HostEvent::DrawFrames(2),
        HostEvent::SurfaceDestroyed,
        HostEvent::Destroy,
    ]
}
