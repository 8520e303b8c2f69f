//! # Shell Simulator
//!
//! A stand-in host shell driving the bridge end to end, in both drive
//! modes, against a toy engine that only logs and counts. Run with
//! `RUST_LOG=debug` to watch every transition.

use std::time::Duration;

use tracing::info;

use kharon::host::{demo_script, replay};
use kharon::{Bridge, BridgeConfig, DriveMode, EngineHooks, FailureSignal, SurfaceHandle};
use kharon_bridge::testing::stub_surface;

/// A native engine reduced to a frame counter.
struct DemoEngine {
    label: &'static str,
    frames: u64,
}

impl DemoEngine {
    fn new(label: &'static str) -> Self {
        Self { label, frames: 0 }
    }
}

impl EngineHooks for DemoEngine {
    fn on_create(&mut self) -> FailureSignal {
        info!(engine = self.label, "native: create");
        FailureSignal::Ok
    }

    fn on_destroy(&mut self) -> FailureSignal {
        info!(engine = self.label, frames = self.frames, "native: destroy");
        FailureSignal::Ok
    }

    fn on_surface_created(&mut self) -> FailureSignal {
        info!(engine = self.label, "native: surface created (context setup)");
        FailureSignal::Ok
    }

    fn on_surface_changed(
        &mut self,
        surface: &SurfaceHandle,
        width: u32,
        height: u32,
    ) -> FailureSignal {
        info!(
            engine = self.label,
            generation = surface.generation(),
            width,
            height,
            "native: surface changed"
        );
        FailureSignal::Ok
    }

    fn on_surface_destroyed(&mut self) -> FailureSignal {
        info!(engine = self.label, "native: surface destroyed");
        FailureSignal::Ok
    }

    fn on_draw_frame(&mut self) -> FailureSignal {
        self.frames += 1;
        FailureSignal::Ok
    }
}

fn run_continuous() {
    info!("=== continuous pull mode ===");
    let config = BridgeConfig::default();
    let mut bridge = Bridge::new(DemoEngine::new("pull"), config);

    assert!(bridge.on_create().is_ok());
    assert!(bridge.on_surface_changed(stub_surface(), 1280, 720).is_ok());

    // The render thread ticks on its own while the surface is live.
    std::thread::sleep(Duration::from_millis(100));
    assert!(bridge.on_surface_changed(stub_surface(), 1920, 1080).is_ok());
    std::thread::sleep(Duration::from_millis(100));

    assert!(bridge.on_surface_destroyed().is_ok());
    assert!(bridge.on_destroy().is_ok());

    let stats = bridge.stats();
    info!(
        ticks = stats.ticks,
        binds = stats.binds,
        resizes = stats.resizes,
        parks = stats.parks,
        "continuous run finished"
    );
}

fn run_event_driven() {
    info!("=== event driven mode ===");
    let config = BridgeConfig {
        drive_mode: DriveMode::EventDriven,
        ..BridgeConfig::default()
    };
    let mut bridge = Bridge::new(DemoEngine::new("event"), config);

    replay(&mut bridge, stub_surface(), &demo_script(1280, 720));

    let stats = bridge.stats();
    info!(ticks = stats.ticks, "event-driven run finished");
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    run_continuous();
    run_event_driven();
}
