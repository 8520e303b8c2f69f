//! Dispatcher hot-path benchmark: what one draw tick and one resize cost
//! on top of the native call itself.

use criterion::{criterion_group, criterion_main, Criterion};

use kharon_bridge::testing::{stub_surface, NullEngine};
use kharon_bridge::Bridge;
use kharon_core::{BridgeConfig, DriveMode};

fn event_driven_bridge() -> Bridge<NullEngine> {
    let config = BridgeConfig {
        drive_mode: DriveMode::EventDriven,
        ..BridgeConfig::default()
    };
    let bridge = Bridge::new(NullEngine, config);
    assert!(bridge.on_create().is_ok());
    assert!(bridge.on_surface_changed(stub_surface(), 1920, 1080).is_ok());
    bridge
}

fn bench_draw_tick(c: &mut Criterion) {
    let bridge = event_driven_bridge();
    c.bench_function("dispatch/draw_tick", |b| b.iter(|| bridge.on_draw_frame()));
}

fn bench_resize(c: &mut Criterion) {
    let bridge = event_driven_bridge();
    c.bench_function("dispatch/resize", |b| {
        b.iter(|| bridge.on_surface_changed(stub_surface(), 1920, 1080))
    });
}

criterion_group!(benches, bench_draw_tick, bench_resize);
criterion_main!(benches);
