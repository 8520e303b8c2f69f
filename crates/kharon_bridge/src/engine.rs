//! # Engine Entry Points
//!
//! The closed set of calls the bridge may make into the native engine.
//! This is a trait rather than a callback registry: the call set is fixed
//! and known in advance, and the dispatcher is its only caller.
//!
//! Every call is a direct, blocking, synchronous invocation that runs to
//! completion; there is no cancellation of an in-flight call. Every call
//! returns a [`FailureSignal`] - the observed legacy shape where some
//! entry points returned nothing (and therefore could not report a panic)
//! is deliberately not reproduced.

use kharon_core::FailureSignal;

use crate::handle::SurfaceHandle;

/// The native engine's bridge entry points.
///
/// The dispatcher guarantees the documented preconditions before each
/// call; an implementation may rely on them without re-checking. All
/// calls for one engine instance are serialized under a single lock, so
/// implementations need no internal synchronization against the bridge.
pub trait EngineHooks: Send + 'static {
    /// Instance creation. First call ever made; runs once.
    fn on_create(&mut self) -> FailureSignal;

    /// Instance teardown. Last call ever made; the surface is already
    /// gone and the render thread (if any) no longer issues ticks, so
    /// the engine may release everything.
    fn on_destroy(&mut self) -> FailureSignal;

    /// One-time context setup, issued before the first
    /// [`on_surface_changed`](Self::on_surface_changed) of the instance.
    /// Only issued under the continuous-pull drive mode.
    fn on_surface_created(&mut self) -> FailureSignal;

    /// A surface was bound or resized. The instance is created; `surface`
    /// is valid until the matching
    /// [`on_surface_destroyed`](Self::on_surface_destroyed) returns.
    ///
    /// Equal-dimension resizes are forwarded verbatim; deduplicating them
    /// is the engine's job.
    fn on_surface_changed(
        &mut self,
        surface: &SurfaceHandle,
        width: u32,
        height: u32,
    ) -> FailureSignal;

    /// The surface is going away. After this returns, the host is free to
    /// recycle or invalidate the underlying handle; the engine must drop
    /// every reference to it before returning.
    fn on_surface_destroyed(&mut self) -> FailureSignal;

    /// Produce one frame. Only issued while a surface is live.
    fn on_draw_frame(&mut self) -> FailureSignal;
}
