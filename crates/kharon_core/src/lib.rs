//! # KHARON Core
//!
//! Contract types for the lifecycle bridge between a host shell and a
//! native engine:
//! - Two independent timelines (component lifecycle, drawable surface)
//!   multiplexed into explicit state machines
//! - A boolean failure signal on every boundary call
//! - Fatal, non-recoverable error propagation
//!
//! ## Architecture Rules
//!
//! 1. **State commits only on success** - a native call that fails leaves
//!    the state machines untouched
//! 2. **Closed call set** - the boundary is six entry points, nothing else
//! 3. **No recovery** - a failed signal is terminal for the process
//!
//! This crate holds no locks and spawns no threads; the dispatcher in
//! `kharon_bridge` owns the concurrency discipline.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod signal;
pub mod surface;

pub use config::{BridgeConfig, ConfigError, DriveMode};
pub use error::{BridgeError, TransitionDenied};
pub use lifecycle::{Lifecycle, LifecycleState};
pub use signal::{EntryPoint, FailureSignal};
pub use surface::{Surface, SurfaceChange, SurfacePhase};
