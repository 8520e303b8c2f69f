//! # KHARON Bridge
//!
//! The crossing between a host shell and a native engine. Two
//! independently-scheduled timelines (component lifecycle, drawable
//! surface) and up to two threads (host callbacks, render loop) meet here
//! and are serialized so the native side never observes an invalid
//! surface, a call before initialization, or a call after teardown.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        BRIDGE DISPATCHER                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  host callback ──> validate ──> marshal ──> invoke native        │
//! │                        │                        │                │
//! │                  state machines           FailureSignal          │
//! │                 (lifecycle/surface)      ok │      │ failed      │
//! │                        │                    │      │             │
//! │                  commit on success <────────┘      └──> FATAL    │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  render thread (continuous pull only):                           │
//! │    park while Absent ── tick while Live ── stop on teardown      │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## FERRYMAN'S MANDATE
//!
//! - One lock. Host transitions and draw ticks never interleave mid-call.
//! - State moves only after the native call returned ok.
//! - A failed signal is terminal: log, terminate, never continue.

#![deny(missing_docs)]
// Note: the handle module locally allows unsafe code for host surface tokens
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod dispatcher;
pub mod engine;
pub mod handle;
mod render_loop;
pub mod testing;

pub use dispatcher::{Bridge, BridgeStats, FatalHandler};
pub use engine::EngineHooks;
pub use handle::SurfaceHandle;
