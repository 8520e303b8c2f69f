//! # KHARON
//!
//! The lifecycle bridge, assembled.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           KHARON                                 │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  host shell ──callbacks──> ┌──────────────────┐                  │
//! │  (out of scope)            │ kharon_bridge    │ ──entry points─> │
//! │                            │  dispatcher      │    native engine │
//! │                            │  render loop     │   (out of scope) │
//! │                            └────────┬─────────┘                  │
//! │                                     │                            │
//! │                            ┌────────┴─────────┐                  │
//! │                            │ kharon_core      │                  │
//! │                            │  state machines  │                  │
//! │                            │  failure signal  │                  │
//! │                            └──────────────────┘                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `host`: scripted host-event sequences and their replay driver

pub mod host;

pub use kharon_bridge::{Bridge, BridgeStats, EngineHooks, SurfaceHandle};
pub use kharon_core::{BridgeConfig, DriveMode, EntryPoint, FailureSignal};
