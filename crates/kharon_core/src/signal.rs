//! # Failure Signal
//!
//! The outcome of a single call across the foreign-function boundary.
//!
//! Every entry point returns one of these. It is deliberately not a
//! `Result`: the native side carries no error payload across the boundary,
//! only "I survived" or "my internal state is gone". Interpretation (and
//! the decision to terminate the process) belongs to the dispatcher, the
//! single topmost caller.

use std::fmt;

/// Boolean-valued outcome of a bridge call.
///
/// A `Failed` signal means the native side considers its internal state
/// corrupted beyond safe continuation. It is never retried and never
/// surfaced to the host as a branchable value; the dispatcher converts it
/// into process termination.
#[must_use = "a failure signal must be interpreted; dropping it can hide a fatal native failure"]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureSignal {
    /// The native call completed normally.
    Ok,
    /// The native call signalled an unrecoverable failure.
    Failed,
}

impl FailureSignal {
    /// Returns `true` if the call completed normally.
    #[inline]
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns `true` if the call signalled failure.
    #[inline]
    #[must_use]
    pub const fn is_failed(self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Builds a signal from the raw boolean the boundary carries
    /// (`true` = survived, matching the host-side panic check).
    #[inline]
    pub const fn from_bool(ok: bool) -> Self {
        if ok {
            Self::Ok
        } else {
            Self::Failed
        }
    }

    /// Collapses the signal back to the raw boundary boolean.
    #[inline]
    #[must_use]
    pub const fn as_bool(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl From<bool> for FailureSignal {
    fn from(ok: bool) -> Self {
        Self::from_bool(ok)
    }
}

impl From<FailureSignal> for bool {
    fn from(signal: FailureSignal) -> Self {
        signal.as_bool()
    }
}

impl fmt::Display for FailureSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

/// The closed set of native entry points the bridge may invoke.
///
/// The callback set is fixed and known in advance, so this is an enum
/// rather than an open-ended callback registry. Used for diagnostics and
/// for asserting call sequences in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// Engine instance creation.
    OnCreate,
    /// Engine instance teardown.
    OnDestroy,
    /// One-time context setup before the first surface bind.
    OnSurfaceCreated,
    /// Surface bind or resize.
    OnSurfaceChanged,
    /// Surface teardown.
    OnSurfaceDestroyed,
    /// One frame tick.
    OnDrawFrame,
}

impl EntryPoint {
    /// Stable snake_case name, used in logs and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OnCreate => "on_create",
            Self::OnDestroy => "on_destroy",
            Self::OnSurfaceCreated => "on_surface_created",
            Self::OnSurfaceChanged => "on_surface_changed",
            Self::OnSurfaceDestroyed => "on_surface_destroyed",
            Self::OnDrawFrame => "on_draw_frame",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
