//! # Surface State Machine
//!
//! Tracks drawable-surface existence and size, nested inside a created
//! engine instance:
//!
//! ```text
//! Absent ──changed──> Live{w,h} ──changed──> Live{w,h}   (resize)
//!   ^                    │
//!   └────destroyed───────┘
//! ```
//!
//! There is no terminal state: the surface may cycle Live -> Absent -> Live
//! for the whole life of the instance (app backgrounding/foregrounding).
//! A resize with unchanged dimensions is still a valid transition and is
//! still forwarded; deduplication is the native side's job, not the
//! bridge's.
//!
//! Gating on the lifecycle being `Created` is the dispatcher's
//! responsibility; this machine only knows its own timeline.

use std::fmt;

use crate::error::TransitionDenied;

/// Whether a drawable surface is currently bound.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfacePhase {
    /// No surface. Draw ticks must not reach the native side.
    Absent,
    /// A surface is bound and frames may be produced.
    Live,
}

impl SurfacePhase {
    /// Returns `true` if a surface is bound.
    #[inline]
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for SurfacePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::Live => f.write_str("live"),
        }
    }
}

/// What kind of transition an incoming `changed` event is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceChange {
    /// Absent -> Live: a new surface generation begins, the handle must
    /// be marshalled.
    Bind,
    /// Live -> Live: same generation, new (possibly identical) dimensions.
    Resize,
}

/// The surface state machine for the current engine instance.
///
/// Check/commit split like [`crate::lifecycle::Lifecycle`]: dimensions and
/// phase move only after the native call succeeded.
#[derive(Debug)]
pub struct Surface {
    phase: SurfacePhase,
    width: u32,
    height: u32,
}

impl Surface {
    /// A fresh machine: `Absent`, zero-sized.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: SurfacePhase::Absent,
            width: 0,
            height: 0,
        }
    }

    /// Current phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> SurfacePhase {
        self.phase
    }

    /// Returns `true` if a surface is bound.
    #[inline]
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.phase.is_live()
    }

    /// Last committed dimensions, `(0, 0)` while nothing was ever bound.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Classifies an incoming `changed` event.
    ///
    /// `changed` is legal from both phases, so there is nothing to check;
    /// the caller needs to know whether a new generation starts.
    #[must_use]
    pub const fn classify_changed(&self) -> SurfaceChange {
        match self.phase {
            SurfacePhase::Absent => SurfaceChange::Bind,
            SurfacePhase::Live => SurfaceChange::Resize,
        }
    }

    /// Commits a `changed` transition after the native call succeeded.
    pub fn commit_changed(&mut self, width: u32, height: u32) {
        self.phase = SurfacePhase::Live;
        self.width = width;
        self.height = height;
    }

    /// Validates that a surface is live, the precondition shared by draw
    /// ticks and by the `destroyed` transition.
    ///
    /// # Errors
    ///
    /// Refused while no surface is bound.
    pub fn check_live(&self) -> Result<(), TransitionDenied> {
        match self.phase {
            SurfacePhase::Live => Ok(()),
            SurfacePhase::Absent => Err(TransitionDenied::SurfaceAbsent { phase: self.phase }),
        }
    }

    /// Validates `destroyed` without committing it.
    ///
    /// # Errors
    ///
    /// Refused while no surface is live: a `destroyed` with no prior
    /// `changed` is a broken host integration.
    pub fn check_destroyed(&self) -> Result<(), TransitionDenied> {
        self.check_live()
    }

    /// Commits `destroyed` after the native call succeeded.
    ///
    /// Dimensions are kept as a last-known size for diagnostics; the
    /// phase alone gates draw ticks.
    ///
    /// # Panics
    ///
    /// Debug-asserts the transition was checked first.
    pub fn commit_destroyed(&mut self) {
        debug_assert!(
            self.check_destroyed().is_ok(),
            "surface destroy committed without check"
        );
        self.phase = SurfacePhase::Absent;
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}
