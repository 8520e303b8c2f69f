//! # Lifecycle State Machine
//!
//! Tracks engine-instance existence, independent of any surface:
//!
//! ```text
//! Uninitialized ──create──> Created ──destroy──> Destroyed (terminal)
//! ```
//!
//! The machine is check/commit split: the dispatcher validates a
//! transition, invokes the native entry point, and commits only if the
//! native call succeeded. A failed call must leave the machine exactly
//! where it was.
//!
//! The ordering constraint between this timeline and the surface timeline
//! (no `destroy` while a surface is live) is enforced by the dispatcher,
//! not here - the two are driven by different host callbacks that may race.

use std::fmt;

use crate::error::TransitionDenied;

/// Where an engine instance is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No native instance exists yet.
    Uninitialized,
    /// The native instance is live and may receive calls.
    Created,
    /// The native instance has been torn down. Terminal.
    Destroyed,
}

impl LifecycleState {
    /// Returns `true` if the instance is live.
    #[inline]
    #[must_use]
    pub const fn is_created(self) -> bool {
        matches!(self, Self::Created)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => f.write_str("uninitialized"),
            Self::Created => f.write_str("created"),
            Self::Destroyed => f.write_str("destroyed"),
        }
    }
}

/// The lifecycle state machine for the single engine instance.
///
/// Accepts exactly the sequence `create destroy?` and refuses everything
/// else: double-create, destroy-before-create and any call after the
/// terminal state are integration bugs, reported so the dispatcher can
/// fail fast.
#[derive(Debug)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    /// A fresh machine in `Uninitialized`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Validates `create` without committing it.
    ///
    /// # Errors
    ///
    /// Refused from any state but `Uninitialized`.
    pub fn check_create(&self) -> Result<(), TransitionDenied> {
        match self.state {
            LifecycleState::Uninitialized => Ok(()),
            LifecycleState::Created => Err(TransitionDenied::AlreadyCreated),
            LifecycleState::Destroyed => Err(TransitionDenied::Destroyed),
        }
    }

    /// Commits `create` after the native call succeeded.
    ///
    /// # Panics
    ///
    /// Debug-asserts the transition was checked first.
    pub fn commit_create(&mut self) {
        debug_assert!(self.check_create().is_ok(), "create committed without check");
        self.state = LifecycleState::Created;
    }

    /// Validates that the instance is live, the precondition shared by
    /// every surface operation and by draw ticks.
    ///
    /// # Errors
    ///
    /// Refused from any state but `Created`.
    pub fn check_created(&self) -> Result<(), TransitionDenied> {
        match self.state {
            LifecycleState::Created => Ok(()),
            LifecycleState::Uninitialized => Err(TransitionDenied::NotCreated {
                state: self.state,
            }),
            LifecycleState::Destroyed => Err(TransitionDenied::Destroyed),
        }
    }

    /// Validates `destroy` without committing it.
    ///
    /// # Errors
    ///
    /// Refused from any state but `Created`.
    pub fn check_destroy(&self) -> Result<(), TransitionDenied> {
        self.check_created()
    }

    /// Commits `destroy` after the native call succeeded.
    ///
    /// # Panics
    ///
    /// Debug-asserts the transition was checked first.
    pub fn commit_destroy(&mut self) {
        debug_assert!(self.check_destroy().is_ok(), "destroy committed without check");
        self.state = LifecycleState::Destroyed;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_create_then_destroy() {
        let mut lc = Lifecycle::new();
        assert_eq!(lc.state(), LifecycleState::Uninitialized);

        assert!(lc.check_create().is_ok());
        lc.commit_create();
        assert_eq!(lc.state(), LifecycleState::Created);
        assert!(lc.state().is_created());

        assert!(lc.check_destroy().is_ok());
        lc.commit_destroy();
        assert_eq!(lc.state(), LifecycleState::Destroyed);
    }

    #[test]
    fn test_create_alone_is_valid() {
        // `create destroy?` - the destroy is optional.
        let mut lc = Lifecycle::new();
        lc.commit_create();
        assert!(lc.state().is_created());
    }

    #[test]
    fn test_rejects_double_create() {
        let mut lc = Lifecycle::new();
        lc.commit_create();
        assert_eq!(lc.check_create(), Err(TransitionDenied::AlreadyCreated));
    }

    #[test]
    fn test_rejects_destroy_before_create() {
        let lc = Lifecycle::new();
        assert_eq!(
            lc.check_destroy(),
            Err(TransitionDenied::NotCreated {
                state: LifecycleState::Uninitialized
            })
        );
    }

    #[test]
    fn test_rejects_double_destroy() {
        let mut lc = Lifecycle::new();
        lc.commit_create();
        lc.commit_destroy();
        assert_eq!(lc.check_destroy(), Err(TransitionDenied::Destroyed));
    }

    #[test]
    fn test_destroyed_is_terminal() {
        let mut lc = Lifecycle::new();
        lc.commit_create();
        lc.commit_destroy();
        // Nothing is accepted after the terminal state.
        assert_eq!(lc.check_create(), Err(TransitionDenied::Destroyed));
        assert_eq!(lc.check_destroy(), Err(TransitionDenied::Destroyed));
    }

    #[test]
    fn test_failed_native_call_leaves_state_untouched() {
        // The dispatcher only commits on success; checking must not mutate.
        let lc = Lifecycle::new();
        assert!(lc.check_create().is_ok());
        assert_eq!(lc.state(), LifecycleState::Uninitialized);
    }
}
