//! # Bridge Error Types
//!
//! Nothing here is recoverable. The taxonomy exists so the fatal
//! diagnostic names exactly what went wrong before the process dies:
//! either the host drove the bridge through an illegal transition
//! (a broken integration), or the native side signalled failure.

use thiserror::Error;

use crate::lifecycle::LifecycleState;
use crate::signal::EntryPoint;
use crate::surface::SurfacePhase;

/// Reason a state machine refused a transition.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenied {
    /// `create` was issued against an already-created instance.
    #[error("engine instance already created")]
    AlreadyCreated,

    /// A call required a created instance, but the lifecycle is elsewhere.
    #[error("engine instance not created (lifecycle is {state})")]
    NotCreated {
        /// The lifecycle state actually observed.
        state: LifecycleState,
    },

    /// A call was issued after the instance reached its terminal state.
    #[error("engine instance already destroyed")]
    Destroyed,

    /// A call required a live surface, but none is bound.
    #[error("no live surface (surface is {phase})")]
    SurfaceAbsent {
        /// The surface phase actually observed.
        phase: SurfacePhase,
    },

    /// Instance teardown was issued while a surface is still live.
    #[error("surface still live; it must be destroyed before the instance")]
    SurfaceStillLive,
}

/// Errors the dispatcher converts into fatal termination.
///
/// These are never returned to the host: the bridge's propagation policy
/// is to terminate at the topmost boundary, because a corrupted native
/// state is not safely continuable.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeError {
    /// The host delivered a callback the current state forbids.
    #[error("contract violation: {call} rejected: {denied}")]
    ContractViolation {
        /// The entry point the host attempted to reach.
        call: EntryPoint,
        /// Why the state machines refused it.
        denied: TransitionDenied,
    },

    /// The native side returned a failed signal from an entry point.
    #[error("native engine signalled failure in {call}")]
    NativeFailure {
        /// The entry point that failed.
        call: EntryPoint,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation_message() {
        let err = BridgeError::ContractViolation {
            call: EntryPoint::OnDestroy,
            denied: TransitionDenied::SurfaceStillLive,
        };
        let msg = err.to_string();
        assert!(msg.contains("on_destroy"));
        assert!(msg.contains("surface still live"));
    }

    #[test]
    fn test_native_failure_message() {
        let err = BridgeError::NativeFailure {
            call: EntryPoint::OnDrawFrame,
        };
        assert_eq!(
            err.to_string(),
            "native engine signalled failure in on_draw_frame"
        );
    }

    #[test]
    fn test_denied_carries_observed_state() {
        let denied = TransitionDenied::NotCreated {
            state: LifecycleState::Destroyed,
        };
        assert!(denied.to_string().contains("destroyed"));
    }
}
