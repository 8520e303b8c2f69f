//! # Surface Handle Adapter
//!
//! Wraps the host's opaque drawable-surface reference in a form safely
//! passable across the boundary, stamped with a generation so the native
//! side can tell a rebound surface from a resize of the current one.
//!
//! ## Safety Note
//!
//! This module requires unsafe code for the `Send` bound on the wrapped
//! raw handle. The single unsafe impl is reviewed and documented below.

#![allow(unsafe_code)]

use raw_window_handle::RawWindowHandle;

/// A marshalled host surface reference.
///
/// The bridge borrows the underlying handle from the host: it is held
/// only between a surface bind and the matching surface-destroyed
/// transition, and is discarded before that transition's native call
/// returns. One `SurfaceHandle` is minted per surface generation; resizes
/// within a generation re-carry the same generation number.
#[derive(Debug)]
pub struct SurfaceHandle {
    raw: RawWindowHandle,
    generation: u64,
}

impl SurfaceHandle {
    /// Marshals a host handle for the given surface generation.
    pub(crate) fn bind(raw: RawWindowHandle, generation: u64) -> Self {
        Self { raw, generation }
    }

    /// The raw platform handle, for the engine to hand to its graphics
    /// stack. Valid only until the matching surface-destroyed call.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> RawWindowHandle {
        self.raw
    }

    /// Surface generation this handle belongs to. Starts at 1 for the
    /// first surface bound to an engine instance and increments on each
    /// Absent -> Live transition.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

// SAFETY: the raw handle is an opaque pointer owned by the host. The
// bridge never dereferences it, only one thread at a time can observe it
// (all access goes through the dispatcher's lock), and it is discarded
// before the host is told the surface is gone. Moving the wrapper between
// the host thread and the render thread is therefore sound.
unsafe impl Send for SurfaceHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::WebWindowHandle;

    fn stub(id: u32) -> RawWindowHandle {
        RawWindowHandle::Web(WebWindowHandle::new(id))
    }

    #[test]
    fn test_generation_stamp() {
        let handle = SurfaceHandle::bind(stub(7), 3);
        assert_eq!(handle.generation(), 3);
    }

    #[test]
    fn test_raw_roundtrip() {
        let raw = stub(42);
        let handle = SurfaceHandle::bind(raw, 1);
        assert_eq!(handle.raw(), raw);
    }
}
