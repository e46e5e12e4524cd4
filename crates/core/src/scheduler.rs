//! The frame scheduling seam.
//!
//! A simulator asks its scheduler for "one more frame before the next
//! repaint" after every tick, and cancels the outstanding request when it is
//! destroyed. In a browser this is `requestAnimationFrame`; headless hosts
//! use [`ManualScheduler`] and call `tick` themselves.
//!
//! The trait is **object-safe** so the simulator can hold
//! `Box<dyn FrameScheduler>`.

use std::cell::RefCell;
use std::rc::Rc;

/// Opaque id of a pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Display-synchronized callback scheduling.
pub trait FrameScheduler {
    /// Requests one frame callback and returns its handle.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancels a pending request. Unknown or already-fired handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    pending: Option<FrameHandle>,
    requested: usize,
    cancelled: Vec<FrameHandle>,
}

/// A scheduler that only records requests; the host decides when frames run.
///
/// Clones share state, so a host can keep one clone to observe what the
/// simulator asked for.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent request, unless it was cancelled.
    pub fn pending(&self) -> Option<FrameHandle> {
        self.state.borrow().pending
    }

    /// Total number of frames requested so far.
    pub fn requested(&self) -> usize {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> Vec<FrameHandle> {
        self.state.borrow().cancelled.clone()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.requested += 1;
        let handle = FrameHandle(state.next_id);
        state.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(handle) {
            state.pending = None;
        }
        state.cancelled.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_trait_is_object_safe() {
        let mut boxed: Box<dyn FrameScheduler> = Box::new(ManualScheduler::new());
        let h = boxed.request_frame();
        boxed.cancel_frame(h);
    }

    #[test]
    fn handles_are_unique_and_increasing() {
        let mut s = ManualScheduler::new();
        let a = s.request_frame();
        let b = s.request_frame();
        assert_ne!(a, b);
        assert!(b.0 > a.0);
        assert_eq!(s.requested(), 2);
        assert_eq!(s.pending(), Some(b));
    }

    #[test]
    fn cancel_clears_pending_and_is_observable_through_clones() {
        let observer = ManualScheduler::new();
        let mut s = observer.clone();
        let h = s.request_frame();
        s.cancel_frame(h);
        assert_eq!(observer.pending(), None);
        assert_eq!(observer.cancelled(), vec![h]);
    }

    #[test]
    fn cancelling_stale_handle_keeps_newer_request() {
        let mut s = ManualScheduler::new();
        let old = s.request_frame();
        let new = s.request_frame();
        s.cancel_frame(old);
        assert_eq!(s.pending(), Some(new));
    }
}
