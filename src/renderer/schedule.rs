//! Frame scheduling
//!
//! The renderer never loops on its own. It asks a [`FrameScheduler`] for
//! the next frame callback and the host fires it later with the returned
//! [`FrameId`]. Cancelling a frame makes its id stale; the renderer ignores
//! any callback whose id is not the one it is waiting for.

use std::cell::RefCell;
use std::rc::Rc;

/// Token for one requested frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Source of per-frame callbacks (a display-refresh timer, a test harness)
pub trait FrameScheduler {
    /// Arm one callback and return its id
    fn request_frame(&mut self) -> FrameId;

    /// Disarm a callback. Unknown or already-fired ids are ignored.
    fn cancel_frame(&mut self, id: FrameId);
}

#[derive(Debug, Default)]
struct QueueState {
    next_id: u64,
    pending: Option<FrameId>,
    requested: u64,
    cancelled: u64,
}

/// Single-threaded frame queue holding at most one pending frame.
///
/// Clones share state: the renderer requests through one handle, the host
/// loop drains through another.
#[derive(Debug, Clone, Default)]
pub struct FrameQueue {
    state: Rc<RefCell<QueueState>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the pending frame, if any
    pub fn next_due(&self) -> Option<FrameId> {
        self.state.borrow_mut().pending.take()
    }

    /// Look at the pending frame without taking it
    pub fn pending(&self) -> Option<FrameId> {
        self.state.borrow().pending
    }

    pub fn requested(&self) -> u64 {
        self.state.borrow().requested
    }

    pub fn cancelled(&self) -> u64 {
        self.state.borrow().cancelled
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        state.requested += 1;
        let id = FrameId(state.next_id);
        state.pending = Some(id);
        id
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(id) {
            state.pending = None;
            state.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_drain() {
        let mut queue = FrameQueue::new();
        let host = queue.clone();
        let id = queue.request_frame();
        assert_eq!(host.pending(), Some(id));
        assert_eq!(host.next_due(), Some(id));
        assert_eq!(host.next_due(), None);
    }

    #[test]
    fn test_cancel_removes_pending() {
        let mut queue = FrameQueue::new();
        let id = queue.request_frame();
        queue.cancel_frame(id);
        assert_eq!(queue.next_due(), None);
        assert_eq!(queue.cancelled(), 1);
    }

    #[test]
    fn test_cancel_stale_id_is_ignored() {
        let mut queue = FrameQueue::new();
        let old = queue.request_frame();
        let new = queue.request_frame();
        queue.cancel_frame(old);
        assert_eq!(queue.next_due(), Some(new));
        assert_eq!(queue.cancelled(), 0);
    }

    #[test]
    fn test_ids_increase() {
        let mut queue = FrameQueue::new();
        let a = queue.request_frame();
        let b = queue.request_frame();
        assert!(b > a);
        assert_eq!(queue.requested(), 2);
    }
}
