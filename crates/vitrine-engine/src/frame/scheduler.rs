use std::cell::RefCell;
use std::rc::Rc;

/// Opaque token for one requested frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FrameHandle(u64);

/// Platform per-frame scheduling.
///
/// A scheduler delivers each requested handle at most once. Cancelling a handle
/// that was already delivered (or already cancelled) has no effect.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
struct RequestState {
    next: u64,
    pending: Option<FrameHandle>,
}

/// Single-slot frame request cell shared between a frame loop and the window runtime.
///
/// The loop requests and cancels through [`FrameScheduler`]; the runtime polls
/// [`is_pending`](Self::is_pending) to decide whether to ask the window for a
/// redraw and drains the due handle with [`take_due`](Self::take_due) when the
/// redraw arrives. A redraw that arrives after cancellation finds no handle and
/// drives nothing.
///
/// Outside a runtime the same type doubles as a manual scheduler.
#[derive(Debug, Clone, Default)]
pub struct FrameRequests {
    state: Rc<RefCell<RequestState>>,
}

impl FrameRequests {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }

    /// Removes and returns the pending handle, if any.
    pub fn take_due(&self) -> Option<FrameHandle> {
        self.state.borrow_mut().pending.take()
    }
}

impl FrameScheduler for FrameRequests {
    fn request_frame(&mut self) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next = state.next.wrapping_add(1);
        let handle = FrameHandle(state.next);
        if let Some(previous) = state.pending.replace(handle) {
            log::trace!("frame request {previous:?} superseded by {handle:?}");
        }
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut state = self.state.borrow_mut();
        if state.pending == Some(handle) {
            state.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_then_take_delivers_once() {
        let mut requests = FrameRequests::new();
        let handle = requests.request_frame();
        assert!(requests.is_pending());
        assert_eq!(requests.take_due(), Some(handle));
        assert_eq!(requests.take_due(), None);
    }

    #[test]
    fn cancel_clears_matching_request() {
        let mut requests = FrameRequests::new();
        let handle = requests.request_frame();
        requests.cancel_frame(handle);
        assert!(!requests.is_pending());
        assert_eq!(requests.take_due(), None);
    }

    #[test]
    fn cancel_of_stale_handle_keeps_newer_request() {
        let mut requests = FrameRequests::new();
        let old = requests.request_frame();
        let new = requests.request_frame();
        assert_ne!(old, new);

        requests.cancel_frame(old);
        assert_eq!(requests.take_due(), Some(new));
    }

    #[test]
    fn clones_share_state() {
        let mut requests = FrameRequests::new();
        let runtime_side = requests.clone();
        let handle = requests.request_frame();
        assert_eq!(runtime_side.take_due(), Some(handle));
        assert!(!requests.is_pending());
    }
}
