// ============================================================================
// Frame Scheduling
// ============================================================================
//
// Components never call each other from inside a frame. They queue a frame
// request tagged with a `FrameTask`, and the host drains the queue once per
// display refresh and hands each request back to whoever asked for it.

use std::time::Instant;

/// Identifies one scheduled frame callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

/// Which component a frame request belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameTask {
    /// Pointer animator idle-check or decay step
    Pointer,
    /// Render loop setup or draw step
    Render,
}

/// A pending frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameRequest {
    pub handle: FrameHandle,
    pub task: FrameTask,
}

/// Outcome of one cooperative frame step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Run again on the next frame
    Continue,
    /// The loop has finished and must not be rescheduled
    Done,
}

/// "Run this before the next repaint" primitive.
pub trait FrameScheduler {
    /// Queue a callback for the next frame.
    fn schedule(&mut self, task: FrameTask) -> FrameHandle;

    /// Drop a queued callback. Unknown or already-run handles are ignored.
    fn cancel(&mut self, handle: FrameHandle);
}

/// Single-threaded frame request queue.
///
/// Requests come out of [`drain_due`](Self::drain_due) in the order they were
/// scheduled. Anything scheduled while a drained batch is being dispatched
/// waits for the next frame.
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_handle: u64,
    pending: Vec<FrameRequest>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every pending request for this frame.
    pub fn drain_due(&mut self) -> Vec<FrameRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Check if anything is waiting for a frame
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of pending requests for `task`
    pub fn pending_for(&self, task: FrameTask) -> usize {
        self.pending.iter().filter(|r| r.task == task).count()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.iter().any(|r| r.handle == handle)
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self, task: FrameTask) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push(FrameRequest { handle, task });
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.pending.retain(|r| r.handle != handle);
    }
}

/// Monotonic millisecond clock shared by input and frame timestamps.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created
    pub fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
