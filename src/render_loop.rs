//! Persistent per-frame render cycle.
//!
//! ```text
//! Uninitialized --start()--> Loading --setup ok--> Running
//!                               |
//!                               +--setup failed--> Failed
//! ```
//!
//! `stop()` moves `Loading` or `Running` to `Stopped`. Nothing ever goes back
//! to an earlier state.

use crate::animation::PointerVelocityAnimator;
use crate::error::{LoopError, SetupError};
use crate::scheduler::{FrameHandle, FrameScheduler, FrameTask};

/// Something that can draw the background effect.
pub trait RenderTarget {
    /// One-time program setup. Called once, on the first frame after `start`.
    fn load_program(&mut self) -> Result<(), SetupError>;

    /// Update the pointer uniform for the next draw.
    fn set_pointer(&mut self, pointer: [f32; 3]);

    /// Draw one frame with the current program and uniforms.
    fn render(&mut self, timestamp_ms: f64);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Loading,
    Running,
    Failed,
    Stopped,
}

pub struct RenderLoop {
    state: LoopState,
    handle: Option<FrameHandle>,
    frames_rendered: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Uninitialized,
            handle: None,
            frames_rendered: 0,
        }
    }

    /// Begin loading. Setup runs on the next frame, never inside this call.
    pub fn start<S: FrameScheduler>(&mut self, scheduler: &mut S) -> Result<(), LoopError> {
        if self.state != LoopState::Uninitialized {
            return Err(LoopError::AlreadyStarted);
        }
        self.state = LoopState::Loading;
        self.handle = Some(scheduler.schedule(FrameTask::Render));
        log::info!("Render loop loading");
        Ok(())
    }

    /// Frame callback. Ignores handles it did not schedule.
    pub fn on_frame<T, S>(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        target: &mut T,
        animator: &PointerVelocityAnimator,
        scheduler: &mut S,
    ) where
        T: RenderTarget,
        S: FrameScheduler,
    {
        if self.handle != Some(handle) {
            return;
        }
        self.handle = None;

        match self.state {
            LoopState::Loading => match target.load_program() {
                Ok(()) => {
                    log::info!("Render program ready, render loop running");
                    self.state = LoopState::Running;
                    self.handle = Some(scheduler.schedule(FrameTask::Render));
                }
                Err(err) => {
                    log::error!("Background effect disabled: {}", err);
                    self.state = LoopState::Failed;
                }
            },
            LoopState::Running => {
                target.set_pointer(animator.current_vector());
                target.render(timestamp_ms);
                self.frames_rendered += 1;
                self.handle = Some(scheduler.schedule(FrameTask::Render));
            }
            LoopState::Uninitialized | LoopState::Failed | LoopState::Stopped => {}
        }
    }

    /// Cancel the pending frame. Production code never calls this.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.handle.take() {
            scheduler.cancel(handle);
        }
        if matches!(self.state, LoopState::Loading | LoopState::Running) {
            log::info!("Render loop stopped after {} frames", self.frames_rendered);
            self.state = LoopState::Stopped;
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn is_scheduled(&self) -> bool {
        self.handle.is_some()
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}
