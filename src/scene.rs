use crate::animation::{AnimatorConfig, PointerMove, PointerVelocityAnimator};
use crate::error::LoopError;
use crate::render_loop::{LoopState, RenderLoop, RenderTarget};
use crate::scheduler::{FrameQueue, FrameTask};

/// Wires pointer input, the pointer animator and the render loop to one
/// frame queue.
///
/// The host calls [`pointer_moved`](Self::pointer_moved) for every motion
/// event and [`frame`](Self::frame) once per display refresh while
/// [`wants_frame`](Self::wants_frame) is true.
pub struct Scene<T: RenderTarget> {
    target: T,
    animator: PointerVelocityAnimator,
    render_loop: RenderLoop,
    queue: FrameQueue,
}

impl<T: RenderTarget> Scene<T> {
    pub fn new(target: T, config: AnimatorConfig) -> Self {
        Self::with_animator(target, PointerVelocityAnimator::new(config))
    }

    pub fn with_animator(target: T, animator: PointerVelocityAnimator) -> Self {
        Self {
            target,
            animator,
            render_loop: RenderLoop::new(),
            queue: FrameQueue::new(),
        }
    }

    pub fn start(&mut self) -> Result<(), LoopError> {
        self.render_loop.start(&mut self.queue)
    }

    pub fn stop(&mut self) {
        self.render_loop.stop(&mut self.queue);
    }

    pub fn pointer_moved(&mut self, event: &PointerMove) {
        self.animator.on_pointer_move(event, &mut self.queue);
    }

    /// Run every frame callback that was due before this frame began.
    ///
    /// The render request is queued ahead of the animator's, so a drawn frame
    /// shows the pointer vector as it stood before this frame's decay step.
    /// The step lands in the next drawn frame.
    pub fn frame(&mut self, timestamp_ms: f64) {
        for request in self.queue.drain_due() {
            match request.task {
                FrameTask::Pointer => {
                    self.animator
                        .on_frame(request.handle, timestamp_ms, &mut self.queue)
                }
                FrameTask::Render => self.render_loop.on_frame(
                    request.handle,
                    timestamp_ms,
                    &mut self.target,
                    &self.animator,
                    &mut self.queue,
                ),
            }
        }
    }

    /// Whether any component is waiting for the next frame
    pub fn wants_frame(&self) -> bool {
        self.queue.has_pending()
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn animator(&self) -> &PointerVelocityAnimator {
        &self.animator
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }

    pub fn queue(&self) -> &FrameQueue {
        &self.queue
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}
