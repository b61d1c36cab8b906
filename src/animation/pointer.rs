//! Pointer velocity animation.
//!
//! [`PointerVelocityAnimator`] turns discrete pointer-move events into a
//! continuously readable `(x, y, z)` vector for the shader. `x` and `y` follow
//! the pointer. `z` accumulates the distance travelled and, once the pointer
//! has been still for longer than the move threshold, is eased back down by
//! the distance of the last move.
//!
//! Two frame loops drive this, and at most one of them is scheduled at a
//! time:
//!
//! - the idle check polls each frame until the pointer stops moving, then
//!   hands off to
//! - the decay run, which eases `z` down over a duration proportional to the
//!   last movement distance.
//!
//! Every pointer move cancels whichever loop is pending and starts over with
//! an idle check.

use crate::scheduler::{FrameHandle, FrameScheduler, FrameTask, Step};

use super::timing::{percent_complete, TimingFunction};

/// Tuning for [`PointerVelocityAnimator`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatorConfig {
    /// The pointer counts as moving while the last move is younger than this (ms)
    pub move_time_threshold_ms: f64,
    /// Decay duration in ms per pixel of movement distance
    pub duration_scale: f64,
}

impl AnimatorConfig {
    pub const DEFAULT: Self = Self {
        move_time_threshold_ms: 5.0,
        duration_scale: 33.0,
    };
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A pointer-move event in surface coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerMove {
    /// Absolute pointer position in logical pixels
    pub position: (f32, f32),
    /// Movement since the previous event in logical pixels
    pub delta: (f32, f32),
    /// Size of the surface the position is relative to
    pub viewport: (f32, f32),
    /// Timestamp on the same clock as frame callbacks (ms)
    pub timestamp_ms: f64,
}

impl PointerMove {
    /// Euclidean length of the movement delta
    pub fn distance(&self) -> f64 {
        let dx = self.delta.0 as f64;
        let dy = self.delta.1 as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Which frame loop currently owns the animator's scheduled callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopKind {
    IdleCheck,
    Decay,
}

/// State of the current (or next) decay run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DecayAnimation {
    /// Frame timestamp of the first decay step, `None` until the run starts
    pub start_ms: Option<f64>,
    /// Length of the run, fixed when the last pointer move arrived
    pub duration_ms: f64,
    /// Amount the run removes from the accumulated magnitude
    pub initial_magnitude: f64,
    /// How much of `initial_magnitude` has been removed so far
    pub applied_reduction: f64,
    /// Progress reported by the most recent step, 0 before the first step
    pub percent: u32,
}

impl DecayAnimation {
    fn reset(&mut self) {
        self.start_ms = None;
        self.applied_reduction = 0.0;
        self.percent = 0;
    }
}

pub struct PointerVelocityAnimator {
    config: AnimatorConfig,
    timing: TimingFunction,
    x: f32,
    y: f32,
    magnitude: f64,
    last_move_ms: Option<f64>,
    decay: DecayAnimation,
    active: Option<(FrameHandle, LoopKind)>,
}

impl PointerVelocityAnimator {
    /// Pointer starts centred with no accumulated movement.
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            timing: TimingFunction::EaseOutExpo,
            x: 0.5,
            y: 0.5,
            magnitude: 0.0,
            last_move_ms: None,
            decay: DecayAnimation::default(),
            active: None,
        }
    }

    /// Replace the decay curve
    pub fn timing(mut self, timing: TimingFunction) -> Self {
        self.timing = timing;
        self
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Handle a pointer move. Synchronous: state is fully updated on return.
    pub fn on_pointer_move<S: FrameScheduler>(&mut self, event: &PointerMove, scheduler: &mut S) {
        self.cancel_active(scheduler);
        self.decay.reset();

        self.last_move_ms = Some(event.timestamp_ms);
        self.schedule(LoopKind::IdleCheck, scheduler);

        let distance = event.distance();

        self.x = normalize(event.position.0, event.viewport.0);
        // Flip so that y grows upwards like the shader's frame coordinates
        self.y = 1.0 - normalize(event.position.1, event.viewport.1);

        self.decay.duration_ms = distance * self.config.duration_scale;
        self.decay.initial_magnitude = distance;
        self.magnitude += distance;
    }

    /// Run one frame step if `handle` is the callback this animator is waiting for.
    ///
    /// Handles that were cancelled or replaced are ignored, so a request that
    /// was already drained when a pointer move arrived cannot touch the
    /// accumulated magnitude.
    pub fn on_frame<S: FrameScheduler>(
        &mut self,
        handle: FrameHandle,
        timestamp_ms: f64,
        scheduler: &mut S,
    ) {
        let kind = match self.active {
            Some((active, kind)) if active == handle => kind,
            _ => return,
        };
        self.active = None;

        match kind {
            LoopKind::IdleCheck => {
                if self.is_moving(timestamp_ms) {
                    self.schedule(LoopKind::IdleCheck, scheduler);
                } else {
                    log::debug!(
                        "Pointer idle, decaying {:.2} over {:.0}ms",
                        self.decay.initial_magnitude,
                        self.decay.duration_ms
                    );
                    self.schedule(LoopKind::Decay, scheduler);
                }
            }
            LoopKind::Decay => {
                if self.decay_step(timestamp_ms) == Step::Continue {
                    self.schedule(LoopKind::Decay, scheduler);
                }
            }
        }
    }

    fn decay_step(&mut self, timestamp_ms: f64) -> Step {
        let start = *self.decay.start_ms.get_or_insert(timestamp_ms);
        let percent = percent_complete(timestamp_ms - start, self.decay.duration_ms);
        self.decay.percent = percent;

        // The last step always removes the full amount, whatever the curve ends on
        let reduction = if percent >= 100 {
            self.decay.initial_magnitude
        } else {
            self.decay.initial_magnitude * self.timing.evaluate(percent as f64 / 100.0)
        };
        self.magnitude -= reduction - self.decay.applied_reduction;
        self.decay.applied_reduction = reduction;

        if percent >= 100 {
            log::debug!("Decay finished, magnitude at {:.2}", self.magnitude);
            self.decay.start_ms = None;
            Step::Done
        } else {
            Step::Continue
        }
    }

    /// Current `(x, y, z)` for the pointer uniform
    pub fn current_vector(&self) -> [f32; 3] {
        [self.x, self.y, self.magnitude as f32]
    }

    /// Accumulated movement magnitude at full precision
    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    /// Whether the last move happened less than the threshold before `now_ms`
    pub fn is_moving(&self, now_ms: f64) -> bool {
        self.last_move_ms
            .map(|last| now_ms - last < self.config.move_time_threshold_ms)
            .unwrap_or(false)
    }

    pub fn last_move_ms(&self) -> Option<f64> {
        self.last_move_ms
    }

    /// The loop that currently has a scheduled callback, if any
    pub fn active_loop(&self) -> Option<LoopKind> {
        self.active.map(|(_, kind)| kind)
    }

    pub fn active_handle(&self) -> Option<FrameHandle> {
        self.active.map(|(handle, _)| handle)
    }

    pub fn decay(&self) -> &DecayAnimation {
        &self.decay
    }

    fn schedule<S: FrameScheduler>(&mut self, kind: LoopKind, scheduler: &mut S) {
        self.cancel_active(scheduler);
        let handle = scheduler.schedule(FrameTask::Pointer);
        self.active = Some((handle, kind));
    }

    fn cancel_active<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if let Some((handle, _)) = self.active.take() {
            scheduler.cancel(handle);
        }
    }
}

impl Default for PointerVelocityAnimator {
    fn default() -> Self {
        Self::new(AnimatorConfig::DEFAULT)
    }
}

fn normalize(value: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        (value / extent).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::FrameQueue;

    fn move_by(dx: f32, dy: f32, at: f64) -> PointerMove {
        PointerMove {
            position: (100.0, 50.0),
            delta: (dx, dy),
            viewport: (200.0, 100.0),
            timestamp_ms: at,
        }
    }

    /// Dispatch one frame worth of pointer requests
    fn tick(animator: &mut PointerVelocityAnimator, queue: &mut FrameQueue, at: f64) {
        for request in queue.drain_due() {
            animator.on_frame(request.handle, at, queue);
        }
    }

    #[test]
    fn test_default_vector_is_centred() {
        let animator = PointerVelocityAnimator::default();
        assert_eq!(animator.current_vector(), [0.5, 0.5, 0.0]);
        assert_eq!(animator.active_loop(), None);
    }

    #[test]
    fn test_move_updates_state_synchronously() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();

        animator.on_pointer_move(&move_by(3.0, 4.0, 10.0), &mut queue);

        assert_eq!(animator.current_vector(), [0.5, 0.5, 5.0]);
        assert_eq!(animator.decay().initial_magnitude, 5.0);
        assert_eq!(animator.decay().duration_ms, 165.0);
        assert_eq!(animator.decay().start_ms, None);
        assert_eq!(animator.last_move_ms(), Some(10.0));
        assert_eq!(animator.active_loop(), Some(LoopKind::IdleCheck));
        assert_eq!(queue.pending_for(FrameTask::Pointer), 1);
    }

    #[test]
    fn test_position_normalization() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        let event = PointerMove {
            position: (50.0, 25.0),
            delta: (1.0, 0.0),
            viewport: (200.0, 100.0),
            timestamp_ms: 0.0,
        };
        animator.on_pointer_move(&event, &mut queue);
        let [x, y, _] = animator.current_vector();
        assert_eq!(x, 0.25);
        assert_eq!(y, 0.75);

        let outside = PointerMove {
            position: (-10.0, 500.0),
            ..event
        };
        animator.on_pointer_move(&outside, &mut queue);
        let [x, y, _] = animator.current_vector();
        assert_eq!(x, 0.0);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn test_empty_viewport_keeps_centre() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        let event = PointerMove {
            viewport: (0.0, 0.0),
            ..move_by(1.0, 1.0, 0.0)
        };
        animator.on_pointer_move(&event, &mut queue);
        let [x, y, _] = animator.current_vector();
        assert_eq!((x, y), (0.5, 0.5));
    }

    #[test]
    fn test_is_moving_threshold() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        assert!(!animator.is_moving(0.0));

        animator.on_pointer_move(&move_by(1.0, 0.0, 100.0), &mut queue);
        assert!(animator.is_moving(100.0));
        assert!(animator.is_moving(104.9));
        assert!(!animator.is_moving(105.0));
    }

    #[test]
    fn test_idle_check_hands_off_to_decay() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        animator.on_pointer_move(&move_by(3.0, 4.0, 0.0), &mut queue);

        // Still within the threshold
        tick(&mut animator, &mut queue, 2.0);
        assert_eq!(animator.active_loop(), Some(LoopKind::IdleCheck));

        tick(&mut animator, &mut queue, 16.0);
        assert_eq!(animator.active_loop(), Some(LoopKind::Decay));
        assert_eq!(queue.pending_for(FrameTask::Pointer), 1);
        // Handing off does not touch the magnitude
        assert_eq!(animator.magnitude(), 5.0);
    }

    #[test]
    fn test_decay_converges_and_clears() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        animator.on_pointer_move(&move_by(3.0, 4.0, 0.0), &mut queue);

        let mut now = 0.0;
        while queue.has_pending() {
            now += 16.0;
            tick(&mut animator, &mut queue, now);
            assert!(now < 10_000.0, "decay never finished");
        }

        assert!(animator.magnitude().abs() < 1e-9);
        assert_eq!(animator.decay().start_ms, None);
        assert_eq!(animator.decay().percent, 100);
        assert_eq!(animator.active_loop(), None);
    }

    #[test]
    fn test_stale_handle_is_ignored() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        animator.on_pointer_move(&move_by(3.0, 4.0, 0.0), &mut queue);
        let stale = queue.drain_due()[0].handle;

        animator.on_pointer_move(&move_by(6.0, 8.0, 1.0), &mut queue);
        animator.on_frame(stale, 100.0, &mut queue);

        // The fresh idle check is still the only scheduled loop
        assert_eq!(animator.active_loop(), Some(LoopKind::IdleCheck));
        assert_eq!(queue.pending_for(FrameTask::Pointer), 1);
        assert_eq!(animator.magnitude(), 15.0);
    }

    #[test]
    fn test_zero_distance_move_finishes_in_one_step() {
        let mut animator = PointerVelocityAnimator::default();
        let mut queue = FrameQueue::new();
        animator.on_pointer_move(&move_by(0.0, 0.0, 0.0), &mut queue);

        tick(&mut animator, &mut queue, 16.0);
        assert_eq!(animator.active_loop(), Some(LoopKind::Decay));
        tick(&mut animator, &mut queue, 32.0);

        assert_eq!(animator.active_loop(), None);
        assert_eq!(animator.decay().percent, 100);
        assert_eq!(animator.magnitude(), 0.0);
    }

    #[test]
    fn test_curve_ending_short_still_lands_on_baseline() {
        let mut animator =
            PointerVelocityAnimator::default().timing(TimingFunction::custom(|t| t * 0.5));
        let mut queue = FrameQueue::new();
        animator.on_pointer_move(&move_by(3.0, 4.0, 0.0), &mut queue);

        let mut now = 0.0;
        while queue.has_pending() {
            now += 16.0;
            tick(&mut animator, &mut queue, now);
        }

        assert_eq!(animator.decay().percent, 100);
        assert_eq!(animator.decay().applied_reduction, 5.0);
        assert!(animator.magnitude().abs() < 1e-9);
    }

    #[test]
    fn test_custom_timing_still_lands_on_baseline() {
        let mut animator = PointerVelocityAnimator::default().timing(TimingFunction::Linear);
        let mut queue = FrameQueue::new();
        animator.on_pointer_move(&move_by(0.0, 2.0, 0.0), &mut queue);

        let mut now = 0.0;
        while queue.has_pending() {
            now += 10.0;
            tick(&mut animator, &mut queue, now);
        }
        assert!(animator.magnitude().abs() < 1e-9);
    }
}
