//! Timing functions (easing curves) for animations.
//!
//! The pointer decay uses [`TimingFunction::EaseOutExpo`]: it drops quickly
//! right after motion stops and then settles gently onto the baseline.
//!
//! ## Example
//!
//! ```
//! use marcher::animation::{percent_complete, TimingFunction};
//!
//! let percent = percent_complete(100.0, 400.0);
//! assert_eq!(percent, 25);
//! let factor = TimingFunction::EaseOutExpo.evaluate(percent as f64 / 100.0);
//! assert!(factor > 0.8);
//! ```

use std::sync::Arc;

/// Smallest elapsed time (ms) a decay step will ever see.
pub const MIN_ELAPSED_MS: f64 = 0.001;

/// Timing function that controls the animation curve
#[derive(Clone)]
pub enum TimingFunction {
    /// Linear interpolation (constant speed)
    Linear,
    /// Exponential ease-out: `1 - 2^(-10t)`, pinned to exactly 1 at the end
    EaseOutExpo,
    /// Custom timing function
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl TimingFunction {
    /// Evaluate the timing function at time t (0.0 to 1.0)
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseOutExpo => ease_out_expo(t),
            TimingFunction::Custom(f) => f(t),
        }
    }

    /// Create a custom timing function from a closure
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        TimingFunction::Custom(Arc::new(f))
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::EaseOutExpo => write!(f, "EaseOutExpo"),
            TimingFunction::Custom(_) => write!(f, "Custom"),
        }
    }
}

/// Exponential ease-out.
///
/// `ease_out_expo(1.0)` is exactly `1.0`, not `1 - 2^-10`, so a finished
/// animation lands precisely on its target.
pub fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t)
    }
}

/// Integer progress of an animation in `[1, 100]`.
///
/// Elapsed time is floored at [`MIN_ELAPSED_MS`]. A duration that is zero,
/// negative or not finite counts as already complete.
pub fn percent_complete(elapsed_ms: f64, duration_ms: f64) -> u32 {
    if !(duration_ms.is_finite() && duration_ms > 0.0) {
        return 100;
    }
    let elapsed = elapsed_ms.max(MIN_ELAPSED_MS);
    let percent = (elapsed / duration_ms * 100.0).ceil();
    if percent.is_nan() {
        return 100;
    }
    percent.clamp(1.0, 100.0) as u32
}
