mod pointer;
mod timing;

pub use pointer::{
    AnimatorConfig, DecayAnimation, LoopKind, PointerMove, PointerVelocityAnimator,
};
pub use timing::{ease_out_expo, percent_complete, TimingFunction, MIN_ELAPSED_MS};
