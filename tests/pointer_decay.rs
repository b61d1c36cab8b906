use marcher::animation::{ease_out_expo, AnimatorConfig, LoopKind, PointerMove};
use marcher::prelude::*;

#[derive(Default)]
struct RecordingTarget {
    pointer: [f32; 3],
    frames: Vec<(f64, [f32; 3])>,
}

impl RenderTarget for RecordingTarget {
    fn load_program(&mut self) -> Result<(), SetupError> {
        Ok(())
    }

    fn set_pointer(&mut self, pointer: [f32; 3]) {
        self.pointer = pointer;
    }

    fn render(&mut self, timestamp_ms: f64) {
        self.frames.push((timestamp_ms, self.pointer));
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scene() -> Scene<RecordingTarget> {
    init_logging();
    let mut scene = Scene::new(RecordingTarget::default(), AnimatorConfig::DEFAULT);
    scene.start().unwrap();
    scene
}

fn moved(dx: f32, dy: f32, at: f64) -> PointerMove {
    PointerMove {
        position: (400.0, 300.0),
        delta: (dx, dy),
        viewport: (800.0, 600.0),
        timestamp_ms: at,
    }
}

/// Tick frames every 16ms starting at `from` until the pointer loops go quiet.
/// Returns the time of the last frame.
fn run_until_idle(scene: &mut Scene<RecordingTarget>, from: f64) -> f64 {
    let mut now = from;
    while scene.queue().pending_for(FrameTask::Pointer) > 0 {
        now += 16.0;
        scene.frame(now);
        assert!(now - from < 60_000.0, "pointer loops never went idle");
    }
    now
}

#[test]
fn test_ease_boundary() {
    assert_eq!(ease_out_expo(1.0), 1.0);
    assert_ne!(ease_out_expo(1.0), 0.9990234375);
    for p in [0.0, 0.1, 0.25, 0.5, 0.75, 0.99] {
        assert_eq!(ease_out_expo(p), 1.0 - 2f64.powf(-10.0 * p));
    }
}

#[test]
fn test_percent_is_monotonic_and_bounded() {
    let mut scene = scene();
    scene.pointer_moved(&moved(30.0, 40.0, 0.0));

    let mut now = 0.0;
    let mut seen = Vec::new();
    while scene.queue().pending_for(FrameTask::Pointer) > 0 {
        now += 16.0;
        scene.frame(now);
        if scene.animator().decay().percent > 0 {
            seen.push(scene.animator().decay().percent);
        }
    }

    assert!(!seen.is_empty());
    assert!(seen.iter().all(|p| (1..=100).contains(p)));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{:?}", seen);
    assert_eq!(seen.last(), Some(&100));
}

#[test]
fn test_decay_removes_exactly_the_last_distance() {
    let mut scene = scene();
    scene.pointer_moved(&moved(3.0, 4.0, 0.0));
    scene.pointer_moved(&moved(6.0, 8.0, 2.0));
    assert_eq!(scene.animator().magnitude(), 15.0);

    run_until_idle(&mut scene, 2.0);

    // Only the last move's distance (10) decays away
    assert!((scene.animator().magnitude() - 5.0).abs() < 1e-9);
    let decay = scene.animator().decay();
    assert_eq!(decay.start_ms, None);
    assert_eq!(decay.percent, 100);
    assert_eq!(scene.animator().active_handle(), None);
    assert_eq!(scene.queue().pending_for(FrameTask::Pointer), 0);
}

#[test]
fn test_pointer_move_preempts_running_decay() {
    let mut scene = scene();
    scene.pointer_moved(&moved(30.0, 40.0, 0.0));

    // Idle check hands off at 16, decay starts at 32
    scene.frame(16.0);
    scene.frame(32.0);
    scene.frame(48.0);
    assert_eq!(scene.animator().active_loop(), Some(LoopKind::Decay));
    assert!(scene.animator().decay().start_ms.is_some());
    let partial = scene.animator().magnitude();
    assert!(partial < 50.0 && partial > 0.0);

    scene.pointer_moved(&moved(0.0, 2.0, 50.0));

    let decay = scene.animator().decay();
    assert_eq!(decay.start_ms, None);
    assert_eq!(decay.initial_magnitude, 2.0);
    assert_eq!(decay.duration_ms, 66.0);
    assert_eq!(scene.animator().active_loop(), Some(LoopKind::IdleCheck));
    assert_eq!(scene.queue().pending_for(FrameTask::Pointer), 1);
    assert_eq!(scene.animator().magnitude(), partial + 2.0);

    run_until_idle(&mut scene, 50.0);

    // The abandoned run never finished: only the new distance was removed
    assert!((scene.animator().magnitude() - partial).abs() < 1e-9);
}

#[test]
fn test_at_most_one_pointer_loop_scheduled() {
    let mut scene = scene();
    let mut now = 0.0;
    for i in 0..40 {
        if i % 7 == 0 {
            scene.pointer_moved(&moved(5.0, 5.0, now));
        }
        assert!(scene.queue().pending_for(FrameTask::Pointer) <= 1);
        now += 16.0;
        scene.frame(now);
        assert!(scene.queue().pending_for(FrameTask::Pointer) <= 1);
        assert_eq!(
            scene.animator().active_handle().is_some(),
            scene.queue().pending_for(FrameTask::Pointer) == 1
        );
    }
}

#[test]
fn test_idle_threshold() {
    let mut scene = scene();

    // Moves every 3ms with frames in between stay within the 5ms threshold
    let mut now = 0.0;
    for _ in 0..10 {
        scene.pointer_moved(&moved(1.0, 0.0, now));
        scene.frame(now + 2.0);
        assert!(scene.animator().is_moving(now + 2.0));
        assert_eq!(scene.animator().active_loop(), Some(LoopKind::IdleCheck));
        now += 3.0;
    }

    // Motion stops: the next frame past the threshold starts a decay run
    let last_move = now - 3.0;
    scene.frame(last_move + 6.0);
    assert!(!scene.animator().is_moving(last_move + 6.0));
    assert_eq!(scene.animator().active_loop(), Some(LoopKind::Decay));
    assert_eq!(scene.animator().decay().start_ms, None);

    scene.frame(last_move + 22.0);
    assert_eq!(scene.animator().decay().start_ms, Some(last_move + 22.0));
}

#[test]
fn test_duration_scales_with_distance() {
    let mut scene = scene();
    scene.pointer_moved(&moved(1.0, 1.0, 0.0));
    let short = scene.animator().decay().duration_ms;
    scene.pointer_moved(&moved(10.0, 10.0, 1.0));
    let long = scene.animator().decay().duration_ms;
    assert!(short < long);
    assert_eq!(long, (200f64).sqrt() * 33.0);
}

#[test]
fn test_render_sees_latest_vector() {
    let mut scene = scene();
    // Setup frame
    scene.frame(0.0);

    scene.pointer_moved(&PointerMove {
        position: (200.0, 150.0),
        delta: (3.0, 4.0),
        viewport: (800.0, 600.0),
        timestamp_ms: 5.0,
    });
    scene.frame(16.0);

    let (at, pointer) = *scene.target().frames.last().unwrap();
    assert_eq!(at, 16.0);
    assert_eq!(pointer, [0.25, 0.75, 5.0]);
}

#[test]
fn test_vector_decays_smoothly_in_rendered_frames() {
    let mut scene = scene();
    scene.frame(0.0);
    scene.pointer_moved(&moved(30.0, 40.0, 1.0));

    let end = run_until_idle(&mut scene, 1.0);
    scene.frame(end + 16.0);

    let zs: Vec<f32> = scene.target().frames.iter().map(|(_, p)| p[2]).collect();
    assert!(zs.windows(2).all(|w| w[1] <= w[0] + 1e-4), "{:?}", zs);
    assert!(zs.last().unwrap().abs() < 1e-4);
}

#[test]
fn test_drawn_frame_trails_decay_step_by_one_frame() {
    let mut scene = scene();
    scene.frame(0.0);
    scene.pointer_moved(&moved(30.0, 40.0, 1.0));

    // Idle check hands off, then the first decay step runs at 32
    scene.frame(16.0);
    scene.frame(32.0);
    assert!(scene.animator().magnitude() < 50.0);
    assert_eq!(scene.target().frames.last().unwrap().1[2], 50.0);

    scene.frame(48.0);
    let drawn = scene.target().frames.last().unwrap().1[2];
    assert!(drawn < 50.0);
}
