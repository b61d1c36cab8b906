pub mod animation;
pub mod color;
pub mod error;
pub mod render_loop;
pub mod scene;
pub mod scheduler;

// These modules are public for advanced use cases
pub mod platform;
pub mod renderer;

use std::time::Duration;

use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;

use animation::AnimatorConfig;
use color::Color;
use error::PlatformError;
use platform::{create_wayland_app, Anchor, Layer, WaylandState, WaylandWindowWrapper};
use renderer::{RaymarchConfig, RaymarchRenderer};
use scene::Scene;
use scheduler::Clock;

pub mod prelude {
    pub use crate::animation::{
        AnimatorConfig, PointerMove, PointerVelocityAnimator, TimingFunction,
    };
    pub use crate::color::Color;
    pub use crate::error::{LoopError, PlatformError, SetupError};
    pub use crate::platform::{Anchor, Layer};
    pub use crate::render_loop::{LoopState, RenderLoop, RenderTarget};
    pub use crate::renderer::RaymarchConfig;
    pub use crate::scene::Scene;
    pub use crate::scheduler::{FrameQueue, FrameScheduler, FrameTask, Step};
    pub use crate::{App, AppConfig};
}

/// Target spacing between frames (~60 Hz)
const FRAME_INTERVAL_MS: f64 = 16.0;

pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub anchor: Anchor,
    pub layer: Layer,
    pub namespace: String,
    pub background_color: Color,
    pub animator: AnimatorConfig,
    pub raymarch: RaymarchConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            anchor: Anchor::TOP | Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT,
            layer: Layer::Background,
            namespace: "marcher".to_string(),
            background_color: Color::rgb(0.12, 0.12, 0.11),
            animator: AnimatorConfig::default(),
            raymarch: RaymarchConfig::default(),
        }
    }
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn width(mut self, width: u32) -> Self {
        self.config.width = width;
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.config.height = height;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.config.anchor = anchor;
        self
    }

    pub fn layer(mut self, layer: Layer) -> Self {
        self.config.layer = layer;
        self
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    pub fn background_color(mut self, color: Color) -> Self {
        self.config.background_color = color;
        self
    }

    /// How long after the last pointer move the pointer still counts as moving
    pub fn move_time_threshold(mut self, ms: f64) -> Self {
        self.config.animator.move_time_threshold_ms = ms;
        self
    }

    /// Decay duration in ms per pixel of the last pointer movement
    pub fn decay_duration_scale(mut self, scale: f64) -> Self {
        self.config.animator.duration_scale = scale;
        self
    }

    pub fn raymarch(mut self, config: RaymarchConfig) -> Self {
        self.config.raymarch = config;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run until the layer surface is closed.
    ///
    /// Wayland and event loop failures are returned. A GPU or shader failure
    /// is only logged: the surface stays up without the effect.
    pub fn run(self) -> Result<(), PlatformError> {
        env_logger::init();

        let clock = Clock::new();
        let (connection, event_queue, mut wayland_state, qh) = create_wayland_app(clock)?;

        wayland_state.create_layer_surface(
            &qh,
            self.config.width,
            self.config.height,
            self.config.anchor,
            self.config.layer,
            &self.config.namespace,
        );

        let mut event_loop: EventLoop<WaylandState> =
            EventLoop::try_new().map_err(|e| PlatformError::EventLoop(e.to_string()))?;
        WaylandSource::new(connection.clone(), event_queue)
            .insert(event_loop.handle())
            .map_err(|e| PlatformError::EventLoop(e.error.to_string()))?;

        // Wait for configure
        while !wayland_state.configured && !wayland_state.exit {
            event_loop
                .dispatch(None, &mut wayland_state)
                .map_err(|e| PlatformError::EventLoop(e.to_string()))?;
        }

        if wayland_state.exit {
            return Err(PlatformError::Closed);
        }

        let Some(surface) = wayland_state.surface.as_ref() else {
            return Err(PlatformError::Closed);
        };
        let window_handle = WaylandWindowWrapper::new(&connection, surface);

        let (physical_width, physical_height) = wayland_state.physical_size();
        log::info!(
            "Creating surface: logical {}x{}, physical {}x{}, scale {}",
            wayland_state.width,
            wayland_state.height,
            physical_width,
            physical_height,
            wayland_state.scale_factor
        );

        let renderer = RaymarchRenderer::new(
            window_handle,
            physical_width,
            physical_height,
            self.config.raymarch,
        )
        .clear_color(self.config.background_color);

        let mut scene = Scene::new(renderer, self.config.animator);
        scene.start()?;

        let mut size = (physical_width, physical_height);
        let mut last_frame_ms: Option<f64> = None;

        // Main loop
        loop {
            let timeout = if scene.wants_frame() {
                let since = last_frame_ms
                    .map(|t| clock.now_ms() - t)
                    .unwrap_or(FRAME_INTERVAL_MS);
                Some(Duration::from_secs_f64(
                    (FRAME_INTERVAL_MS - since).max(0.0) / 1000.0,
                ))
            } else {
                // Nothing animating, sleep until input arrives
                None
            };

            event_loop
                .dispatch(timeout, &mut wayland_state)
                .map_err(|e| PlatformError::EventLoop(e.to_string()))?;

            if wayland_state.exit {
                break;
            }

            for event in wayland_state.take_moves() {
                scene.pointer_moved(&event);
            }

            let physical = wayland_state.physical_size();
            if physical != size {
                log::info!(
                    "Resizing surface to {}x{} (physical), scale {}",
                    physical.0,
                    physical.1,
                    wayland_state.scale_factor
                );
                scene.target_mut().resize(physical.0, physical.1);
                size = physical;
            }

            let now = clock.now_ms();
            let due = last_frame_ms.map_or(true, |t| now - t >= FRAME_INTERVAL_MS);
            if scene.wants_frame() && due {
                scene.frame(now);
                last_frame_ms = Some(now);
            }

            if let Err(e) = connection.flush() {
                log::warn!("Failed to flush Wayland connection: {}", e);
            }
        }

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
