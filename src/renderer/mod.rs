pub mod constants;
pub mod context;
pub mod pipeline;
pub mod uniforms;

use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, BufferUsages, RenderPipeline};

use self::constants::{
    DEFAULT_CAMERA_RADIUS, DEFAULT_FOV_DEGREES, DEFAULT_MAX_DISTANCE, DEFAULT_PRECISION,
};
use crate::color::Color;
use crate::error::SetupError;
use crate::render_loop::RenderTarget;

pub use context::{GpuContext, SurfaceState};
pub use uniforms::SceneUniforms;

/// Camera and marching parameters for the background scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaymarchConfig {
    pub max_distance: f32,
    pub precision: f32,
    pub fov_degrees: f32,
    pub camera_radius: f32,
}

impl Default for RaymarchConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            precision: DEFAULT_PRECISION,
            fov_degrees: DEFAULT_FOV_DEGREES,
            camera_radius: DEFAULT_CAMERA_RADIUS,
        }
    }
}

impl RaymarchConfig {
    /// Uniform values for one frame
    pub fn uniforms(&self, resolution: [f32; 2], time: f32, pointer: [f32; 3]) -> SceneUniforms {
        SceneUniforms {
            resolution,
            time,
            _pad: 0.0,
            pointer,
            fov: self.fov_degrees.to_radians(),
            camera: [0.0, 0.0, self.camera_radius],
            max_distance: self.max_distance,
            look_at: [0.0, 0.0, 0.0],
            march_precision: self.precision,
        }
    }
}

/// GPU objects that exist once the program has loaded
struct GpuResources {
    // Keeps the device and instance alive alongside the surface
    _context: GpuContext,
    surface: SurfaceState,
    pipeline: RenderPipeline,
    #[allow(dead_code)] // Kept alive - bind groups hold reference to layout
    bind_group_layout: BindGroupLayout,
    uniform_buffer: Buffer,
    uniform_bind_group: BindGroup,
}

/// Draws the raymarched scene into a window surface with wgpu.
///
/// Nothing touches the GPU until [`RenderTarget::load_program`] runs, so
/// constructing a renderer is cheap and cannot fail.
pub struct RaymarchRenderer<W> {
    window: W,
    config: RaymarchConfig,
    clear_color: Color,
    width: u32,
    height: u32,
    pointer: [f32; 3],
    start_ms: Option<f64>,
    gpu: Option<GpuResources>,
}

impl<W> RaymarchRenderer<W>
where
    W: HasWindowHandle + HasDisplayHandle,
{
    /// `width` and `height` are in physical pixels.
    pub fn new(window: W, width: u32, height: u32, config: RaymarchConfig) -> Self {
        Self {
            window,
            config,
            clear_color: Color::TRANSPARENT,
            width,
            height,
            pointer: [0.5, 0.5, 0.0],
            start_ms: None,
            gpu: None,
        }
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Resize the drawable area (physical pixels).
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.surface.resize(width, height);
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_loaded(&self) -> bool {
        self.gpu.is_some()
    }
}

impl<W> RenderTarget for RaymarchRenderer<W>
where
    W: HasWindowHandle + HasDisplayHandle,
{
    fn load_program(&mut self) -> Result<(), SetupError> {
        if self.gpu.is_some() {
            return Ok(());
        }

        let (context, surface) = GpuContext::for_window(&self.window, self.width, self.height)?;
        let device = context.device.clone();

        // Catch WGSL and pipeline validation errors instead of panicking
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let bind_group_layout = pipeline::create_uniform_layout(&device);
        let render_pipeline =
            pipeline::create_raymarch_pipeline(&device, &bind_group_layout, surface.format());
        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(SetupError::Shader(err.to_string()));
        }

        let uniforms = self.config.uniforms(
            [self.width as f32, self.height as f32],
            0.0,
            self.pointer,
        );
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Raymarch Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Raymarch Uniform Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        self.gpu = Some(GpuResources {
            _context: context,
            surface,
            pipeline: render_pipeline,
            bind_group_layout,
            uniform_buffer,
            uniform_bind_group,
        });
        Ok(())
    }

    fn set_pointer(&mut self, pointer: [f32; 3]) {
        self.pointer = pointer;
    }

    fn render(&mut self, timestamp_ms: f64) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        if self.width == 0 || self.height == 0 {
            return;
        }

        let start = *self.start_ms.get_or_insert(timestamp_ms);
        let time = ((timestamp_ms - start) * 0.001) as f32;
        let uniforms = self.config.uniforms(
            [gpu.surface.width() as f32, gpu.surface.height() as f32],
            time,
            self.pointer,
        );
        gpu.surface
            .queue
            .write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let output = match gpu.surface.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = (gpu.surface.width(), gpu.surface.height());
                gpu.surface.resize(width, height);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                return;
            }
            Err(e) => {
                log::warn!("Skipping frame, surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            gpu.surface
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Raymarch Encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Raymarch Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color.into()),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&gpu.pipeline);
            render_pass.set_bind_group(0, &gpu.uniform_bind_group, &[]);
            render_pass.draw(0..3, 0..1);
        }

        gpu.surface.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}
