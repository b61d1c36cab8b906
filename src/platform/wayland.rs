use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawDisplayHandle,
    RawWindowHandle, WaylandDisplayHandle, WaylandWindowHandle, WindowHandle,
};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState},
    delegate_compositor, delegate_layer, delegate_output, delegate_pointer, delegate_registry,
    delegate_seat,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    seat::{
        pointer::{PointerEvent, PointerEventKind, PointerHandler},
        Capability, SeatHandler, SeatState,
    },
    shell::{
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
        WaylandSurface,
    },
};
use wayland_backend::sys::client::ObjectId;
use wayland_client::{
    globals::registry_queue_init,
    protocol::{wl_output, wl_pointer, wl_seat, wl_surface},
    Connection, EventQueue, Proxy, QueueHandle,
};

use crate::animation::PointerMove;
use crate::error::PlatformError;
use crate::scheduler::Clock;

pub struct WaylandState {
    pub registry_state: RegistryState,
    pub compositor_state: CompositorState,
    pub output_state: OutputState,
    pub seat_state: SeatState,
    pub layer_shell: LayerShell,
    pub layer_surface: Option<LayerSurface>,
    pub surface: Option<wl_surface::WlSurface>,
    pub configured: bool,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f32,
    pub exit: bool,

    // Pointer state
    pointer: Option<wl_pointer::WlPointer>,
    pointer_x: f32,
    pointer_y: f32,
    pointer_over_surface: bool,

    clock: Clock,

    // Pending pointer moves to be processed by the main loop
    pub pending_moves: Vec<PointerMove>,
}

pub fn create_wayland_app(
    clock: Clock,
) -> Result<
    (
        Connection,
        EventQueue<WaylandState>,
        WaylandState,
        QueueHandle<WaylandState>,
    ),
    PlatformError,
> {
    let connection =
        Connection::connect_to_env().map_err(|e| PlatformError::Connect(e.to_string()))?;
    let (globals, event_queue) = registry_queue_init::<WaylandState>(&connection)
        .map_err(|e| PlatformError::Registry(e.to_string()))?;
    let qh = event_queue.handle();

    let compositor_state = CompositorState::bind(&globals, &qh)
        .map_err(|_| PlatformError::MissingGlobal("wl_compositor"))?;
    let layer_shell = LayerShell::bind(&globals, &qh)
        .map_err(|_| PlatformError::MissingGlobal("zwlr_layer_shell_v1"))?;
    let output_state = OutputState::new(&globals, &qh);
    let seat_state = SeatState::new(&globals, &qh);

    let state = WaylandState {
        registry_state: RegistryState::new(&globals),
        compositor_state,
        output_state,
        seat_state,
        layer_shell,
        layer_surface: None,
        surface: None,
        configured: false,
        width: 0,
        height: 0,
        scale_factor: 1.0,
        exit: false,
        pointer: None,
        pointer_x: 0.0,
        pointer_y: 0.0,
        pointer_over_surface: false,
        clock,
        pending_moves: Vec::new(),
    };

    Ok((connection, event_queue, state, qh))
}

impl WaylandState {
    pub fn create_layer_surface(
        &mut self,
        qh: &QueueHandle<Self>,
        width: u32,
        height: u32,
        anchor: Anchor,
        layer: Layer,
        namespace: &str,
    ) {
        let surface = self.compositor_state.create_surface(qh);
        let layer_surface = self.layer_shell.create_layer_surface(
            qh,
            surface.clone(),
            layer,
            Some(namespace.to_string()),
            None,
        );

        layer_surface.set_anchor(anchor);

        // When anchored to both edges on an axis, set that dimension to 0
        // to let the compositor stretch the surface to fill
        let use_width = if anchor.contains(Anchor::LEFT) && anchor.contains(Anchor::RIGHT) {
            0
        } else {
            width
        };
        let use_height = if anchor.contains(Anchor::TOP) && anchor.contains(Anchor::BOTTOM) {
            0
        } else {
            height
        };

        layer_surface.set_size(use_width, use_height);
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        // Extend under panels instead of reserving space for ourselves
        layer_surface.set_exclusive_zone(-1);

        layer_surface.commit();

        self.surface = Some(surface);
        self.layer_surface = Some(layer_surface);
        self.width = width;
        self.height = height;
    }

    /// Take all pending pointer moves (drains the queue)
    pub fn take_moves(&mut self) -> Vec<PointerMove> {
        std::mem::take(&mut self.pending_moves)
    }

    /// Surface size in physical pixels
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = self.scale_factor.max(1.0) as u32;
        (self.width * scale, self.height * scale)
    }

    fn pointer_moved_to(&mut self, x: f32, y: f32) {
        let delta = (x - self.pointer_x, y - self.pointer_y);
        self.pointer_x = x;
        self.pointer_y = y;
        self.pending_moves.push(PointerMove {
            position: (x, y),
            delta,
            viewport: (self.width as f32, self.height as f32),
            timestamp_ms: self.clock.now_ms(),
        });
    }
}

pub struct WaylandWindowWrapper {
    display: *mut std::ffi::c_void,
    surface: *mut std::ffi::c_void,
}

impl WaylandWindowWrapper {
    pub fn new(connection: &Connection, surface: &wl_surface::WlSurface) -> Self {
        // The sys backend exposes the raw wl_display* and wl_proxy* pointers
        let backend = connection.backend();
        let display_ptr = backend.display_ptr() as *mut std::ffi::c_void;

        let surface_id = surface.id();
        let surface_ptr = ObjectId::as_ptr(&surface_id) as *mut std::ffi::c_void;

        Self {
            display: display_ptr,
            surface: surface_ptr,
        }
    }
}

unsafe impl Send for WaylandWindowWrapper {}
unsafe impl Sync for WaylandWindowWrapper {}

impl HasDisplayHandle for WaylandWindowWrapper {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        let display = std::ptr::NonNull::new(self.display).ok_or(HandleError::Unavailable)?;
        let handle = WaylandDisplayHandle::new(display);
        Ok(unsafe { DisplayHandle::borrow_raw(RawDisplayHandle::Wayland(handle)) })
    }
}

impl HasWindowHandle for WaylandWindowWrapper {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        let surface = std::ptr::NonNull::new(self.surface).ok_or(HandleError::Unavailable)?;
        let handle = WaylandWindowHandle::new(surface);
        Ok(unsafe { WindowHandle::borrow_raw(RawWindowHandle::Wayland(handle)) })
    }
}

impl CompositorHandler for WaylandState {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        surface: &wl_surface::WlSurface,
        new_factor: i32,
    ) {
        log::info!("Scale factor changed to: {}", new_factor);
        self.scale_factor = new_factor as f32;
        // Set the buffer scale on the surface for proper HiDPI rendering
        surface.set_buffer_scale(new_factor);
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    // Frames are paced by the main loop, compositor frame callbacks are not requested
    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }
}

impl OutputHandler for WaylandState {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }
}

impl LayerShellHandler for WaylandState {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        self.exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        log::info!(
            "Layer shell configure: requested size {:?}, current {}x{}",
            configure.new_size,
            self.width,
            self.height
        );
        if configure.new_size.0 > 0 {
            self.width = configure.new_size.0;
        }
        if configure.new_size.1 > 0 {
            self.height = configure.new_size.1;
        }
        self.configured = true;
    }
}

impl SeatHandler for WaylandState {
    fn seat_state(&mut self) -> &mut SeatState {
        &mut self.seat_state
    }

    fn new_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {}

    fn new_capability(
        &mut self,
        _conn: &Connection,
        qh: &QueueHandle<Self>,
        seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Pointer && self.pointer.is_none() {
            log::info!("Pointer capability available, creating pointer");
            match self.seat_state.get_pointer(qh, &seat) {
                Ok(pointer) => self.pointer = Some(pointer),
                Err(e) => log::warn!("Failed to get pointer: {}", e),
            }
        }
    }

    fn remove_capability(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _seat: wl_seat::WlSeat,
        capability: Capability,
    ) {
        if capability == Capability::Pointer {
            log::info!("Pointer capability removed");
            if let Some(pointer) = self.pointer.take() {
                pointer.release();
            }
        }
    }

    fn remove_seat(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _seat: wl_seat::WlSeat) {
    }
}

impl PointerHandler for WaylandState {
    fn pointer_frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _pointer: &wl_pointer::WlPointer,
        events: &[PointerEvent],
    ) {
        for event in events {
            let is_our_surface = self
                .surface
                .as_ref()
                .map(|s| s == &event.surface)
                .unwrap_or(false);

            if !is_our_surface {
                continue;
            }

            match event.kind {
                PointerEventKind::Enter { .. } => {
                    // Re-anchor without producing a jump from the old position
                    self.pointer_over_surface = true;
                    self.pointer_x = event.position.0 as f32;
                    self.pointer_y = event.position.1 as f32;
                }
                PointerEventKind::Leave { .. } => {
                    self.pointer_over_surface = false;
                }
                PointerEventKind::Motion { .. } if self.pointer_over_surface => {
                    self.pointer_moved_to(event.position.0 as f32, event.position.1 as f32);
                }
                _ => {}
            }
        }
    }
}

impl ProvidesRegistryState for WaylandState {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }

    registry_handlers![OutputState, SeatState];
}

delegate_compositor!(WaylandState);
delegate_output!(WaylandState);
delegate_layer!(WaylandState);
delegate_seat!(WaylandState);
delegate_pointer!(WaylandState);
delegate_registry!(WaylandState);
