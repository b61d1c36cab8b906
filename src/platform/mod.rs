pub mod wayland;

pub use wayland::{create_wayland_app, WaylandState, WaylandWindowWrapper};

pub use smithay_client_toolkit::shell::wlr_layer::{Anchor, KeyboardInteractivity, Layer};
