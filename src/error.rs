//! Error types.
//!
//! Setup errors never escape the render loop: they are logged and the effect
//! stays off. Platform errors are returned from [`App::run`](crate::App::run).

use thiserror::Error;

/// Failure while preparing the GPU program for the background effect.
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("no compatible GPU adapter found: {0}")]
    Adapter(String),

    #[error("failed to create GPU device: {0}")]
    Device(String),

    #[error("failed to create render surface: {0}")]
    Surface(String),

    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,

    #[error("shader program failed validation: {0}")]
    Shader(String),
}

/// Misuse of the render loop lifecycle.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopError {
    #[error("render loop was already started")]
    AlreadyStarted,
}

/// Failure talking to the Wayland compositor.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("failed to connect to Wayland: {0}")]
    Connect(String),

    #[error("failed to initialize Wayland registry: {0}")]
    Registry(String),

    #[error("required global not available: {0}")]
    MissingGlobal(&'static str),

    #[error("event loop error: {0}")]
    EventLoop(String),

    #[error("layer surface was closed before it was configured")]
    Closed,

    #[error(transparent)]
    Loop(#[from] LoopError),
}
