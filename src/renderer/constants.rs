//! Raymarch constants to avoid magic numbers throughout the codebase.

/// Rays that travel further than this (scene units) count as a miss.
pub const DEFAULT_MAX_DISTANCE: f32 = 50.0;

/// A ray has hit a surface once the field distance drops below this.
pub const DEFAULT_PRECISION: f32 = 0.01;

/// Vertical field of view in degrees.
pub const DEFAULT_FOV_DEGREES: f32 = 45.0;

/// Distance of the camera from the scene origin along +z.
pub const DEFAULT_CAMERA_RADIUS: f32 = 20.0;
