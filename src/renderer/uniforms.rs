/// Uniform buffer data for the raymarch shader.
///
/// Field order mirrors `SceneUniforms` in `raymarch.wgsl`: each `vec3` is
/// followed by a scalar so the struct packs to 16-byte rows.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Surface size in physical pixels
    pub resolution: [f32; 2],
    /// Seconds since the first rendered frame
    pub time: f32,
    pub _pad: f32,
    /// Pointer x, y (0..1) and accumulated movement
    pub pointer: [f32; 3],
    /// Vertical field of view in radians
    pub fov: f32,
    pub camera: [f32; 3],
    pub max_distance: f32,
    pub look_at: [f32; 3],
    pub march_precision: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    #[test]
    fn test_layout_matches_wgsl() {
        assert_eq!(size_of::<SceneUniforms>(), 64);
        assert_eq!(offset_of!(SceneUniforms, time), 8);
        assert_eq!(offset_of!(SceneUniforms, pointer), 16);
        assert_eq!(offset_of!(SceneUniforms, fov), 28);
        assert_eq!(offset_of!(SceneUniforms, camera), 32);
        assert_eq!(offset_of!(SceneUniforms, max_distance), 44);
        assert_eq!(offset_of!(SceneUniforms, look_at), 48);
        assert_eq!(offset_of!(SceneUniforms, march_precision), 60);
    }
}
