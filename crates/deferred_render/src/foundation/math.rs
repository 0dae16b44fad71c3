//! Math utilities and types
//!
//! Provides the matrix and vector types carried by render commands and
//! render objects.

pub use nalgebra::{Matrix4, Quaternion, Unit, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (colours, shader constants)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Pack a normalised RGBA colour into a `u32`, red in the lowest byte.
///
/// Components are clamped to `[0, 1]` before being scaled to 8 bits.
pub fn pack_rgba8(color: &Vec4) -> u32 {
    let channel = |value: f32| u32::from((value.clamp(0.0, 1.0) * 255.0) as u8);
    channel(color.x) | (channel(color.y) << 8) | (channel(color.z) << 16) | (channel(color.w) << 24)
}

/// Inverse of [`pack_rgba8`]: split a packed colour into `[r, g, b, a]` bytes.
pub const fn unpack_rgba8(packed: u32) -> [u8; 4] {
    packed.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_rgba8_channel_order() {
        let packed = pack_rgba8(&Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(packed, 0xFF00_00FF);
        assert_eq!(unpack_rgba8(packed), [255, 0, 0, 255]);
    }

    #[test]
    fn test_pack_rgba8_clamps() {
        let packed = pack_rgba8(&Vec4::new(2.0, -1.0, 0.5, 0.0));
        assert_eq!(unpack_rgba8(packed), [255, 0, 127, 0]);
    }
}
