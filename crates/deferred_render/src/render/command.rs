//! Deferred render commands
//!
//! A [`Command`] is one graphics operation recorded by a render script and
//! executed later by replay. Operands are plain values (matrices included),
//! so a command owns everything it needs and dropping a buffer frees it.

use std::fmt;

use super::constants::ConstantBufferHandle;
use super::graphics::{
    BlendFactor, BufferType, FaceType, MaterialHandle, RenderState, RenderTargetHandle,
    TextureHandle,
};
use super::predicate::PredicateHandle;
use crate::foundation::math::{pack_rgba8, Mat4, Vec4};

/// Command discriminant, in stable wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum CommandKind {
    /// Enable a render state
    EnableState,
    /// Disable a render state
    DisableState,
    /// Set the viewport
    SetViewport,
    /// Set the view matrix
    SetView,
    /// Set the projection matrix
    SetProjection,
    /// Set blend factors
    SetBlendFunc,
    /// Set colour write mask
    SetColorMask,
    /// Set depth write mask
    SetDepthMask,
    /// Set stencil write mask
    SetStencilMask,
    /// Set culled faces
    SetCullFace,
    /// Set polygon offset
    SetPolygonOffset,
    /// Bind a render target
    EnableRenderTarget,
    /// Unbind a render target
    DisableRenderTarget,
    /// Bind a texture unit
    EnableTexture,
    /// Unbind a texture unit
    DisableTexture,
    /// Clear buffers
    Clear,
    /// Draw objects matching a predicate
    Draw,
    /// Flush 2D debug geometry
    DrawDebug2d,
    /// Flush 3D debug geometry
    DrawDebug3d,
    /// Activate a material
    EnableMaterial,
    /// Deactivate the material
    DisableMaterial,
}

impl CommandKind {
    /// Upper-case name used in logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::EnableState => "ENABLE_STATE",
            Self::DisableState => "DISABLE_STATE",
            Self::SetViewport => "SET_VIEWPORT",
            Self::SetView => "SET_VIEW",
            Self::SetProjection => "SET_PROJECTION",
            Self::SetBlendFunc => "SET_BLEND_FUNC",
            Self::SetColorMask => "SET_COLOR_MASK",
            Self::SetDepthMask => "SET_DEPTH_MASK",
            Self::SetStencilMask => "SET_STENCIL_MASK",
            Self::SetCullFace => "SET_CULL_FACE",
            Self::SetPolygonOffset => "SET_POLYGON_OFFSET",
            Self::EnableRenderTarget => "ENABLE_RENDER_TARGET",
            Self::DisableRenderTarget => "DISABLE_RENDER_TARGET",
            Self::EnableTexture => "ENABLE_TEXTURE",
            Self::DisableTexture => "DISABLE_TEXTURE",
            Self::Clear => "CLEAR",
            Self::Draw => "DRAW",
            Self::DrawDebug2d => "DRAW_DEBUG2D",
            Self::DrawDebug3d => "DRAW_DEBUG3D",
            Self::EnableMaterial => "ENABLE_MATERIAL",
            Self::DisableMaterial => "DISABLE_MATERIAL",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One recorded graphics operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Enable a render state
    EnableState(RenderState),
    /// Disable a render state
    DisableState(RenderState),
    /// Set the viewport rectangle
    SetViewport {
        /// Left
        x: i32,
        /// Bottom
        y: i32,
        /// Width
        width: i32,
        /// Height
        height: i32,
    },
    /// Set the view matrix used by subsequent draws
    SetView(Mat4),
    /// Set the projection matrix used by subsequent draws
    SetProjection(Mat4),
    /// Set blend factors
    SetBlendFunc {
        /// Source factor
        source: BlendFactor,
        /// Destination factor
        destination: BlendFactor,
    },
    /// Per-channel colour write mask
    SetColorMask {
        /// Red
        red: bool,
        /// Green
        green: bool,
        /// Blue
        blue: bool,
        /// Alpha
        alpha: bool,
    },
    /// Depth write mask
    SetDepthMask(bool),
    /// Stencil write mask
    SetStencilMask(u32),
    /// Faces to cull
    SetCullFace(FaceType),
    /// Polygon depth offset
    SetPolygonOffset {
        /// Slope factor
        factor: f32,
        /// Constant units
        units: f32,
    },
    /// Bind a render target
    EnableRenderTarget(RenderTargetHandle),
    /// Return to the default framebuffer
    DisableRenderTarget(Option<RenderTargetHandle>),
    /// Bind a texture to a sampler unit
    EnableTexture {
        /// Sampler unit
        unit: u32,
        /// Texture to bind
        texture: TextureHandle,
    },
    /// Unbind a sampler unit
    DisableTexture {
        /// Sampler unit
        unit: u32,
    },
    /// Clear the active target
    Clear {
        /// Buffers to clear
        flags: BufferType,
        /// RGBA8, red in the low byte
        color: u32,
        /// Raw bits of the `f32` clear depth
        depth_bits: u32,
        /// Clear stencil value
        stencil: u32,
    },
    /// Draw every live object matching a predicate
    Draw {
        /// Predicate created by the same script instance
        predicate: PredicateHandle,
        /// Constants applied to every object drawn
        constants: Option<ConstantBufferHandle>,
    },
    /// Flush queued 2D debug geometry
    DrawDebug2d,
    /// Flush queued 3D debug geometry
    DrawDebug3d,
    /// Activate a material for subsequent draws
    EnableMaterial(MaterialHandle),
    /// Deactivate the current material
    DisableMaterial,
}

impl Command {
    /// Build a `Clear` command, packing colour and depth into their stored form.
    pub fn clear(flags: BufferType, color: &Vec4, depth: f32, stencil: u32) -> Self {
        Self::Clear {
            flags,
            color: pack_rgba8(color),
            depth_bits: depth.to_bits(),
            stencil,
        }
    }

    /// Discriminant of this command
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::EnableState(_) => CommandKind::EnableState,
            Self::DisableState(_) => CommandKind::DisableState,
            Self::SetViewport { .. } => CommandKind::SetViewport,
            Self::SetView(_) => CommandKind::SetView,
            Self::SetProjection(_) => CommandKind::SetProjection,
            Self::SetBlendFunc { .. } => CommandKind::SetBlendFunc,
            Self::SetColorMask { .. } => CommandKind::SetColorMask,
            Self::SetDepthMask(_) => CommandKind::SetDepthMask,
            Self::SetStencilMask(_) => CommandKind::SetStencilMask,
            Self::SetCullFace(_) => CommandKind::SetCullFace,
            Self::SetPolygonOffset { .. } => CommandKind::SetPolygonOffset,
            Self::EnableRenderTarget(_) => CommandKind::EnableRenderTarget,
            Self::DisableRenderTarget(_) => CommandKind::DisableRenderTarget,
            Self::EnableTexture { .. } => CommandKind::EnableTexture,
            Self::DisableTexture { .. } => CommandKind::DisableTexture,
            Self::Clear { .. } => CommandKind::Clear,
            Self::Draw { .. } => CommandKind::Draw,
            Self::DrawDebug2d => CommandKind::DrawDebug2d,
            Self::DrawDebug3d => CommandKind::DrawDebug3d,
            Self::EnableMaterial(_) => CommandKind::EnableMaterial,
            Self::DisableMaterial => CommandKind::DisableMaterial,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_stores_depth_bits_exactly() {
        let command = Command::clear(BufferType::DEPTH, &Vec4::zeros(), 0.75, 0);
        let Command::Clear { depth_bits, .. } = command else {
            panic!("expected a clear command");
        };
        assert_eq!(f32::from_bits(depth_bits).to_bits(), 0.75_f32.to_bits());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Command::DisableState(RenderState::Blend).kind(), CommandKind::DisableState);
        assert_eq!(CommandKind::DrawDebug2d.to_string(), "DRAW_DEBUG2D");
        assert!(CommandKind::EnableState < CommandKind::DisableMaterial);
    }
}
