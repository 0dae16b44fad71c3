//! Graphics device collaborator
//!
//! # Architecture
//!
//! The render core never talks to a graphics API directly. Replay and
//! immediate script calls go through [`GraphicsDevice`], which a backend
//! implements. [`RecordingDevice`] is a headless implementation that keeps
//! an ordered log of every call.

use std::any::Any;

use thiserror::Error;

use super::graphics::{
    BlendFactor, BufferType, FaceType, RenderState, RenderTargetHandle, TextureHandle,
    TextureParams,
};

mod recording;

pub use recording::{DeviceCall, RecordingDevice};

/// Device-level failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The render target handle no longer refers to a live target
    #[error("Unknown render target: {0:?}")]
    UnknownRenderTarget(RenderTargetHandle),

    /// Creation parameters were rejected by the backend
    #[error("Invalid render target parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for device operations
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Graphics device operations consumed by replay and by the script API.
pub trait GraphicsDevice {
    /// Turn a render state on
    fn enable_state(&mut self, state: RenderState);

    /// Turn a render state off
    fn disable_state(&mut self, state: RenderState);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Set the blend equation factors
    fn set_blend_func(&mut self, source: BlendFactor, destination: BlendFactor);

    /// Enable or disable writes per colour channel
    fn set_color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);

    /// Enable or disable depth writes
    fn set_depth_mask(&mut self, enabled: bool);

    /// Set the stencil write mask
    fn set_stencil_mask(&mut self, mask: u32);

    /// Select faces to cull
    fn set_cull_face(&mut self, face: FaceType);

    /// Set depth offset applied to filled polygons
    fn set_polygon_offset(&mut self, factor: f32, units: f32);

    /// Clear the buffers in `flags` of the active target
    fn clear(&mut self, flags: BufferType, color: [u8; 4], depth: f32, stencil: u32);

    /// Create a render target with one attachment per entry of `attachments`
    fn new_render_target(
        &mut self,
        attachments: &[(BufferType, TextureParams)],
    ) -> DeviceResult<RenderTargetHandle>;

    /// Destroy a render target and its attachments
    fn delete_render_target(&mut self, target: RenderTargetHandle) -> DeviceResult<()>;

    /// Resize every attachment of a render target
    fn set_render_target_size(
        &mut self,
        target: RenderTargetHandle,
        width: u32,
        height: u32,
    ) -> DeviceResult<()>;

    /// Direct subsequent drawing into `target`
    fn enable_render_target(&mut self, target: RenderTargetHandle) -> DeviceResult<()>;

    /// Return to the default framebuffer
    fn disable_render_target(&mut self, target: Option<RenderTargetHandle>);

    /// Texture backing one attachment of a render target
    fn render_target_texture(
        &self,
        target: RenderTargetHandle,
        buffer_type: BufferType,
    ) -> Option<TextureHandle>;

    /// Texture width in pixels
    fn texture_width(&self, texture: TextureHandle) -> Option<u32>;

    /// Texture height in pixels
    fn texture_height(&self, texture: TextureHandle) -> Option<u32>;

    /// Bind a texture to a sampler unit
    fn enable_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Unbind a sampler unit
    fn disable_texture(&mut self, unit: u32);

    /// Project (design) width
    fn width(&self) -> u32;

    /// Project (design) height
    fn height(&self) -> u32;

    /// Current window width
    fn window_width(&self) -> u32;

    /// Current window height
    fn window_height(&self) -> u32;

    /// Downcast to the concrete device type
    fn as_any(&self) -> &dyn Any;

    /// Downcast to the concrete device type (mutable)
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
