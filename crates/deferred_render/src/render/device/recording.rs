//! Headless device that records every call

use std::any::Any;

use slotmap::SlotMap;

use super::{DeviceError, DeviceResult, GraphicsDevice};
use crate::render::graphics::{
    BlendFactor, BufferType, FaceType, RenderState, RenderTargetHandle, TextureHandle,
    TextureParams,
};

/// One call made against a [`RecordingDevice`]
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    /// `enable_state`
    EnableState(RenderState),
    /// `disable_state`
    DisableState(RenderState),
    /// `set_viewport`
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
    /// `set_blend_func`
    SetBlendFunc(BlendFactor, BlendFactor),
    /// `set_color_mask`
    SetColorMask([bool; 4]),
    /// `set_depth_mask`
    SetDepthMask(bool),
    /// `set_stencil_mask`
    SetStencilMask(u32),
    /// `set_cull_face`
    SetCullFace(FaceType),
    /// `set_polygon_offset`
    SetPolygonOffset(f32, f32),
    /// `clear`
    Clear {
        /// Buffers cleared
        flags: BufferType,
        /// Clear colour bytes
        color: [u8; 4],
        /// Clear depth
        depth: f32,
        /// Clear stencil
        stencil: u32,
    },
    /// `new_render_target`
    NewRenderTarget(RenderTargetHandle),
    /// `delete_render_target`
    DeleteRenderTarget(RenderTargetHandle),
    /// `set_render_target_size`
    SetRenderTargetSize(RenderTargetHandle, u32, u32),
    /// `enable_render_target`
    EnableRenderTarget(RenderTargetHandle),
    /// `disable_render_target`
    DisableRenderTarget(Option<RenderTargetHandle>),
    /// `enable_texture`
    EnableTexture(u32, TextureHandle),
    /// `disable_texture`
    DisableTexture(u32),
}

#[derive(Debug, Clone)]
struct RecordedTarget {
    attachments: Vec<(BufferType, TextureHandle)>,
}

#[derive(Debug, Clone, Copy)]
struct RecordedTexture {
    width: u32,
    height: u32,
}

/// [`GraphicsDevice`] that performs no rendering and logs each call in order.
#[derive(Debug)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    targets: SlotMap<RenderTargetHandle, RecordedTarget>,
    textures: SlotMap<TextureHandle, RecordedTexture>,
    width: u32,
    height: u32,
    window_width: u32,
    window_height: u32,
}

impl RecordingDevice {
    /// Create a device whose project and window size are both `width` x `height`
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            calls: Vec::new(),
            targets: SlotMap::with_key(),
            textures: SlotMap::with_key(),
            width,
            height,
            window_width: width,
            window_height: height,
        }
    }

    /// Simulate a window resize
    pub fn resize_window(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Drain the call log
    pub fn take_calls(&mut self) -> Vec<DeviceCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of live render targets
    pub fn render_target_count(&self) -> usize {
        self.targets.len()
    }

    fn target(&self, target: RenderTargetHandle) -> DeviceResult<&RecordedTarget> {
        self.targets
            .get(target)
            .ok_or(DeviceError::UnknownRenderTarget(target))
    }
}

impl Default for RecordingDevice {
    fn default() -> Self {
        Self::new(960, 640)
    }
}

impl GraphicsDevice for RecordingDevice {
    fn enable_state(&mut self, state: RenderState) {
        self.calls.push(DeviceCall::EnableState(state));
    }

    fn disable_state(&mut self, state: RenderState) {
        self.calls.push(DeviceCall::DisableState(state));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.calls.push(DeviceCall::SetViewport { x, y, width, height });
    }

    fn set_blend_func(&mut self, source: BlendFactor, destination: BlendFactor) {
        self.calls.push(DeviceCall::SetBlendFunc(source, destination));
    }

    fn set_color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.calls.push(DeviceCall::SetColorMask([red, green, blue, alpha]));
    }

    fn set_depth_mask(&mut self, enabled: bool) {
        self.calls.push(DeviceCall::SetDepthMask(enabled));
    }

    fn set_stencil_mask(&mut self, mask: u32) {
        self.calls.push(DeviceCall::SetStencilMask(mask));
    }

    fn set_cull_face(&mut self, face: FaceType) {
        self.calls.push(DeviceCall::SetCullFace(face));
    }

    fn set_polygon_offset(&mut self, factor: f32, units: f32) {
        self.calls.push(DeviceCall::SetPolygonOffset(factor, units));
    }

    fn clear(&mut self, flags: BufferType, color: [u8; 4], depth: f32, stencil: u32) {
        self.calls.push(DeviceCall::Clear { flags, color, depth, stencil });
    }

    fn new_render_target(
        &mut self,
        attachments: &[(BufferType, TextureParams)],
    ) -> DeviceResult<RenderTargetHandle> {
        if attachments.is_empty() {
            return Err(DeviceError::InvalidParameters(
                "a render target needs at least one attachment".to_string(),
            ));
        }
        let mut recorded = Vec::with_capacity(attachments.len());
        for (buffer_type, params) in attachments {
            let texture = self.textures.insert(RecordedTexture {
                width: params.width,
                height: params.height,
            });
            recorded.push((*buffer_type, texture));
        }
        let handle = self.targets.insert(RecordedTarget { attachments: recorded });
        self.calls.push(DeviceCall::NewRenderTarget(handle));
        Ok(handle)
    }

    fn delete_render_target(&mut self, target: RenderTargetHandle) -> DeviceResult<()> {
        let removed = self
            .targets
            .remove(target)
            .ok_or(DeviceError::UnknownRenderTarget(target))?;
        for (_, texture) in removed.attachments {
            self.textures.remove(texture);
        }
        self.calls.push(DeviceCall::DeleteRenderTarget(target));
        Ok(())
    }

    fn set_render_target_size(
        &mut self,
        target: RenderTargetHandle,
        width: u32,
        height: u32,
    ) -> DeviceResult<()> {
        let attachments = self.target(target)?.attachments.clone();
        for (_, texture) in attachments {
            if let Some(recorded) = self.textures.get_mut(texture) {
                recorded.width = width;
                recorded.height = height;
            }
        }
        self.calls
            .push(DeviceCall::SetRenderTargetSize(target, width, height));
        Ok(())
    }

    fn enable_render_target(&mut self, target: RenderTargetHandle) -> DeviceResult<()> {
        self.target(target)?;
        self.calls.push(DeviceCall::EnableRenderTarget(target));
        Ok(())
    }

    fn disable_render_target(&mut self, target: Option<RenderTargetHandle>) {
        self.calls.push(DeviceCall::DisableRenderTarget(target));
    }

    fn render_target_texture(
        &self,
        target: RenderTargetHandle,
        buffer_type: BufferType,
    ) -> Option<TextureHandle> {
        self.targets
            .get(target)?
            .attachments
            .iter()
            .find(|(kind, _)| *kind == buffer_type)
            .map(|(_, texture)| *texture)
    }

    fn texture_width(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(texture).map(|t| t.width)
    }

    fn texture_height(&self, texture: TextureHandle) -> Option<u32> {
        self.textures.get(texture).map(|t| t.height)
    }

    fn enable_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.calls.push(DeviceCall::EnableTexture(unit, texture));
    }

    fn disable_texture(&mut self, unit: u32) {
        self.calls.push(DeviceCall::DisableTexture(unit));
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn window_width(&self) -> u32 {
        self.window_width
    }

    fn window_height(&self) -> u32 {
        self.window_height
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
