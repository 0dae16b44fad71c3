//! Script-facing render API
//!
//! [`RenderApi`] is handed to every entry point and is bound to the instance
//! being run. Drawing-state functions validate their arguments and record a
//! command; a rejected call records nothing. Resource functions act on the
//! device immediately.

use smallvec::SmallVec;

use super::instance::{ScriptData, ScriptState};
use super::{RenderScriptError, ScriptResult};
use crate::foundation::hash::hash64;
use crate::foundation::math::{Mat4, Vec4};
use crate::render::command::Command;
use crate::render::constants::{ConstantBufferHandle, NamedConstantBuffer};
use crate::render::context::RenderContext;
use crate::render::graphics::{
    BlendFactor, BufferType, FaceType, RenderState, RenderTargetHandle, TextureFilter,
    TextureFormat, TextureParams, TextureWrap,
};
use crate::render::predicate::{Predicate, PredicateHandle};

/// Render target attachment parameters as a script passes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTextureParams {
    /// [`TextureFormat`] number
    pub format: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// [`TextureFilter`] number
    pub min_filter: u32,
    /// [`TextureFilter`] number
    pub mag_filter: u32,
    /// [`TextureWrap`] number
    pub u_wrap: u32,
    /// [`TextureWrap`] number
    pub v_wrap: u32,
}

impl RawTextureParams {
    /// Validate every field
    pub fn validate(&self) -> ScriptResult<TextureParams> {
        let invalid = |parameter, value| RenderScriptError::InvalidTextureParameter { parameter, value };
        Ok(TextureParams {
            format: TextureFormat::try_from(self.format).map_err(|e| invalid("format", e.value))?,
            width: self.width,
            height: self.height,
            min_filter: TextureFilter::try_from(self.min_filter)
                .map_err(|e| invalid("min_filter", e.value))?,
            mag_filter: TextureFilter::try_from(self.mag_filter)
                .map_err(|e| invalid("mag_filter", e.value))?,
            u_wrap: TextureWrap::try_from(self.u_wrap).map_err(|e| invalid("u_wrap", e.value))?,
            v_wrap: TextureWrap::try_from(self.v_wrap).map_err(|e| invalid("v_wrap", e.value))?,
        })
    }
}

/// Value paired with a buffer type in [`RenderApi::clear`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Colour, for the colour buffer
    Color(Vec4),
    /// Number, for the depth and stencil buffers
    Number(f64),
}

/// Render functions available to a running script
pub struct RenderApi<'a> {
    state: &'a mut ScriptState,
    context: &'a mut RenderContext,
}

impl<'a> RenderApi<'a> {
    pub(crate) fn new(state: &'a mut ScriptState, context: &'a mut RenderContext) -> Self {
        Self { state, context }
    }

    fn record(&mut self, command: Command) -> ScriptResult<()> {
        if self.state.commands.push(command) {
            Ok(())
        } else {
            Err(RenderScriptError::CommandBufferFull {
                capacity: self.state.commands.capacity(),
            })
        }
    }

    fn render_state(operation: &'static str, value: u32) -> ScriptResult<RenderState> {
        RenderState::try_from(value).map_err(|_| RenderScriptError::InvalidState { operation, value })
    }

    fn buffer_type(operation: &'static str, value: u32) -> ScriptResult<BufferType> {
        BufferType::single(value).ok_or(RenderScriptError::UnknownBufferType { operation, value })
    }

    fn require_target(
        operation: &'static str,
        target: Option<RenderTargetHandle>,
    ) -> ScriptResult<RenderTargetHandle> {
        target.ok_or(RenderScriptError::NilRenderTarget(operation))
    }

    /// Program data table
    pub fn data(&self) -> &ScriptData {
        &self.state.data
    }

    /// Program data table (mutable)
    pub fn data_mut(&mut self) -> &mut ScriptData {
        &mut self.state.data
    }

    /// Number of commands recorded so far this update
    pub fn recorded(&self) -> usize {
        self.state.commands.len()
    }

    /// `render.enable_state(state)`
    pub fn enable_state(&mut self, state: u32) -> ScriptResult<()> {
        let state = Self::render_state("enable_state", state)?;
        self.record(Command::EnableState(state))
    }

    /// `render.disable_state(state)`
    pub fn disable_state(&mut self, state: u32) -> ScriptResult<()> {
        let state = Self::render_state("disable_state", state)?;
        self.record(Command::DisableState(state))
    }

    /// `render.set_viewport(x, y, width, height)`
    pub fn set_viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> ScriptResult<()> {
        self.record(Command::SetViewport { x, y, width, height })
    }

    /// `render.set_view(matrix)`
    pub fn set_view(&mut self, view: Mat4) -> ScriptResult<()> {
        self.record(Command::SetView(view))
    }

    /// `render.set_projection(matrix)`
    pub fn set_projection(&mut self, projection: Mat4) -> ScriptResult<()> {
        self.record(Command::SetProjection(projection))
    }

    /// `render.set_blend_func(source, destination)`
    pub fn set_blend_func(&mut self, source: u32, destination: u32) -> ScriptResult<()> {
        let invalid = RenderScriptError::InvalidBlendFactors {
            source_factor: source,
            destination_factor: destination,
        };
        let (Ok(source), Ok(destination)) =
            (BlendFactor::try_from(source), BlendFactor::try_from(destination))
        else {
            return Err(invalid);
        };
        self.record(Command::SetBlendFunc { source, destination })
    }

    /// `render.set_color_mask(red, green, blue, alpha)`
    pub fn set_color_mask(
        &mut self,
        red: bool,
        green: bool,
        blue: bool,
        alpha: bool,
    ) -> ScriptResult<()> {
        self.record(Command::SetColorMask { red, green, blue, alpha })
    }

    /// `render.set_depth_mask(enabled)`
    pub fn set_depth_mask(&mut self, enabled: bool) -> ScriptResult<()> {
        self.record(Command::SetDepthMask(enabled))
    }

    /// `render.set_stencil_mask(mask)`
    pub fn set_stencil_mask(&mut self, mask: u32) -> ScriptResult<()> {
        self.record(Command::SetStencilMask(mask))
    }

    /// `render.set_cull_face(face)`
    pub fn set_cull_face(&mut self, face: u32) -> ScriptResult<()> {
        let face =
            FaceType::try_from(face).map_err(|_| RenderScriptError::InvalidFaceType { value: face })?;
        self.record(Command::SetCullFace(face))
    }

    /// `render.set_polygon_offset(factor, units)`
    pub fn set_polygon_offset(&mut self, factor: f32, units: f32) -> ScriptResult<()> {
        self.record(Command::SetPolygonOffset { factor, units })
    }

    /// `render.render_target(name, params)`: create a target and register it
    /// under `name`. Immediate.
    pub fn render_target(
        &mut self,
        name: &str,
        params: &[(u32, RawTextureParams)],
    ) -> ScriptResult<RenderTargetHandle> {
        let mut attachments: SmallVec<[(BufferType, TextureParams); 3]> = SmallVec::new();
        for (buffer_type, raw) in params {
            attachments.push((Self::buffer_type("render_target", *buffer_type)?, raw.validate()?));
        }
        let target = self.context.device_mut().new_render_target(&attachments)?;
        self.context.register_render_target(name, target);
        Ok(target)
    }

    /// `render.delete_render_target(target)`. Immediate.
    pub fn delete_render_target(&mut self, target: Option<RenderTargetHandle>) -> ScriptResult<()> {
        let target = Self::require_target("delete_render_target", target)?;
        self.context.device_mut().delete_render_target(target)?;
        self.context.unregister_render_target(target);
        Ok(())
    }

    /// Look up a target registered by [`render_target`](Self::render_target)
    pub fn get_render_target(&self, name: &str) -> Option<RenderTargetHandle> {
        self.context.render_target(name)
    }

    /// `render.enable_render_target(target)`
    pub fn enable_render_target(&mut self, target: Option<RenderTargetHandle>) -> ScriptResult<()> {
        let target = Self::require_target("enable_render_target", target)?;
        self.record(Command::EnableRenderTarget(target))
    }

    /// `render.disable_render_target(target)`
    pub fn disable_render_target(&mut self, target: Option<RenderTargetHandle>) -> ScriptResult<()> {
        self.record(Command::DisableRenderTarget(target))
    }

    /// `render.set_render_target_size(target, width, height)`. Immediate.
    pub fn set_render_target_size(
        &mut self,
        target: Option<RenderTargetHandle>,
        width: u32,
        height: u32,
    ) -> ScriptResult<()> {
        let target = Self::require_target("set_render_target_size", target)?;
        self.context
            .device_mut()
            .set_render_target_size(target, width, height)?;
        Ok(())
    }

    /// `render.enable_texture(unit, target, buffer_type)`
    pub fn enable_texture(
        &mut self,
        unit: u32,
        target: Option<RenderTargetHandle>,
        buffer_type: u32,
    ) -> ScriptResult<()> {
        let target = Self::require_target("enable_texture", target)?;
        let buffer_type = Self::buffer_type("enable_texture", buffer_type)?;
        let texture = self
            .context
            .device()
            .render_target_texture(target, buffer_type)
            .ok_or(RenderScriptError::MissingTexture)?;
        self.record(Command::EnableTexture { unit, texture })
    }

    /// `render.disable_texture(unit)`
    pub fn disable_texture(&mut self, unit: u32) -> ScriptResult<()> {
        self.record(Command::DisableTexture { unit })
    }

    fn render_target_dimension(
        &self,
        operation: &'static str,
        target: Option<RenderTargetHandle>,
        buffer_type: u32,
        height: bool,
    ) -> ScriptResult<u32> {
        let target = Self::require_target(operation, target)?;
        let buffer_type = Self::buffer_type(operation, buffer_type)?;
        let device = self.context.device();
        let texture = device
            .render_target_texture(target, buffer_type)
            .ok_or(RenderScriptError::MissingTexture)?;
        let size = if height {
            device.texture_height(texture)
        } else {
            device.texture_width(texture)
        };
        size.ok_or(RenderScriptError::MissingTexture)
    }

    /// `render.get_render_target_width(target, buffer_type)`. Immediate.
    pub fn get_render_target_width(
        &self,
        target: Option<RenderTargetHandle>,
        buffer_type: u32,
    ) -> ScriptResult<u32> {
        self.render_target_dimension("get_render_target_width", target, buffer_type, false)
    }

    /// `render.get_render_target_height(target, buffer_type)`. Immediate.
    pub fn get_render_target_height(
        &self,
        target: Option<RenderTargetHandle>,
        buffer_type: u32,
    ) -> ScriptResult<u32> {
        self.render_target_dimension("get_render_target_height", target, buffer_type, true)
    }

    /// `render.clear({[buffer_type] = value, ...})`
    ///
    /// Buffers not named keep a zero clear value.
    pub fn clear(&mut self, values: &[(u32, ClearValue)]) -> ScriptResult<()> {
        let mut flags = BufferType::empty();
        let mut color = Vec4::zeros();
        let mut depth = 0.0_f32;
        let mut stencil = 0_u32;

        for (value_type, value) in values {
            let buffer_type = Self::buffer_type("clear", *value_type)?;
            let expected = if buffer_type == BufferType::COLOR { "a colour" } else { "a number" };
            match value {
                ClearValue::Color(c) if buffer_type == BufferType::COLOR => color = *c,
                ClearValue::Number(n) if buffer_type == BufferType::DEPTH => depth = *n as f32,
                ClearValue::Number(n) if buffer_type == BufferType::STENCIL => stencil = *n as u32,
                _ => {
                    return Err(RenderScriptError::InvalidClearValue {
                        value: *value_type,
                        expected,
                    })
                }
            }
            flags |= buffer_type;
        }
        self.record(Command::clear(flags, &color, depth, stencil))
    }

    /// `render.draw(predicate, constants)`
    pub fn draw(
        &mut self,
        predicate: Option<PredicateHandle>,
        constants: Option<ConstantBufferHandle>,
    ) -> ScriptResult<()> {
        let predicate = predicate.ok_or(RenderScriptError::NilPredicate)?;
        if predicate.index() >= self.state.predicates.len() {
            return Err(RenderScriptError::UnknownPredicate("draw"));
        }
        if let Some(constants) = constants {
            if !self.state.constant_buffers.contains_key(constants) {
                return Err(RenderScriptError::UnknownConstantBuffer("draw"));
            }
        }
        self.record(Command::Draw { predicate, constants })
    }

    /// `render.draw_debug2d()`
    pub fn draw_debug2d(&mut self) -> ScriptResult<()> {
        self.record(Command::DrawDebug2d)
    }

    /// `render.draw_debug3d()`
    pub fn draw_debug3d(&mut self) -> ScriptResult<()> {
        self.record(Command::DrawDebug3d)
    }

    /// `render.get_width()`: project width
    pub fn get_width(&self) -> u32 {
        self.context.device().width()
    }

    /// `render.get_height()`: project height
    pub fn get_height(&self) -> u32 {
        self.context.device().height()
    }

    /// `render.get_window_width()`
    pub fn get_window_width(&self) -> u32 {
        self.context.device().window_width()
    }

    /// `render.get_window_height()`
    pub fn get_window_height(&self) -> u32 {
        self.context.device().window_height()
    }

    /// `render.predicate(tags)`
    ///
    /// Predicates live as long as the instance; the table is never reset
    /// between ticks. A program that builds predicates in `update` fills the
    /// table after `max_predicates` frames and then gets
    /// [`RenderScriptError::PredicateTableFull`], so create them in `init`
    /// and keep the handles in the data table.
    pub fn predicate(&mut self, tags: &[&str]) -> ScriptResult<PredicateHandle> {
        if self.state.predicates.len() >= self.state.max_predicates {
            return Err(RenderScriptError::PredicateTableFull {
                capacity: self.state.max_predicates,
            });
        }
        let predicate = Predicate::from_tags(tags.iter().copied(), self.state.max_predicate_tags);
        self.state.predicates.push(predicate);
        Ok(PredicateHandle(self.state.predicates.len() - 1))
    }

    /// `render.constant_buffer()`
    pub fn constant_buffer(&mut self) -> ConstantBufferHandle {
        self.state.constant_buffers.insert(NamedConstantBuffer::new())
    }

    /// Release a constant buffer; later draws naming it fail
    pub fn delete_constant_buffer(&mut self, buffer: ConstantBufferHandle) -> ScriptResult<()> {
        self.state
            .constant_buffers
            .remove(buffer)
            .map(|_| ())
            .ok_or(RenderScriptError::UnknownConstantBuffer("delete_constant_buffer"))
    }

    /// `constants[name] = value`
    pub fn set_constant(
        &mut self,
        buffer: ConstantBufferHandle,
        name: &str,
        value: Vec4,
    ) -> ScriptResult<()> {
        self.state
            .constant_buffers
            .get_mut(buffer)
            .ok_or(RenderScriptError::UnknownConstantBuffer("set_constant"))?
            .set(name, value);
        Ok(())
    }

    /// `constants[name]`
    pub fn get_constant(&self, buffer: ConstantBufferHandle, name: &str) -> ScriptResult<Vec4> {
        self.state
            .constant_buffers
            .get(buffer)
            .ok_or(RenderScriptError::UnknownConstantBuffer("get_constant"))?
            .get(name)
            .ok_or_else(|| RenderScriptError::ConstantNotSet(name.to_string()))
    }

    /// `render.enable_material(name)`
    pub fn enable_material(&mut self, name: Option<&str>) -> ScriptResult<()> {
        let name = name.ok_or(RenderScriptError::NilMaterial)?;
        let material = self
            .state
            .materials
            .get(&hash64(name))
            .copied()
            .ok_or_else(|| RenderScriptError::MaterialNotFound(name.to_string()))?;
        self.record(Command::EnableMaterial(material))
    }

    /// `render.disable_material()`
    pub fn disable_material(&mut self) -> ScriptResult<()> {
        self.record(Command::DisableMaterial)
    }
}
