//! Command replay
//!
//! Executes a recorded command stream in push order against the render
//! context and world. Replay stops at the first command that fails; state
//! set by earlier commands stays in effect.

use slotmap::SlotMap;

use super::{RenderScriptError, ScriptResult};
use crate::foundation::math::unpack_rgba8;
use crate::render::command::Command;
use crate::render::constants::{ConstantBufferHandle, NamedConstantBuffer};
use crate::render::context::RenderContext;
use crate::render::dispatch::{DrawStats, ObjectRenderer};
use crate::render::predicate::Predicate;
use crate::render::world::RenderWorld;

/// Everything replay reads or drives
pub struct ReplayTarget<'a> {
    /// Device, camera and material state
    pub context: &'a mut RenderContext,
    /// Objects drawn by `DRAW`
    pub world: &'a mut RenderWorld,
    /// Per-type draw handlers
    pub renderer: &'a mut dyn ObjectRenderer,
    /// Predicates of the recording instance
    pub predicates: &'a [Predicate],
    /// Constant buffers of the recording instance
    pub constant_buffers: &'a SlotMap<ConstantBufferHandle, NamedConstantBuffer>,
}

/// Execute `commands` in order. Returns the combined draw counts of every
/// `DRAW` command.
pub fn replay(commands: &[Command], target: &mut ReplayTarget<'_>) -> ScriptResult<DrawStats> {
    let mut stats = DrawStats::default();
    for (index, command) in commands.iter().enumerate() {
        log::trace!("Replaying {} ({}/{})", command.kind(), index + 1, commands.len());
        match execute(command, target) {
            Ok(drawn) => stats += drawn,
            Err(err) => {
                log::error!("Render command {} ({}) failed: {}", index, command.kind(), err);
                return Err(RenderScriptError::Replay {
                    index,
                    kind: command.kind(),
                    source: Box::new(err),
                });
            }
        }
    }
    Ok(stats)
}

fn execute(command: &Command, target: &mut ReplayTarget<'_>) -> ScriptResult<DrawStats> {
    let context = &mut *target.context;
    match *command {
        Command::EnableState(state) => context.device_mut().enable_state(state),
        Command::DisableState(state) => context.device_mut().disable_state(state),
        Command::SetViewport { x, y, width, height } => {
            context.device_mut().set_viewport(x, y, width, height);
        }
        Command::SetView(view) => context.set_view(view),
        Command::SetProjection(projection) => context.set_projection(projection),
        Command::SetBlendFunc { source, destination } => {
            context.device_mut().set_blend_func(source, destination);
        }
        Command::SetColorMask { red, green, blue, alpha } => {
            context.device_mut().set_color_mask(red, green, blue, alpha);
        }
        Command::SetDepthMask(enabled) => context.device_mut().set_depth_mask(enabled),
        Command::SetStencilMask(mask) => context.device_mut().set_stencil_mask(mask),
        Command::SetCullFace(face) => context.device_mut().set_cull_face(face),
        Command::SetPolygonOffset { factor, units } => {
            context.device_mut().set_polygon_offset(factor, units);
        }
        Command::EnableRenderTarget(render_target) => {
            context.device_mut().enable_render_target(render_target)?;
        }
        Command::DisableRenderTarget(render_target) => {
            context.device_mut().disable_render_target(render_target);
        }
        Command::EnableTexture { unit, texture } => {
            context.device_mut().enable_texture(unit, texture);
        }
        Command::DisableTexture { unit } => context.device_mut().disable_texture(unit),
        Command::Clear {
            flags,
            color,
            depth_bits,
            stencil,
        } => {
            context
                .device_mut()
                .clear(flags, unpack_rgba8(color), f32::from_bits(depth_bits), stencil);
        }
        Command::Draw {
            predicate,
            constants,
        } => {
            let predicate = target
                .predicates
                .get(predicate.index())
                .ok_or(RenderScriptError::UnknownPredicate("draw"))?;
            let constants = match constants {
                Some(handle) => Some(
                    target
                        .constant_buffers
                        .get(handle)
                        .ok_or(RenderScriptError::UnknownConstantBuffer("draw"))?,
                ),
                None => None,
            };
            let bits = target.world.tags().bits_for(predicate);
            let view = context.pass_view();
            let material = context.material();
            return Ok(target.world.draw_matching(
                bits,
                context.device_mut(),
                &mut *target.renderer,
                view,
                constants,
                material,
            ));
        }
        Command::DrawDebug2d => context.flush_debug_2d(),
        Command::DrawDebug3d => context.flush_debug_3d(),
        Command::EnableMaterial(material) => context.enable_material(material),
        Command::DisableMaterial => context.disable_material(),
    }
    Ok(DrawStats::default())
}
