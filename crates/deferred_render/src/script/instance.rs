//! Render script instances
//!
//! An instance binds a shared [`RenderScript`](super::RenderScript) to the
//! per-instance state its entry points work on: the command buffer,
//! predicates, constant buffers, the material table and a free-form data
//! table.

use std::collections::HashMap;
use std::rc::Rc;

use slotmap::SlotMap;

use super::api::RenderApi;
use super::message::{Message, MessagePayload, ScriptValue};
use super::program::{EntryPoint, RenderScriptProgram, SharedRenderScript};
use super::replay::{replay, ReplayTarget};
use super::{RenderScriptError, ScriptResult};
use crate::config::RenderConfig;
use crate::foundation::hash::{hash64, Hash64};
use crate::foundation::math::Vec4;
use crate::render::command_buffer::CommandBuffer;
use crate::render::constants::{ConstantBufferHandle, NamedConstantBuffer};
use crate::render::context::RenderContext;
use crate::render::dispatch::{DrawStats, ObjectRenderer};
use crate::render::graphics::MaterialHandle;
use crate::render::predicate::{Predicate, PredicateHandle};
use crate::render::world::RenderWorld;

/// Face colour of text drawn through [`DRAW_TEXT`](super::message::DRAW_TEXT) messages
const DEBUG_TEXT_COLOR: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

/// Key-value table a program keeps between calls
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptData {
    values: HashMap<String, ScriptValue>,
}

impl ScriptData {
    /// Read a value
    pub fn get(&self, key: &str) -> Option<&ScriptValue> {
        self.values.get(key)
    }

    /// Write a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: ScriptValue) -> Option<ScriptValue> {
        self.values.insert(key.into(), value)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<ScriptValue> {
        self.values.remove(key)
    }

    /// Read a number, if the key holds one
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            Some(ScriptValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Read a predicate handle, if the key holds one
    pub fn predicate(&self, key: &str) -> Option<PredicateHandle> {
        match self.values.get(key) {
            Some(ScriptValue::Predicate(handle)) => Some(*handle),
            _ => None,
        }
    }

    /// Read a constant buffer handle, if the key holds one
    pub fn constant_buffer(&self, key: &str) -> Option<ConstantBufferHandle> {
        match self.values.get(key) {
            Some(ScriptValue::ConstantBuffer(handle)) => Some(*handle),
            _ => None,
        }
    }
}

/// State an instance's entry points operate on
#[derive(Debug)]
pub(crate) struct ScriptState {
    pub(crate) commands: CommandBuffer,
    pub(crate) predicates: Vec<Predicate>,
    pub(crate) max_predicates: usize,
    pub(crate) max_predicate_tags: usize,
    pub(crate) constant_buffers: SlotMap<ConstantBufferHandle, NamedConstantBuffer>,
    pub(crate) materials: HashMap<Hash64, MaterialHandle>,
    pub(crate) data: ScriptData,
}

/// One running render script
#[derive(Debug)]
pub struct RenderScriptInstance {
    script: SharedRenderScript,
    state: ScriptState,
    last_draw: DrawStats,
}

impl RenderScriptInstance {
    /// Create an instance sized by `config`
    pub fn new(config: &RenderConfig, script: SharedRenderScript) -> Self {
        Self {
            script,
            state: ScriptState {
                commands: CommandBuffer::new(config.command_buffer_size),
                predicates: Vec::with_capacity(config.max_predicates),
                max_predicates: config.max_predicates,
                max_predicate_tags: config.max_predicate_tags,
                constant_buffers: SlotMap::with_key(),
                materials: HashMap::with_capacity(config.material_capacity),
                data: ScriptData::default(),
            },
            last_draw: DrawStats::default(),
        }
    }

    /// Script this instance runs
    pub const fn script(&self) -> &SharedRenderScript {
        &self.script
    }

    /// Switch to another script; instance state is kept
    pub fn set_script(&mut self, script: SharedRenderScript) {
        self.script = script;
    }

    /// Make a material available to `enable_material` under `name`
    pub fn add_material(&mut self, name: &str, material: MaterialHandle) {
        self.state.materials.insert(hash64(name), material);
    }

    /// Forget every material
    pub fn clear_materials(&mut self) {
        self.state.materials.clear();
    }

    /// Number of registered materials
    pub fn material_count(&self) -> usize {
        self.state.materials.len()
    }

    /// Commands recorded by the last update
    pub const fn command_buffer(&self) -> &CommandBuffer {
        &self.state.commands
    }

    /// A predicate created by this instance
    pub fn predicate(&self, handle: PredicateHandle) -> Option<&Predicate> {
        self.state.predicates.get(handle.index())
    }

    /// A constant buffer created by this instance
    pub fn constant_buffer(&self, handle: ConstantBufferHandle) -> Option<&NamedConstantBuffer> {
        self.state.constant_buffers.get(handle)
    }

    /// Program data table
    pub const fn data(&self) -> &ScriptData {
        &self.state.data
    }

    /// Program data table (mutable)
    pub fn data_mut(&mut self) -> &mut ScriptData {
        &mut self.state.data
    }

    /// Draw counts from the last replay
    pub const fn last_draw_stats(&self) -> DrawStats {
        self.last_draw
    }

    /// Run `init`
    pub fn init(&mut self, ctx: &mut RenderContext) -> ScriptResult<()> {
        self.call(ctx, EntryPoint::Init, |program, render| program.init(render))
    }

    /// Run `on_reload`
    pub fn on_reload(&mut self, ctx: &mut RenderContext) -> ScriptResult<()> {
        self.call(ctx, EntryPoint::OnReload, |program, render| {
            program.on_reload(render)
        })
    }

    /// One frame of the script.
    ///
    /// The command buffer is cleared, queued messages are dispatched,
    /// `update` runs, and everything recorded by the message handlers and
    /// `update` is replayed in push order. Commands recorded before a runtime
    /// error are still replayed. The first error raised by any of these steps
    /// is returned.
    pub fn update(
        &mut self,
        ctx: &mut RenderContext,
        world: &mut RenderWorld,
        renderer: &mut dyn ObjectRenderer,
    ) -> ScriptResult<()> {
        self.state.commands.clear();
        let dispatched = self.dispatch_messages(ctx);

        let updated = self.call(ctx, EntryPoint::Update, |program, render| {
            program.update(render)
        });

        let replayed = if self.state.commands.is_empty() {
            self.last_draw = DrawStats::default();
            Ok(())
        } else {
            let mut target = ReplayTarget {
                context: ctx,
                world,
                renderer,
                predicates: &self.state.predicates,
                constant_buffers: &self.state.constant_buffers,
            };
            replay(self.state.commands.as_slice(), &mut target).map(|stats| {
                self.last_draw = stats;
            })
        };

        dispatched.and(updated).and(replayed)
    }

    /// Deliver every queued message.
    ///
    /// Debug text and line requests are drawn directly; everything else goes
    /// to `on_message`, whose commands join the current tick's buffer. All
    /// messages are delivered even if one fails; the first failure is
    /// returned.
    pub(crate) fn dispatch_messages(&mut self, ctx: &mut RenderContext) -> ScriptResult<()> {
        let mut result = Ok(());
        for message in ctx.mailbox_mut().drain() {
            let delivered = match &message.payload {
                MessagePayload::DrawText { text, position } => {
                    if ctx.debug().has_system_font() {
                        ctx.debug_mut()
                            .draw_text(text, *position, DEBUG_TEXT_COLOR);
                        Ok(())
                    } else {
                        log::warn!("Unable to draw text '{}': no system font is loaded", text);
                        Err(RenderScriptError::NoSystemFont(text.clone()))
                    }
                }
                MessagePayload::DrawLine { start, end, color } => {
                    ctx.debug_mut().draw_line(*start, *end, *color);
                    Ok(())
                }
                MessagePayload::Table(_) => self.deliver(ctx, &message),
            };
            result = result.and(delivered);
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn into_state(self) -> ScriptState {
        self.state
    }

    fn deliver(&mut self, ctx: &mut RenderContext, message: &Message) -> ScriptResult<()> {
        self.call(ctx, EntryPoint::OnMessage, |program, render| {
            program.on_message(render, message)
        })
    }

    fn call<F>(&mut self, ctx: &mut RenderContext, entry: EntryPoint, run: F) -> ScriptResult<()>
    where
        F: FnOnce(&dyn RenderScriptProgram, &mut RenderApi<'_>) -> ScriptResult<()>,
    {
        let script = Rc::clone(&self.script);
        let script = script.borrow();
        if !script.entry_points().contains(entry.flag()) {
            return Ok(());
        }

        let mut render = RenderApi::new(&mut self.state, ctx);
        let result = run(script.program(), &mut render);
        if let Err(err) = &result {
            log::error!(
                "Error running '{}' in render script '{}': {}",
                entry.name(),
                script.filename(),
                err
            );
        }
        result
    }
}
