//! # Deferred Render
//!
//! Deferred render-command pipeline for a real-time engine.
//!
//! ## Features
//!
//! - **Record and replay**: render scripts record commands that never touch
//!   the device; replay executes them in order once the script returns
//! - **Render world**: arena-owned render objects with a mark-then-reap
//!   lifecycle
//! - **Double-buffered passes**: per-pass instance lists filled by tag mask
//!   and swapped once per frame
//! - **Typed dispatch**: one draw handler per object type, grouped into
//!   begin/end runs
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deferred_render::prelude::*;
//!
//! struct Renderer;
//!
//! impl ObjectRenderer for Renderer {
//!     fn draw_model(&mut self, _ctx: &mut DrawContext<'_>, _object: RenderObjectHandle) {}
//!     fn draw_text(&mut self, _ctx: &mut DrawContext<'_>, _object: RenderObjectHandle) {}
//!     fn draw_particle(&mut self, _ctx: &mut DrawContext<'_>, _object: RenderObjectHandle) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenderConfig::default();
//!     let mut world = RenderWorld::new(&config);
//!     let mask = world.tags_mut().mask_for(["model"])?;
//!     world.add_render_pass(RenderPassDesc::new("opaque", mask))?;
//!     world.new_tagged_render_object(RenderObjectType::Model, ResourceId(1), &["model"])?;
//!
//!     let mut device = RecordingDevice::default();
//!     let stats = world.update(1.0 / 60.0, &mut device, &mut Renderer);
//!     assert_eq!(stats.drawn, 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod render;
pub mod script;

/// Common imports for crate users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, RenderConfig},
        foundation::math::{Mat4, Quat, Vec3, Vec4},
        render::{
            BufferType, ColorType, Command, CommandBuffer, DebugBuffer, DebugRenderer,
            DrawContext, EntityId, FrameStats, GraphicsDevice, MaterialHandle, ObjectRenderer,
            PassHooks, PassView, RecordingDevice, RenderContext, RenderObjectDesc,
            RenderObjectHandle, RenderObjectType, RenderPassDesc, RenderWorld, RenderWorldError,
            ResourceId, TransformSource,
        },
        script::{
            Message, ProgramRegistry, RenderApi, RenderScript, RenderScriptError,
            RenderScriptInstance, RenderScriptProgram, ScriptLoader, ScriptResult, ScriptValue,
        },
    };
}
