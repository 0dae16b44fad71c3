//! Render module - Deferred command recording and object drawing
//!
//! # Architecture
//!
//! ```text
//! script update -> CommandBuffer -> replay -> GraphicsDevice
//!                                      |
//!                                      v
//!           RenderWorld::update -> RenderPass live lists -> ObjectRenderer
//! ```
//!
//! - [`command`] / [`command_buffer`]: the recorded command stream
//! - [`object`], [`pass`], [`world`]: objects, passes and the frame cycle
//! - [`predicate`]: tag masks and object matching
//! - [`dispatch`]: type-grouped draw dispatch
//! - [`device`], [`debug`], [`context`]: collaborators used during replay

pub mod command;
pub mod command_buffer;
pub mod constants;
pub mod context;
pub mod debug;
pub mod device;
pub mod dispatch;
pub mod graphics;
pub mod object;
pub mod pass;
pub mod predicate;
pub mod world;

#[cfg(test)]
mod pipeline_tests;

pub use command::{Command, CommandKind};
pub use command_buffer::CommandBuffer;
pub use constants::{ConstantBufferHandle, NamedConstantBuffer};
pub use context::RenderContext;
pub use debug::{DebugBuffer, DebugRenderer};
pub use device::{DeviceCall, DeviceError, DeviceResult, GraphicsDevice, RecordingDevice};
pub use dispatch::{DrawContext, DrawStats, ObjectRenderer};
pub use graphics::{
    BlendFactor, BufferType, FaceType, InvalidEnumValue, MaterialHandle, RenderState,
    RenderTargetHandle, TextureFilter, TextureFormat, TextureHandle, TextureParams, TextureWrap,
};
pub use object::{
    ColorType, EntityId, ObjectState, RenderObject, RenderObjectDesc, RenderObjectHandle,
    RenderObjectType, ResourceId,
};
pub use pass::{PassHooks, PassView, RenderPassDesc, RenderPassId};
pub use predicate::{matches, Predicate, PredicateHandle, TagRegistry};
pub use world::{FrameStats, RenderWorld, RenderWorldError, TransformSource, WorldResult};
