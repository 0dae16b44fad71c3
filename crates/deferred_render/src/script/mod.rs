//! Render scripts
//!
//! # Architecture
//!
//! A render script is a host-compiled [`RenderScriptProgram`] with optional
//! `init`, `update`, `on_message` and `on_reload` entry points. Programs are
//! stateless; everything an instance remembers lives in its
//! [`RenderScriptInstance`].
//!
//! ## Record and replay
//!
//! Entry points receive a [`RenderApi`] bound to their instance. Drawing
//! state calls only record [`Command`](crate::render::Command)s; nothing
//! reaches the device until the update returns and [`replay`] executes the
//! buffer in push order. Resource management (render target creation,
//! size queries) is immediate.

pub mod api;
pub mod constants;
pub mod instance;
pub mod message;
pub mod program;
pub mod replay;

use thiserror::Error;

use crate::render::command::CommandKind;
use crate::render::device::DeviceError;

pub use api::{ClearValue, RawTextureParams, RenderApi};
pub use instance::{RenderScriptInstance, ScriptData};
pub use message::{Mailbox, Message, MessagePayload, ScriptValue, Url};
pub use program::{
    EntryPoint, EntryPoints, ProgramRegistry, RenderScript, RenderScriptProgram, ScriptLoader,
    SharedRenderScript,
};
pub use replay::{replay, ReplayTarget};

/// Render script errors
///
/// Every error aborts only the call that raised it.
#[derive(Error, Debug)]
pub enum RenderScriptError {
    /// The command buffer has no room for another command
    #[error("Command buffer is full ({capacity}).")]
    CommandBufferFull {
        /// Buffer capacity
        capacity: usize,
    },

    /// The predicate table has no room for another predicate
    #[error("Could not create more predicates since the buffer is full ({capacity}).")]
    PredicateTableFull {
        /// Table capacity
        capacity: usize,
    },

    /// A render state number is not a known state
    #[error("Invalid state: render.{operation}({value}).")]
    InvalidState {
        /// API function called
        operation: &'static str,
        /// Rejected number
        value: u32,
    },

    /// A blend factor number is not a known factor
    #[error("Invalid blend types: render.set_blend_func({source_factor}, {destination_factor})")]
    InvalidBlendFactors {
        /// Source factor number
        source_factor: u32,
        /// Destination factor number
        destination_factor: u32,
    },

    /// A face type number is not a known face type
    #[error("Invalid face types: render.set_cull_face({value})")]
    InvalidFaceType {
        /// Rejected number
        value: u32,
    },

    /// A buffer type number is not exactly one known buffer
    #[error("Unknown buffer type supplied to render.{operation}: {value}")]
    UnknownBufferType {
        /// API function called
        operation: &'static str,
        /// Rejected number
        value: u32,
    },

    /// A clear value does not fit its buffer type
    #[error("Invalid clear value for buffer type {value}: expected {expected}")]
    InvalidClearValue {
        /// Buffer type number
        value: u32,
        /// Expected value shape
        expected: &'static str,
    },

    /// A render target parameter is out of range
    #[error("Invalid render target parameter '{parameter}': {value}")]
    InvalidTextureParameter {
        /// Parameter name
        parameter: &'static str,
        /// Rejected number
        value: u32,
    },

    /// No material is registered under the name
    #[error("Could not find material '{0}'.")]
    MaterialNotFound(String),

    /// `enable_material` was called without a material
    #[error("render.enable_material was supplied nil as material.")]
    NilMaterial,

    /// A render target argument was missing
    #[error("Invalid render target (nil) supplied to render.{0}.")]
    NilRenderTarget(&'static str),

    /// `draw` was called without a predicate
    #[error("render.draw was supplied nil as predicate.")]
    NilPredicate,

    /// The render target has no attachment of the requested type
    #[error("Render target does not have a texture for the specified buffer type.")]
    MissingTexture,

    /// A constant was read before being set
    #[error("Constant {0} not set.")]
    ConstantNotSet(String),

    /// The constant buffer handle no longer resolves
    #[error("Unknown constant buffer supplied to render.{0}.")]
    UnknownConstantBuffer(&'static str),

    /// The predicate handle does not belong to this instance
    #[error("Unknown predicate supplied to render.{0}.")]
    UnknownPredicate(&'static str),

    /// Debug text was requested without a system font
    #[error("Unable to draw text '{0}': no system font is loaded")]
    NoSystemFont(String),

    /// Graphics device failure
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// A recorded command failed during replay
    #[error("Replay of command {index} ({kind}) failed: {source}")]
    Replay {
        /// Position in the command buffer
        index: usize,
        /// Kind of the failing command
        kind: CommandKind,
        /// Underlying failure
        source: Box<RenderScriptError>,
    },

    /// A script entry point raised an error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// The script source could not be loaded
    #[error("Failed to load render script '{filename}': {reason}")]
    Load {
        /// Script file name
        filename: String,
        /// What went wrong
        reason: String,
    },
}

impl RenderScriptError {
    /// Runtime error raised by script code
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

/// Result type for render script operations
pub type ScriptResult<T> = Result<T, RenderScriptError>;
