//! Messages delivered to render scripts
//!
//! Messages carry key-value arguments so receivers never depend on argument
//! order. Debug draw requests have dedicated payloads; they are executed by
//! the engine during dispatch and never reach a script's `on_message`.

use std::collections::{HashMap, VecDeque};

use crate::foundation::hash::{hash64, Hash64};
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::constants::ConstantBufferHandle;
use crate::render::graphics::RenderTargetHandle;
use crate::render::predicate::PredicateHandle;

/// Id of the built-in debug text message
pub const DRAW_TEXT: &str = "draw_text";

/// Id of the built-in debug line message
pub const DRAW_LINE: &str = "draw_line";

/// Value stored in message tables and script data
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptValue {
    /// Number
    Number(f64),
    /// Boolean
    Bool(bool),
    /// String
    Text(String),
    /// Hashed string
    Hash(Hash64),
    /// 4D vector
    Vector(Vec4),
    /// 4x4 matrix
    Matrix(Mat4),
    /// Predicate created by `render.predicate`
    Predicate(PredicateHandle),
    /// Constant buffer created by `render.constant_buffer`
    ConstantBuffer(ConstantBufferHandle),
    /// Render target created by `render.render_target`
    RenderTarget(RenderTargetHandle),
}

/// Address of a message sender
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Url {
    /// Socket (world) hash
    pub socket: Hash64,
    /// Object path hash
    pub path: Hash64,
    /// Component hash
    pub fragment: Hash64,
}

impl Url {
    /// Build from readable names
    pub fn new(socket: &str, path: &str, fragment: &str) -> Self {
        Self {
            socket: hash64(socket),
            path: hash64(path),
            fragment: hash64(fragment),
        }
    }
}

/// Message body
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    /// Draw debug text at a screen position
    DrawText {
        /// Text
        text: String,
        /// Screen position
        position: Vec3,
    },
    /// Draw a debug line in world space
    DrawLine {
        /// Start point
        start: Vec3,
        /// End point
        end: Vec3,
        /// Colour
        color: Vec4,
    },
    /// Script-defined arguments
    Table(HashMap<String, ScriptValue>),
}

/// One `(id, payload, sender)` message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Hash of the message name
    pub id: Hash64,
    /// Body
    pub payload: MessagePayload,
    /// Who sent it
    pub sender: Url,
}

impl Message {
    /// Script message with an empty argument table
    pub fn new(name: &str) -> Self {
        Self {
            id: hash64(name),
            payload: MessagePayload::Table(HashMap::new()),
            sender: Url::default(),
        }
    }

    /// Debug text request
    pub fn draw_text(text: impl Into<String>, position: Vec3) -> Self {
        Self {
            id: hash64(DRAW_TEXT),
            payload: MessagePayload::DrawText {
                text: text.into(),
                position,
            },
            sender: Url::default(),
        }
    }

    /// Debug line request
    pub fn draw_line(start: Vec3, end: Vec3, color: Vec4) -> Self {
        Self {
            id: hash64(DRAW_LINE),
            payload: MessagePayload::DrawLine { start, end, color },
            sender: Url::default(),
        }
    }

    /// Set the sender (builder pattern)
    #[must_use]
    pub fn with_sender(mut self, sender: Url) -> Self {
        self.sender = sender;
        self
    }

    /// Add a table argument (builder pattern); ignored for debug payloads
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: ScriptValue) -> Self {
        if let MessagePayload::Table(args) = &mut self.payload {
            args.insert(key.into(), value);
        }
        self
    }

    /// Get a table argument by key
    pub fn get_arg(&self, key: &str) -> Option<&ScriptValue> {
        match &self.payload {
            MessagePayload::Table(args) => args.get(key),
            _ => None,
        }
    }

    /// Whether the message id is the hash of `name`
    pub fn is(&self, name: &str) -> bool {
        self.id == hash64(name)
    }
}

/// FIFO of messages waiting for a render script
#[derive(Debug, Clone, Default)]
pub struct Mailbox {
    queue: VecDeque<Message>,
}

impl Mailbox {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message
    pub fn post(&mut self, message: Message) {
        self.queue.push_back(message);
    }

    /// Take every queued message; messages posted afterwards wait for the
    /// next drain.
    pub fn drain(&mut self) -> VecDeque<Message> {
        std::mem::take(&mut self.queue)
    }

    /// Number of queued messages
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_args() {
        let message = Message::new("set_tint")
            .with_arg("alpha", ScriptValue::Number(0.5))
            .with_sender(Url::new("main", "/hud", "gui"));

        assert!(message.is("set_tint"));
        assert_eq!(message.get_arg("alpha"), Some(&ScriptValue::Number(0.5)));
        assert_eq!(message.get_arg("missing"), None);
        assert_eq!(message.sender.path, hash64("/hud"));
    }

    #[test]
    fn test_debug_payloads_have_no_args() {
        let message = Message::draw_text("hello", Vec3::zeros()).with_arg("x", ScriptValue::Bool(true));
        assert!(message.is(DRAW_TEXT));
        assert_eq!(message.get_arg("x"), None);
    }

    #[test]
    fn test_mailbox_is_fifo() {
        let mut mailbox = Mailbox::new();
        mailbox.post(Message::new("a"));
        mailbox.post(Message::new("b"));

        let drained: Vec<_> = mailbox.drain().into_iter().collect();
        assert!(drained[0].is("a"));
        assert!(drained[1].is("b"));
        assert!(mailbox.is_empty());
    }
}
