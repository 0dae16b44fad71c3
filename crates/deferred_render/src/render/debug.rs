//! Immediate debug text and lines
//!
//! Debug geometry is queued as it arrives and flushed when replay reaches a
//! `DRAW_DEBUG2D` (text) or `DRAW_DEBUG3D` (lines) command.

use std::any::Any;

use super::device::GraphicsDevice;
use crate::foundation::math::{Vec3, Vec4};

/// Debug drawing collaborator
pub trait DebugRenderer {
    /// Whether a font is available for [`draw_text`](Self::draw_text)
    fn has_system_font(&self) -> bool;

    /// Queue a line of screen-space text
    fn draw_text(&mut self, text: &str, position: Vec3, color: Vec4);

    /// Queue a world-space line segment
    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4);

    /// Submit queued text
    fn flush_2d(&mut self, device: &mut dyn GraphicsDevice);

    /// Submit queued lines
    fn flush_3d(&mut self, device: &mut dyn GraphicsDevice);

    /// Downcast to the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Queued text
#[derive(Debug, Clone, PartialEq)]
pub struct DebugText {
    /// Text
    pub text: String,
    /// Screen position
    pub position: Vec3,
    /// Colour
    pub color: Vec4,
}

/// Queued line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    /// Start point
    pub start: Vec3,
    /// End point
    pub end: Vec3,
    /// Colour
    pub color: Vec4,
}

/// [`DebugRenderer`] that keeps queued geometry and counts flushes
#[derive(Debug, Clone, Default)]
pub struct DebugBuffer {
    has_font: bool,
    text: Vec<DebugText>,
    lines: Vec<DebugLine>,
    flushed_text: usize,
    flushed_lines: usize,
}

impl DebugBuffer {
    /// Create a buffer, optionally with a system font
    pub fn new(has_font: bool) -> Self {
        Self {
            has_font,
            ..Self::default()
        }
    }

    /// Text queued since the last 2D flush
    pub fn pending_text(&self) -> &[DebugText] {
        &self.text
    }

    /// Lines queued since the last 3D flush
    pub fn pending_lines(&self) -> &[DebugLine] {
        &self.lines
    }

    /// Text items submitted by 2D flushes so far
    pub const fn flushed_text(&self) -> usize {
        self.flushed_text
    }

    /// Lines submitted by 3D flushes so far
    pub const fn flushed_lines(&self) -> usize {
        self.flushed_lines
    }
}

impl DebugRenderer for DebugBuffer {
    fn has_system_font(&self) -> bool {
        self.has_font
    }

    fn draw_text(&mut self, text: &str, position: Vec3, color: Vec4) {
        self.text.push(DebugText {
            text: text.to_string(),
            position,
            color,
        });
    }

    fn draw_line(&mut self, start: Vec3, end: Vec3, color: Vec4) {
        self.lines.push(DebugLine { start, end, color });
    }

    fn flush_2d(&mut self, _device: &mut dyn GraphicsDevice) {
        self.flushed_text += self.text.len();
        self.text.clear();
    }

    fn flush_3d(&mut self, _device: &mut dyn GraphicsDevice) {
        self.flushed_lines += self.lines.len();
        self.lines.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
