//! Bounded command queue
//!
//! Filled by one script instance during an update and drained once by
//! replay. The capacity is fixed at creation; the storage is reused across
//! frames.

use super::command::Command;

/// Ordered, fixed-capacity sequence of [`Command`]s
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    capacity: usize,
}

impl CommandBuffer {
    /// Create an empty buffer holding at most `capacity` commands
    pub fn new(capacity: usize) -> Self {
        Self {
            commands: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a command.
    ///
    /// Returns `false`, leaving the buffer unchanged, when it is full.
    #[must_use]
    pub fn push(&mut self, command: Command) -> bool {
        if self.is_full() {
            return false;
        }
        self.commands.push(command);
        true
    }

    /// Remove every command, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// First recorded command
    pub fn front(&self) -> Option<&Command> {
        self.commands.first()
    }

    /// Number of recorded commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether another push would fail
    pub fn is_full(&self) -> bool {
        self.commands.len() >= self.capacity
    }

    /// Maximum number of commands
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Recorded commands in push order
    pub fn as_slice(&self) -> &[Command] {
        &self.commands
    }

    /// Iterate recorded commands in push order
    pub fn iter(&self) -> std::slice::Iter<'_, Command> {
        self.commands.iter()
    }
}

impl<'a> IntoIterator for &'a CommandBuffer {
    type Item = &'a Command;
    type IntoIter = std::slice::Iter<'a, Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::graphics::RenderState;

    #[test]
    fn test_push_until_full() {
        let mut buffer = CommandBuffer::new(3);
        for _ in 0..3 {
            assert!(buffer.push(Command::DrawDebug3d));
        }
        assert!(buffer.is_full());
        assert!(!buffer.push(Command::DrawDebug2d));
        assert_eq!(buffer.len(), 3);
        assert!(buffer.iter().all(|c| *c == Command::DrawDebug3d));
    }

    #[test]
    fn test_capacity_two_keeps_first_two() {
        let mut buffer = CommandBuffer::new(2);
        let a = Command::EnableState(RenderState::Blend);
        let b = Command::SetDepthMask(true);
        let c = Command::DisableMaterial;

        assert!(buffer.push(a));
        assert!(buffer.push(b));
        assert!(!buffer.push(c));
        assert_eq!(buffer.as_slice(), &[a, b]);
        assert_eq!(buffer.front(), Some(&a));
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut buffer = CommandBuffer::new(1);
        assert!(buffer.push(Command::DisableMaterial));
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 1);
        assert!(buffer.push(Command::DrawDebug2d));
    }

    #[test]
    fn test_zero_capacity_rejects_everything() {
        let mut buffer = CommandBuffer::new(0);
        assert!(!buffer.push(Command::DrawDebug2d));
        assert!(buffer.is_empty());
    }
}
