//! Specialized collection types

pub use slotmap::SlotMap;

/// Selects one half of a [`DoubleBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    /// Slot 0
    First,
    /// Slot 1
    Second,
}

impl BufferSlot {
    /// The opposite slot
    pub const fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// Two instances of `T` with one designated live (read) and the other
/// pending (write).
///
/// Writers fill the pending half while readers see the live half; a
/// [`swap`](Self::swap) publishes the pending half as the new live one.
#[derive(Debug, Clone, Default)]
pub struct DoubleBuffer<T> {
    first: T,
    second: T,
    live: BufferSlot,
}

impl Default for BufferSlot {
    fn default() -> Self {
        // Writes start in the first slot.
        Self::Second
    }
}

impl<T> DoubleBuffer<T> {
    /// Create a double buffer from its two halves; the first is pending.
    pub fn new(first: T, second: T) -> Self {
        Self {
            first,
            second,
            live: BufferSlot::Second,
        }
    }

    /// Slot currently visible to readers
    pub const fn live_slot(&self) -> BufferSlot {
        self.live
    }

    /// Slot currently receiving writes
    pub const fn pending_slot(&self) -> BufferSlot {
        self.live.other()
    }

    /// Borrow a specific slot
    pub const fn slot(&self, slot: BufferSlot) -> &T {
        match slot {
            BufferSlot::First => &self.first,
            BufferSlot::Second => &self.second,
        }
    }

    fn slot_mut(&mut self, slot: BufferSlot) -> &mut T {
        match slot {
            BufferSlot::First => &mut self.first,
            BufferSlot::Second => &mut self.second,
        }
    }

    /// The live (read) half
    pub const fn live(&self) -> &T {
        self.slot(self.live)
    }

    /// The pending (write) half
    pub const fn pending(&self) -> &T {
        self.slot(self.live.other())
    }

    /// Mutable access to the pending (write) half
    pub fn pending_mut(&mut self) -> &mut T {
        self.slot_mut(self.live.other())
    }

    /// Publish the pending half; the old live half becomes pending.
    pub fn swap(&mut self) {
        self.live = self.live.other();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_target_pending_until_swap() {
        let mut buffer = DoubleBuffer::new(Vec::new(), Vec::new());
        buffer.pending_mut().push(7);

        assert!(buffer.live().is_empty());
        assert_eq!(buffer.pending(), &vec![7]);

        buffer.swap();
        assert_eq!(buffer.live(), &vec![7]);
        assert!(buffer.pending().is_empty());
    }

    #[test]
    fn test_swap_alternates_slots() {
        let mut buffer: DoubleBuffer<u8> = DoubleBuffer::default();
        assert_eq!(buffer.pending_slot(), BufferSlot::First);
        buffer.swap();
        assert_eq!(buffer.live_slot(), BufferSlot::First);
        buffer.swap();
        assert_eq!(buffer.live_slot(), BufferSlot::Second);
    }
}
