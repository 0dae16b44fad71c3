//! Named shader constants

use std::collections::HashMap;

use crate::foundation::hash::{hash32, Hash32};
use crate::foundation::math::Vec4;

slotmap::new_key_type! {
    /// Handle to a constant buffer owned by a script instance
    pub struct ConstantBufferHandle;
}

/// Vector constants keyed by the 32-bit hash of their name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedConstantBuffer {
    values: HashMap<Hash32, Vec4>,
}

impl NamedConstantBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a constant by name
    pub fn set(&mut self, name: &str, value: Vec4) {
        self.values.insert(hash32(name), value);
    }

    /// Read a constant by name
    pub fn get(&self, name: &str) -> Option<Vec4> {
        self.get_by_id(hash32(name))
    }

    /// Read a constant by name hash
    pub fn get_by_id(&self, id: Hash32) -> Option<Vec4> {
        self.values.get(&id).copied()
    }

    /// Iterate `(name hash, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Hash32, Vec4)> + '_ {
        self.values.iter().map(|(id, value)| (*id, *value))
    }

    /// Number of constants set
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no constants are set
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
