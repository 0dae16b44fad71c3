//! Predicates and tag masks
//!
//! # Architecture
//!
//! Scripts describe what to draw with tag names; render objects carry a
//! 64-bit mask. [`TagRegistry`] assigns each distinct tag one mask bit the
//! first time it is seen, so a [`Predicate`]'s tag hashes translate to mask
//! bits and matching reduces to [`matches`].

use std::collections::HashMap;

use smallvec::SmallVec;

use super::world::{RenderWorldError, WorldResult};
use crate::foundation::hash::{hash32, Hash32};

/// Number of distinct tags a world can assign bits to
pub const MASK_BITS: usize = u64::BITS as usize;

/// Whether an object mask intersects a set of predicate bits
#[inline]
pub const fn matches(mask: u64, predicate_bits: u64) -> bool {
    mask & predicate_bits != 0
}

/// Index of a predicate inside the script instance that created it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PredicateHandle(pub(crate) usize);

impl PredicateHandle {
    /// Position in the owning instance's predicate table
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Set of tag hashes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    tags: SmallVec<[Hash32; 8]>,
}

impl Predicate {
    /// Create an empty predicate (matches nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from tag names, keeping at most `max_tags` of them
    pub fn from_tags<'a, I>(tags: I, max_tags: usize) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut predicate = Self::new();
        for tag in tags {
            if !predicate.push_tag(hash32(tag), max_tags) {
                break;
            }
        }
        predicate
    }

    /// Add a tag hash; returns `false` once `max_tags` is reached.
    ///
    /// Duplicate tags are accepted but stored once.
    pub fn push_tag(&mut self, tag: Hash32, max_tags: usize) -> bool {
        if self.tags.contains(&tag) {
            return true;
        }
        if self.tags.len() >= max_tags {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Tag hashes in insertion order
    pub fn tags(&self) -> &[Hash32] {
        &self.tags
    }

    /// Whether no tags are set
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Assigns mask bits to tag hashes in first-use order
#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    bits: HashMap<Hash32, u32>,
}

impl TagRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Mask bit for `tag`, allocating one if the tag is new
    pub fn bit_for(&mut self, tag: Hash32) -> WorldResult<u64> {
        if let Some(bit) = self.bits.get(&tag) {
            return Ok(1 << bit);
        }
        let next = self.bits.len();
        if next >= MASK_BITS {
            return Err(RenderWorldError::TagSpaceExhausted { max: MASK_BITS });
        }
        let bit = next as u32;
        self.bits.insert(tag, bit);
        Ok(1 << bit)
    }

    /// Object mask for a list of tag names, allocating bits as needed
    pub fn mask_for<'a, I>(&mut self, tags: I) -> WorldResult<u64>
    where
        I: IntoIterator<Item = &'a str>,
    {
        tags.into_iter()
            .try_fold(0, |mask, tag| Ok(mask | self.bit_for(hash32(tag))?))
    }

    /// Mask bits a predicate selects; unknown tags contribute nothing
    pub fn bits_for(&self, predicate: &Predicate) -> u64 {
        predicate
            .tags()
            .iter()
            .filter_map(|tag| self.bits.get(tag))
            .fold(0, |bits, bit| bits | (1 << bit))
    }

    /// Number of tags with an assigned bit
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether no tags have been seen
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }
}
