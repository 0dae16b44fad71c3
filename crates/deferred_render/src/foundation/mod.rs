//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types (nalgebra aliases)
//! - Collections (double buffers, slot-map handles)
//! - String hashing for tags, names and message ids
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod hash;
pub mod logging;
