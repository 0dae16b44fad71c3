//! String hashing
//!
//! Tags, material names, constant names and message ids are referred to by
//! hash rather than by string once they cross into the render core.

use xxhash_rust::{xxh32::xxh32, xxh64::xxh64};

/// 32-bit string hash (tags, constant names)
pub type Hash32 = u32;

/// 64-bit string hash (material names, render target names, message ids)
pub type Hash64 = u64;

/// Hash a string to 32 bits.
pub fn hash32(value: &str) -> Hash32 {
    xxh32(value.as_bytes(), 0)
}

/// Hash a string to 64 bits.
pub fn hash64(value: &str) -> Hash64 {
    xxh64(value.as_bytes(), 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes_are_stable_per_input() {
        assert_eq!(hash32("model"), hash32("model"));
        assert_ne!(hash32("model"), hash32("text"));
        assert_eq!(hash64("diffuse"), hash64("diffuse"));
        assert_ne!(hash64("diffuse"), hash64("emissive"));
    }
}
