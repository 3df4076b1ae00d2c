//! Errors raised at the configuration boundary.
//!
//! Hashing itself is total; only choosing a tier and parsing configuration
//! can fail.

use thiserror::Error;

use crate::dispatch::Tier;

/// Invalid engine configuration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Policy name not recognised.
    #[error("unknown dispatch policy '{0}' (expected scalar, vector, native or all)")]
    UnknownPolicy(String),
    /// Lane override outside the supported set.
    #[error("invalid lane count '{0}' (expected 2, 4, 8 or 16)")]
    InvalidLanes(String),
}

/// The requested tier cannot run on this machine or variant.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
pub enum DispatchError {
    /// Forced tier unavailable.
    #[error("{tier} tier unavailable for {variant}")]
    TierUnavailable {
        /// Tier that was forced.
        tier: Tier,
        /// Variant name.
        variant: &'static str,
    },
}

/// Slice length does not match the digest width.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("digest must be {expected} bytes, got {actual}")]
pub struct DigestLengthError {
    /// Digest width of the variant.
    pub expected: usize,
    /// Length supplied.
    pub actual: usize,
}
