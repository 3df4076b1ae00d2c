#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` provides the diagnostic plumbing shared by the SHA engine
//! workspace: a small set of target-scoped macros that the engine uses to
//! report capability detection, tier selection and Merkle reduction, plus a
//! subscriber initialiser for binaries.
//!
//! # Design
//!
//! The engine never depends on `tracing` directly. It calls the macros
//! exported here, which forward to `tracing` when the `tracing` feature is
//! enabled and expand to nothing otherwise. Each macro pins a fixed target so
//! `RUST_LOG=sha::dispatch=debug` style filters select one subsystem.
//!
//! # Invariants
//!
//! - Macros only accept format-string arguments. Without the feature the
//!   arguments are type-checked but never evaluated.
//! - [`VerbosityConfig`] maps a `-v` count onto a level filter; an explicit
//!   `RUST_LOG` always wins.
//!
//! # Examples
//!
//! ```
//! use logging::VerbosityConfig;
//!
//! let config = VerbosityConfig::from_verbose_level(2);
//! assert_eq!(config.directive(), "debug");
//! ```

mod config;
#[cfg(feature = "tracing")]
mod tracing_bridge;
mod tracing_macros;

pub use config::{Level, VerbosityConfig};
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub use tracing_bridge::{init_tracing, try_init_tracing};

/// Target used for capability detection events.
pub const TARGET_CAPS: &str = "sha::caps";
/// Target used for tier selection events.
pub const TARGET_DISPATCH: &str = "sha::dispatch";
/// Target used for Merkle reduction events.
pub const TARGET_MERKLE: &str = "sha::merkle";

#[doc(hidden)]
#[cfg(feature = "tracing")]
pub use tracing as __tracing;
