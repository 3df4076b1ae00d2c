//! crates/logging/src/tracing_macros.rs
//! Convenience macros for engine-specific tracing.
//!
//! These macros wrap the standard tracing macros with fixed targets for the
//! engine subsystems. Without the `tracing` feature the arguments are still
//! type-checked, so locals used only for tracing stay "used", but nothing is
//! evaluated and the call compiles to nothing.

/// Emit a capability detection trace.
///
/// # Example
/// ```ignore
/// trace_caps!("detected {}", caps);
/// ```
#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! trace_caps {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: $crate::TARGET_CAPS, $($arg)*)
    };
}

/// Emit a capability detection trace.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace_caps {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Emit a tier selection trace.
///
/// # Example
/// ```ignore
/// trace_dispatch!("{} engine using {} tier", name, tier);
/// ```
#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! trace_dispatch {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: $crate::TARGET_DISPATCH, $($arg)*)
    };
}

/// Emit a tier selection trace.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace_dispatch {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}

/// Emit a Merkle reduction trace.
///
/// Reduction traces are emitted once per tree level at `trace` level.
#[cfg(feature = "tracing")]
#[macro_export]
macro_rules! trace_merkle {
    ($($arg:tt)*) => {
        $crate::__tracing::trace!(target: $crate::TARGET_MERKLE, $($arg)*)
    };
}

/// Emit a Merkle reduction trace.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! trace_merkle {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::core::format_args!($($arg)*);
        }
    }};
}
