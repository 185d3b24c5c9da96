//! Placement diagnostics.
//!
//! The engine reports candidate counts, chosen penalties and infeasible
//! tooltips through `debug!` and `warn!`. Building with the `tracing` feature
//! routes them to `tracing` (the CLI then honours `RUST_LOG`); otherwise they
//! are dropped at compile time and cost nothing.

#[cfg(feature = "tracing")]
pub use tracing::{debug, warn};

/// Discards its arguments; stands in for `tracing::debug!`.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($field:tt)*) => {};
}

/// Discards its arguments; stands in for `tracing::warn!`.
#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($field:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, warn};
