//! Shared test utilities for the OGC request workspace.
//!
//! This crate provides:
//! - A capabilities tree to validate against
//! - Reference request documents and query strings
//! - Approximate float assertions
//! - Log capture for tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures};
//! ```

pub mod fixtures;

pub use fixtures::*;

use tracing_subscriber::{fmt, EnvFilter};

/// Route `tracing` output through the test harness.
///
/// Filtering follows `RUST_LOG` and defaults to `warn`. Safe to call from
/// every test; only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init();
}

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f64, 1.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of bounding box corners.
///
/// The expected corners are a `(min_x, min_y, max_x, max_y)` tuple such as
/// the ones in [`fixtures::bbox`].
#[macro_export]
macro_rules! assert_bbox_approx_eq {
    ($bbox:expr, $expected:expr, $epsilon:expr) => {{
        let bbox = &$bbox;
        let (min_x, min_y, max_x, max_y) = $expected;
        $crate::assert_approx_eq!(bbox.min_x(), min_x, $epsilon);
        $crate::assert_approx_eq!(bbox.min_y(), min_y, $epsilon);
        $crate::assert_approx_eq!(bbox.max_x(), max_x, $epsilon);
        $crate::assert_approx_eq!(bbox.max_y(), max_y, $epsilon);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn test_fixture_capabilities_load() {
        let caps = capabilities();
        assert!(caps.find_layer("Rivers").is_some());
        assert!(caps.find_layer("Hydrography").is_none());
        assert_eq!(caps.max_width, Some(2048));
    }
}
