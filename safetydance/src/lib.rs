//! Check-the-result wrappers for fallible operations.
//!
//! Instead of threading `?` through every call site, callers get a sentinel
//! (`None`, `false`, or a fallback of their choosing) and may inspect the
//! captured error afterwards:
//!
//! ```
//! let doc = safetydance::io::json::parse("{ not json");
//! assert!(doc.is_none());
//! assert!(safetydance::last_error_message().is_some());
//! ```
//!
//! - **[`core`]**: pure logic. [`core::invoke`] runs closures and keeps the
//!   last error; [`core::path`] reads, writes and removes values at
//!   `a.b[0].c`-style paths inside `serde_json::Value` trees.
//! - **[`io`]**: filesystem, process, JSON, URL and data-module wrappers built
//!   on the invoker.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::invoke::{
    SafeInvoker, call, call_or, capture, clear_last_error, has_error, last_error,
    last_error_message, take_last_error,
};
pub use crate::core::path::{KeyPath, PathExpr, get, query, set, unset};
