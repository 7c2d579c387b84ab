//! Side-effecting wrappers built on [`crate::core::invoke`].
//!
//! Every wrapper returns a sentinel on failure and leaves the error in this
//! thread's last-error slot.

pub mod config;
pub mod fs;
pub mod json;
pub mod module;
pub mod process;
pub mod url;
