//! Stable exit codes for the `safetydance` CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// Invalid input, unreadable/unwritable document, or bad config.
pub const INVALID: i32 = 1;
/// `safetydance get` found nothing at the path and no default was given.
pub const MISSING: i32 = 2;
