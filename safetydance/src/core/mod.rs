//! Pure logic: safe invocation and key-path access over JSON values.
//!
//! Nothing here touches the filesystem or spawns processes; the wrappers in
//! [`crate::io`] are built on top of [`invoke`].

pub mod invoke;
pub mod path;
