//! Small utility types shared across the workspace.
//!
//! - [`lit_str`] - Compile-time string literal types, used for wire-format constants
//!   like protocol versions and scheme tags

pub mod lit_str;
