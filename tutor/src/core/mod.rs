//! Deterministic, pure logic over the tutorial tree.
//!
//! Core modules are free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod format;
pub mod frontmatter;
pub mod invariants;
pub mod progress;
pub mod selector;
pub mod state_update;
pub mod wrap;
