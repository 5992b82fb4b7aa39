//! Interactive tutorial engine.
//!
//! Tutorials are authored as a directory tree of `tutorial.json` metadata and
//! markdown step files. The engine tracks one learner's progress through them
//! in a versioned, checksummed state file and answers each command with a
//! single text response.
//!
//! - **[`core`]**: Pure logic (navigation, progress derivation, invariants,
//!   message formatting, content wrapping). No filesystem access.
//! - **[`io`]**: Catalog reads, content loading and caching, state
//!   persistence, configuration and the user identity file.
//!
//! [`engine`] and [`diagnose`] combine the two to implement the commands.

pub mod core;
pub mod diagnose;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod tutorial;
