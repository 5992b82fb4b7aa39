//! Filesystem-facing helpers: configuration, identity, catalog, state and content.

pub mod atomic;
pub mod catalog;
pub mod config;
pub mod content;
pub mod identity;
pub mod paths;
pub mod state_store;
