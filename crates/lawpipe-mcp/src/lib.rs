//! `lawpipe` crate (library surface).
//!
//! The primary entrypoint for end users is the `lawpipe` binary (CLI + MCP stdio).
//! This library exposes the tool surface so it can be embedded or driven without
//! an MCP transport.

pub use lawpipe_core as core;
pub use lawpipe_local as local;

pub mod envelope;
pub mod guidance;
pub mod tools;

pub use tools::LawTools;
