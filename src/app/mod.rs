//! Host Application Module
//!
//! Session context and the REPL command layer built on top of the cache.

pub mod commands;
mod context;

pub use commands::{dispatch, Command, Flow};
pub use context::AppContext;
