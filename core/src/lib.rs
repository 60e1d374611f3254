//! Core library entry point that wires together the BrainBlog AI pipeline.
//!
//! Each module is intentionally kept lightweight so that the boundaries
//! between responsibilities remain obvious when exploring the codebase:
//! - [`config`] resolves the active provider family once at startup.
//! - [`providers`] holds the outbound model clients and the fallback runner.
//! - [`generate`] implements the generation operations and their
//!   post-processing.
//! - [`api`] exposes the REST surface that the blog backend invokes.
//! - [`errors`] keeps the central error catalogue with human friendly metadata.
//! - [`logging`] initialises structured diagnostics output.

pub mod api;
pub mod config;
pub mod errors;
pub mod generate;
pub mod logging;
pub mod providers;
