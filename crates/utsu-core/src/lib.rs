//! Utsu Core - live 4-stem mixer over a platform audio graph
//!
//! The mixer owns one node chain per stem (source → 3-band EQ → gain →
//! shared output) and keeps the UI-facing session state in sync with the
//! graph's node parameters. Audio processing itself is left to the
//! [`graph::AudioGraph`] implementation.

pub mod catalog;
pub mod config;
pub mod events;
pub mod graph;
pub mod mixer;
pub mod types;

pub use types::*;
