//! Python bindings
//!
//! Configuration, snapshots and updates cross the boundary as JSON strings,
//! so the Python side never depends on Rust type layouts.

pub mod process;
