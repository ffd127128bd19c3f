//! Cellgrid formula engine.
//!
//! Cells are parsed once into a shared expression arena and evaluated
//! lazily: references are resolved on demand, each cell is computed at
//! most once, and dependency cycles turn into `Loop!` errors instead of
//! recursing forever.

pub mod builtins;
pub mod engine;
pub mod error;
