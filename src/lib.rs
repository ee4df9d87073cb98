//! # keycaps
//!
//! Batch generation of keyboard keycap models through an external CAD
//! renderer (OpenSCAD by default).
//!
//! Builds a catalog of keys (letters, symbols, function keys, named keys),
//! turns each key into one or two renderer invocations, runs them all as
//! parallel child processes and reports how each one ended.

pub mod catalog;
pub mod config;
pub mod error;
pub mod escape;
pub mod model;
pub mod render;
pub mod telemetry;
