//! Versioned tax parameter tables and the registry that serves them.

pub mod builtin;
mod registry;

pub use registry::ParameterRegistry;
