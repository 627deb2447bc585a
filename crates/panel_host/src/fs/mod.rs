//! Domain-scoped filesystem contracts, wire types, and adapters.

pub mod envelope;
pub mod memory;
pub mod path;
pub mod service;
pub mod types;
