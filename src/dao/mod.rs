//! Storage layer for lobby and player entities.

/// Entity model definitions.
pub mod models;
/// Repository trait and in-memory implementation.
pub mod store;
