//! Storage implementations for query services

pub mod in_memory;

pub use in_memory::{InMemoryQueryService, InMemoryStore, RelationBinding};
