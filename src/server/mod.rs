//! Server module exposing relation schemas over HTTP

pub mod exposure;

#[cfg(feature = "graphql")]
pub use exposure::graphql::{GraphQLExposure, RelationSchema, RelationSchemaBuilder};
