//! API exposure modules for different protocols
//!
//! Each exposure consumes a built schema and produces a Router for that
//! protocol.

#[cfg(feature = "graphql")]
pub mod graphql;

#[cfg(feature = "graphql")]
pub use graphql::GraphQLExposure;
