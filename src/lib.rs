//! # This-Relations
//!
//! Relation resolvers for GraphQL DTO types.
//!
//! ## Features
//!
//! - **Declarative Relations**: "one" and "many" relations per host DTO
//! - **Generated Resolvers**: one accessor per relation, delegating to a query service
//! - **Relay Connections**: cursor pagination with `edges` and `pageInfo`
//! - **Per-Relation Hooks**: guards, pipes, interceptors and error filters
//! - **Auto-Pluralization**: many-relation fields are pluralized (subTask → subTasks)
//! - **Configuration-Based**: declare DTOs and relations in YAML
//! - **Dynamic Schema**: served with `async-graphql` and axum
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_relations::prelude::*;
//!
//! let store = InMemoryStore::new();
//! let todos = InMemoryQueryService::new("TodoItem", store.clone())
//!     .with_relation("subTask", RelationBinding::new("SubTask", "id", "todoItemId"));
//!
//! let schema = RelationSchemaBuilder::new()
//!     .dto(DtoDescriptor::new("TodoItem").id_field())
//!     .dto(DtoDescriptor::new("SubTask").id_field())
//!     .relations(
//!         "TodoItem",
//!         Relations::new().many("subTask", RelationDescriptor::new("SubTask")),
//!     )
//!     .service("TodoItem", Arc::new(todos))
//!     .build()?;
//!
//! let app = GraphQLExposure::build_router(schema);
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Relation model ===
    pub use crate::core::{
        Connection, CursorPaging, DtoDescriptor, DtoField, Edge, PageInfo, RelationDescriptor,
        RelationKind, RelationQuery, Relations, ScalarKind, SortDirection, SortField, SortNulls,
    };

    // === Resolver generation ===
    pub use crate::core::{
        FieldRegistrar, FieldRegistration, QueryArgsType, RelationAccessor, RelationOutput,
        RelationResolver, RelationResolverFactory, ResolverDefinition, ReturnType,
    };

    // === Hooks and auth ===
    pub use crate::core::{
        ArgumentPipe, AuthContext, AuthPolicy, AuthProvider, ErrorFilter, HeaderAuthProvider,
        NoAuthProvider, RelationGuard, RelationHooks, RelationInterceptor,
    };

    // === Services and errors ===
    pub use crate::core::{Pluralizer, QueryService, RelationError};

    // === Configuration ===
    pub use crate::config::RelationsConfig;

    // === Storage ===
    pub use crate::storage::{InMemoryQueryService, InMemoryStore, RelationBinding};

    // === Server ===
    #[cfg(feature = "graphql")]
    pub use crate::server::exposure::graphql::{
        DynamicRegistrar, GraphQLExposure, RelationSchema, RelationSchemaBuilder,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};
    pub use std::sync::Arc;

    // === Axum ===
    pub use axum::{Router, http::HeaderMap};
}
