//! GraphQL API exposure
//!
//! Builds a dynamic `async_graphql` schema from DTO descriptors and their
//! relations, and serves it over HTTP with axum.

mod registrar;
mod schema;
mod types;

pub use registrar::{DynamicRegistrar, to_graphql_error};
pub use schema::{RelationSchema, RelationSchemaBuilder, ResolverRegistry};

use crate::core::{AuthProvider, NoAuthProvider};
use async_graphql::http::{GraphQLPlaygroundConfig, playground_source};
use axum::{
    Router,
    extract::{Extension, Json as AxumJson},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequestBody {
    query: String,
    variables: Option<serde_json::Value>,
    #[allow(dead_code)]
    operation_name: Option<String>,
}

#[derive(Clone)]
struct GraphQLState {
    schema: RelationSchema,
    auth: Arc<dyn AuthProvider>,
}

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router for a schema, every caller anonymous
    ///
    /// Routes:
    /// - `POST /graphql` executes queries
    /// - `GET /graphql/playground` serves the playground UI
    /// - `GET /graphql/schema` returns the SDL
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let schema = RelationSchemaBuilder::new().from_config(&config).build()?;
    /// let app = GraphQLExposure::build_router(schema);
    /// ```
    pub fn build_router(schema: RelationSchema) -> Router {
        Self::build_router_with_auth(schema, Arc::new(NoAuthProvider))
    }

    /// Build the GraphQL router, resolving each caller with `auth`
    pub fn build_router_with_auth(schema: RelationSchema, auth: Arc<dyn AuthProvider>) -> Router {
        Router::new()
            .route("/graphql", post(graphql_handler))
            .route("/graphql/playground", get(graphql_playground))
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(GraphQLState { schema, auth }))
    }
}

/// Handler for GraphQL queries
async fn graphql_handler(
    Extension(state): Extension<GraphQLState>,
    headers: HeaderMap,
    AxumJson(request): AxumJson<GraphQLRequestBody>,
) -> impl IntoResponse {
    let auth = match state.auth.extract_context(&headers).await {
        Ok(auth) => auth,
        Err(e) => {
            tracing::warn!(error = %e, "rejected graphql request credentials");
            return (
                StatusCode::UNAUTHORIZED,
                AxumJson(serde_json::json!({
                    "errors": [{ "message": e.to_string() }]
                })),
            );
        }
    };

    let response = state
        .schema
        .execute(&request.query, request.variables, auth)
        .await;
    (StatusCode::OK, AxumJson(response))
}

/// Handler for GraphQL playground UI
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(state): Extension<GraphQLState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.schema.sdl(),
    )
}
