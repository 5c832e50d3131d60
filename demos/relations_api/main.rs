//! Todo Relations Example
//!
//! Serves a GraphQL API whose relation fields are generated from
//! `relations.yaml`:
//! - `TodoItem.assignee` and `SubTask.todoItem` ("one" relations)
//! - `TodoItem.subTasks` and `User.todoItems` ("many" relations, paginated)
//!
//! Try it:
//!
//! ```text
//! curl -X POST http://127.0.0.1:3000/graphql \
//!   -H 'content-type: application/json' \
//!   -H 'x-user-id: 6f1c1a4e-0c55-4a8e-9a55-6a8c9fd0b2f1' \
//!   -d '{"query":"{ user(id: \"user-1\") { name todoItems { edges { node { title } } } } }"}'
//! ```

use anyhow::Result;
use this_relations::prelude::*;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::filter::EnvFilter;

const CONFIG: &str = include_str!("relations.yaml");

#[tokio::main]
async fn main() -> Result<()> {
    let filter = match std::env::var_os("RUST_LOG") {
        Some(_) => EnvFilter::try_from_default_env()?,
        None => EnvFilter::new("this_relations=debug,tower_http=info"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = RelationsConfig::from_yaml_str(CONFIG)?;
    let store = InMemoryStore::new();
    populate_test_data(&store)?;

    let todos = InMemoryQueryService::new("TodoItem", store.clone())
        .with_relation("assignee", RelationBinding::new("User", "assigneeId", "id"))
        .with_relation("subTask", RelationBinding::new("SubTask", "id", "todoItemId"));
    let sub_tasks = InMemoryQueryService::new("SubTask", store.clone())
        .with_relation("todoItem", RelationBinding::new("TodoItem", "todoItemId", "id"));
    let users = InMemoryQueryService::new("User", store)
        .with_relation("assigned", RelationBinding::new("TodoItem", "id", "assigneeId"));

    let schema = RelationSchemaBuilder::new()
        .from_config(&config)
        .service("TodoItem", Arc::new(todos))
        .service("SubTask", Arc::new(sub_tasks))
        .service("User", Arc::new(users))
        .build()?;

    let app = GraphQLExposure::build_router_with_auth(schema, Arc::new(HeaderAuthProvider))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;

    println!("🚀 Todo relations API running on http://127.0.0.1:3000");
    println!("  POST   /graphql             - Execute queries");
    println!("  GET    /graphql/playground  - GraphQL playground");
    println!("  GET    /graphql/schema      - Schema SDL");

    axum::serve(listener, app).await?;

    Ok(())
}

fn populate_test_data(store: &InMemoryStore) -> Result<()> {
    store.insert(
        "User",
        json!({ "id": "user-1", "name": "Ada", "metadata": { "team": "docs" } }),
    )?;
    store.insert("User", json!({ "id": "user-2", "name": "Grace", "metadata": null }))?;

    let todos = [
        ("todo-1", "Write the handbook", false, Some("user-1")),
        ("todo-2", "Publish release notes", true, Some("user-1")),
        ("todo-3", "Plan the offsite", false, None),
    ];
    for (id, title, completed, assignee) in todos {
        store.insert(
            "TodoItem",
            json!({ "id": id, "title": title, "completed": completed, "assigneeId": assignee }),
        )?;
    }

    let sub_tasks = [
        ("sub-1", "Outline chapters", "todo-1"),
        ("sub-2", "Draft chapter one", "todo-1"),
        ("sub-3", "Collect feedback", "todo-1"),
        ("sub-4", "Book a venue", "todo-3"),
    ];
    for (id, title, todo) in sub_tasks {
        store.insert(
            "SubTask",
            json!({ "id": id, "title": title, "todoItemId": todo }),
        )?;
    }

    Ok(())
}
