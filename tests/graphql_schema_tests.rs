//! End-to-end tests for the dynamic GraphQL schema
//!
//! Builds a schema over the in-memory query service and executes real
//! GraphQL documents against it.

#![cfg(feature = "graphql")]

use this_relations::core::connection::encode_cursor;
use this_relations::prelude::*;
use uuid::Uuid;

// =============================================================================
// Fixtures
// =============================================================================

fn store() -> InMemoryStore {
    let store = InMemoryStore::new();
    let records = [
        ("TodoItem", json!({ "id": "todo-1", "title": "Write docs", "assigneeId": "user-1" })),
        ("TodoItem", json!({ "id": "todo-2", "title": "Ship", "assigneeId": null })),
        ("User", json!({ "id": "user-1", "name": "Ada" })),
        ("SubTask", json!({ "id": "sub-1", "title": "Write outline", "todoItemId": "todo-1" })),
        ("SubTask", json!({ "id": "sub-2", "title": "Write examples", "todoItemId": "todo-1" })),
        ("SubTask", json!({ "id": "sub-3", "title": "Review", "todoItemId": "todo-1" })),
    ];
    for (dto, record) in records {
        store.insert(dto, record).unwrap();
    }
    store
}

fn dtos() -> Vec<DtoDescriptor> {
    vec![
        DtoDescriptor::new("TodoItem")
            .id_field()
            .field(DtoField::new("title", ScalarKind::String))
            .field(DtoField::new("assigneeId", ScalarKind::Id).nullable()),
        DtoDescriptor::new("User")
            .id_field()
            .field(DtoField::new("name", ScalarKind::String)),
        DtoDescriptor::new("SubTask")
            .id_field()
            .field(DtoField::new("title", ScalarKind::String))
            .field(DtoField::new("todoItemId", ScalarKind::Id)),
    ]
}

fn default_relations() -> Relations {
    Relations::new()
        .one("assignee", RelationDescriptor::new("User").nullable(true))
        .many("subTask", RelationDescriptor::new("SubTask"))
}

fn schema_with(todo_relations: Relations) -> RelationSchema {
    let store = store();
    let todos = InMemoryQueryService::new("TodoItem", store.clone())
        .with_relation("assignee", RelationBinding::new("User", "assigneeId", "id"))
        .with_relation("subTask", RelationBinding::new("SubTask", "id", "todoItemId"));
    let sub_tasks = InMemoryQueryService::new("SubTask", store)
        .with_relation("todoItem", RelationBinding::new("TodoItem", "todoItemId", "id"));

    dtos()
        .into_iter()
        .fold(RelationSchemaBuilder::new(), |builder, dto| builder.dto(dto))
        .relations("TodoItem", todo_relations)
        .relations(
            "SubTask",
            Relations::new().one("todoItem", RelationDescriptor::new("TodoItem")),
        )
        .service("TodoItem", Arc::new(todos))
        .service("SubTask", Arc::new(sub_tasks))
        .build()
        .unwrap()
}

fn schema() -> RelationSchema {
    schema_with(default_relations())
}

fn error_codes(response: &Value) -> Vec<String> {
    response["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["extensions"]["code"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

// =============================================================================
// Relation fields
// =============================================================================

#[tokio::test]
async fn test_one_and_many_relations() {
    let response = schema()
        .execute(
            r#"{
                todoItem(id: "todo-1") {
                    id
                    title
                    assignee { id name }
                    subTasks {
                        edges { cursor node { id title } }
                        pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                    }
                }
            }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert!(response.get("errors").is_none(), "{}", response);
    assert_eq!(
        response["data"]["todoItem"],
        json!({
            "id": "todo-1",
            "title": "Write docs",
            "assignee": { "id": "user-1", "name": "Ada" },
            "subTasks": {
                "edges": [
                    { "cursor": encode_cursor(0), "node": { "id": "sub-1", "title": "Write outline" } },
                    { "cursor": encode_cursor(1), "node": { "id": "sub-2", "title": "Write examples" } },
                    { "cursor": encode_cursor(2), "node": { "id": "sub-3", "title": "Review" } },
                ],
                "pageInfo": {
                    "hasNextPage": false,
                    "hasPreviousPage": false,
                    "startCursor": encode_cursor(0),
                    "endCursor": encode_cursor(2),
                }
            }
        })
    );
}

#[tokio::test]
async fn test_missing_one_relation_is_null() {
    let response = schema()
        .execute(
            r#"{ todoItem(id: "todo-2") { id assignee { id } } }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert_eq!(
        response["data"]["todoItem"],
        json!({ "id": "todo-2", "assignee": null })
    );
}

#[tokio::test]
async fn test_many_relation_filter() {
    let response = schema()
        .execute(
            r#"{
                todoItem(id: "todo-1") {
                    subTasks(filter: { title: { like: "Write%" } }) {
                        edges { node { id } }
                    }
                }
            }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert_eq!(
        response["data"]["todoItem"]["subTasks"]["edges"],
        json!([{ "node": { "id": "sub-1" } }, { "node": { "id": "sub-2" } }])
    );
}

#[tokio::test]
async fn test_many_relation_paging_and_sorting() {
    let query = r#"
        query SubTasks($paging: CursorPaging) {
            todoItem(id: "todo-1") {
                subTasks(paging: $paging, sorting: [{ field: title, direction: DESC }]) {
                    edges { cursor node { id } }
                    pageInfo { hasNextPage hasPreviousPage endCursor }
                }
            }
        }
    "#;
    let schema = schema();

    let first = schema
        .execute(
            query,
            Some(json!({ "paging": { "first": 1 } })),
            AuthContext::Anonymous,
        )
        .await;
    let page = &first["data"]["todoItem"]["subTasks"];
    assert_eq!(
        page["edges"],
        json!([{ "cursor": encode_cursor(0), "node": { "id": "sub-1" } }])
    );
    assert_eq!(page["pageInfo"]["hasNextPage"], json!(true));
    assert_eq!(page["pageInfo"]["hasPreviousPage"], json!(false));

    let after = page["pageInfo"]["endCursor"].clone();
    let second = schema
        .execute(
            query,
            Some(json!({ "paging": { "first": 1, "after": after } })),
            AuthContext::Anonymous,
        )
        .await;
    let page = &second["data"]["todoItem"]["subTasks"];
    assert_eq!(
        page["edges"],
        json!([{ "cursor": encode_cursor(1), "node": { "id": "sub-2" } }])
    );
    assert_eq!(page["pageInfo"]["hasNextPage"], json!(true));
    assert_eq!(page["pageInfo"]["hasPreviousPage"], json!(true));
}

#[tokio::test]
async fn test_invalid_cursor_reports_code() {
    let response = schema()
        .execute(
            r#"{ todoItem(id: "todo-1") { subTasks(paging: { after: "bogus" }) { edges { cursor } } } }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert_eq!(error_codes(&response), vec!["INVALID_CURSOR"]);
}

#[tokio::test]
async fn test_cursor_at_last_offset_reports_code() {
    let response = schema()
        .execute(
            r#"query Page($after: String) {
                todoItem(id: "todo-1") { subTasks(paging: { after: $after }) { edges { cursor } } }
            }"#,
            Some(json!({ "after": encode_cursor(usize::MAX) })),
            AuthContext::Anonymous,
        )
        .await;

    assert_eq!(error_codes(&response), vec!["INVALID_CURSOR"]);
    assert_eq!(response["data"]["todoItem"], Value::Null);
}

#[tokio::test]
async fn test_nested_relations() {
    let response = schema()
        .execute(
            r#"{ subTask(id: "sub-3") { title todoItem { title assignee { name } } } }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert_eq!(
        response["data"]["subTask"],
        json!({
            "title": "Review",
            "todoItem": { "title": "Write docs", "assignee": { "name": "Ada" } }
        })
    );
}

// =============================================================================
// Root fields
// =============================================================================

#[tokio::test]
async fn test_root_query_fields() {
    let response = schema()
        .execute(
            r#"{
                dtoTypes
                todoItems(filter: { assigneeId: { is: null } }) {
                    edges { node { id } }
                    pageInfo { hasNextPage }
                }
                missing: todoItem(id: "nope") { id }
            }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert!(response.get("errors").is_none(), "{}", response);
    assert_eq!(
        response["data"],
        json!({
            "dtoTypes": ["TodoItem", "User", "SubTask"],
            "todoItems": {
                "edges": [{ "node": { "id": "todo-2" } }],
                "pageInfo": { "hasNextPage": false }
            },
            "missing": null
        })
    );
}

// =============================================================================
// Hooks
// =============================================================================

struct RedactNames;

impl RelationInterceptor for RedactNames {
    fn intercept(&self, _field: &str, mut value: Value) -> Result<Value> {
        if let Some(name) = value.get_mut("name") {
            *name = json!("[redacted]");
        }
        Ok(value)
    }
}

struct MaskServiceErrors;

impl ErrorFilter for MaskServiceErrors {
    fn catch(&self, field: &str, error: RelationError) -> RelationError {
        match error {
            RelationError::Service(_) => {
                RelationError::Service(anyhow::anyhow!("{} is unavailable", field))
            }
            other => other,
        }
    }
}

#[tokio::test]
async fn test_guard_denies_anonymous() {
    let schema = schema_with(
        Relations::new().one(
            "assignee",
            RelationDescriptor::new("User")
                .nullable(true)
                .hooks(RelationHooks::default().guard(AuthPolicy::Authenticated)),
        ),
    );
    let query = r#"{ todoItem(id: "todo-1") { id assignee { name } } }"#;

    let denied = schema.execute(query, None, AuthContext::Anonymous).await;
    assert_eq!(error_codes(&denied), vec!["FORBIDDEN"]);
    assert_eq!(denied["data"]["todoItem"]["assignee"], Value::Null);

    let user = AuthContext::User {
        user_id: Uuid::new_v4(),
        roles: vec![],
    };
    let allowed = schema.execute(query, None, user).await;
    assert!(allowed.get("errors").is_none(), "{}", allowed);
    assert_eq!(allowed["data"]["todoItem"]["assignee"]["name"], "Ada");
}

#[tokio::test]
async fn test_interceptor_rewrites_result() {
    let schema = schema_with(
        Relations::new().one(
            "assignee",
            RelationDescriptor::new("User")
                .nullable(true)
                .hooks(RelationHooks::default().interceptor(RedactNames)),
        ),
    );

    let response = schema
        .execute(
            r#"{ todoItem(id: "todo-1") { assignee { id name } } }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;
    assert_eq!(
        response["data"]["todoItem"]["assignee"],
        json!({ "id": "user-1", "name": "[redacted]" })
    );
}

#[tokio::test]
async fn test_pipe_rewrites_arguments() {
    let clamp = |argument: &str, value: Value| -> Result<Value> {
        if argument != "paging" {
            return Ok(value);
        }
        let mut paging = value;
        paging["first"] = json!(1);
        Ok(paging)
    };
    let schema = schema_with(
        Relations::new().many(
            "subTask",
            RelationDescriptor::new("SubTask").hooks(RelationHooks::default().pipe(clamp)),
        ),
    );

    let response = schema
        .execute(
            r#"{ todoItem(id: "todo-1") { subTasks(paging: { first: 10 }) { edges { node { id } } } } }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;
    assert_eq!(
        response["data"]["todoItem"]["subTasks"]["edges"],
        json!([{ "node": { "id": "sub-1" } }])
    );
}

#[tokio::test]
async fn test_error_filter_rewrites_failure() {
    // no binding for "labels" in the todo service
    let schema = schema_with(
        Relations::new().many(
            "label",
            RelationDescriptor::new("User")
                .relation_name("labels")
                .hooks(RelationHooks::default().filter(MaskServiceErrors)),
        ),
    );

    let response = schema
        .execute(
            r#"{ todoItem(id: "todo-1") { labels { edges { cursor } } } }"#,
            None,
            AuthContext::Anonymous,
        )
        .await;

    assert_eq!(error_codes(&response), vec!["SERVICE_ERROR"]);
    assert_eq!(response["errors"][0]["message"], "labels is unavailable");
}
