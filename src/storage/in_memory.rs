//! In-memory query service for testing and development

use crate::core::filter::{filter_records, sort_records};
use crate::core::{QueryService, RelationQuery};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// How a relation of the host DTO finds its related records
///
/// A related record belongs to a parent when
/// `parent[local_key] == related[foreign_key]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationBinding {
    /// DTO type of the related records
    pub target: String,
    pub local_key: String,
    pub foreign_key: String,
}

impl RelationBinding {
    pub fn new(
        target: impl Into<String>,
        local_key: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            local_key: local_key.into(),
            foreign_key: foreign_key.into(),
        }
    }
}

/// Shared record store, one list of JSON records per DTO type
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record to a DTO collection
    pub fn insert(&self, dto: &str, record: Value) -> Result<()> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.entry(dto.to_string()).or_default().push(record);

        Ok(())
    }

    /// Every record of a DTO collection, in insertion order
    pub fn list(&self, dto: &str) -> Result<Vec<Value>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(dto).cloned().unwrap_or_default())
    }
}

/// Query service over an [`InMemoryStore`] for one host DTO
#[derive(Clone)]
pub struct InMemoryQueryService {
    dto: String,
    store: InMemoryStore,
    relations: HashMap<String, RelationBinding>,
}

impl InMemoryQueryService {
    pub fn new(dto: impl Into<String>, store: InMemoryStore) -> Self {
        Self {
            dto: dto.into(),
            store,
            relations: HashMap::new(),
        }
    }

    /// Bind a relation name to the records it reaches
    pub fn with_relation(mut self, relation_name: impl Into<String>, binding: RelationBinding) -> Self {
        self.relations.insert(relation_name.into(), binding);
        self
    }

    fn binding(&self, relation_name: &str) -> Result<&RelationBinding> {
        self.relations
            .get(relation_name)
            .ok_or_else(|| anyhow!("Unable to find relation {} on {}", relation_name, self.dto))
    }

    fn related(&self, parent: &Value, binding: &RelationBinding) -> Result<Vec<Value>> {
        let Some(key) = parent.get(&binding.local_key).filter(|v| !v.is_null()) else {
            return Ok(Vec::new());
        };

        Ok(self
            .store
            .list(&binding.target)?
            .into_iter()
            .filter(|record| record.get(&binding.foreign_key) == Some(key))
            .collect())
    }
}

/// Filter, sort, then cut the page window requested by `query`
fn apply_query(records: Vec<Value>, query: &RelationQuery) -> Result<Vec<Value>> {
    let mut records = filter_records(records, query.filter.as_ref())?;
    sort_records(&mut records, &query.sorting);

    let offset = query.paging.offset()?;
    let page = records.into_iter().skip(offset);
    Ok(match query.paging.limit() {
        Some(limit) => page.take(limit).collect(),
        None => page.collect(),
    })
}

#[async_trait]
impl QueryService for InMemoryQueryService {
    async fn find_relation(&self, parent: &Value, relation_name: &str) -> Result<Option<Value>> {
        let binding = self.binding(relation_name)?;
        Ok(self.related(parent, binding)?.into_iter().next())
    }

    async fn query_relations(
        &self,
        parent: &Value,
        relation_name: &str,
        query: &RelationQuery,
    ) -> Result<Vec<Value>> {
        let binding = self.binding(relation_name)?;
        apply_query(self.related(parent, binding)?, query)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Value>> {
        Ok(self
            .store
            .list(&self.dto)?
            .into_iter()
            .find(|record| record.get("id").and_then(Value::as_str) == Some(id)))
    }

    async fn query(&self, query: &RelationQuery) -> Result<Vec<Value>> {
        apply_query(self.store.list(&self.dto)?, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::connection::encode_cursor;
    use crate::core::{CursorPaging, SortDirection, SortField};
    use serde_json::json;

    fn seeded() -> InMemoryQueryService {
        let store = InMemoryStore::new();
        store
            .insert("TodoItem", json!({ "id": "todo-1", "assigneeId": "user-1" }))
            .unwrap();
        store
            .insert("TodoItem", json!({ "id": "todo-2", "assigneeId": null }))
            .unwrap();
        store.insert("User", json!({ "id": "user-1" })).unwrap();
        for (id, title) in [("sub-1", "b"), ("sub-2", "a"), ("sub-3", "c")] {
            store
                .insert(
                    "SubTask",
                    json!({ "id": id, "title": title, "todoItemId": "todo-1" }),
                )
                .unwrap();
        }

        InMemoryQueryService::new("TodoItem", store)
            .with_relation("assignee", RelationBinding::new("User", "assigneeId", "id"))
            .with_relation("subTasks", RelationBinding::new("SubTask", "id", "todoItemId"))
    }

    #[tokio::test]
    async fn test_find_relation() {
        let service = seeded();
        let todo = service.find_by_id("todo-1").await.unwrap().unwrap();

        let assignee = service.find_relation(&todo, "assignee").await.unwrap();
        assert_eq!(assignee, Some(json!({ "id": "user-1" })));

        let unassigned = service.find_by_id("todo-2").await.unwrap().unwrap();
        assert_eq!(service.find_relation(&unassigned, "assignee").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unknown_relation_fails() {
        let service = seeded();
        let err = service
            .find_relation(&json!({ "id": "todo-1" }), "nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unable to find relation nope on TodoItem");
    }

    #[tokio::test]
    async fn test_query_relations_filter_sort_page() {
        let service = seeded();
        let todo = json!({ "id": "todo-1" });

        let all = service
            .query_relations(&todo, "subTasks", &RelationQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let filtered = service
            .query_relations(
                &todo,
                "subTasks",
                &RelationQuery::with_filter(json!({ "id": { "eq": "sub-2" } })),
            )
            .await
            .unwrap();
        assert_eq!(filtered, vec![json!({ "id": "sub-2", "title": "a", "todoItemId": "todo-1" })]);

        let query = RelationQuery {
            filter: None,
            paging: CursorPaging {
                first: Some(1),
                after: Some(encode_cursor(0)),
            },
            sorting: vec![SortField {
                field: "title".into(),
                direction: SortDirection::Asc,
                nulls: None,
            }],
        };
        let page = service.query_relations(&todo, "subTasks", &query).await.unwrap();
        let ids: Vec<_> = page.iter().map(|r| r["id"].as_str().unwrap()).collect();
        // sorted a, b, c; skip one, fetch first + 1
        assert_eq!(ids, vec!["sub-1", "sub-3"]);
    }

    #[tokio::test]
    async fn test_query_host_records() {
        let service = seeded();
        let todos = service
            .query(&RelationQuery::with_filter(json!({ "assigneeId": { "is": null } })))
            .await
            .unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["id"], "todo-2");
    }
}
