//! Query service trait backing relation resolution

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::query::RelationQuery;

/// Data access for one host DTO type, including its relations
///
/// Records are JSON objects. Implementations are free to fetch them from
/// any store; failures are returned as-is to the GraphQL layer.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Find the single record related to `parent` through `relation_name`
    async fn find_relation(&self, parent: &Value, relation_name: &str) -> Result<Option<Value>>;

    /// Query the records related to `parent` through `relation_name`
    ///
    /// `query` is the field's argument object exactly as received. When
    /// `query.paging.first` is set, returning one record more than asked
    /// lets the connection report a next page.
    async fn query_relations(
        &self,
        parent: &Value,
        relation_name: &str,
        query: &RelationQuery,
    ) -> Result<Vec<Value>>;

    /// Find a host record by its id
    async fn find_by_id(&self, id: &str) -> Result<Option<Value>>;

    /// Query host records
    async fn query(&self, query: &RelationQuery) -> Result<Vec<Value>>;
}
