//! Generated relation resolvers
//!
//! A [`ResolverDefinition`] is produced once per host DTO when the schema is
//! built. A [`RelationResolver`] pairs it with a query service for the
//! duration of a request.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

use super::connection::Connection;
use super::error::RelationError;
use super::query::RelationQuery;
use super::relation::RelationKind;
use super::service::QueryService;

/// Result of resolving a relation field
#[derive(Debug, Clone, PartialEq)]
pub enum RelationOutput {
    One(Option<Value>),
    Many(Connection),
}

impl RelationOutput {
    /// JSON form as returned to clients
    pub fn into_value(self) -> Result<Value, RelationError> {
        match self {
            RelationOutput::One(value) => Ok(value.unwrap_or(Value::Null)),
            RelationOutput::Many(connection) => Ok(serde_json::to_value(connection)?),
        }
    }
}

/// One generated relation accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationAccessor {
    /// Exposed field name
    pub field_name: String,
    /// Relation name passed to the query service
    pub relation_name: String,
    /// Related DTO type
    pub dto: String,
    pub kind: RelationKind,
}

impl RelationAccessor {
    /// Delegate to the query service for `parent`
    ///
    /// "one" accessors ignore `query`; "many" accessors forward it untouched.
    pub async fn resolve(
        &self,
        service: &dyn QueryService,
        parent: &Value,
        query: &RelationQuery,
    ) -> Result<RelationOutput, RelationError> {
        match self.kind {
            RelationKind::One => Ok(RelationOutput::One(self.find(service, parent).await?)),
            RelationKind::Many => Ok(RelationOutput::Many(
                self.query(service, parent, query).await?,
            )),
        }
    }

    /// Single related record, returned exactly as the service produced it
    pub async fn find(
        &self,
        service: &dyn QueryService,
        parent: &Value,
    ) -> Result<Option<Value>, RelationError> {
        tracing::debug!(field = %self.field_name, relation = %self.relation_name, "finding relation");

        service
            .find_relation(parent, &self.relation_name)
            .await
            .map_err(RelationError::from)
    }

    /// Related records shaped into a connection
    pub async fn query(
        &self,
        service: &dyn QueryService,
        parent: &Value,
        query: &RelationQuery,
    ) -> Result<Connection, RelationError> {
        tracing::debug!(field = %self.field_name, relation = %self.relation_name, "querying relations");

        let records = service
            .query_relations(parent, &self.relation_name, query)
            .await
            .map_err(RelationError::from)?;
        Connection::paginate(records, &query.paging)
    }
}

/// Relation accessors of one host DTO, keyed by field name
#[derive(Debug, Clone, Default)]
pub struct ResolverDefinition {
    pub host: String,
    pub accessors: IndexMap<String, RelationAccessor>,
}

impl ResolverDefinition {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            accessors: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn accessor(&self, field: &str) -> Option<&RelationAccessor> {
        self.accessors.get(field)
    }

    /// Exposed field names in registration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }
}

/// Request-scoped resolver bound to a query service
pub struct RelationResolver {
    definition: Arc<ResolverDefinition>,
    service: Arc<dyn QueryService>,
}

impl RelationResolver {
    pub fn new(definition: Arc<ResolverDefinition>, service: Arc<dyn QueryService>) -> Self {
        Self {
            definition,
            service,
        }
    }

    pub fn definition(&self) -> &ResolverDefinition {
        &self.definition
    }

    fn accessor(&self, field: &str, kind: RelationKind) -> Result<&RelationAccessor, RelationError> {
        self.definition
            .accessor(field)
            .filter(|a| a.kind == kind)
            .ok_or_else(|| RelationError::UnknownRelation {
                host: self.definition.host.clone(),
                field: field.to_string(),
            })
    }

    /// Resolve any relation field
    pub async fn resolve(
        &self,
        field: &str,
        parent: &Value,
        query: &RelationQuery,
    ) -> Result<RelationOutput, RelationError> {
        let accessor = self.definition.accessor(field).ok_or_else(|| {
            RelationError::UnknownRelation {
                host: self.definition.host.clone(),
                field: field.to_string(),
            }
        })?;
        accessor.resolve(self.service.as_ref(), parent, query).await
    }

    /// Resolve a "one" relation field
    pub async fn find_one(&self, field: &str, parent: &Value) -> Result<Option<Value>, RelationError> {
        self.accessor(field, RelationKind::One)?
            .find(self.service.as_ref(), parent)
            .await
    }

    /// Resolve a "many" relation field
    pub async fn query_many(
        &self,
        field: &str,
        parent: &Value,
        query: &RelationQuery,
    ) -> Result<Connection, RelationError> {
        self.accessor(field, RelationKind::Many)?
            .query(self.service.as_ref(), parent, query)
            .await
    }
}
