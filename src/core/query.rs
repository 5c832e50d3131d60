//! Query arguments for "many" relations
//!
//! A [`RelationQuery`] is the argument object a many-relation field accepts.
//! It is handed to the query service exactly as received.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::connection::decode_cursor;
use super::error::RelationError;

/// Filter, paging and sorting arguments of a many-relation field
///
/// # Example
/// ```rust,ignore
/// let query: RelationQuery = serde_json::from_value(json!({
///     "filter": { "id": { "eq": "id-2" } },
///     "paging": { "first": 10 },
///     "sorting": [{ "field": "title", "direction": "DESC" }]
/// }))?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RelationQuery {
    /// Filter expression, see [`crate::core::filter`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,

    #[serde(skip_serializing_if = "CursorPaging::is_empty")]
    pub paging: CursorPaging,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorting: Vec<SortField>,
}

impl RelationQuery {
    /// Query with only a filter
    pub fn with_filter(filter: Value) -> Self {
        Self {
            filter: Some(filter),
            ..Self::default()
        }
    }
}

/// Forward cursor paging
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorPaging {
    /// Maximum number of edges to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<usize>,

    /// Return edges after this cursor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl CursorPaging {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.after.is_none()
    }

    /// Number of records preceding the first returned edge
    pub fn offset(&self) -> Result<usize, RelationError> {
        match &self.after {
            Some(cursor) => decode_cursor(cursor)?
                .checked_add(1)
                .ok_or_else(|| RelationError::InvalidCursor(cursor.clone())),
            None => Ok(0),
        }
    }

    /// How many records a service should fetch
    ///
    /// One extra record is requested so the connection can tell whether a
    /// next page exists.
    pub fn limit(&self) -> Option<usize> {
        self.first.map(|first| first.saturating_add(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortNulls {
    NullsFirst,
    NullsLast,
}

/// One sort criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,

    #[serde(default)]
    pub direction: SortDirection,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<SortNulls>,
}
