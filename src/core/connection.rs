//! Cursor-paginated connections
//!
//! Related records returned by a query service are shaped into the common
//! connection envelope (edges plus page info). Cursors are offset based:
//! the base64 encoding of `arrayconnection:<index>`.
//!
//! See: https://relay.dev/graphql/connections.htm

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;

use super::error::RelationError;
use super::query::CursorPaging;

const CURSOR_PREFIX: &str = "arrayconnection:";

/// Encode a record offset as an opaque cursor
pub fn encode_cursor(offset: usize) -> String {
    STANDARD.encode(format!("{}{}", CURSOR_PREFIX, offset))
}

/// Decode a cursor produced by [`encode_cursor`]
pub fn decode_cursor(cursor: &str) -> Result<usize, RelationError> {
    let invalid = || RelationError::InvalidCursor(cursor.to_string());

    let bytes = STANDARD.decode(cursor).map_err(|_| invalid())?;
    let decoded = String::from_utf8(bytes).map_err(|_| invalid())?;
    decoded
        .strip_prefix(CURSOR_PREFIX)
        .and_then(|offset| offset.parse().ok())
        .ok_or_else(invalid)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub cursor: String,
    pub node: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
}

impl Connection {
    /// Build a connection over every record, cursors starting at zero
    pub fn from_records(records: Vec<Value>) -> Self {
        Self::from_offset(records, 0, false)
    }

    /// Build a connection for a forward page
    ///
    /// `records` is what the service returned for `paging`: the window
    /// starting right after `paging.after`, possibly one record longer than
    /// `paging.first`. The surplus record is dropped and reported through
    /// `has_next_page`.
    pub fn paginate(mut records: Vec<Value>, paging: &CursorPaging) -> Result<Self, RelationError> {
        let offset = paging.offset()?;

        let has_next_page = match paging.first {
            Some(first) if records.len() > first => {
                records.truncate(first);
                true
            }
            _ => false,
        };

        // last edge offset must still be encodable
        if records.len().saturating_sub(1) > usize::MAX - offset {
            return Err(RelationError::InvalidCursor(
                paging.after.clone().unwrap_or_default(),
            ));
        }

        let mut connection = Self::from_offset(records, offset, has_next_page);
        connection.page_info.has_previous_page = offset > 0;
        Ok(connection)
    }

    fn from_offset(records: Vec<Value>, offset: usize, has_next_page: bool) -> Self {
        let edges: Vec<Edge> = records
            .into_iter()
            .enumerate()
            .map(|(i, node)| Edge {
                cursor: encode_cursor(offset + i),
                node,
            })
            .collect();

        let page_info = PageInfo {
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
            has_next_page,
            has_previous_page: false,
        };

        Self { edges, page_info }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Nodes in edge order
    pub fn nodes(&self) -> impl Iterator<Item = &Value> {
        self.edges.iter().map(|e| &e.node)
    }
}
