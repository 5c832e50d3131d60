//! Schema registration capability
//!
//! The resolver factory never touches a GraphQL library directly. It asks a
//! [`FieldRegistrar`] for type references and hands it one
//! [`FieldRegistration`] per exposed relation field.

use super::error::RelationError;
use super::hooks::RelationHooks;
use super::resolver::RelationAccessor;

/// Output type of a registered field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    /// A DTO object type
    Object(String),

    /// The connection type wrapping a DTO (`<Dto>Connection`)
    Connection { connection: String, node: String },
}

impl ReturnType {
    /// GraphQL type name
    pub fn type_name(&self) -> &str {
        match self {
            ReturnType::Object(name) => name,
            ReturnType::Connection { connection, .. } => connection,
        }
    }
}

/// Input types accepted by a many-relation field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArgsType {
    pub filter: String,
    pub sort: String,
    pub paging: String,
}

impl QueryArgsType {
    /// Conventional names for a DTO: `<Dto>Filter`, `<Dto>Sort`, `CursorPaging`
    pub fn for_dto(dto: &str) -> Self {
        Self {
            filter: format!("{}Filter", dto),
            sort: format!("{}Sort", dto),
            paging: "CursorPaging".to_string(),
        }
    }
}

/// Everything needed to expose one relation field on a host type
#[derive(Debug, Clone)]
pub struct FieldRegistration {
    /// Host DTO the field is added to
    pub host: String,
    pub name: String,
    pub return_type: ReturnType,
    pub nullable: bool,
    pub description: Option<String>,
    /// Present for many-relations only
    pub args: Option<QueryArgsType>,
    pub hooks: RelationHooks,
    pub accessor: RelationAccessor,
}

/// Declares types and fields on a schema under construction
pub trait FieldRegistrar {
    /// Reference to the object type of a DTO
    fn object_type(&mut self, dto: &str) -> Result<ReturnType, RelationError>;

    /// Filter, sort and paging input types for a DTO
    fn query_args_type(&mut self, dto: &str) -> Result<QueryArgsType, RelationError>;

    /// Connection type wrapping a DTO
    fn connection_type(&mut self, dto: &str) -> Result<ReturnType, RelationError>;

    /// Add a field to its host type
    fn register_field(&mut self, registration: FieldRegistration) -> Result<(), RelationError>;
}
