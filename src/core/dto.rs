//! DTO descriptions for GraphQL-exposed types
//!
//! A [`DtoDescriptor`] names a type and lists its scalar fields. Records of
//! that type travel through resolvers as JSON objects, so the descriptor is
//! only needed when the schema is built.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::IDENTIFIER;

/// Scalar kinds a DTO field can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Id,
    String,
    Int,
    Float,
    Boolean,
    Json,
}

impl ScalarKind {
    /// GraphQL name of the scalar
    pub fn graphql_name(&self) -> &'static str {
        match self {
            ScalarKind::Id => "ID",
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::Json => "JSON",
        }
    }
}

/// A scalar field of a DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DtoField {
    #[validate(regex(path = *IDENTIFIER))]
    pub name: String,

    pub kind: ScalarKind,

    #[serde(default)]
    pub nullable: bool,

    #[serde(default)]
    pub description: Option<String>,
}

impl DtoField {
    pub fn new(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
            description: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// Schema-level description of a DTO type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DtoDescriptor {
    /// GraphQL object type name (e.g. "TodoItem")
    #[validate(regex(path = *IDENTIFIER))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(nested)]
    #[serde(default)]
    pub fields: Vec<DtoField>,
}

impl DtoDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a field to the descriptor
    pub fn field(mut self, field: DtoField) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a non-null `ID` field named `id`
    pub fn id_field(self) -> Self {
        self.field(DtoField::new("id", ScalarKind::Id))
    }

    /// Find a field by name
    pub fn get_field(&self, name: &str) -> Option<&DtoField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
