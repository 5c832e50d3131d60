//! Relation descriptors
//!
//! A host DTO declares its relations in two maps: `one` for single related
//! records and `many` for paginated collections. The map key names the field
//! unless `dto_name` overrides it, and names the underlying relation unless
//! `relation_name` overrides it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::hooks::RelationHooks;
use super::pluralize::{Pluralizer, lower_case_first};

/// Cardinality of a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    One,
    Many,
}

/// How one field maps to a related DTO and to the underlying service call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDescriptor {
    /// Name of the related DTO type
    pub dto: String,

    /// Overrides the map key as base of the exposed field name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dto_name: Option<String>,

    /// Overrides the map key as the relation name passed to the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,

    /// Only meaningful for "one" relations; connections are never null
    #[serde(default)]
    pub nullable: bool,

    /// Suppresses the field entirely
    #[serde(default)]
    pub disable_read: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip)]
    pub hooks: RelationHooks,
}

impl RelationDescriptor {
    pub fn new(dto: impl Into<String>) -> Self {
        Self {
            dto: dto.into(),
            ..Self::default()
        }
    }

    pub fn dto_name(mut self, name: impl Into<String>) -> Self {
        self.dto_name = Some(name.into());
        self
    }

    pub fn relation_name(mut self, name: impl Into<String>) -> Self {
        self.relation_name = Some(name.into());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn disable_read(mut self, disabled: bool) -> Self {
        self.disable_read = disabled;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn hooks(mut self, hooks: RelationHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// `lowerCaseFirst(dto_name ?? key)`
    pub fn base_name(&self, key: &str) -> String {
        lower_case_first(self.dto_name.as_deref().unwrap_or(key))
    }

    /// Name of the exposed GraphQL field
    ///
    /// "one" fields use the base name, "many" fields its plural.
    pub fn field_name(&self, key: &str, kind: RelationKind) -> String {
        let base = self.base_name(key);
        match kind {
            RelationKind::One => base,
            RelationKind::Many => Pluralizer::pluralize(&base),
        }
    }

    /// Relation name handed to the query service
    pub fn service_relation_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.relation_name.as_deref().unwrap_or(key)
    }
}

/// The `one` and `many` relation maps of a host DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relations {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub one: IndexMap<String, RelationDescriptor>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub many: IndexMap<String, RelationDescriptor>,
}

impl Relations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn one(mut self, key: impl Into<String>, descriptor: RelationDescriptor) -> Self {
        self.one.insert(key.into(), descriptor);
        self
    }

    pub fn many(mut self, key: impl Into<String>, descriptor: RelationDescriptor) -> Self {
        self.many.insert(key.into(), descriptor);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.one.is_empty() && self.many.is_empty()
    }

    /// Every entry with its kind, `one` entries first
    pub fn entries(&self) -> impl Iterator<Item = (RelationKind, &String, &RelationDescriptor)> {
        self.one
            .iter()
            .map(|(k, d)| (RelationKind::One, k, d))
            .chain(self.many.iter().map(|(k, d)| (RelationKind::Many, k, d)))
    }

    /// Merge `other` into `self`; entries of `other` win on key clashes
    pub fn merge(&mut self, other: Relations) {
        self.one.extend(other.one);
        self.many.extend(other.many);
    }
}
