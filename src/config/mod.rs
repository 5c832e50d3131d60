//! Configuration loading and management
//!
//! DTO types and their relations can be declared in YAML instead of code:
//!
//! ```yaml
//! dtos:
//!   - name: TodoItem
//!     fields:
//!       - { name: id, kind: id }
//!       - { name: title, kind: string }
//!   - name: SubTask
//!     fields:
//!       - { name: id, kind: id }
//!       - { name: todoItemId, kind: id }
//!
//! relations:
//!   TodoItem:
//!     many:
//!       subTask:
//!         dto: SubTask
//!         guards: [authenticated]
//! ```

use crate::core::validation::is_identifier;
use crate::core::{AuthPolicy, DtoDescriptor, RelationDescriptor, RelationHooks, Relations};
use anyhow::{Result, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One relation entry as written in YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationConfig {
    #[serde(flatten)]
    pub descriptor: RelationDescriptor,

    /// Guard policies, parsed with [`AuthPolicy::parse_policy`]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<String>,
}

impl RelationConfig {
    /// Descriptor with the configured guards attached
    pub fn to_descriptor(&self) -> RelationDescriptor {
        let hooks = self
            .guards
            .iter()
            .fold(RelationHooks::default(), |hooks, guard| {
                hooks.guard(AuthPolicy::parse_policy(guard))
            });
        self.descriptor.clone().hooks(hooks)
    }
}

/// Relation maps of one host DTO
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostRelationsConfig {
    #[serde(default)]
    pub one: IndexMap<String, RelationConfig>,

    #[serde(default)]
    pub many: IndexMap<String, RelationConfig>,
}

impl HostRelationsConfig {
    pub fn to_relations(&self) -> Relations {
        Relations {
            one: self
                .one
                .iter()
                .map(|(k, c)| (k.clone(), c.to_descriptor()))
                .collect(),
            many: self
                .many
                .iter()
                .map(|(k, c)| (k.clone(), c.to_descriptor()))
                .collect(),
        }
    }
}

/// Complete configuration for DTOs and their relations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationsConfig {
    #[serde(default)]
    pub dtos: Vec<DtoDescriptor>,

    /// Host DTO name -> relation maps
    #[serde(default)]
    pub relations: IndexMap<String, HostRelationsConfig>,
}

impl RelationsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Find a DTO descriptor by name
    pub fn dto(&self, name: &str) -> Option<&DtoDescriptor> {
        self.dtos.iter().find(|d| d.name == name)
    }

    /// Relations declared for a host DTO (empty when none)
    pub fn relations_for(&self, host: &str) -> Relations {
        self.relations
            .get(host)
            .map(HostRelationsConfig::to_relations)
            .unwrap_or_default()
    }

    /// Check names and that every referenced DTO is declared
    pub fn validate(&self) -> Result<()> {
        for dto in &self.dtos {
            if let Err(e) = dto.validate() {
                bail!("Invalid DTO '{}': {}", dto.name, e);
            }
        }

        for (host, host_relations) in &self.relations {
            if self.dto(host).is_none() {
                bail!("Relations declared for unknown DTO '{}'", host);
            }

            let entries = host_relations
                .one
                .iter()
                .chain(host_relations.many.iter());
            for (key, relation) in entries {
                if !is_identifier(key) {
                    bail!("Invalid relation name '{}' on '{}'", key, host);
                }
                if self.dto(&relation.descriptor.dto).is_none() {
                    bail!(
                        "Relation '{}' on '{}' targets unknown DTO '{}'",
                        key,
                        host,
                        relation.descriptor.dto
                    );
                }
            }
        }

        Ok(())
    }

    /// Merge multiple configurations into one
    ///
    /// DTOs are deduplicated by name and relation entries by host and key;
    /// later configurations win.
    pub fn merge(configs: Vec<RelationsConfig>) -> Self {
        let mut dtos: IndexMap<String, DtoDescriptor> = IndexMap::new();
        let mut relations: IndexMap<String, HostRelationsConfig> = IndexMap::new();

        for config in configs {
            for dto in config.dtos {
                dtos.insert(dto.name.clone(), dto);
            }
            for (host, host_relations) in config.relations {
                let merged = relations.entry(host).or_default();
                merged.one.extend(host_relations.one);
                merged.many.extend(host_relations.many);
            }
        }

        Self {
            dtos: dtos.into_values().collect(),
            relations,
        }
    }
}
