//! Relation resolver factory
//!
//! Turns a host DTO's [`Relations`] into registered GraphQL fields and the
//! [`ResolverDefinition`] that serves them.

use std::sync::Arc;

use super::error::RelationError;
use super::registrar::{FieldRegistrar, FieldRegistration};
use super::relation::{RelationDescriptor, RelationKind, Relations};
use super::resolver::{RelationAccessor, ResolverDefinition};

/// Builds relation resolvers for host DTOs
pub struct RelationResolverFactory;

impl RelationResolverFactory {
    /// Register one field per enabled relation of `host`
    ///
    /// Disabled entries, and empty relation maps, cause no registrar calls
    /// at all. Hooks are forwarded to the registrar as declared.
    pub fn build<R: FieldRegistrar + ?Sized>(
        host: &str,
        relations: &Relations,
        registrar: &mut R,
    ) -> Result<Arc<ResolverDefinition>, RelationError> {
        let mut definition = ResolverDefinition::new(host);

        for (key, descriptor) in &relations.one {
            if descriptor.disable_read {
                tracing::debug!(host = %host, relation = %key, "one relation disabled");
                continue;
            }
            let accessor = Self::register_one(host, key, descriptor, registrar)?;
            definition
                .accessors
                .insert(accessor.field_name.clone(), accessor);
        }

        for (key, descriptor) in &relations.many {
            if descriptor.disable_read {
                tracing::debug!(host = %host, relation = %key, "many relation disabled");
                continue;
            }
            let accessor = Self::register_many(host, key, descriptor, registrar)?;
            definition
                .accessors
                .insert(accessor.field_name.clone(), accessor);
        }

        Ok(Arc::new(definition))
    }

    fn accessor(key: &str, descriptor: &RelationDescriptor, kind: RelationKind) -> RelationAccessor {
        RelationAccessor {
            field_name: descriptor.field_name(key, kind),
            relation_name: descriptor.service_relation_name(key).to_string(),
            dto: descriptor.dto.clone(),
            kind,
        }
    }

    fn register_one<R: FieldRegistrar + ?Sized>(
        host: &str,
        key: &str,
        descriptor: &RelationDescriptor,
        registrar: &mut R,
    ) -> Result<RelationAccessor, RelationError> {
        let return_type = registrar.object_type(&descriptor.dto)?;
        let accessor = Self::accessor(key, descriptor, RelationKind::One);

        tracing::debug!(
            host = %host,
            field = %accessor.field_name,
            relation = %accessor.relation_name,
            "registering one relation"
        );

        registrar.register_field(FieldRegistration {
            host: host.to_string(),
            name: accessor.field_name.clone(),
            return_type,
            nullable: descriptor.nullable,
            description: descriptor.description.clone(),
            args: None,
            hooks: descriptor.hooks.clone(),
            accessor: accessor.clone(),
        })?;

        Ok(accessor)
    }

    fn register_many<R: FieldRegistrar + ?Sized>(
        host: &str,
        key: &str,
        descriptor: &RelationDescriptor,
        registrar: &mut R,
    ) -> Result<RelationAccessor, RelationError> {
        let args = registrar.query_args_type(&descriptor.dto)?;
        let return_type = registrar.connection_type(&descriptor.dto)?;
        let accessor = Self::accessor(key, descriptor, RelationKind::Many);

        tracing::debug!(
            host = %host,
            field = %accessor.field_name,
            relation = %accessor.relation_name,
            "registering many relation"
        );

        registrar.register_field(FieldRegistration {
            host: host.to_string(),
            name: accessor.field_name.clone(),
            return_type,
            nullable: false,
            description: descriptor.description.clone(),
            args: Some(args),
            hooks: descriptor.hooks.clone(),
            accessor: accessor.clone(),
        })?;

        Ok(accessor)
    }
}
