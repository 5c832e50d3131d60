//! Dynamic schema assembly
//!
//! [`RelationSchemaBuilder`] runs the relation resolver factory for every
//! host DTO against a [`DynamicRegistrar`], adds root read fields for DTOs
//! that have a query service, and finishes an `async_graphql` dynamic
//! schema.

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Object, Schema, TypeRef,
};
use async_graphql::{Request, Variables};
use indexmap::IndexMap;
use serde_json::{Value as JsonValue, json};
use std::collections::HashMap;
use std::sync::Arc;

use super::registrar::{DynamicRegistrar, arguments_json, to_graphql_error};
use super::types::{self, PropertyKind};
use crate::config::RelationsConfig;
use crate::core::pluralize::lower_case_first;
use crate::core::{
    AuthContext, Connection, DtoDescriptor, FieldRegistrar, Pluralizer, QueryService,
    RelationError, RelationQuery, RelationResolver, RelationResolverFactory, Relations,
    ResolverDefinition,
};

const QUERY_ROOT: &str = "Query";

/// Resolver definitions and query services, keyed by host DTO
///
/// Stored in schema data; a [`RelationResolver`] is created from it for
/// every relation field resolution.
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    definitions: HashMap<String, Arc<ResolverDefinition>>,
    services: HashMap<String, Arc<dyn QueryService>>,
}

impl ResolverRegistry {
    pub fn service(&self, dto: &str) -> Result<Arc<dyn QueryService>, RelationError> {
        self.services
            .get(dto)
            .cloned()
            .ok_or_else(|| RelationError::UnknownService(dto.to_string()))
    }

    pub fn definition(&self, host: &str) -> Option<Arc<ResolverDefinition>> {
        self.definitions.get(host).cloned()
    }

    /// Request-scoped resolver for a host DTO
    pub fn resolver(&self, host: &str) -> Result<RelationResolver, RelationError> {
        let definition = self
            .definition(host)
            .ok_or_else(|| RelationError::UnknownDto(host.to_string()))?;
        Ok(RelationResolver::new(definition, self.service(host)?))
    }
}

/// Builder for a [`RelationSchema`]
///
/// # Example
///
/// ```rust,ignore
/// let schema = RelationSchemaBuilder::new()
///     .dto(DtoDescriptor::new("TodoItem").id_field())
///     .dto(DtoDescriptor::new("SubTask").id_field())
///     .relations("TodoItem", Relations::new().many("subTask", RelationDescriptor::new("SubTask")))
///     .service("TodoItem", Arc::new(todo_service))
///     .build()?;
/// ```
#[derive(Default)]
pub struct RelationSchemaBuilder {
    dtos: Vec<DtoDescriptor>,
    relations: IndexMap<String, Relations>,
    services: HashMap<String, Arc<dyn QueryService>>,
}

impl RelationSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a DTO object type
    pub fn dto(mut self, dto: DtoDescriptor) -> Self {
        self.dtos.push(dto);
        self
    }

    /// Query service answering for records of `dto`
    pub fn service(mut self, dto: impl Into<String>, service: Arc<dyn QueryService>) -> Self {
        self.services.insert(dto.into(), service);
        self
    }

    /// Relations of a host DTO, merged with any declared earlier
    pub fn relations(mut self, host: impl Into<String>, relations: Relations) -> Self {
        self.relations
            .entry(host.into())
            .or_default()
            .merge(relations);
        self
    }

    /// Every DTO and relation map of a configuration
    pub fn from_config(self, config: &RelationsConfig) -> Self {
        let builder = config
            .dtos
            .iter()
            .cloned()
            .fold(self, |builder, dto| builder.dto(dto));

        config.relations.keys().fold(builder, |builder, host| {
            let relations = config.relations_for(host);
            builder.relations(host.clone(), relations)
        })
    }

    pub fn build(self) -> Result<RelationSchema, RelationError> {
        let mut registrar = DynamicRegistrar::new();
        for dto in self.dtos {
            registrar.register_dto(dto);
        }

        let mut registry = ResolverRegistry {
            definitions: HashMap::new(),
            services: self.services,
        };

        for (host, relations) in &self.relations {
            let definition = RelationResolverFactory::build(host, relations, &mut registrar)?;
            tracing::debug!(
                host = %host,
                fields = definition.accessors.len(),
                "relation resolvers generated"
            );
            registry.definitions.insert(host.clone(), definition);
        }

        let query = root_query(&mut registrar, &registry)?;

        let dto_count = registrar.dto_names().count();
        let schema = registrar
            .into_types()
            .into_iter()
            .fold(Schema::build(QUERY_ROOT, None, None), |schema, ty| {
                schema.register(ty)
            })
            .register(query)
            .data(registry.clone())
            .finish()
            .map_err(|e| RelationError::Schema(e.to_string()))?;

        tracing::info!(dtos = dto_count, "relation schema built");

        Ok(RelationSchema {
            schema,
            registry: Arc::new(registry),
        })
    }
}

/// `Query` root: DTO type listing plus read fields per serviced DTO
fn root_query(
    registrar: &mut DynamicRegistrar,
    registry: &ResolverRegistry,
) -> Result<Object, RelationError> {
    let dto_names: Vec<String> = registrar.dto_names().map(str::to_string).collect();

    let names = dto_names.clone();
    let mut query = Object::new(QUERY_ROOT).field(
        Field::new("dtoTypes", TypeRef::named_nn_list_nn(TypeRef::STRING), move |_| {
            let names = names.clone();
            FieldFuture::new(async move {
                Ok(Some(FieldValue::list(
                    names.into_iter().map(|n| FieldValue::value(n)),
                )))
            })
        })
        .description("Names of every DTO type in the schema"),
    );

    for dto in dto_names.iter().filter(|d| registry.services.contains_key(*d)) {
        let args = registrar.query_args_type(dto)?;
        let connection = registrar.connection_type(dto)?;
        let single = lower_case_first(dto);
        let plural = Pluralizer::pluralize(&single);

        query = query
            .field(find_by_id_field(&single, dto))
            .field(
                query_field(&plural, dto, connection.type_name())
                    .argument(InputValue::new("filter", TypeRef::named(args.filter)))
                    .argument(InputValue::new("paging", TypeRef::named(args.paging)))
                    .argument(InputValue::new(
                        "sorting",
                        TypeRef::named_nn_list(args.sort),
                    )),
            );
    }

    Ok(query)
}

fn find_by_id_field(name: &str, dto: &str) -> Field {
    let dto_name = dto.to_string();
    Field::new(name, TypeRef::named(dto), move |ctx| {
        let dto_name = dto_name.clone();
        FieldFuture::new(async move {
            let id = ctx.args.try_get("id")?.string()?.to_string();
            let registry = ctx.data::<ResolverRegistry>()?;
            let service = registry.service(&dto_name).map_err(to_graphql_error)?;

            tracing::debug!(dto = %dto_name, id = %id, "finding record");
            let record = service
                .find_by_id(&id)
                .await
                .map_err(|e| to_graphql_error(RelationError::from(e)))?;

            types::to_field_value(record.unwrap_or(JsonValue::Null), PropertyKind::Composite)
        })
    })
    .argument(
        InputValue::new("id", TypeRef::named_nn(TypeRef::ID))
            .description(format!("ID of the {} to return.", dto)),
    )
}

fn query_field(name: &str, dto: &str, connection: &str) -> Field {
    let dto_name = dto.to_string();
    Field::new(name, TypeRef::named_nn(connection), move |ctx| {
        let dto_name = dto_name.clone();
        FieldFuture::new(async move {
            let connection = query_records(&ctx, &dto_name)
                .await
                .map_err(to_graphql_error)?;
            types::to_field_value(serde_json::to_value(connection)?, PropertyKind::Composite)
        })
    })
}

async fn query_records(
    ctx: &async_graphql::dynamic::ResolverContext<'_>,
    dto: &str,
) -> Result<Connection, RelationError> {
    let registry = ctx
        .data::<ResolverRegistry>()
        .map_err(|e| RelationError::Schema(e.message))?;
    let service = registry.service(dto)?;

    let mut arguments = arguments_json(ctx)?;
    arguments.retain(|_, value| !value.is_null());
    let query: RelationQuery = serde_json::from_value(JsonValue::Object(arguments))?;

    tracing::debug!(dto = %dto, "querying records");
    let records = service.query(&query).await.map_err(RelationError::from)?;
    Connection::paginate(records, &query.paging)
}

/// Executable relation schema
#[derive(Clone)]
pub struct RelationSchema {
    schema: Schema,
    registry: Arc<ResolverRegistry>,
}

impl RelationSchema {
    pub fn builder() -> RelationSchemaBuilder {
        RelationSchemaBuilder::new()
    }

    /// Underlying dynamic schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Schema in SDL form
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Execute a request as `auth`
    ///
    /// Returns the JSON response body: `data`, plus `errors` when any
    /// occurred.
    pub async fn execute(
        &self,
        query: &str,
        variables: Option<JsonValue>,
        auth: AuthContext,
    ) -> JsonValue {
        let mut request = Request::new(query).data(auth);
        if let Some(variables) = variables {
            request = request.variables(Variables::from_json(variables));
        }

        let response = self.schema.execute(request).await;
        let mut body = json!({
            "data": response.data.into_json().unwrap_or(JsonValue::Null),
        });

        if !response.errors.is_empty() {
            body["errors"] = response
                .errors
                .iter()
                .map(|error| {
                    serde_json::to_value(error)
                        .unwrap_or_else(|_| json!({ "message": error.message }))
                })
                .collect();
        }

        body
    }
}
