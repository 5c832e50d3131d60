//! [`FieldRegistrar`] over `async_graphql::dynamic`
//!
//! DTO objects are assembled last so relation fields can be appended to
//! their hosts in any order. Connection and query-argument types are
//! created once per DTO, however many relations point at it.

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{
    Field, FieldFuture, InputValue, ResolverContext, Scalar, Type, TypeRef,
};
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use std::sync::Arc;

use super::schema::ResolverRegistry;
use super::types::{self, PropertyKind};
use crate::core::{
    AuthContext, DtoDescriptor, FieldRegistrar, FieldRegistration, QueryArgsType, RelationError,
    RelationQuery, ReturnType, ScalarKind,
};

/// Convert a relation error into a GraphQL error carrying its code
pub fn to_graphql_error(error: RelationError) -> async_graphql::Error {
    let code = error.error_code();
    async_graphql::Error::new(error.to_string()).extend_with(|_, e| e.set("code", code))
}

/// Field arguments as one JSON object
pub fn arguments_json(ctx: &ResolverContext<'_>) -> Result<Map<String, JsonValue>, RelationError> {
    let mut arguments = Map::new();
    for (name, value) in ctx.args.iter() {
        arguments.insert(name.to_string(), value.as_value().clone().into_json()?);
    }
    Ok(arguments)
}

/// Collects dynamic types while relation resolvers are generated
#[derive(Default)]
pub struct DynamicRegistrar {
    dtos: IndexMap<String, DtoDescriptor>,
    relation_fields: IndexMap<String, Vec<Field>>,
    types: Vec<Type>,
    connections: HashSet<String>,
    query_args: HashSet<String>,
    comparisons: HashSet<ScalarKind>,
    shared_inputs: bool,
}

impl DynamicRegistrar {
    pub fn new() -> Self {
        let mut registrar = Self::default();
        registrar.types.push(types::page_info_object().into());
        registrar
    }

    /// Declare a DTO object type
    ///
    /// Declaring the same name twice replaces the earlier descriptor.
    pub fn register_dto(&mut self, dto: DtoDescriptor) {
        self.dtos.insert(dto.name.clone(), dto);
    }

    pub fn dto(&self, name: &str) -> Option<&DtoDescriptor> {
        self.dtos.get(name)
    }

    pub fn dto_names(&self) -> impl Iterator<Item = &str> {
        self.dtos.keys().map(String::as_str)
    }

    fn require_dto(&self, name: &str) -> Result<&DtoDescriptor, RelationError> {
        self.dtos
            .get(name)
            .ok_or_else(|| RelationError::UnknownDto(name.to_string()))
    }

    fn ensure_shared_inputs(&mut self) {
        if self.shared_inputs {
            return;
        }
        self.shared_inputs = true;
        self.types.push(types::cursor_paging_input().into());
        self.types.push(types::sort_direction_enum().into());
        self.types.push(types::sort_nulls_enum().into());
    }

    fn ensure_comparison(&mut self, kind: ScalarKind) {
        if types::filterable(kind) && self.comparisons.insert(kind) {
            self.types.push(types::comparison_input(kind).into());
        }
    }

    /// Every collected type, DTO objects included
    pub fn into_types(mut self) -> Vec<Type> {
        if self
            .dtos
            .values()
            .flat_map(|dto| dto.fields.iter())
            .any(|field| field.kind == ScalarKind::Json)
        {
            self.types.push(Scalar::new(types::JSON_SCALAR).into());
        }

        for (name, dto) in &self.dtos {
            let fields = self.relation_fields.shift_remove(name).unwrap_or_default();
            self.types.push(types::dto_object(dto, fields).into());
        }
        self.types
    }
}

impl FieldRegistrar for DynamicRegistrar {
    fn object_type(&mut self, dto: &str) -> Result<ReturnType, RelationError> {
        self.require_dto(dto)?;
        Ok(ReturnType::Object(dto.to_string()))
    }

    fn query_args_type(&mut self, dto: &str) -> Result<QueryArgsType, RelationError> {
        let descriptor = self.require_dto(dto)?.clone();
        let args = QueryArgsType::for_dto(dto);

        if self.query_args.insert(dto.to_string()) {
            self.ensure_shared_inputs();
            for field in &descriptor.fields {
                self.ensure_comparison(field.kind);
            }
            self.types
                .push(types::filter_input(&descriptor, &args.filter).into());
            self.types.push(types::sort_fields_enum(&descriptor).into());
            self.types
                .push(types::sort_input(&descriptor, &args.sort).into());
        }

        Ok(args)
    }

    fn connection_type(&mut self, dto: &str) -> Result<ReturnType, RelationError> {
        self.require_dto(dto)?;

        if self.connections.insert(dto.to_string()) {
            self.types.push(types::edge_object(dto).into());
            self.types.push(types::connection_object(dto).into());
        }

        Ok(ReturnType::Connection {
            connection: types::connection_name(dto),
            node: dto.to_string(),
        })
    }

    fn register_field(&mut self, registration: FieldRegistration) -> Result<(), RelationError> {
        self.require_dto(&registration.host)?;

        let host = registration.host.clone();
        let field = relation_field(registration);
        self.relation_fields.entry(host).or_default().push(field);
        Ok(())
    }
}

fn relation_field(registration: FieldRegistration) -> Field {
    let type_name = registration.return_type.type_name().to_string();
    let ty = if registration.nullable {
        TypeRef::named(type_name)
    } else {
        TypeRef::named_nn(type_name)
    };

    let name = registration.name.clone();
    let description = registration.description.clone();
    let args = registration.args.clone();
    let registration = Arc::new(registration);

    let mut field = Field::new(name, ty, move |ctx| {
        let registration = registration.clone();
        FieldFuture::new(async move {
            let value = resolve_relation(&ctx, &registration)
                .await
                .map_err(to_graphql_error)?;
            types::to_field_value(value, PropertyKind::Composite)
        })
    });

    if let Some(description) = description {
        field = field.description(description);
    }
    if let Some(args) = args {
        field = field
            .argument(InputValue::new("filter", TypeRef::named(args.filter)))
            .argument(InputValue::new("paging", TypeRef::named(args.paging)))
            .argument(InputValue::new("sorting", TypeRef::named_nn_list(args.sort)));
    }
    field
}

/// Guards, pipes, accessor and interceptors for one relation field
async fn resolve_relation(
    ctx: &ResolverContext<'_>,
    registration: &FieldRegistration,
) -> Result<JsonValue, RelationError> {
    let hooks = &registration.hooks;
    let field = registration.name.as_str();

    let auth = ctx.data_opt::<AuthContext>().cloned().unwrap_or_default();
    hooks.check_guards(field, &auth)?;

    let outcome: Result<JsonValue, RelationError> = async {
        let registry = ctx
            .data::<ResolverRegistry>()
            .map_err(|e| RelationError::Schema(e.message))?;
        let resolver = registry.resolver(&registration.host)?;

        let parent = ctx
            .parent_value
            .try_downcast_ref::<JsonValue>()
            .map_err(|e| RelationError::Schema(e.message))?;

        let mut arguments = Map::new();
        for (name, value) in arguments_json(ctx)? {
            let value = hooks.apply_pipes(&name, value)?;
            if !value.is_null() {
                arguments.insert(name, value);
            }
        }
        let query: RelationQuery = serde_json::from_value(JsonValue::Object(arguments))?;

        let output = resolver.resolve(field, parent, &query).await?;
        hooks.apply_interceptors(field, output.into_value()?)
    }
    .await;

    outcome.map_err(|error| hooks.apply_filters(field, error))
}
