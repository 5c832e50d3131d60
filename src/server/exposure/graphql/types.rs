//! `async_graphql::dynamic` building blocks for DTO, connection and
//! query-argument types
//!
//! Every object in the generated schema resolves its fields from a
//! `serde_json::Value` parent, so DTO records, connections, edges and page
//! info share one property resolver.
//!
//! See: https://relay.dev/graphql/connections.htm#sec-Connection-Types

use async_graphql::Value as GqlValue;
use async_graphql::dynamic::{
    Enum, Field, FieldFuture, FieldValue, InputObject, InputValue, Object, TypeRef,
};
use serde_json::Value as JsonValue;

use crate::core::{DtoDescriptor, ScalarKind};

pub const PAGE_INFO: &str = "PageInfo";
pub const CURSOR_PAGING: &str = "CursorPaging";
pub const SORT_DIRECTION: &str = "SortDirection";
pub const SORT_NULLS: &str = "SortNulls";
pub const JSON_SCALAR: &str = "JSON";

pub fn edge_name(dto: &str) -> String {
    format!("{}Edge", dto)
}

pub fn connection_name(dto: &str) -> String {
    format!("{}Connection", dto)
}

pub fn sort_fields_name(dto: &str) -> String {
    format!("{}SortFields", dto)
}

pub fn comparison_name(kind: ScalarKind) -> String {
    format!("{}FieldComparison", kind.graphql_name())
}

/// How a JSON property maps onto GraphQL output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Leaf value, returned as-is (scalars and the JSON scalar)
    Scalar,
    /// Object or list of objects resolved by nested fields
    Composite,
}

/// Convert a JSON property into a field value
pub fn to_field_value<'a>(
    value: JsonValue,
    kind: PropertyKind,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    match (value, kind) {
        (JsonValue::Null, _) => Ok(None),
        (JsonValue::Array(items), PropertyKind::Composite) => {
            Ok(Some(FieldValue::list(items.into_iter().map(|item| {
                if item.is_null() {
                    FieldValue::NULL
                } else {
                    FieldValue::owned_any(item)
                }
            }))))
        }
        (value @ JsonValue::Object(_), PropertyKind::Composite) => {
            Ok(Some(FieldValue::owned_any(value)))
        }
        (value, _) => Ok(Some(FieldValue::value(GqlValue::from_json(value)?))),
    }
}

/// Field reading `name` from a JSON parent
pub fn property_field(name: &str, ty: TypeRef, kind: PropertyKind) -> Field {
    let property = name.to_string();
    Field::new(name, ty, move |ctx| {
        let property = property.clone();
        FieldFuture::new(async move {
            let parent = ctx.parent_value.try_downcast_ref::<JsonValue>()?;
            let value = parent.get(&property).cloned().unwrap_or(JsonValue::Null);
            to_field_value(value, kind)
        })
    })
}

fn scalar_type_ref(kind: ScalarKind, nullable: bool) -> TypeRef {
    if nullable {
        TypeRef::named(kind.graphql_name())
    } else {
        TypeRef::named_nn(kind.graphql_name())
    }
}

/// Object type exposing the scalar fields of a DTO
///
/// Relation fields are appended by the registrar.
pub fn dto_object(dto: &DtoDescriptor, relation_fields: Vec<Field>) -> Object {
    let mut object = Object::new(&dto.name);
    if let Some(description) = &dto.description {
        object = object.description(description);
    }

    for field in &dto.fields {
        let mut gql_field = property_field(
            &field.name,
            scalar_type_ref(field.kind, field.nullable),
            PropertyKind::Scalar,
        );
        if let Some(description) = &field.description {
            gql_field = gql_field.description(description);
        }
        object = object.field(gql_field);
    }

    relation_fields
        .into_iter()
        .fold(object, |object, field| object.field(field))
}

/// See: https://relay.dev/graphql/connections.htm#sec-undefined.PageInfo
pub fn page_info_object() -> Object {
    Object::new(PAGE_INFO)
        .field(property_field(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            PropertyKind::Scalar,
        ))
        .field(property_field(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            PropertyKind::Scalar,
        ))
        .field(property_field(
            "startCursor",
            TypeRef::named(TypeRef::STRING),
            PropertyKind::Scalar,
        ))
        .field(property_field(
            "endCursor",
            TypeRef::named(TypeRef::STRING),
            PropertyKind::Scalar,
        ))
}

pub fn edge_object(dto: &str) -> Object {
    Object::new(edge_name(dto))
        .field(property_field(
            "cursor",
            TypeRef::named_nn(TypeRef::STRING),
            PropertyKind::Scalar,
        ))
        .field(property_field(
            "node",
            TypeRef::named_nn(dto),
            PropertyKind::Composite,
        ))
}

pub fn connection_object(dto: &str) -> Object {
    Object::new(connection_name(dto))
        .field(property_field(
            "edges",
            TypeRef::named_nn_list_nn(edge_name(dto)),
            PropertyKind::Composite,
        ))
        .field(property_field(
            "pageInfo",
            TypeRef::named_nn(PAGE_INFO),
            PropertyKind::Composite,
        ))
}

pub fn cursor_paging_input() -> InputObject {
    InputObject::new(CURSOR_PAGING)
        .field(
            InputValue::new("first", TypeRef::named(TypeRef::INT))
                .description("Paginate forward, returning the given amount of edges at most."),
        )
        .field(
            InputValue::new("after", TypeRef::named(TypeRef::STRING))
                .description("Return edges after the given cursor."),
        )
}

pub fn sort_direction_enum() -> Enum {
    Enum::new(SORT_DIRECTION).item("ASC").item("DESC")
}

pub fn sort_nulls_enum() -> Enum {
    Enum::new(SORT_NULLS).item("NULLS_FIRST").item("NULLS_LAST")
}

/// Comparison operators accepted for one scalar kind
pub fn comparison_input(kind: ScalarKind) -> InputObject {
    let scalar = kind.graphql_name();
    let mut input = InputObject::new(comparison_name(kind))
        .field(InputValue::new("is", TypeRef::named(TypeRef::BOOLEAN)))
        .field(InputValue::new("isNot", TypeRef::named(TypeRef::BOOLEAN)))
        .field(InputValue::new("eq", TypeRef::named(scalar)))
        .field(InputValue::new("neq", TypeRef::named(scalar)));

    if kind == ScalarKind::Boolean {
        return input;
    }

    for op in ["gt", "gte", "lt", "lte"] {
        input = input.field(InputValue::new(op, TypeRef::named(scalar)));
    }
    for op in ["in", "notIn"] {
        input = input.field(InputValue::new(op, TypeRef::named_nn_list(scalar)));
    }
    if matches!(kind, ScalarKind::String | ScalarKind::Id) {
        for op in ["like", "notLike", "iLike", "notILike"] {
            input = input.field(InputValue::new(op, TypeRef::named(TypeRef::STRING)));
        }
    }
    input
}

/// Scalar kinds that get a comparison input type
pub fn filterable(kind: ScalarKind) -> bool {
    kind != ScalarKind::Json
}

/// `<Dto>Filter` input with `and` / `or` and one comparison per field
pub fn filter_input(dto: &DtoDescriptor, filter_name: &str) -> InputObject {
    let mut input = InputObject::new(filter_name)
        .field(InputValue::new("and", TypeRef::named_nn_list(filter_name)))
        .field(InputValue::new("or", TypeRef::named_nn_list(filter_name)));

    for field in dto.fields.iter().filter(|f| filterable(f.kind)) {
        input = input.field(InputValue::new(
            &field.name,
            TypeRef::named(comparison_name(field.kind)),
        ));
    }
    input
}

/// `<Dto>SortFields` enum over the sortable fields of a DTO
pub fn sort_fields_enum(dto: &DtoDescriptor) -> Enum {
    dto.fields
        .iter()
        .filter(|f| filterable(f.kind))
        .fold(Enum::new(sort_fields_name(&dto.name)), |e, field| {
            e.item(field.name.as_str())
        })
}

pub fn sort_input(dto: &DtoDescriptor, sort_name: &str) -> InputObject {
    InputObject::new(sort_name)
        .field(InputValue::new(
            "field",
            TypeRef::named_nn(sort_fields_name(&dto.name)),
        ))
        .field(InputValue::new("direction", TypeRef::named_nn(SORT_DIRECTION)))
        .field(InputValue::new("nulls", TypeRef::named(SORT_NULLS)))
}
