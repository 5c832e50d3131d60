//! Core module containing the relation model, resolver factory and services

pub mod auth;
pub mod connection;
pub mod dto;
pub mod error;
pub mod factory;
pub mod filter;
pub mod hooks;
pub mod pluralize;
pub mod query;
pub mod registrar;
pub mod relation;
pub mod resolver;
pub mod service;
pub mod validation;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, HeaderAuthProvider, NoAuthProvider};
pub use connection::{Connection, Edge, PageInfo};
pub use dto::{DtoDescriptor, DtoField, ScalarKind};
pub use error::RelationError;
pub use factory::RelationResolverFactory;
pub use hooks::{ArgumentPipe, ErrorFilter, RelationGuard, RelationHooks, RelationInterceptor};
pub use pluralize::Pluralizer;
pub use query::{CursorPaging, RelationQuery, SortDirection, SortField, SortNulls};
pub use registrar::{FieldRegistrar, FieldRegistration, QueryArgsType, ReturnType};
pub use relation::{RelationDescriptor, RelationKind, Relations};
pub use resolver::{RelationAccessor, RelationOutput, RelationResolver, ResolverDefinition};
pub use service::QueryService;
