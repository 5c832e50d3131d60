//! Per-relation hooks: guards, pipes, interceptors and error filters
//!
//! Hooks are declared on a relation descriptor and handed unchanged to the
//! field registrar. The registrar runs them around each resolution:
//!
//! 1. guards decide whether the caller may read the field
//! 2. pipes rewrite each incoming argument
//! 3. the relation accessor runs
//! 4. interceptors rewrite the resolved value
//! 5. error filters rewrite any failure from steps 2-4

use anyhow::Result;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::auth::{AuthContext, AuthPolicy};
use super::error::RelationError;

/// Decides whether a relation field may be read
pub trait RelationGuard: Send + Sync {
    fn can_activate(&self, context: &AuthContext) -> bool;
}

impl RelationGuard for AuthPolicy {
    fn can_activate(&self, context: &AuthContext) -> bool {
        self.check(context)
    }
}

/// Rewrites one named field argument before resolution
pub trait ArgumentPipe: Send + Sync {
    fn transform(&self, argument: &str, value: Value) -> Result<Value>;
}

impl<F> ArgumentPipe for F
where
    F: Fn(&str, Value) -> Result<Value> + Send + Sync,
{
    fn transform(&self, argument: &str, value: Value) -> Result<Value> {
        self(argument, value)
    }
}

/// Rewrites the resolved value of a relation field
pub trait RelationInterceptor: Send + Sync {
    fn intercept(&self, field: &str, value: Value) -> Result<Value>;
}

/// Maps a resolution failure to the error returned to the client
pub trait ErrorFilter: Send + Sync {
    fn catch(&self, field: &str, error: RelationError) -> RelationError;
}

/// Hooks attached to one relation entry
///
/// Cloning shares the same hook instances.
#[derive(Clone, Default)]
pub struct RelationHooks {
    pub guards: Vec<Arc<dyn RelationGuard>>,
    pub interceptors: Vec<Arc<dyn RelationInterceptor>>,
    pub pipes: Vec<Arc<dyn ArgumentPipe>>,
    pub filters: Vec<Arc<dyn ErrorFilter>>,
}

impl fmt::Debug for RelationHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationHooks")
            .field("guards", &self.guards.len())
            .field("interceptors", &self.interceptors.len())
            .field("pipes", &self.pipes.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl RelationHooks {
    pub fn guard(mut self, guard: impl RelationGuard + 'static) -> Self {
        self.guards.push(Arc::new(guard));
        self
    }

    pub fn interceptor(mut self, interceptor: impl RelationInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn pipe(mut self, pipe: impl ArgumentPipe + 'static) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }

    pub fn filter(mut self, filter: impl ErrorFilter + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
            && self.interceptors.is_empty()
            && self.pipes.is_empty()
            && self.filters.is_empty()
    }

    /// Same hook instances, compared by identity
    pub fn ptr_eq(&self, other: &RelationHooks) -> bool {
        fn same<T: ?Sized>(a: &[Arc<T>], b: &[Arc<T>]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
        }
        same(&self.guards, &other.guards)
            && same(&self.interceptors, &other.interceptors)
            && same(&self.pipes, &other.pipes)
            && same(&self.filters, &other.filters)
    }

    /// Every guard must allow access
    pub fn check_guards(&self, field: &str, context: &AuthContext) -> Result<(), RelationError> {
        if self.guards.iter().all(|g| g.can_activate(context)) {
            Ok(())
        } else {
            tracing::warn!(field = %field, "relation guard denied access");
            Err(RelationError::Forbidden {
                field: field.to_string(),
            })
        }
    }

    /// Run every pipe over one argument, in declaration order
    pub fn apply_pipes(&self, argument: &str, value: Value) -> Result<Value, RelationError> {
        self.pipes
            .iter()
            .try_fold(value, |value, pipe| pipe.transform(argument, value))
            .map_err(|e| RelationError::InvalidArguments(e.to_string()))
    }

    /// Run every interceptor over the resolved value, in declaration order
    pub fn apply_interceptors(&self, field: &str, value: Value) -> Result<Value, RelationError> {
        self.interceptors
            .iter()
            .try_fold(value, |value, interceptor| interceptor.intercept(field, value))
            .map_err(RelationError::from)
    }

    /// Let every error filter rewrite a failure, in declaration order
    pub fn apply_filters(&self, field: &str, error: RelationError) -> RelationError {
        self.filters
            .iter()
            .fold(error, |error, filter| filter.catch(field, error))
    }
}
