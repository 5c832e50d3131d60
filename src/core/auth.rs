//! Authorization context and policies used by relation guards
//!
//! An [`AuthContext`] is attached to each GraphQL request by an
//! [`AuthProvider`]. [`AuthPolicy`] values act as guards on relation fields.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Authorization context extracted from a request
#[derive(Debug, Clone, Default)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: Uuid, roles: Vec<String> },

    /// Service-to-service communication
    Service { service_name: String },

    /// System administrator
    Admin { admin_id: Uuid },

    /// No authentication (public access)
    #[default]
    Anonymous,
}

impl AuthContext {
    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    /// Check if context represents a service
    pub fn is_service(&self) -> bool {
        matches!(self, AuthContext::Service { .. })
    }

    /// Get user_id if available
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::User { user_id, .. } => Some(*user_id),
            _ => None,
        }
    }
}

/// Authorization policy guarding a relation field
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any authenticated caller
    Authenticated,

    /// User must have one of these roles
    HasRole(Vec<String>),

    /// Service-to-service only
    ServiceOnly,

    /// Admin only
    AdminOnly,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),

    /// Custom policy function
    Custom(fn(&AuthContext) -> bool),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => !matches!(context, AuthContext::Anonymous),

            AuthPolicy::HasRole(required_roles) => match context {
                AuthContext::User { roles, .. } => required_roles.iter().any(|r| roles.contains(r)),
                AuthContext::Admin { .. } => true,
                _ => false,
            },

            AuthPolicy::ServiceOnly => context.is_service(),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),

            AuthPolicy::Custom(f) => f(context),
        }
    }

    /// Parse policy from string (for YAML config)
    pub fn parse_policy(s: &str) -> Self {
        match s {
            "public" => AuthPolicy::Public,
            "authenticated" => AuthPolicy::Authenticated,
            "service_only" => AuthPolicy::ServiceOnly,
            "admin_only" => AuthPolicy::AdminOnly,
            s if s.starts_with("role:") => {
                let roles = s["role:".len()..]
                    .split(',')
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect();
                AuthPolicy::HasRole(roles)
            }
            _ => AuthPolicy::Authenticated,
        }
    }
}

/// Extracts an [`AuthContext`] from incoming request headers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Default no-auth provider (for development)
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}

/// Reads identity headers set by a trusted gateway
///
/// - `x-user-id` + optional `x-roles` (comma separated) → `User`
/// - `x-service-name` → `Service`
/// - `x-admin-id` → `Admin`
/// - none of the above → `Anonymous`
pub struct HeaderAuthProvider;

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let header = |name: &str| -> Result<Option<String>> {
            headers
                .get(name)
                .map(|v| {
                    v.to_str()
                        .map(str::to_string)
                        .map_err(|e| anyhow!("Invalid {} header: {}", name, e))
                })
                .transpose()
        };

        if let Some(admin_id) = header("x-admin-id")? {
            return Ok(AuthContext::Admin {
                admin_id: Uuid::parse_str(&admin_id)?,
            });
        }

        if let Some(service_name) = header("x-service-name")? {
            return Ok(AuthContext::Service { service_name });
        }

        if let Some(user_id) = header("x-user-id")? {
            let roles = header("x-roles")?
                .map(|r| {
                    r.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            return Ok(AuthContext::User {
                user_id: Uuid::parse_str(&user_id)?,
                roles,
            });
        }

        Ok(AuthContext::Anonymous)
    }
}
