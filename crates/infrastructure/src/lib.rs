//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_group_repository;
mod json_plugin_permission_registry;
mod postgres_audit_repository;
mod postgres_group_repository;
mod tracing_audit_repository;

pub use in_memory_group_repository::InMemoryGroupRepository;
pub use json_plugin_permission_registry::JsonPluginPermissionRegistry;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_group_repository::PostgresGroupRepository;
pub use tracing_audit_repository::TracingAuditRepository;
