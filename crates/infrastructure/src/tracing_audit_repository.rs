//! Audit sink for the in-memory configuration. Writes events to tracing output.

use async_trait::async_trait;
use huddle_application::{AuditEvent, AuditRepository};
use huddle_core::AppResult;
use tracing::info;

/// Audit repository that logs events instead of storing them.
#[derive(Clone, Default)]
pub struct TracingAuditRepository;

impl TracingAuditRepository {
    /// Creates a new tracing audit repository.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditRepository for TracingAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        info!(
            group_id = %event.group_id,
            subject = %event.subject,
            action = event.action.as_str(),
            resource_type = %event.resource_type,
            resource_id = %event.resource_id,
            detail = event.detail.as_deref().unwrap_or_default(),
            "audit event"
        );

        Ok(())
    }
}
