use crate::error::Result;
use async_trait::async_trait;
use pricefeed_core::PriceRecord;

/// Boundary abstraction over the message queue client.
///
/// The orchestrator only depends on this seam; the concrete transport is an
/// injected collaborator. Implementations must serialize the record so that
/// `metadata` is a string (never null) and `is_deleted` a native boolean.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes one normalized record, returning the queue message id.
    async fn publish(&self, record: &PriceRecord) -> Result<String>;
}
