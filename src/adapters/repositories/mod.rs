pub mod message_repository;

use async_trait::async_trait;

use crate::domain::chat::entity::{ChatMessage, MessageRecord};
use crate::services::response::ServiceError;

/// Durable message store surface. Everything fails `StoreUnavailable` while
/// the backing connection is down; the connection heals itself in the
/// background and calls start succeeding again without intervention.
#[async_trait]
pub trait TMessageRepository: Send + Sync {
	/// Persist one message, assigning its id and defaulting its timestamp.
	/// The returned record is the canonical form handed to receivers.
	async fn insert(
		&self,
		message: ChatMessage,
	) -> Result<MessageRecord, ServiceError>;

	/// Every record, ascending by timestamp, insertion order within a tie.
	async fn list(&self) -> Result<Vec<MessageRecord>, ServiceError>;

	/// Remove all records. Returns how many were removed.
	async fn clear(&self) -> Result<u64, ServiceError>;
}
