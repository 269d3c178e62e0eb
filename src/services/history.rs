use crate::adapters::repositories::TMessageRepository;
use crate::domain::chat::entity::MessageRecord;
use crate::services::response::ServiceError;

/// Read/delete surface over the message store, consumed by the UI for initial
/// state hydration and the clear-history control.
pub struct HistoryService<R> {
	repository: R,
}

impl<R> HistoryService<R>
where
	R: TMessageRepository,
{
	pub fn new(repository: R) -> Self {
		Self { repository }
	}

	pub async fn list(&self) -> Result<Vec<MessageRecord>, ServiceError> {
		self.repository.list().await
	}

	/// Unconditional wipe. Confirming intent is the caller's job.
	pub async fn clear(&self) -> Result<u64, ServiceError> {
		self.repository.clear().await
	}
}
