use crate::adapters::classifier::TClassify;
use crate::adapters::repositories::TMessageRepository;
use crate::domain::chat::{entity::ChatMessage, schemas::IncomingEnvelope, Broadcaster};
use crate::services::response::ServiceError;

/// Per-message workflow: classify, persist, fan out. Owns its collaborators;
/// the broadcaster is an injected instance so independent pipelines (and
/// tests) can coexist in one process.
pub struct MessagePipeline<C, R> {
	classifier: C,
	repository: R,
	broadcaster: Broadcaster,
}

impl<C, R> MessagePipeline<C, R>
where
	C: TClassify,
	R: TMessageRepository,
{
	pub fn new(
		classifier: C,
		repository: R,
		broadcaster: Broadcaster,
	) -> Self {
		Self {
			classifier,
			repository,
			broadcaster,
		}
	}

	/// Handles one inbound send event, at most once. Classification never
	/// fails (a dead classifier means an unflagged message); persistence can,
	/// and a message that was not durably recorded is never broadcast, so
	/// everything receivers see is findable in history afterwards.
	pub async fn handle_incoming(
		&self,
		envelope: IncomingEnvelope,
	) -> Result<(), ServiceError> {
		let body = envelope.body();
		let verdict = self.classifier.classify(&body).await;

		let message = ChatMessage {
			user: envelope.user(),
			message: body,
			timestamp: None,
			is_phishing: verdict.is_phishing,
			is_spam: verdict.is_spam,
		};

		match self.repository.insert(message).await {
			Ok(record) => {
				self.broadcaster.forward(record);
				Ok(())
			}
			Err(err) => {
				tracing::error!("message dropped, could not be persisted: {err}");
				Err(err)
			}
		}
	}
}
