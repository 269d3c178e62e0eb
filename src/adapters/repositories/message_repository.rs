use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::StoreConnection;
use crate::domain::chat::entity::{ChatMessage, MessageRecord};
use crate::services::response::ServiceError;

use super::TMessageRepository;

#[derive(Clone)]
pub struct MessageRepository {
	connection: StoreConnection,
}

impl MessageRepository {
	pub fn new(connection: StoreConnection) -> Self {
		Self { connection }
	}

	fn map_error(
		&self,
		err: sqlx::Error,
	) -> ServiceError {
		if is_disconnect(&err) {
			// Flag the outage so the supervisor starts reconnecting.
			self.connection.mark_disconnected();
			ServiceError::StoreUnavailable
		} else {
			ServiceError::DatabaseError(Box::new(err))
		}
	}
}

fn is_disconnect(err: &sqlx::Error) -> bool {
	matches!(
		err,
		sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Protocol(_) | sqlx::Error::Tls(_)
	)
}

#[async_trait]
impl TMessageRepository for MessageRepository {
	async fn insert(
		&self,
		message: ChatMessage,
	) -> Result<MessageRecord, ServiceError> {
		let pool = self.connection.acquire().await?;
		let record = sqlx::query_as::<_, MessageRecord>(
			r#"INSERT INTO messages (id, user_name, message, timestamp, is_phishing, is_spam)
			VALUES ($1, $2, $3, $4, $5, $6)
			RETURNING id, user_name, message, timestamp, is_phishing, is_spam"#,
		)
		.bind(Uuid::new_v4())
		.bind(&message.user)
		.bind(&message.message)
		.bind(message.timestamp.unwrap_or_else(Utc::now))
		.bind(message.is_phishing)
		.bind(message.is_spam)
		.fetch_one(&pool)
		.await
		.map_err(|err| self.map_error(err))?;

		Ok(record)
	}

	async fn list(&self) -> Result<Vec<MessageRecord>, ServiceError> {
		let pool = self.connection.acquire().await?;
		// seq breaks timestamp ties in insertion order.
		sqlx::query_as::<_, MessageRecord>(
			"SELECT id, user_name, message, timestamp, is_phishing, is_spam FROM messages ORDER BY timestamp ASC, seq ASC",
		)
		.fetch_all(&pool)
		.await
		.map_err(|err| self.map_error(err))
	}

	async fn clear(&self) -> Result<u64, ServiceError> {
		let pool = self.connection.acquire().await?;
		let result = sqlx::query("DELETE FROM messages").execute(&pool).await.map_err(|err| self.map_error(err))?;

		Ok(result.rows_affected())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_disconnect_classification() {
		assert!(is_disconnect(&sqlx::Error::PoolClosed));
		assert!(is_disconnect(&sqlx::Error::PoolTimedOut));
		assert!(is_disconnect(&sqlx::Error::Io(std::io::Error::new(
			std::io::ErrorKind::ConnectionReset,
			"reset"
		))));
		assert!(!is_disconnect(&sqlx::Error::RowNotFound));
	}

	#[tokio::test]
	async fn test_operations_fail_while_disconnected() {
		let repository = MessageRepository::new(StoreConnection::new("postgres://nowhere/nothing"));

		assert!(matches!(repository.insert(ChatMessage::default()).await, Err(ServiceError::StoreUnavailable)));
		assert!(matches!(repository.list().await, Err(ServiceError::StoreUnavailable)));
		assert!(matches!(repository.clear().await, Err(ServiceError::StoreUnavailable)));
	}
}
