use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message accepted from a client with its threat flags already resolved,
/// not yet persisted. `timestamp` stays `None` unless the caller supplied one;
/// the store fills it at insert time.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct ChatMessage {
	pub user: String,
	pub message: String,
	pub timestamp: Option<DateTime<Utc>>,
	pub is_phishing: bool,
	pub is_spam: bool,
}

/// Canonical persisted record. Only this form is ever fanned out to clients.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageRecord {
	pub id: Uuid,
	#[sqlx(rename = "user_name")]
	pub user: String,
	pub message: String,
	pub timestamp: DateTime<Utc>,
	pub is_phishing: bool,
	pub is_spam: bool,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_record_wire_layout() {
		let record = MessageRecord {
			id: Uuid::new_v4(),
			user: "alice".to_string(),
			message: "hello".to_string(),
			timestamp: Utc::now(),
			is_phishing: false,
			is_spam: false,
		};

		let wire = serde_json::to_value(&record).unwrap();
		let object = wire.as_object().unwrap();
		for key in ["id", "user", "message", "timestamp", "is_phishing", "is_spam"] {
			assert!(object.contains_key(key), "missing wire field {key}");
		}
		assert_eq!(object.len(), 6);
		assert_eq!(object["user"], "alice");
	}
}
