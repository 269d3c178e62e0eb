use serde_json::Value;

use crate::services::response::ServiceError;

/// Raw `sendMessage` payload. Kept as loose JSON on purpose: senders are not
/// validated here, their payload is only read.
#[derive(Debug, Clone)]
pub struct IncomingEnvelope(Value);

impl IncomingEnvelope {
	pub fn user(&self) -> String {
		match self.0.get("user") {
			Some(Value::String(user)) if !user.is_empty() => user.clone(),
			_ => "anonymous".to_string(),
		}
	}

	/// Body handed to the classifier and persisted: the `message` field when
	/// it is a usable string, then `text`, then the serialized payload itself.
	pub fn body(&self) -> String {
		match (self.0.get("message"), self.0.get("text")) {
			(Some(Value::String(message)), _) => message.clone(),
			(_, Some(Value::String(text))) => text.clone(),
			_ => self.0.to_string(),
		}
	}
}

impl From<Value> for IncomingEnvelope {
	fn from(value: Value) -> Self {
		Self(value)
	}
}

impl TryFrom<axum::extract::ws::Message> for IncomingEnvelope {
	type Error = ServiceError;
	fn try_from(value: axum::extract::ws::Message) -> Result<Self, Self::Error> {
		match value {
			axum::extract::ws::Message::Text(string_value) => {
				serde_json::from_str::<Value>(&string_value).map(IncomingEnvelope).map_err(|_err| ServiceError::ParsingError)
			}

			axum::extract::ws::Message::Close(_close_frame) => Err(ServiceError::UserCloseConnection),
			_ => Err(ServiceError::BadRequest),
		}
	}
}

#[cfg(test)]
mod test {
	use serde_json::json;

	use super::*;

	#[test]
	fn test_body_prefers_message_over_text() {
		let envelope = IncomingEnvelope::from(json!({"user": "alice", "message": "hello", "text": "ignored"}));
		assert_eq!(envelope.body(), "hello");

		let envelope = IncomingEnvelope::from(json!({"user": "alice", "text": "fallback"}));
		assert_eq!(envelope.body(), "fallback");
	}

	#[test]
	fn test_body_serializes_unusable_payload() {
		let envelope = IncomingEnvelope::from(json!({"user": "alice", "message": 42}));
		assert_eq!(envelope.body(), r#"{"message":42,"user":"alice"}"#);
	}

	#[test]
	fn test_missing_user_becomes_anonymous() {
		let envelope = IncomingEnvelope::from(json!({"message": "hello"}));
		assert_eq!(envelope.user(), "anonymous");

		let envelope = IncomingEnvelope::from(json!({"user": 7, "message": "hello"}));
		assert_eq!(envelope.user(), "anonymous");
	}

	#[test]
	fn test_ws_frame_conversion() {
		let frame = axum::extract::ws::Message::Text(r#"{"user":"bob","message":"hi"}"#.to_string());
		let envelope = IncomingEnvelope::try_from(frame).unwrap();
		assert_eq!(envelope.user(), "bob");

		let garbage = axum::extract::ws::Message::Text("not json".to_string());
		assert!(matches!(IncomingEnvelope::try_from(garbage), Err(ServiceError::ParsingError)));

		let close = axum::extract::ws::Message::Close(None);
		assert!(matches!(IncomingEnvelope::try_from(close), Err(ServiceError::UserCloseConnection)));
	}
}
