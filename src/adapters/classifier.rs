use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

/// Outcome of screening one message. The default is the fail-open verdict:
/// delivered, unflagged.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Verdict {
	pub is_phishing: bool,
	pub is_spam: bool,
}

#[async_trait]
pub trait TClassify: Send + Sync {
	async fn classify(
		&self,
		text: &str,
	) -> Verdict;
}

/// Client for the external prediction endpoint. One request per message,
/// bounded by the configured timeout, never retried.
pub struct ClassifierClient {
	http: reqwest::Client,
	endpoint: String,
	timeout: Duration,
}

impl ClassifierClient {
	pub fn new(
		base_url: &str,
		timeout: Duration,
	) -> Self {
		Self {
			http: reqwest::Client::new(),
			endpoint: format!("{}/predict", base_url.trim_end_matches('/')),
			timeout,
		}
	}

	async fn request(
		&self,
		text: &str,
	) -> Result<Verdict, reqwest::Error> {
		let body = self
			.http
			.post(&self.endpoint)
			.timeout(self.timeout)
			.json(&json!({ "message": text }))
			.send()
			.await?
			.error_for_status()?
			.json::<Value>()
			.await?;

		Ok(Verdict {
			is_phishing: loose_flag(body.get("is_phising")),
			is_spam: loose_flag(body.get("is_spam")),
		})
	}
}

#[async_trait]
impl TClassify for ClassifierClient {
	/// Never raises: a broken classifier must not hold up chat delivery, so
	/// timeouts, transport errors, non-success statuses and unparsable bodies
	/// all resolve to the unflagged verdict.
	async fn classify(
		&self,
		text: &str,
	) -> Verdict {
		match self.request(text).await {
			Ok(verdict) => verdict,
			Err(err) => {
				tracing::warn!("classifier unavailable, delivering unflagged: {err}");
				Verdict::default()
			}
		}
	}
}

/// The service answers with booleans or the strings "true"/"false"; `true`
/// and "true" count as flagged, anything else (absence included) does not.
/// `is_phising` is the service's wire spelling.
fn loose_flag(value: Option<&Value>) -> bool {
	match value {
		Some(Value::Bool(flag)) => *flag,
		Some(Value::String(flag)) => flag == "true",
		_ => false,
	}
}

#[cfg(test)]
mod test {
	use std::net::SocketAddr;
	use std::time::Instant;

	use axum::{http::StatusCode, routing::post, Json, Router};
	use serde_json::json;

	use super::*;

	fn spawn_prediction_service(app: Router) -> SocketAddr {
		let server = axum::Server::bind(&"127.0.0.1:0".parse().unwrap()).serve(app.into_make_service());
		let addr = server.local_addr();
		tokio::spawn(server);
		addr
	}

	fn client_for(
		addr: SocketAddr,
		timeout: Duration,
	) -> ClassifierClient {
		ClassifierClient::new(&format!("http://{addr}"), timeout)
	}

	#[test]
	fn test_loose_flag_coercion() {
		assert!(loose_flag(Some(&json!(true))));
		assert!(loose_flag(Some(&json!("true"))));
		assert!(!loose_flag(Some(&json!(false))));
		assert!(!loose_flag(Some(&json!("false"))));
		assert!(!loose_flag(Some(&json!("TRUE"))));
		assert!(!loose_flag(Some(&json!(1))));
		assert!(!loose_flag(None));
	}

	#[tokio::test]
	async fn test_string_true_counts_as_flagged() {
		let app = Router::new().route(
			"/predict",
			post(|| async { Json(json!({"is_phising": "true", "is_spam": "false"})) }),
		);
		let client = client_for(spawn_prediction_service(app), Duration::from_secs(1));

		let verdict = client.classify("click here to verify your bank").await;

		assert_eq!(
			verdict,
			Verdict {
				is_phishing: true,
				is_spam: false
			}
		);
	}

	#[tokio::test]
	async fn test_missing_fields_are_unflagged() {
		let app = Router::new().route("/predict", post(|| async { Json(json!({})) }));
		let client = client_for(spawn_prediction_service(app), Duration::from_secs(1));

		assert_eq!(client.classify("hello").await, Verdict::default());
	}

	#[tokio::test]
	async fn test_non_success_status_fails_open() {
		let app = Router::new().route("/predict", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
		let client = client_for(spawn_prediction_service(app), Duration::from_secs(1));

		assert_eq!(client.classify("hello").await, Verdict::default());
	}

	#[tokio::test]
	async fn test_unparsable_body_fails_open() {
		let app = Router::new().route("/predict", post(|| async { "certainly not json" }));
		let client = client_for(spawn_prediction_service(app), Duration::from_secs(1));

		assert_eq!(client.classify("hello").await, Verdict::default());
	}

	#[tokio::test]
	async fn test_timeout_fails_open_within_bound() {
		let app = Router::new().route(
			"/predict",
			post(|| async {
				tokio::time::sleep(Duration::from_secs(5)).await;
				Json(json!({"is_phising": true, "is_spam": true}))
			}),
		);
		let client = client_for(spawn_prediction_service(app), Duration::from_millis(200));

		let started = Instant::now();
		let verdict = client.classify("hello").await;

		assert_eq!(verdict, Verdict::default());
		assert!(started.elapsed() < Duration::from_secs(2));
	}

	#[tokio::test]
	async fn test_unreachable_endpoint_fails_open() {
		let client = ClassifierClient::new("http://127.0.0.1:9", Duration::from_millis(500));

		assert_eq!(client.classify("hello").await, Verdict::default());
	}
}
