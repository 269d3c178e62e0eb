use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::services::response::ServiceError;

/// Delay between reconnection attempts and liveness probes. Fixed, no backoff.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

const MESSAGES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS messages (
	id UUID PRIMARY KEY,
	user_name TEXT NOT NULL,
	message TEXT NOT NULL,
	timestamp TIMESTAMPTZ NOT NULL,
	is_phishing BOOLEAN NOT NULL,
	is_spam BOOLEAN NOT NULL,
	seq BIGSERIAL
)
"#;

struct StoreConnectionInner {
	url: String,
	pool: RwLock<Option<PgPool>>,
	ready: AtomicBool,
}

/// The store's one logical connection. Request handlers `acquire` it; a
/// supervisor task re-establishes it whenever it drops, so callers only ever
/// see `StoreUnavailable` in the window between a disconnect and the next
/// successful attempt.
#[derive(Clone)]
pub struct StoreConnection(Arc<StoreConnectionInner>);

impl StoreConnection {
	pub fn new(url: impl Into<String>) -> Self {
		Self(Arc::new(StoreConnectionInner {
			url: url.into(),
			pool: RwLock::new(None),
			ready: AtomicBool::new(false),
		}))
	}

	/// Initial connection attempt. Failure is logged, not propagated: the
	/// supervisor keeps retrying and the store stays unavailable until then.
	pub async fn establish(&self) {
		match self.try_connect().await {
			Ok(()) => tracing::info!("store connected"),
			Err(err) => tracing::error!("store connection failed, supervisor will retry: {err}"),
		}
	}

	pub fn is_ready(&self) -> bool {
		self.0.ready.load(Ordering::SeqCst)
	}

	pub async fn acquire(&self) -> Result<PgPool, ServiceError> {
		if !self.is_ready() {
			return Err(ServiceError::StoreUnavailable);
		}
		match self.0.pool.read().await.as_ref() {
			Some(pool) => Ok(pool.clone()),
			None => Err(ServiceError::StoreUnavailable),
		}
	}

	pub fn mark_disconnected(&self) {
		self.0.ready.store(false, Ordering::SeqCst);
	}

	/// Long-lived reconnect loop; runs until process shutdown. While the
	/// connection is up it only probes liveness, while it is down it retries
	/// indefinitely at a fixed cadence.
	pub fn spawn_supervisor(&self) -> JoinHandle<()> {
		let connection = self.clone();
		tokio::spawn(async move {
			loop {
				tokio::time::sleep(RECONNECT_DELAY).await;
				if connection.is_ready() {
					if connection.ping().await.is_err() {
						tracing::warn!("store disconnected, retrying");
						connection.mark_disconnected();
					}
					continue;
				}
				match connection.try_connect().await {
					Ok(()) => tracing::info!("store reconnected"),
					Err(err) => tracing::warn!("store reconnection failed: {err}"),
				}
			}
		})
	}

	async fn try_connect(&self) -> Result<(), sqlx::Error> {
		let pool = PgPoolOptions::new().max_connections(30).connect(&self.0.url).await?;
		sqlx::query(MESSAGES_SCHEMA).execute(&pool).await?;

		*self.0.pool.write().await = Some(pool);
		self.0.ready.store(true, Ordering::SeqCst);
		Ok(())
	}

	async fn ping(&self) -> Result<(), sqlx::Error> {
		let pool = match self.0.pool.read().await.as_ref() {
			Some(pool) => pool.clone(),
			None => return Err(sqlx::Error::PoolClosed),
		};
		sqlx::query("SELECT 1").execute(&pool).await.map(|_| ())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn test_acquire_fails_until_connected() {
		let connection = StoreConnection::new("postgres://nowhere/nothing");

		assert!(!connection.is_ready());
		assert!(matches!(connection.acquire().await, Err(ServiceError::StoreUnavailable)));
	}

	#[tokio::test]
	async fn test_mark_disconnected_blocks_acquire() {
		let connection = StoreConnection::new("postgres://nowhere/nothing");
		connection.0.ready.store(true, Ordering::SeqCst);

		connection.mark_disconnected();

		assert!(matches!(connection.acquire().await, Err(ServiceError::StoreUnavailable)));
	}
}
