pub mod entity;
pub mod schemas;

use std::{
	collections::HashSet,
	ops::{Deref, DerefMut},
	sync::Arc,
};

use tokio::sync::{broadcast, Mutex, MutexGuard};
use uuid::Uuid;

use self::entity::MessageRecord;

/// Identity of one physical client connection. A client that reconnects gets
/// a fresh id; ids are never reused.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for ConnectionId {
	fn default() -> Self {
		Self::new()
	}
}

/// Fan-out handle over all currently connected clients. Cloned into the
/// pipeline so fan-out is an injected collaborator, not a process global.
#[derive(Clone)]
pub struct Broadcaster(pub(crate) broadcast::Sender<MessageRecord>);

impl Broadcaster {
	pub fn new(capacity: usize) -> Self {
		let (tx, _rx) = broadcast::channel(capacity);
		Self(tx)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<MessageRecord> {
		self.0.subscribe()
	}

	/// Best-effort delivery. An empty room is not an error; per-connection
	/// write failures are dealt with at the socket tasks.
	pub fn forward(
		&self,
		record: MessageRecord,
	) -> usize {
		self.0.send(record).unwrap_or(0)
	}
}

impl From<broadcast::Sender<MessageRecord>> for Broadcaster {
	fn from(value: broadcast::Sender<MessageRecord>) -> Self {
		Self(value)
	}
}

pub struct ChatState {
	pub connections: HashSet<ConnectionId>,
	pub broadcaster: Broadcaster,
}

impl Deref for ChatState {
	type Target = HashSet<ConnectionId>;
	fn deref(&self) -> &Self::Target {
		&self.connections
	}
}
impl DerefMut for ChatState {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.connections
	}
}

#[derive(Clone)]
pub struct ChatStateWrapper(pub Arc<Mutex<ChatState>>);
impl From<Arc<Mutex<ChatState>>> for ChatStateWrapper {
	fn from(value: Arc<Mutex<ChatState>>) -> Self {
		Self(value)
	}
}
impl From<ChatState> for ChatStateWrapper {
	fn from(value: ChatState) -> Self {
		Arc::new(Mutex::new(value)).into()
	}
}
impl ChatStateWrapper {
	pub async fn write(&self) -> MutexGuard<'_, ChatState> {
		self.0.lock().await
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[tokio::test]
	async fn test_connection_membership() {
		let state: ChatStateWrapper = ChatState {
			connections: Default::default(),
			broadcaster: Broadcaster::new(8),
		}
		.into();

		let first = ConnectionId::new();
		let second = ConnectionId::new();
		assert_ne!(first, second);

		state.write().await.insert(first);
		state.write().await.insert(second);
		assert_eq!(state.write().await.len(), 2);

		// Disconnect is terminal; the entry just goes away.
		state.write().await.remove(&first);
		assert_eq!(state.write().await.len(), 1);
		assert!(state.write().await.contains(&second));
	}

	#[test]
	fn test_forward_without_receivers_is_not_an_error() {
		let broadcaster = Broadcaster::new(8);
		let delivered = broadcaster.forward(entity::MessageRecord {
			id: Uuid::new_v4(),
			user: "alice".to_string(),
			message: "hello".to_string(),
			timestamp: chrono::Utc::now(),
			is_phishing: false,
			is_spam: false,
		});
		assert_eq!(delivered, 0);
	}
}
