use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};

use futures::{
	stream::{SplitSink, SplitStream},
	SinkExt, StreamExt,
};

use tokio::{
	sync::broadcast::{self},
	task::JoinHandle,
};

use crate::{
	adapters::{classifier::TClassify, repositories::TMessageRepository},
	domain::chat::{entity::MessageRecord, schemas::IncomingEnvelope, ChatStateWrapper, ConnectionId},
	services::{pipeline::MessagePipeline, response::ServiceError},
};

pub struct ChatHandler;
impl ChatHandler {
	/// This function deals with a single websocket connection, i.e., a single
	/// connected client / user, for which we will spawn two independent tasks (for
	/// receiving / sending chat messages).
	pub async fn run_socket_broker<C, R>(
		stream: WebSocket,
		state: ChatStateWrapper,
		pipeline: Arc<MessagePipeline<C, R>>,
	) where
		C: TClassify + 'static,
		R: TMessageRepository + 'static,
	{
		let (sender, receiver) = stream.split();

		let connection_id = ConnectionId::new();
		let subscription = {
			let mut guard = state.write().await;
			guard.insert(connection_id);
			guard.broadcaster.subscribe()
		};
		tracing::info!("client {connection_id:?} connected");

		let mut send_task = ChatHandler::_send_records_to_this_client(subscription, sender);

		let mut recv_task = ChatHandler::_receive_messages_from_this_client(receiver, pipeline);

		// Waits on multiple concurrent branches, returning when the first branch completes,
		// cancelling the remaining branches.
		tokio::select! {
			_ = (&mut send_task) => recv_task.abort(),
			_ = (&mut recv_task) => send_task.abort(),
		};

		state.write().await.remove(&connection_id);
		tracing::info!("client {connection_id:?} disconnected");
	}

	/// Fan-out half. A failed write means this client's socket is gone; only
	/// this task ends, everyone else keeps receiving.
	fn _send_records_to_this_client(
		mut subscription: broadcast::Receiver<MessageRecord>,
		mut sender: SplitSink<WebSocket, Message>,
	) -> JoinHandle<()> {
		tokio::spawn(async move {
			while let Ok(record) = subscription.recv().await {
				let Ok(payload) = serde_json::to_string(&record) else {
					continue;
				};
				if sender.send(Message::Text(payload)).await.is_err() {
					break;
				}
			}
		})
	}

	/// Inbound half. Frames run through the pipeline one at a time, so one
	/// client's messages keep their send order; a failed pipeline run is
	/// already logged there and must not end the connection.
	fn _receive_messages_from_this_client<C, R>(
		mut receiver: SplitStream<WebSocket>,
		pipeline: Arc<MessagePipeline<C, R>>,
	) -> JoinHandle<()>
	where
		C: TClassify + 'static,
		R: TMessageRepository + 'static,
	{
		tokio::spawn(async move {
			while let Some(Ok(message)) = receiver.next().await {
				match IncomingEnvelope::try_from(message) {
					Ok(envelope) => {
						let _ = pipeline.handle_incoming(envelope).await;
					}
					Err(ServiceError::UserCloseConnection) => break,
					Err(ServiceError::ParsingError) => {
						tracing::warn!("dropping malformed chat frame");
					}
					Err(_) => {}
				}
			}
		})
	}
}
