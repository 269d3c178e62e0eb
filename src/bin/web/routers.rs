use std::sync::Arc;

use axum::{
	extract::{State, WebSocketUpgrade},
	headers::{self, authorization::Bearer, Authorization},
	http::StatusCode,
	response::IntoResponse,
	routing::get,
	Json, Router, TypedHeader,
};
use serde_json::json;

use chat::{
	adapters::{classifier::ClassifierClient, repositories::message_repository::MessageRepository},
	domain::chat::ChatStateWrapper,
	services::{handlers::ChatHandler, history::HistoryService, pipeline::MessagePipeline},
};

#[derive(Clone)]
pub struct AppState {
	pub chat: ChatStateWrapper,
	pub pipeline: Arc<MessagePipeline<ClassifierClient, MessageRepository>>,
	pub history: Arc<HistoryService<MessageRepository>>,
}

async fn chat_websocket_route(
	ws: WebSocketUpgrade,
	current_user: Option<TypedHeader<headers::Authorization<Bearer>>>,
	State(state): State<AppState>,
) -> impl IntoResponse {
	// Session issuance lives with the auth collaborator; the token is only
	// good for log correlation here.
	if let Some(TypedHeader(Authorization::<Bearer>(value))) = current_user {
		tracing::debug!("client connecting with token `{}`", value.token());
	} else {
		tracing::info!("client connecting without a bearer token");
	}

	ws.on_upgrade(move |socket| ChatHandler::run_socket_broker(socket, state.chat, state.pipeline))
}

async fn list_messages_route(State(state): State<AppState>) -> impl IntoResponse {
	match state.history.list().await {
		Ok(records) => (StatusCode::OK, Json(json!(records))),
		Err(err) => {
			tracing::error!("history fetch failed: {err}");
			(StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Server error" })))
		}
	}
}

async fn clear_messages_route(State(state): State<AppState>) -> impl IntoResponse {
	match state.history.clear().await {
		Ok(removed) => {
			tracing::info!("chat history cleared, {removed} messages removed");
			(StatusCode::OK, Json(json!({ "message": "Chat cleared successfully" })))
		}
		Err(err) => {
			tracing::error!("history clear failed: {err}");
			(StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Server error" })))
		}
	}
}

pub fn chat_routers() -> Router<AppState> {
	Router::new()
		.route("/chat", get(chat_websocket_route))
		.route("/messages", get(list_messages_route).delete(clear_messages_route))
}
