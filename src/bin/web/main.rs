pub mod routers;

use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
	http::{HeaderValue, Method},
	Router,
};

use chat::{
	adapters::{classifier::ClassifierClient, repositories::message_repository::MessageRepository},
	database::StoreConnection,
	dependencies::config,
	domain::chat::{Broadcaster, ChatState, ChatStateWrapper},
	services::{history::HistoryService, pipeline::MessagePipeline},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::routers::AppState;

#[tokio::main]
async fn main() {
	println!("Environment Variable Is Being Set...");
	dotenv::dotenv().ok();

	// ! Tracing
	tracing_subscriber::registry()
		.with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			// axum logs rejections from built-in extractors with the `axum::rejection`
			// target, at `TRACE` level. `axum::rejection=trace` enables showing those events
			"tracing=debug,tower_http=debug,axum::rejection=trace".into()
		}))
		.with(tracing_subscriber::fmt::layer())
		.init();

	// ! Connection
	println!("Store Connection Is Being Established...");
	let store = StoreConnection::new(&config().database_url);
	store.establish().await;
	let _supervisor = store.spawn_supervisor();

	let repository = MessageRepository::new(store);
	let classifier = ClassifierClient::new(&config().classifier_url, config().classifier_timeout);
	let broadcaster = Broadcaster::new(100);

	let chat_state: ChatStateWrapper = ChatState {
		connections: Default::default(),
		broadcaster: broadcaster.clone(),
	}
	.into();

	let state = AppState {
		chat: chat_state,
		pipeline: Arc::new(MessagePipeline::new(classifier, repository.clone(), broadcaster)),
		history: Arc::new(HistoryService::new(repository)),
	};

	let app = Router::new()
		.merge(routers::chat_routers())
		.with_state(state)
		.layer(
			CorsLayer::new()
				.allow_origin(config().allow_origins.parse::<HeaderValue>().unwrap())
				.allow_methods([Method::GET, Method::POST, Method::DELETE]),
		)
		.layer(TraceLayer::new_for_http());

	println!("Start Web Server...");
	axum::Server::bind(&SocketAddr::from_str(&config().server_ip_port).unwrap())
		.serve(app.into_make_service())
		.await
		.unwrap();
}
