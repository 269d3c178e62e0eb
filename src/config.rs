use std::time::Duration;

use crate::services::response::ServiceError;

pub struct Config {
	/// Which errors we want to log
	pub log_level: String,

	/// Port server is listening to
	pub server_ip_port: String,
	pub database_url: String,
	pub classifier_url: String,
	pub classifier_timeout: Duration,
	pub allow_origins: String,
}

impl Config {
	pub fn new() -> Result<Config, ServiceError> {
		dotenv::dotenv().ok();
		let log_level = std::env::var("LOG_LEVEL").unwrap_or("warn".to_string());
		let server_ip_port = std::env::var("SERVER_IP_PORT").unwrap_or("0.0.0.0:5000".into());
		let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set!");
		let classifier_url = std::env::var("CLASSIFIER_URL").unwrap_or("http://127.0.0.1:8000".to_string());
		// The classifier may run model inference per message; a short timeout
		// would turn slow answers into false negatives.
		let classifier_timeout = Duration::from_secs(std::env::var("CLASSIFIER_TIMEOUT_SECS").ok().and_then(|secs| secs.parse().ok()).unwrap_or(15));
		let allow_origins = std::env::var("ALLOW_ORIGINS").unwrap_or("http://localhost:3000".to_string());

		Ok(Config {
			log_level,
			server_ip_port,
			database_url,
			classifier_url,
			classifier_timeout,
			allow_origins,
		})
	}
}
