pub mod api_handler;
pub mod config_source;
pub mod health_handler;
pub mod memory_store;
pub mod notifier;
pub mod record_client;
