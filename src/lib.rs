//! # dynform - Schema-driven dynamic forms
//!
//! dynform renders editable forms from a declarative, possibly nested field
//! schema and keeps their values in sync with an existing record and a
//! two-level configuration map (environment → market → connection details).
//!
//! ## Features
//!
//! - **Recursive schemas**: string, number, boolean, object and array fields
//! - **Dynamic lists**: add/remove items with stable identities
//! - **Cascading selection**: market options narrow by environment and seed
//!   the dependent connection fields
//! - **Submission routing**: create without a record id, update with one
//! - **Backend service**: configuration map and record store over HTTP
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynform::form::{FormDefinition, FormSession, ConfigurationMap};
//! use dynform::form::definition::default_primary_options;
//!
//! fn main() -> anyhow::Result<()> {
//!     let definition = FormDefinition::market_configuration(default_primary_options());
//!     let mut session = FormSession::open(definition)?;
//!     session.load_configuration(ConfigurationMap::new())?;
//!     let markets = session.select_environment("dev")?;
//!     println!("{} market(s), {} node(s)", markets.len(), session.render().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Form**: the engine (schema, state, lists, cascade, render, dispatch)
//! - **Domain**: records and the ports the engine talks to
//! - **Adapters**: HTTP handlers, clients and port implementations
//! - **Persistence**: SQL record storage
//! - **Config**: settings and configuration map loading

pub mod adapters;
pub mod cli;
pub mod config;
pub mod domain;
pub mod form;
pub mod persistence;

use crate::adapters::api_handler::{self, ApiState};
use crate::adapters::health_handler::HealthHandler;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Creates the Axum application router with all endpoints configured.
pub fn create_app(health_handler: Arc<HealthHandler>, api_state: ApiState) -> Router {
    let health_router = Router::new()
        .route("/health", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.health().await }
            }
        }))
        .route("/health/ready", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.ready().await }
            }
        }))
        .route("/health/live", get({
            let handler = health_handler.clone();
            move || {
                let h = handler.clone();
                async move { h.live().await }
            }
        }));

    let api_router = Router::new()
        .route("/configs", get(api_handler::get_configs))
        .route("/form", get(api_handler::get_form))
        .route("/records", axum::routing::post(api_handler::create_record))
        .route(
            "/records/:id",
            get(api_handler::get_record).put(api_handler::update_record),
        )
        .with_state(api_state);

    health_router.nest("/api", api_router).layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
