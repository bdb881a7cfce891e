use clap::Parser;
use dynform::adapters::api_handler::ApiState;
use dynform::adapters::health_handler::HealthHandler;
use dynform::cli::{Cli, Command};
use dynform::config::Settings;
use dynform::domain::Record;
use dynform::form::schema::load_fields;
use dynform::form::{FormDefinition, FormSession};
use dynform::persistence::DataStore;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::new_with_cli(&cli)?;

    match cli.command() {
        Command::Serve => serve(settings).await,
        Command::Render { schema, record } => render(&settings, schema.as_deref(), record.as_deref()),
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    info!("Starting dynform on {}:{}", host, port);

    let configs = Arc::new(RwLock::new(settings.load_configuration_map()?));
    let store = DataStore::connect(&settings.persistence).await?;
    info!("Record store ready on {}", store.backend().name());

    let health_handler = Arc::new(HealthHandler::new(configs.clone(), Some(store.clone())));
    let api_state = ApiState {
        configs,
        definition: Arc::new(settings.form_definition()),
        records: store.records().clone(),
    };

    let app = dynform::create_app(health_handler, api_state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Print the render tree of a form, seeded from an optional record file.
fn render(settings: &Settings, schema: Option<&Path>, record: Option<&Path>) -> anyhow::Result<()> {
    let definition = match schema {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            let value: serde_json::Value = if matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("yaml" | "yml")
            ) {
                serde_yaml::from_str(&content)?
            } else {
                serde_json::from_str(&content)?
            };
            FormDefinition::from_fields(load_fields(&value)?)
        }
        None => settings.form_definition(),
    };

    let mut session = match record {
        Some(path) => {
            let data: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
            let record = match serde_json::from_value::<Record>(data.clone()) {
                Ok(record) => record,
                Err(_) => Record::new("local", data),
            };
            FormSession::open_with_record(definition, &record)?
        }
        None => FormSession::open(definition)?,
    };

    if session.definition().cascade.is_some() {
        session.load_configuration(settings.load_configuration_map()?)?;
    }

    println!("{}", serde_json::to_string_pretty(&session.render())?);
    Ok(())
}
