//! A form session driven entirely through the HTTP clients

use std::sync::Arc;

use dynform::adapters::config_source::HttpConfigSource;
use dynform::adapters::notifier::TracingNotifier;
use dynform::adapters::record_client::HttpRecordStore;
use dynform::domain::RecordStore;
use dynform::form::definition::{default_primary_options, FormDefinition};
use dynform::form::{FormSession, PropertyPath, SharedForm, SubmissionDispatcher, SubmitOutcome};
use serde_json::json;

use crate::common::test_server::TestServer;

#[tokio::test]
async fn test_create_then_update_over_http() {
    let server = TestServer::new().await;
    let definition = FormDefinition::market_configuration(default_primary_options());
    let store = Arc::new(HttpRecordStore::new(&server.base_url));
    let dispatcher = SubmissionDispatcher::with_store(store.clone(), Arc::new(TracingNotifier));

    let form = SharedForm::new(FormSession::open(definition).unwrap());
    form.load_configuration(&HttpConfigSource::new(&server.base_url))
        .await
        .unwrap();

    form.write(|s| -> Result<(), dynform::form::FormError> {
        s.set_value(&PropertyPath::parse("name"), json!("billing"))?;
        s.set_value(&PropertyPath::parse("description"), json!("Billing service"))?;
        s.select_environment("dev")?;
        s.select_market("eu")?;
        Ok(())
    })
    .await
    .unwrap();

    let created = match form.submit(&dispatcher).await.unwrap() {
        SubmitOutcome::Success(record) => record,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(created.data["appIds"], json!(["a", "b"]));
    assert_eq!(server.store.records().count().await.unwrap(), 1);

    // The second submit updates the record created by the first
    form.write(|s| s.set_value(&PropertyPath::parse("hostUrl"), json!("h1-new")))
        .await
        .unwrap();
    let updated = form.submit(&dispatcher).await.unwrap();
    assert!(updated.is_success());
    assert_eq!(server.store.records().count().await.unwrap(), 1);

    let stored = store.get(&created.id).await.unwrap().unwrap();
    assert_eq!(stored.data["hostUrl"], "h1-new");
    assert_eq!(stored.data["environment"], "dev");
}

#[tokio::test]
async fn test_reopen_stored_record() {
    let server = TestServer::new().await;
    let store = HttpRecordStore::new(&server.base_url);
    let record = store
        .create(json!({
            "name": "billing",
            "description": "Billing service",
            "environment": "dev",
            "market": "eu",
            "hostUrl": "custom",
            "tokenUrl": "t1",
            "appIds": ["z"]
        }))
        .await
        .unwrap();

    let fetched = store.get(&record.id).await.unwrap().unwrap();
    let form = SharedForm::new(
        FormSession::open_with_record(
            FormDefinition::market_configuration(default_primary_options()),
            &fetched,
        )
        .unwrap(),
    );
    form.load_configuration(&HttpConfigSource::new(&server.base_url))
        .await
        .unwrap();

    let document = form.read(|s| s.document()).await;
    assert_eq!(document["hostUrl"], "custom");
    assert_eq!(document["appIds"], json!(["z"]));
    assert_eq!(form.read(|s| s.record_id().map(String::from)).await, Some(record.id));
}

#[tokio::test]
async fn test_missing_record_is_none() {
    let server = TestServer::new().await;
    let store = HttpRecordStore::new(&server.base_url);
    assert!(store.get("does-not-exist").await.unwrap().is_none());
    assert!(store.update("does-not-exist", json!({})).await.is_err());
}
