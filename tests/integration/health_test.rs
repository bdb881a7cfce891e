use crate::common::test_server::TestServer;

#[tokio::test]
async fn test_health_reports_configs_and_store() {
    let server = TestServer::new().await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["configs"], "ok");
    assert_eq!(body["checks"]["environments"], 1);
    assert_eq!(body["checks"]["database"], "ok");
}

#[tokio::test]
async fn test_probes() {
    let server = TestServer::new().await;

    for (path, status) in [("/health/ready", "ready"), ("/health/live", "alive")] {
        let response = reqwest::get(server.url(path)).await.unwrap();
        assert_eq!(response.status(), 200, "{}", path);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], status, "{}", path);
    }
}
