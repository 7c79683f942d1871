mod common;

use serde_json::json;

#[tokio::test]
async fn test_events_follow_operations() {
    let (server, state, _clock) = common::create_test_server();

    server
        .post("/api/shorten")
        .json(&json!({ "urls": [{ "url": "https://example.com", "shortcode": "ev" }] }))
        .await
        .assert_status_ok();
    server.get("/ev").await;
    server.post("/api/links/ev/access").await;

    let response = server.get("/api/events").await;

    response.assert_status_ok();
    let events = response.json::<serde_json::Value>();
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 3);

    assert_eq!(events[0]["kind"], "CREATE");
    assert_eq!(events[0]["message"], "Created shortlink");
    assert_eq!(events[0]["metadata"]["url"], "https://example.com");
    assert_eq!(events[0]["metadata"]["short_id"], "ev");
    assert_eq!(
        events[0]["metadata"]["expires_at"],
        json!(state.registry.resolve("ev").unwrap().expires_at)
    );

    assert_eq!(events[1]["kind"], "ACCESS");
    assert_eq!(events[1]["message"], "Accessed shortlink");
    assert_eq!(events[2]["metadata"], json!({ "short_id": "ev" }));
}

#[tokio::test]
async fn test_events_rejected_batch_records_nothing() {
    let (server, _state, _clock) = common::create_test_server();

    server
        .post("/api/shorten")
        .json(&json!({ "urls": [{ "url": "" }] }))
        .await
        .assert_status_bad_request();

    let events = server.get("/api/events").await.json::<serde_json::Value>();
    assert_eq!(events, json!([]));
}

#[tokio::test]
async fn test_events_filter_and_limit() {
    let (server, state, _clock) = common::create_test_server();
    common::create_test_link(&state, "https://a.com", "a");
    common::create_test_link(&state, "https://b.com", "b");
    state.registry.record_access("a").unwrap();
    state.registry.record_access("b").unwrap();

    let creates = server
        .get("/api/events")
        .add_query_param("kind", "create")
        .await
        .json::<serde_json::Value>();
    assert_eq!(creates.as_array().unwrap().len(), 2);

    let newest = server
        .get("/api/events")
        .add_query_param("limit", "1")
        .await
        .json::<serde_json::Value>();
    assert_eq!(newest[0]["metadata"]["short_id"], "b");
    assert_eq!(newest[0]["kind"], "ACCESS");

    server
        .get("/api/events")
        .add_query_param("kind", "delete")
        .await
        .assert_status_bad_request();
}
