// HTTP client tests against a mock server.

use hange_config::OpenAiConfig;
use hange_openai::{OpenAiClient, OpenAiError, ResponseRequest, VectorStoreStatus};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OpenAiClient {
    let config = OpenAiConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
        ..Default::default()
    };
    OpenAiClient::from_config(&config, "sk-example").unwrap()
}

#[tokio::test]
async fn upload_file_sends_multipart_with_expiration() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(header("authorization", "Bearer sk-example"))
        .and(header("openai-beta", "assistants=v2"))
        .and(body_string_contains("user_data"))
        .and(body_string_contains("expires_after[anchor]"))
        .and(body_string_contains("main.go"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-1",
            "filename": "main.go",
            "bytes": 12,
            "purpose": "user_data"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = client_for(&server)
        .upload_file(b"package main".to_vec(), "main.go")
        .await
        .unwrap();

    assert_eq!(file.id, "file-1");
    assert_eq!(file.filename, "main.go");
}

#[tokio::test]
async fn create_vector_store_sets_expiration_policy() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/vector_stores"))
        .and(body_json(json!({
            "name": "hange_1",
            "expires_after": { "anchor": "last_active_at", "days": 1 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vs_1",
            "name": "hange_1",
            "status": "in_progress",
            "file_counts": { "in_progress": 0, "completed": 0, "failed": 0, "cancelled": 0, "total": 0 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = client_for(&server).create_vector_store("hange_1").await.unwrap();

    assert_eq!(store.id, "vs_1");
    assert_eq!(store.status, VectorStoreStatus::InProgress);
}

#[tokio::test]
async fn get_vector_store_reads_file_counts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vector_stores/vs_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vs_1",
            "status": "completed",
            "file_counts": { "in_progress": 0, "completed": 2, "failed": 1, "cancelled": 0, "total": 3 }
        })))
        .mount(&server)
        .await;

    let store = client_for(&server).get_vector_store("vs_1").await.unwrap();

    assert_eq!(store.status, VectorStoreStatus::Completed);
    assert_eq!(store.file_counts.total, 3);
    assert_eq!(store.file_counts.failed, 1);
}

#[tokio::test]
async fn create_file_batch_posts_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/vector_stores/vs_1/file_batches"))
        .and(body_json(json!({ "file_ids": ["file-1", "file-2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vsfb_1",
            "status": "in_progress"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let batch = client_for(&server)
        .create_file_batch("vs_1", vec!["file-1".to_string(), "file-2".to_string()])
        .await
        .unwrap();

    assert_eq!(batch.id, "vsfb_1");
}

#[tokio::test]
async fn create_response_returns_output_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(body_json(json!({
            "model": "gpt-5-nano",
            "input": "Files: main.go",
            "instructions": "Explain",
            "tools": [{ "type": "file_search", "vector_store_ids": ["vs_1"] }],
            "include": ["file_search_call.results"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp_1",
            "status": "completed",
            "output": [
                { "type": "file_search_call", "id": "fs_1" },
                { "type": "message", "content": [{ "type": "output_text", "text": "It is a CLI." }] }
            ]
        })))
        .mount(&server)
        .await;

    let request = ResponseRequest::new("gpt-5-nano", "Files: main.go")
        .with_instructions("Explain")
        .with_file_search("vs_1");
    let response = client_for(&server).create_response(&request).await.unwrap();

    assert_eq!(response.output_text(), "It is a CLI.");
}

#[tokio::test]
async fn delete_endpoints_report_status() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/files/file-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "file-1", "object": "file", "deleted": true
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/vector_stores/vs_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "vs_1", "object": "vector_store.deleted", "deleted": true
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.delete_file("file-1").await.unwrap().deleted);
    assert!(client.delete_vector_store("vs_1").await.unwrap().deleted);
}

#[tokio::test]
async fn unauthorized_maps_to_dedicated_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vector_stores/vs_1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_vector_store("vs_1").await.unwrap_err();

    match err {
        OpenAiError::Unauthorized { message } => assert_eq!(message, "Incorrect API key provided"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn api_error_falls_back_to_raw_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/files/file-1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let err = client_for(&server).delete_file("file-1").await.unwrap_err();

    match err {
        OpenAiError::ApiError { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_host_is_reported() {
    let config = OpenAiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_seconds: 5,
        ..Default::default()
    };
    let client = OpenAiClient::from_config(&config, "sk-example").unwrap();

    let err = client.get_vector_store("vs_1").await.unwrap_err();
    assert!(matches!(err, OpenAiError::ServerUnreachable { .. }));
}
