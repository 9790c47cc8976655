mod common;

use common::{TestApp, FAILING_MODEL};
use model_serving::dtos::CompletionResponse;
use serde_json::{json, Value};

#[tokio::test]
async fn completion_without_model_is_service_unavailable() {
    let app = TestApp::spawn().await;

    let response = app.complete("Hello").await;
    assert_eq!(response.status().as_u16(), 503);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Model not deployed");
}

#[tokio::test]
async fn completion_without_model_ignores_request_content() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/completion", &json!({ "messages": [] })).await;
    assert_eq!(response.status().as_u16(), 503);
}

#[tokio::test]
async fn completion_after_deploy_returns_assistant_reply() {
    let app = TestApp::spawn().await;
    app.deploy("gpt2").await;

    let response = app.complete("Hello").await;
    assert_eq!(response.status().as_u16(), 200);

    let body: CompletionResponse = response.json().await.unwrap();
    match body {
        CompletionResponse::Success { response } => {
            assert_eq!(response.len(), 1);
            assert_eq!(response[0].role, "assistant");
            assert!(!response[0].message.is_empty());
        }
        other => panic!("expected success payload, got {:?}", other),
    }
}

#[tokio::test]
async fn only_last_message_is_used_as_prompt() {
    let app = TestApp::spawn().await;
    app.deploy("gpt2").await;

    let response = app
        .post_json(
            "/completion",
            &json!({
                "messages": [
                    { "role": "user", "content": "first question" },
                    { "role": "assistant", "content": "first answer" },
                    { "role": "user", "content": "second question" }
                ]
            }),
        )
        .await;

    let body: Value = response.json().await.unwrap();
    let message = body["response"][0]["message"].as_str().unwrap();
    assert!(message.starts_with("second question"));
    assert!(!message.contains("first"));
}

#[tokio::test]
async fn generation_failure_is_reported_in_payload() {
    let app = TestApp::spawn().await;
    app.deploy(FAILING_MODEL).await;

    let response = app.complete("Hello").await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(!body["message"].as_str().unwrap().is_empty());

    // The model keeps serving after a failed generation.
    assert_eq!(app.status().await, "RUNNING");
}

#[tokio::test]
async fn empty_messages_are_unprocessable_once_deployed() {
    let app = TestApp::spawn().await;
    app.deploy("gpt2").await;

    let response = app.post_json("/completion", &json!({ "messages": [] })).await;
    assert_eq!(response.status().as_u16(), 422);
}
