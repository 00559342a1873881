//! Integration tests against a mock OpenAI-compatible endpoint

use futures::StreamExt;
use ser_core::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Mock endpoint helpers ───────────────────────────────────

fn settings(server: &MockServer) -> LlmSettings {
    LlmSettings::default()
        .with_api_key("test-key")
        .with_base_url(server.uri())
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    })
}

/// Build an SSE `data:` line for a streaming chat chunk.
fn sse_chunk(content: &str) -> String {
    let json = json!({
        "choices": [{
            "index": 0,
            "delta": { "content": content },
            "finish_reason": null
        }]
    });
    format!("data: {}\n\n", json)
}

fn sse_usage() -> String {
    let json = json!({
        "choices": [],
        "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
    });
    format!("data: {}\n\n", json)
}

/// Build an SSE response body from a list of token strings.
fn build_sse_body(tokens: &[&str]) -> String {
    let mut body = String::new();
    for token in tokens {
        body.push_str(&sse_chunk(token));
    }
    body.push_str(&sse_usage());
    body.push_str("data: [DONE]\n\n");
    body
}

fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body)
}

// ── Conversation client ─────────────────────────────────────

#[tokio::test]
async fn test_batch_reply_recorded_in_history() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "qwen3-omni-flash",
            "stream": false,
            "modalities": ["text"],
            "messages": [
                { "role": "system", "content": "be brief" },
                { "role": "user", "content": [{ "type": "text", "text": "hello" }] }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hi there")))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = ConversationClient::with_system_prompt(settings(&server), "be brief").unwrap();
    let reply = client.ask("hello", false).await.unwrap();
    assert_eq!(reply, "hi there");

    let history = client.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].role, MessageRole::Assistant);
    assert_eq!(history[1].content.text(), "hi there");
}

#[tokio::test]
async fn test_stream_reply_recorded_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "stream": true,
            "stream_options": { "include_usage": true }
        })))
        .respond_with(sse_response(build_sse_body(&["你", "好", "！"])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = ConversationClient::with_system_prompt(settings(&server), "sys").unwrap();
    let mut deltas = Vec::new();
    let mut saw_usage = false;
    {
        let mut stream = client.send_stream("hi").await.unwrap();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            saw_usage |= chunk.usage.is_some();
            if let Some(delta) = chunk.delta {
                deltas.push(delta);
            }
        }
        assert!(stream.is_committed());
    }

    assert_eq!(deltas, ["你", "好", "！"]);
    assert!(saw_usage);

    let history = client.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content.text(), "你好！");
}

#[tokio::test]
async fn test_malformed_chunk_keeps_partial_reply() {
    let server = MockServer::start().await;
    let body = format!("{}data: {{not json\n\n", sse_chunk("partial"));
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(sse_response(body))
        .mount(&server)
        .await;

    let mut client = ConversationClient::with_system_prompt(settings(&server), "sys").unwrap();
    let result = client.ask("hi", true).await;
    assert!(matches!(result, Err(SerError::Stream(_))));

    let history = client.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].content.text(), "partial");
}

#[tokio::test]
async fn test_api_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error"
            }
        })))
        .mount(&server)
        .await;

    let mut client = ConversationClient::with_system_prompt(settings(&server), "sys").unwrap();
    match client.send("hi").await {
        Err(SerError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid_request_error: Incorrect API key provided");
        }
        other => panic!("expected API error, got {other:?}"),
    }

    // the user turn stays, no assistant turn
    assert_eq!(client.history().len(), 1);
}

#[tokio::test]
async fn test_reply_without_choices() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let mut client = ConversationClient::with_system_prompt(settings(&server), "sys").unwrap();
    assert_eq!(client.send("hi").await.unwrap(), "");
    assert_eq!(client.history().len(), 1);
}

#[tokio::test]
async fn test_choice_without_content_is_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": null } }]
        })))
        .mount(&server)
        .await;

    let mut client = ConversationClient::with_system_prompt(settings(&server), "sys").unwrap();
    client.send("q1").await.unwrap();
    assert_eq!(client.send("q2").await.unwrap(), "");

    let roles: Vec<MessageRole> = client.history().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        [
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant
        ]
    );
}

#[tokio::test]
async fn test_history_window_on_the_wire() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    let mut client =
        ConversationClient::with_system_prompt(settings(&server).with_max_history(Some(2)), "sys")
            .unwrap();
    for text in ["one", "two", "three"] {
        client.send(text).await.unwrap();
    }

    let requests = server.received_requests().await.unwrap();
    let last: serde_json::Value = serde_json::from_slice(&requests[2].body).unwrap();
    let messages = last["messages"].as_array().unwrap();
    // system + the previous assistant turn + the new user turn
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[2]["content"], "three");
}

// ── Pipelines ───────────────────────────────────────────────

#[tokio::test]
async fn test_recognizer_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(sse_response(build_sse_body(&[
            "这个项目很难，",
            "但你一定可以的！\n",
            "[EMOTION:3]",
        ])))
        .mount(&server)
        .await;

    let config = SerConfig {
        llm: settings(&server),
        ..SerConfig::default()
    };
    let mut recognizer = TextEmotionRecognizer::from_config(&config).unwrap();
    let result = recognizer
        .recognize("这个项目很难，但我相信我一定可以的！", true)
        .await
        .unwrap();

    assert_eq!(result.emotion, Emotion::Confident);
    assert_eq!(result.label(), 3);
    assert_eq!(result.text, "这个项目很难，但你一定可以的！");
}

#[tokio::test]
async fn test_gait_pipeline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("情感识别助手"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("好的，向左转！\n[EMOTION:1]")),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("快向左转！ [EMOTION:happy]"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"y_vel": 0.0, "yaw_vel": 0.3, "freq_offset": 0.1}"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut gait = GaitGenerator::new(settings(&server)).unwrap();
    let result = gait.generate("快向左转！", false).await.unwrap();

    assert_eq!(result.x_vel, X_VEL);
    assert_eq!(result.y_vel, 0.0);
    assert_eq!(result.yaw_vel, 0.3);
    assert_eq!(result.freq_offset, 0.1);
    assert_eq!(result.emo_label, Emotion::Happy);

    let history = gait.history();
    assert_eq!(history.emotion.len(), 2);
    assert_eq!(history.motion.len(), 2);
}

#[test]
fn test_missing_key_fails_at_construction() {
    let settings = LlmSettings {
        api_key_env: "SER_TEST_UNSET_KEY_VAR_5".to_string(),
        ..LlmSettings::default()
    };
    assert!(matches!(
        GaitGenerator::new(settings),
        Err(SerError::Authentication(_))
    ));
}
