//! HTTP transport tests against a local mock server
//!
//! These cover request shapes (paths, headers, bodies) and the full streaming
//! round trip: a run that requires a tool call, the submission, and the
//! continuation stream.

use assistant_runs::{Assistant, ClientOptions, ContentPayload, Error, HttpTransport, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .build()
        .expect("valid options")
}

fn sse(records: &[(&str, serde_json::Value)]) -> String {
    let mut body = String::new();
    for (event, data) in records {
        body.push_str(&format!("event: {}\ndata: {}\n\n", event, data));
    }
    body.push_str("event: done\ndata: [DONE]\n\n");
    body
}

fn event_stream(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

#[derive(Deserialize)]
struct Query {
    city: String,
}

#[derive(Serialize)]
struct Weather {
    #[serde(rename = "tempC")]
    temp_c: f64,
}

#[tokio::test]
async fn create_thread_sends_auth_and_beta_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .and(header("authorization", "Bearer test-key"))
        .and(header("openai-beta", "assistants=v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "thread_abc",
            "object": "thread",
            "created_at": 1_700_000_000,
            "metadata": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = Assistant::connect("asst_1", options(&server)).unwrap();
    let thread = assistant.create_thread().await.unwrap();

    assert_eq!(thread.id(), "thread_abc");
}

#[tokio::test]
async fn organization_header_is_sent_when_configured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .and(header("openai-organization", "org-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "thread_org"})))
        .expect(1)
        .mount(&server)
        .await;

    let options = ClientOptions::builder()
        .api_key("test-key")
        .base_url(format!("{}/", server.uri()))
        .organization("org-42")
        .build()
        .unwrap();
    let transport = HttpTransport::new(options).unwrap();

    let thread = transport.create_thread().await.unwrap();
    assert_eq!(thread.id, "thread_org");
}

#[tokio::test]
async fn add_message_posts_content_parts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/messages"))
        .and(body_json(json!({
            "role": "user",
            "content": [
                {"type": "text", "text": "What is this?"},
                {"type": "image_file", "image_file": {"file_id": "file-1"}}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "object": "thread.message",
            "thread_id": "thread_1",
            "role": "user",
            "content": [{"type": "text", "text": {"value": "What is this?", "annotations": []}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = Assistant::connect("asst_1", options(&server)).unwrap();
    let message = assistant
        .thread("thread_1")
        .add_message([
            ContentPayload::text("What is this?"),
            ContentPayload::image_file("file-1"),
        ])
        .await
        .unwrap();

    assert_eq!(message.id, "msg_1");
    assert_eq!(message.text(), "What is this?");
}

#[tokio::test]
async fn run_dispatches_tool_and_consumes_continuation() {
    let _ = env_logger::builder().is_test(true).try_init();
    let server = MockServer::start().await;

    let first = sse(&[
        (
            "thread.run.created",
            json!({"id": "run_1", "object": "thread.run", "status": "queued"}),
        ),
        (
            "thread.run.requires_action",
            json!({
                "id": "run_1",
                "object": "thread.run",
                "status": "requires_action",
                "required_action": {
                    "type": "submit_tool_outputs",
                    "submit_tool_outputs": {
                        "tool_calls": [{
                            "id": "c1",
                            "type": "function",
                            "function": {"name": "getWeather", "arguments": "{\"city\":\"Zurich\"}"}
                        }]
                    }
                }
            }),
        ),
    ]);

    let second = sse(&[
        (
            "thread.message.delta",
            json!({"id": "msg_1", "object": "thread.message.delta", "delta": {}}),
        ),
        (
            "thread.message.completed",
            json!({
                "id": "msg_1",
                "object": "thread.message",
                "thread_id": "thread_1",
                "role": "assistant",
                "content": [{"type": "text", "text": {"value": "21.5 degrees", "annotations": []}}]
            }),
        ),
        (
            "thread.run.completed",
            json!({"id": "run_1", "object": "thread.run", "status": "completed"}),
        ),
    ]);

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .and(body_json(json!({"assistant_id": "asst_1", "stream": true})))
        .respond_with(event_stream(first))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs/run_1/submit_tool_outputs"))
        .and(body_json(json!({
            "tool_outputs": [{"tool_call_id": "c1", "output": "{\"tempC\":21.5}"}],
            "stream": true
        })))
        .respond_with(event_stream(second))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = Assistant::connect("asst_1", options(&server)).unwrap();
    assistant.set_tool("getWeather", |query: Query| async move {
        let temp_c = if query.city == "Zurich" { 21.5 } else { 0.0 };
        Ok::<_, Error>(Weather { temp_c })
    });

    let messages = assistant.thread("thread_1").run(None).await.unwrap();

    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].id, "msg_1");
    assert_eq!(messages[0].text(), "21.5 degrees");
}

#[tokio::test]
async fn parallel_tool_calls_flag_is_serialized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .and(body_json(json!({
            "assistant_id": "asst_1",
            "stream": true,
            "parallel_tool_calls": false
        })))
        .respond_with(event_stream(sse(&[])))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = Assistant::connect("asst_1", options(&server)).unwrap();
    let messages = assistant.thread("thread_1").run(Some(false)).await.unwrap();

    assert!(messages.is_empty());
}

#[tokio::test]
async fn non_success_status_is_an_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads/missing/runs"))
        .respond_with(ResponseTemplate::new(404).set_body_string("No thread found"))
        .expect(1)
        .mount(&server)
        .await;

    let assistant = Assistant::connect("asst_1", options(&server)).unwrap();
    let err = assistant.thread("missing").run(None).await.unwrap_err();

    match err {
        Error::Api(message) => {
            assert!(message.contains("404"), "message was {}", message);
            assert!(message.contains("No thread found"), "message was {}", message);
        }
        other => panic!("Expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_stream_payload_fails_the_run() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/threads/thread_1/runs"))
        .respond_with(event_stream(
            "event: thread.message.completed\ndata: {\"object\":\n\n".to_string(),
        ))
        .mount(&server)
        .await;

    let assistant = Assistant::connect("asst_1", options(&server)).unwrap();
    let err = assistant.thread("thread_1").run(None).await.unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
}
