//! HTTP-level tests for the OpenAI-compatible providers against a mock
//! server.

use helpdesk_rag::{
    ChatMessage, ChatModel, ChatRequest, EmbeddingProvider, HelpdeskError, OpenAIChatModel,
    OpenAIEmbeddingProvider,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_request(question: &str) -> ChatRequest {
    ChatRequest {
        messages: vec![ChatMessage::system("You are a test."), ChatMessage::user(question)],
        temperature: 0.0,
        max_tokens: 100,
    }
}

#[tokio::test]
async fn embed_batch_parses_vectors_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({ "model": "test-embed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "embedding": [0.1, 0.2] },
                { "embedding": [0.3, 0.4] },
            ]
        })))
        .mount(&server)
        .await;

    let provider = OpenAIEmbeddingProvider::new("test-key")
        .unwrap()
        .with_base_url(server.uri())
        .with_model("test-embed", 2);

    let embeddings = provider.embed_batch(&["first", "second"]).await.unwrap();
    assert_eq!(embeddings, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    assert_eq!(provider.dimensions(), 2);
}

#[tokio::test]
async fn embedding_api_error_carries_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "quota exceeded" }
        })))
        .mount(&server)
        .await;

    let provider =
        OpenAIEmbeddingProvider::new("test-key").unwrap().with_base_url(server.uri());

    let err = provider.embed("hello").await.unwrap_err();
    match err {
        HelpdeskError::Embedding { provider, message } => {
            assert_eq!(provider, "OpenAI");
            assert!(message.contains("429"));
            assert!(message.contains("quota exceeded"));
        }
        other => panic!("expected embedding error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_completion_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "model": "test-chat" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "Reboot it." } }
            ]
        })))
        .mount(&server)
        .await;

    let model = OpenAIChatModel::new("test-key")
        .unwrap()
        .with_base_url(server.uri())
        .with_model("test-chat");

    let text = model.generate(chat_request("What now?")).await.unwrap();
    assert_eq!(text, "Reboot it.");
}

#[tokio::test]
async fn chat_api_error_maps_to_generation_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let model = OpenAIChatModel::new("test-key").unwrap().with_base_url(server.uri());

    let err = model.generate(chat_request("What now?")).await.unwrap_err();
    match err {
        HelpdeskError::Generation { message, .. } => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("expected generation error, got {other:?}"),
    }
}

#[tokio::test]
async fn chat_response_without_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let model = OpenAIChatModel::new("test-key").unwrap().with_base_url(server.uri());

    let err = model.generate(chat_request("What now?")).await.unwrap_err();
    assert!(matches!(err, HelpdeskError::Generation { .. }));
}

#[test]
fn empty_api_key_is_rejected() {
    assert!(OpenAIEmbeddingProvider::new("").is_err());
    assert!(OpenAIChatModel::new("").is_err());
}
