use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultation_cell::engine::postprocess::EMERGENCY_MESSAGE;
use consultation_cell::handlers::{consultation_chat, generate_session_summary};
use consultation_cell::{ChatRequest, SummaryRequest, Track};
use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn config_with(supabase: &MockServer, openai: &MockServer) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        supabase_url: supabase.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_jwt_secret: TestConfig::default().jwt_secret,
        openai_api_key: "test-openai-key".to_string(),
        openai_base_url: openai.uri(),
    })
}

fn chat_request(message: &str, turn_count: u32) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        history: vec![],
        turn_count,
        track: None,
        entry_intent: None,
    }
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "choices": [
            { "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[tokio::test]
async fn test_chat_emergency_works_anonymously() {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    // The red flag must short-circuit before any OpenAI traffic.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("무시")))
        .expect(0)
        .mount(&openai)
        .await;

    let result = consultation_chat(
        State(config_with(&supabase, &openai)),
        HeaderMap::new(),
        Json(chat_request("가슴 통증이 심해요", 0)),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response.content, EMERGENCY_MESSAGE);
    assert!(!response.is_hard_stop);
}

#[tokio::test]
async fn test_chat_normal_turn_returns_generated_reply() {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion_body("언제부터 그러셨나요?")),
        )
        .expect(1)
        .mount(&openai)
        .await;

    let result = consultation_chat(
        State(config_with(&supabase, &openai)),
        HeaderMap::new(),
        Json(chat_request("요즘 잠을 잘 못 자요", 0)),
    )
    .await;

    let response = result.unwrap().0;
    assert_eq!(response.content, "언제부터 그러셨나요?");
    assert_eq!(response.track, Track::Sleep);
    assert_eq!(response.turn_count, 0);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    let result = consultation_chat(
        State(config_with(&supabase, &openai)),
        HeaderMap::new(),
        Json(chat_request("", 0)),
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_session_summary_end_to_end() {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    let user = TestUser::patient("patient@example.com");
    let config = config_with(&supabase, &openai);
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultation_messages"))
        .and(query_param("session_id", "eq.sess-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "role": "user", "content": "잠을 못 자요" },
            { "role": "ai", "content": "언제부터 그러셨나요?" },
            { "role": "user", "content": "일주일쯤 됐어요" }
        ])))
        .mount(&supabase)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"pattern_tags":["수면 부족","불규칙한 취침"],"rhythm_score":62,"summary_text":"일주일째 수면 리듬이 흔들리고 있습니다.","main_concern":"불면"}"#,
        )))
        .expect(1)
        .mount(&openai)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/consultation_summaries"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "sum-1", "session_id": "sess-1" }
        ])))
        .expect(1)
        .mount(&supabase)
        .await;

    let result = generate_session_summary(
        State(config),
        TypedHeader(Authorization::<Bearer>::bearer(&token).unwrap()),
        Extension(user.to_user()),
        Path("sess-1".to_string()),
        Some(Json(SummaryRequest {
            topic: Some(Track::Sleep),
        })),
    )
    .await;

    let summary = result.unwrap().0;
    assert_eq!(summary.rhythm_score, 62);
    assert_eq!(summary.pattern_tags, vec!["수면 부족", "불규칙한 취침"]);
    assert_eq!(summary.main_concern, "불면");
}

#[tokio::test]
async fn test_session_summary_missing_transcript_is_not_found() {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    let user = TestUser::patient("patient@example.com");
    let config = config_with(&supabase, &openai);
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultation_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&supabase)
        .await;

    let result = generate_session_summary(
        State(config),
        TypedHeader(Authorization::<Bearer>::bearer(&token).unwrap()),
        Extension(user.to_user()),
        Path("sess-missing".to_string()),
        None,
    )
    .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_session_summary_survives_storage_failure() {
    let supabase = MockServer::start().await;
    let openai = MockServer::start().await;

    let user = TestUser::patient("patient@example.com");
    let config = config_with(&supabase, &openai);
    let token = JwtTestUtils::create_test_token(&user, &config.supabase_jwt_secret, Some(1));

    Mock::given(method("GET"))
        .and(path("/rest/v1/consultation_messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "role": "user", "content": "소화가 잘 안 돼요" }
        ])))
        .mount(&supabase)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            r#"{"pattern_tags":["과식","야식"],"rhythm_score":55,"summary_text":"식사 리듬이 불규칙합니다.","main_concern":"소화"}"#,
        )))
        .mount(&openai)
        .await;

    // Storage is down; the summary must still come back.
    Mock::given(method("POST"))
        .and(path("/rest/v1/consultation_summaries"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&supabase)
        .await;

    let result = generate_session_summary(
        State(config),
        TypedHeader(Authorization::<Bearer>::bearer(&token).unwrap()),
        Extension(user.to_user()),
        Path("sess-2".to_string()),
        None,
    )
    .await;

    let summary = result.unwrap().0;
    assert_eq!(summary.rhythm_score, 55);
    assert_eq!(summary.main_concern, "소화");
}
