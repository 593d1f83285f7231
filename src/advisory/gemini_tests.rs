use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::gemini::{GeminiAdvisor, GeminiConfig};
use super::Advisor;
use crate::categories::DepartmentCategory;

fn advisor_for(server: &MockServer) -> GeminiAdvisor {
    GeminiAdvisor::new(GeminiConfig {
        api_key: "test-key-123".to_string(),
        base_url: server.uri(),
        ..GeminiConfig::default()
    })
    .unwrap()
}

fn model_list(names: &[&str]) -> serde_json::Value {
    json!({
        "models": names.iter().map(|name| json!({"name": name})).collect::<Vec<_>>()
    })
}

fn generation_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{"text": text}]
            }
        }]
    })
}

#[tokio::test]
async fn advisor_fails_when_both_revisions_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    // Discovery failure must not trigger any generation attempt.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("와이파이가 안 됩니다").await;

    assert_eq!(outcome.label, None);
    assert_eq!(outcome.reason, "gemini_listmodels_failed");
}

#[tokio::test]
async fn advisor_falls_back_to_secondary_revision() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .and(query_param("key", "test-key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_reply(
            "{\"label\":\"전산\",\"reason\":\"네트워크 장애\"}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("와이파이가 안 됩니다").await;

    assert_eq!(outcome.label, Some(DepartmentCategory::It));
    assert_eq!(outcome.reason, "gemini_ok");
}

#[tokio::test]
async fn advisor_treats_empty_model_list_as_revision_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_reply(
            "{\"label\":\"시설\",\"reason\":\"누수\"}",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("3층 복도 누수").await;

    assert_eq!(outcome.label, Some(DepartmentCategory::Facility));
}

#[tokio::test]
async fn advisor_fails_without_generation_capable_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&[
            "models/gemini-embedding-001",
            "models/text-bison",
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("텍스트").await;

    assert_eq!(outcome.label, None);
    assert_eq!(outcome.reason, "gemini_no_suitable_model");
}

#[tokio::test]
async fn advisor_reports_generation_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("텍스트").await;

    assert_eq!(outcome.label, None);
    assert_eq!(outcome.reason, "gemini_http_500");
}

#[tokio::test]
async fn advisor_extracts_verdict_wrapped_in_prose() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_reply(
            "분석 결과는 다음과 같습니다.\n{\"label\": \"시설\", \"reason\": \"누수 언급\"}\n감사합니다.",
        )))
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("3층 복도 누수").await;

    assert_eq!(outcome.label, Some(DepartmentCategory::Facility));
    assert_eq!(outcome.reason, "gemini_ok");
}

#[tokio::test]
async fn advisor_rejects_label_outside_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(generation_reply(
            "{\"label\":\"보안\",\"reason\":\"추측\"}",
        )))
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("텍스트").await;

    assert_eq!(outcome.label, None);
    assert_eq!(outcome.reason, "gemini_parse_failed");
}

#[tokio::test]
async fn advisor_rejects_reply_without_json_object() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(generation_reply("판단하기 어렵습니다")),
        )
        .mount(&server)
        .await;

    let outcome = advisor_for(&server).advise("텍스트").await;

    assert_eq!(outcome.reason, "gemini_parse_failed");
}

#[tokio::test]
async fn advisor_converts_generation_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(model_list(&["models/gemini-pro"])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/models/gemini-pro:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(generation_reply("{\"label\":\"시설\"}")),
        )
        .mount(&server)
        .await;

    let advisor = GeminiAdvisor::new(GeminiConfig {
        api_key: "test-key-123".to_string(),
        base_url: server.uri(),
        generate_timeout: Duration::from_millis(50),
        ..GeminiConfig::default()
    })
    .unwrap();

    let outcome = advisor.advise("텍스트").await;

    assert_eq!(outcome.label, None);
    assert_eq!(outcome.reason, "gemini_error:Timeout");
}
