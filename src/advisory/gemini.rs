use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use super::{Advisor, AdvisoryOutcome};
use crate::categories::DepartmentCategory;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_GENERATE_TIMEOUT: Duration = Duration::from_secs(20);

/// API revisions probed for model discovery, in fixed order.
const API_REVISIONS: [&str; 2] = ["v1", "v1beta"];

/// Generation-capable models in preference order. Discovery returns names
/// in the `models/...` form.
const PREFERRED_MODELS: [&str; 5] = [
    "models/gemini-pro",
    "models/gemini-1.5-flash-latest",
    "models/gemini-1.5-flash",
    "models/gemini-1.5-pro",
    "models/gemini-1.0-pro",
];

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub discovery_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
            generate_timeout: DEFAULT_GENERATE_TIMEOUT,
        }
    }
}

/// Gemini-backed advisory classifier.
///
/// Works in two phases: discover which models the configured key can reach
/// (trying both API revisions), then issue one `generateContent` call
/// against the best available model and extract the JSON verdict from the
/// reply text. Every failure collapses into a fixed reason code.
pub struct GeminiAdvisor {
    client: reqwest::Client,
    config: GeminiConfig,
    json_object: Regex,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Defensive walk of `candidates[0].content.parts[0].text`.
    fn first_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .unwrap_or_default()
    }
}

impl GeminiAdvisor {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        // Providers wrap the JSON verdict in prose, so the reply is scanned
        // for a bracketed object rather than parsed whole.
        let json_object =
            Regex::new(r"(?s)\{.*\}").context("Failed to compile JSON extraction pattern")?;
        Ok(Self {
            client,
            config,
            json_object,
        })
    }

    /// Queries both API revisions for reachable models. Returns the first
    /// revision with a non-empty model list.
    async fn list_models(&self) -> Option<(&'static str, Vec<String>)> {
        for revision in API_REVISIONS {
            let url = format!(
                "{}/{}/models?key={}",
                self.config.base_url, revision, self.config.api_key
            );
            let response = match self
                .client
                .get(&url)
                .timeout(self.config.discovery_timeout)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(revision, error = %e, "model discovery request failed");
                    continue;
                }
            };
            if !response.status().is_success() {
                tracing::warn!(revision, status = %response.status(), "model discovery rejected");
                continue;
            }
            let list: ModelList = match response.json().await {
                Ok(list) => list,
                Err(e) => {
                    tracing::warn!(revision, error = %e, "model discovery reply unreadable");
                    continue;
                }
            };
            let names: Vec<String> = list.models.into_iter().filter_map(|m| m.name).collect();
            if !names.is_empty() {
                return Some((revision, names));
            }
        }
        None
    }

    async fn generate(&self, revision: &str, model: &str, text: &str) -> AdvisoryOutcome {
        let url = format!(
            "{}/{}/{}:generateContent?key={}",
            self.config.base_url, revision, model, self.config.api_key
        );
        let body = json!({"contents": [{"parts": [{"text": build_prompt(text)}]}]});

        let response = match self
            .client
            .post(&url)
            .json(&body)
            .timeout(self.config.generate_timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return AdvisoryOutcome::failure(format!("gemini_error:{}", error_kind(&e))),
        };

        let status = response.status();
        if !status.is_success() {
            return AdvisoryOutcome::failure(format!("gemini_http_{}", status.as_u16()));
        }

        let payload: GenerateResponse = match response.json().await {
            Ok(payload) => payload,
            Err(e) => return AdvisoryOutcome::failure(format!("gemini_error:{}", error_kind(&e))),
        };

        let content = payload.first_text();
        match self.extract_label(&content) {
            Some(label) => AdvisoryOutcome::success(label, "gemini_ok"),
            None => {
                tracing::warn!(reply = %content, "no usable verdict in advisory reply");
                AdvisoryOutcome::failure("gemini_parse_failed")
            }
        }
    }

    /// Finds the first parseable JSON object in the reply and validates its
    /// `label` against the closed category set.
    fn extract_label(&self, content: &str) -> Option<DepartmentCategory> {
        let parsed: serde_json::Value = self
            .json_object
            .find_iter(content)
            .find_map(|m| serde_json::from_str(m.as_str()).ok())?;
        let label = parsed.get("label")?.as_str()?;
        DepartmentCategory::from_label(label).ok()
    }
}

#[async_trait]
impl Advisor for GeminiAdvisor {
    async fn advise(&self, text: &str) -> AdvisoryOutcome {
        let Some((revision, models)) = self.list_models().await else {
            return AdvisoryOutcome::failure("gemini_listmodels_failed");
        };

        let Some(model) = choose_model(&models) else {
            tracing::warn!(available = models.len(), "no generation-capable model");
            return AdvisoryOutcome::failure("gemini_no_suitable_model");
        };

        self.generate(revision, &model, text).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// First preferred model present in `available`, else any gemini model that
/// is not embedding-only.
fn choose_model(available: &[String]) -> Option<String> {
    for preferred in PREFERRED_MODELS {
        if available.iter().any(|name| name == preferred) {
            return Some(preferred.to_string());
        }
    }
    available
        .iter()
        .find(|name| name.contains("models/gemini") && !name.to_lowercase().contains("embedding"))
        .cloned()
}

fn build_prompt(text: &str) -> String {
    let labels: Vec<&str> = DepartmentCategory::ALL
        .iter()
        .map(|category| category.as_label())
        .collect();
    format!(
        "다음 한국어 신고 문장을 읽고 가장 적절한 하나의 카테고리를 선택하세요.\n\
         카테고리 후보: {}\n\
         출력 형식(JSON): {{\"label\":\"시설|환경|전산|기타\", \"reason\":\"...\"}}\n\
         문장: {}\n",
        labels.join(", "),
        text
    )
}

fn error_kind(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "Timeout"
    } else if error.is_connect() {
        "Connect"
    } else if error.is_decode() {
        "Decode"
    } else {
        "Request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_model_prefers_fixed_order() {
        let available = vec![
            "models/gemini-1.5-pro".to_string(),
            "models/gemini-pro".to_string(),
        ];
        assert_eq!(choose_model(&available).as_deref(), Some("models/gemini-pro"));
    }

    #[test]
    fn test_choose_model_falls_back_to_any_gemini() {
        let available = vec![
            "models/text-bison".to_string(),
            "models/gemini-exp-1206".to_string(),
        ];
        assert_eq!(
            choose_model(&available).as_deref(),
            Some("models/gemini-exp-1206")
        );
    }

    #[test]
    fn test_choose_model_skips_embedding_models() {
        let available = vec!["models/gemini-embedding-001".to_string()];
        assert_eq!(choose_model(&available), None);
    }

    #[test]
    fn test_prompt_embeds_candidate_labels() {
        let prompt = build_prompt("복도 전등이 나갔습니다");
        assert!(prompt.contains("시설, 환경, 전산, 기타"));
        assert!(prompt.contains("복도 전등이 나갔습니다"));
    }
}
