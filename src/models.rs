//! Wire types exchanged with the question-answering service.
//!
//! Request types serialize exactly the fields the server reads; optional
//! crawl and retrieval knobs are omitted when unset. Response types tolerate
//! missing fields so that a partial payload still renders.

use serde::{Deserialize, Serialize};

/// One entry of the model catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
}

/// Body of `GET /getState`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub model_id: Option<String>,
}

/// Body of `GET /models`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// Body of `POST /selectedModel`.
#[derive(Debug, Clone, Serialize)]
pub struct SelectModelRequest<'a> {
    pub model_id: &'a str,
}

/// Body of `POST /ingest`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestRequest {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
}

/// Body of `POST /answer`.
///
/// `session_id` and `model` are always present; `null` asks the server to
/// open a new session or use its default model.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest {
    pub question: String,
    pub session_id: Option<String>,
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

/// Body of a successful `POST /answer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub tokens: Option<u64>,
    #[serde(default)]
    pub tokens_used_total: Option<u64>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

/// Body of `GET /sites`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SitesResponse {
    #[serde(default)]
    pub sites: Vec<String>,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_answer_request_keeps_null_session_and_model() {
        let req = AnswerRequest {
            question: "what?".into(),
            session_id: None,
            model: None,
            top_k: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({"question": "what?", "session_id": null, "model": null})
        );
    }

    #[test]
    fn test_ingest_request_omits_unset_limits() {
        let req = IngestRequest {
            urls: vec!["a.com".into()],
            max_pages: None,
            max_depth: Some(2),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, json!({"urls": ["a.com"], "max_depth": 2}));
    }

    #[test]
    fn test_answer_response_tolerates_missing_fields() {
        let resp: AnswerResponse = serde_json::from_value(json!({"answer": "hi"})).unwrap();
        assert_eq!(resp.answer, "hi");
        assert!(resp.tokens.is_none());
        assert!(resp.sources.is_none());
        assert!(resp.session_id.is_none());
    }

    #[test]
    fn test_state_response_with_null_model() {
        let resp: StateResponse =
            serde_json::from_value(json!({"models": [{"id": "m1"}], "model_id": null})).unwrap();
        assert_eq!(resp.models, vec![ModelInfo { id: "m1".into() }]);
        assert!(resp.model_id.is_none());
    }
}
