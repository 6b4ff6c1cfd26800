use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

// ──────────────────── Request Types ────────────────────

/// Analysis mode requested from the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    FactCheck,
    AiDetection,
    GeneralChat,
}

impl RequestType {
    /// Wire name (e.g. "fact_check").
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::FactCheck => "fact_check",
            RequestType::AiDetection => "ai_detection",
            RequestType::GeneralChat => "general_chat",
        }
    }

    /// Human-readable label shown next to a result.
    pub fn label(&self) -> &'static str {
        match self {
            RequestType::FactCheck => "✓ Fact-Check",
            RequestType::AiDetection => "🤖 AI Detection",
            RequestType::GeneralChat => "💬 General Chat",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fact_check" => Ok(RequestType::FactCheck),
            "ai_detection" => Ok(RequestType::AiDetection),
            "general_chat" => Ok(RequestType::GeneralChat),
            other => Err(format!(
                "unknown request type '{other}' (expected fact_check, ai_detection or general_chat)"
            )),
        }
    }
}

/// JSON body sent to `POST /api/analyze`.
///
/// Every field is optional on the wire; absent fields are omitted so that a
/// plain text submission serializes to `{"text": "..."}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRequest {
    /// Free text, URL, or image caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Image as a base64 data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Audio as a base64 data URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Analysis mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_type: Option<RequestType>,
    /// Sampling temperature in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl AnalysisRequest {
    /// Request carrying only text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// True when at least one of `text`, `image` or `audio` is non-empty.
    pub fn has_content(&self) -> bool {
        [&self.text, &self.image, &self.audio]
            .iter()
            .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

// ──────────────────── Response Types ────────────────────

/// Raw response body from `POST /api/analyze`.
///
/// Both success (`result`, `type`) and failure (`error`, `success: false`)
/// shapes deserialize into this; interpretation happens in the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Only a JSON boolean counts; any other value is ignored.
    #[serde(
        default,
        deserialize_with = "bool_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub success: Option<bool>,
}

fn bool_or_none<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_bool()))
}

impl AnalysisResponse {
    /// Non-empty `error` field, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }

    /// Whether the body carries an explicit failure indicator.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false) || self.error_message().is_some()
    }
}

/// A successful analysis, ready to render.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisResult {
    /// Result text, exactly as returned by the backend.
    pub result: String,
    /// Analysis type reported by the backend.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl AnalysisResult {
    /// Display label for `kind`; unknown types are shown unchanged.
    pub fn type_label(&self) -> Option<String> {
        self.kind.as_deref().map(|k| match k.parse::<RequestType>() {
            Ok(rt) => rt.label().to_string(),
            Err(_) => k.to_string(),
        })
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_request_serializes_only_text() {
        let req = AnalysisRequest::text("The sky is green");
        let json = serde_json::to_string(&req).unwrap();
        assert_eq!(json, r#"{"text":"The sky is green"}"#);
    }

    #[test]
    fn test_full_request_serde() {
        let req = AnalysisRequest {
            text: Some("hello".into()),
            request_type: Some(RequestType::AiDetection),
            temperature: Some(0.5),
            ..Default::default()
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["request_type"], "ai_detection");
        assert_eq!(value["temperature"], 0.5);
        assert!(value.get("image").is_none());
    }

    #[test]
    fn test_has_content() {
        assert!(!AnalysisRequest::default().has_content());
        assert!(!AnalysisRequest::text("   ").has_content());
        assert!(AnalysisRequest::text("x").has_content());

        let audio_only = AnalysisRequest {
            text: Some(String::new()),
            audio: Some("data:audio/wav;base64,AAAA".into()),
            ..Default::default()
        };
        assert!(audio_only.has_content());
    }

    #[test]
    fn test_request_type_parse() {
        assert_eq!(
            "general_chat".parse::<RequestType>(),
            Ok(RequestType::GeneralChat)
        );
        assert!("chat".parse::<RequestType>().is_err());
        assert_eq!(RequestType::FactCheck.to_string(), "fact_check");
    }

    #[test]
    fn test_response_failure_detection() {
        let ok: AnalysisResponse = serde_json::from_str(r#"{"result":"fine"}"#).unwrap();
        assert!(!ok.is_failure());

        let flagged: AnalysisResponse =
            serde_json::from_str(r#"{"success":false,"result":"x"}"#).unwrap();
        assert!(flagged.is_failure());

        let empty_error: AnalysisResponse =
            serde_json::from_str(r#"{"result":"x","error":""}"#).unwrap();
        assert!(!empty_error.is_failure());

        let err: AnalysisResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(err.error_message(), Some("boom"));
    }

    #[test]
    fn test_non_boolean_success_is_ignored() {
        let resp: AnalysisResponse =
            serde_json::from_str(r#"{"success":"false","result":"fine"}"#).unwrap();
        assert_eq!(resp.success, None);
        assert!(!resp.is_failure());

        let resp: AnalysisResponse = serde_json::from_str(r#"{"success":0,"result":"x"}"#).unwrap();
        assert!(!resp.is_failure());
    }

    #[test]
    fn test_response_type_field() {
        let resp: AnalysisResponse =
            serde_json::from_str(r#"{"result":"r","type":"fact_check"}"#).unwrap();
        assert_eq!(resp.kind.as_deref(), Some("fact_check"));
    }

    #[test]
    fn test_type_label() {
        let known = AnalysisResult {
            result: "r".into(),
            kind: Some("ai_detection".into()),
        };
        assert_eq!(known.type_label().as_deref(), Some("🤖 AI Detection"));

        let unknown = AnalysisResult {
            result: "r".into(),
            kind: Some("translation".into()),
        };
        assert_eq!(unknown.type_label().as_deref(), Some("translation"));

        let none = AnalysisResult {
            result: "r".into(),
            kind: None,
        };
        assert_eq!(none.type_label(), None);
    }
}
