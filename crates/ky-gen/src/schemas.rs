use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use ky_core::Stage;

/// Extra submit parameters. Refine must carry the preview task id so the
/// service refines that output instead of starting over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub prompt: String,
    pub stage: Stage,
    pub stage_params: StageParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub task_id: String,
}

/// Business-level status reported by the service. Distinct from a transport
/// failure, which surfaces as a `ClientError` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemoteStatus {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: RemoteStatus,
    #[serde(default)]
    pub progress: Option<f32>,
    #[serde(default)]
    pub model_urls: HashMap<String, String>,
    #[serde(default)]
    pub texture_urls: Vec<String>,
}

impl StatusResponse {
    /// Model locator from the payload, preferring glb
    pub fn model_ref(&self) -> Option<&str> {
        self.model_urls
            .get("glb")
            .or_else(|| self.model_urls.values().next())
            .map(String::as_str)
    }

    pub fn texture_ref(&self) -> Option<&str> {
        self.texture_urls.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_wire_shape() {
        let request = SubmitRequest {
            prompt: "red ceramic vase".into(),
            stage: Stage::Refine,
            stage_params: StageParams {
                preview_task_id: Some("p1".into()),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stage"], "refine");
        assert_eq!(value["stageParams"]["previewTaskId"], "p1");
    }

    #[test]
    fn test_preview_submit_omits_stage_params_id() {
        let request = SubmitRequest {
            prompt: "red ceramic vase".into(),
            stage: Stage::Preview,
            stage_params: StageParams {
                preview_task_id: None,
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert!(value["stageParams"].get("previewTaskId").is_none());
    }

    #[test]
    fn test_status_response_parses_sparse_payload() {
        let raw = r#"{"status": "RUNNING"}"#;
        let status: StatusResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(status.status, RemoteStatus::Running);
        assert_eq!(status.progress, None);
        assert!(status.model_urls.is_empty());
    }

    #[test]
    fn test_model_ref_prefers_glb() {
        let raw = r#"{
            "status": "SUCCEEDED",
            "progress": 100,
            "modelUrls": {"obj": "https://x/m.obj", "glb": "https://x/m.glb"},
            "textureUrls": ["https://x/t0.png"]
        }"#;
        let status: StatusResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(status.model_ref(), Some("https://x/m.glb"));
        assert_eq!(status.texture_ref(), Some("https://x/t0.png"));
    }
}
