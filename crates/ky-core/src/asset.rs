use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the asset came out of the remote pipeline or is a local
/// stand-in committed after a failure or timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    Standard,
    Degraded,
}

/// A finished generation result as kept in the history. `model_ref` is an
/// opaque locator the renderer knows how to resolve; it doubles as the
/// identity key for history dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAsset {
    pub id: String,
    pub prompt: String,
    pub model_ref: String,
    pub texture_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub quality: Quality,
}

impl GeneratedAsset {
    pub fn standard(
        prompt: impl Into<String>,
        model_ref: impl Into<String>,
        texture_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            model_ref: model_ref.into(),
            texture_ref,
            created_at: Utc::now(),
            quality: Quality::Standard,
        }
    }

    pub fn degraded(prompt: impl Into<String>, model_ref: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            model_ref: model_ref.into(),
            texture_ref: None,
            created_at: Utc::now(),
            quality: Quality::Degraded,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.quality == Quality::Degraded
    }
}
