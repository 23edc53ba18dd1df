use serde::{Deserialize, Serialize};

/// One phase of the two-stage remote generation pipeline. Preview always
/// completes before refine starts; refine reworks the preview output rather
/// than generating from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preview,
    Refine,
}

impl Stage {
    /// Stage name as sent on the wire and shown in the UI
    pub fn label(&self) -> &str {
        match self {
            Self::Preview => "preview",
            Self::Refine => "refine",
        }
    }

    /// Pipeline order, first stage first
    pub fn all() -> [Stage; 2] {
        [Self::Preview, Self::Refine]
    }
}
