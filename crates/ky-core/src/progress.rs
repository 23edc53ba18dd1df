use serde::{Deserialize, Serialize};

/// Live progress tuple published on every poll tick. `percent` never
/// decreases within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub percent: f32,
    pub stage_label: String,
    pub message: String,
}
