mod asset;
mod progress;
mod stage;

pub use asset::{GeneratedAsset, Quality};
pub use progress::ProgressReport;
pub use stage::Stage;
