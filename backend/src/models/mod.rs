pub mod analysis;

pub use analysis::{AnalysisRequest, AnalysisResponse, ResponseMeta};
