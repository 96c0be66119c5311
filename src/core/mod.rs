pub mod artifacts;
pub mod client;
pub mod form;
pub mod preview;
pub mod report;
pub mod upload;
pub mod workflow;

pub use crate::domain::model::{AnalysisResponse, PredictionInput, PredictionResponse};
pub use crate::domain::ports::{ConfigProvider, RiskApi, Storage};
pub use crate::utils::error::Result;
