pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::{CliConfig, Command};

pub use crate::config::{storage::LocalStorage, Settings};
pub use crate::core::{client::HttpRiskApi, form::PredictionForm, workflow::RiskWorkflow};
pub use crate::utils::error::{Result, RiskClientError};
