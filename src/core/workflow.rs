use crate::core::artifacts::{self, ArtifactOptions, SavedArtifacts};
use crate::core::form::PredictionForm;
use crate::core::preview::CsvPreview;
use crate::core::upload::DatasetFile;
use crate::domain::model::{AnalysisResponse, PredictionResponse, RiskLevel};
use crate::domain::ports::{RiskApi, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;
use std::path::Path;

/// Everything produced by one analyze action.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub preview: CsvPreview,
    pub analysis: AnalysisResponse,
    pub artifacts: SavedArtifacts,
}

/// Runs one user action at a time against the analysis service.
pub struct RiskWorkflow<A: RiskApi, S: Storage> {
    api: A,
    storage: S,
    artifact_options: ArtifactOptions,
    monitoring_enabled: bool,
}

impl<A: RiskApi, S: Storage> RiskWorkflow<A, S> {
    pub fn new(api: A, storage: S) -> Self {
        Self {
            api,
            storage,
            artifact_options: ArtifactOptions {
                save_plots: true,
                archive: false,
            },
            monitoring_enabled: false,
        }
    }

    pub fn with_artifact_options(mut self, options: ArtifactOptions) -> Self {
        self.artifact_options = options;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitoring_enabled = enabled;
        self
    }

    /// Local check and preview only, nothing is sent.
    pub async fn preview<P: AsRef<Path>>(&self, path: Option<P>) -> Result<CsvPreview> {
        let dataset = DatasetFile::select(path).await?;
        Ok(Self::preview_dataset(&dataset))
    }

    // 預覽失敗不阻擋上傳，由服務端判斷資料是否可用
    fn preview_dataset(dataset: &DatasetFile) -> CsvPreview {
        let preview = CsvPreview::from_bytes_lossy(&dataset.contents);
        let missing = preview.missing_columns();
        if !missing.is_empty() {
            tracing::warn!(
                "⚠️ {} is missing expected columns: {}",
                dataset.file_name,
                missing.join(", ")
            );
        }
        preview
    }

    pub async fn analyze<P: AsRef<Path>>(&self, path: Option<P>) -> Result<AnalysisOutcome> {
        let mut monitor = PhaseMonitor::new(self.monitoring_enabled);

        tracing::info!("🚀 Starting dataset analysis");
        let dataset = DatasetFile::select(path).await?;
        let preview = Self::preview_dataset(&dataset);
        tracing::info!(
            "📄 {}: {} columns, {} rows",
            dataset.file_name,
            preview.headers.len(),
            preview.total_rows()
        );
        monitor.log_phase("Preview");

        let analysis = self
            .api
            .analyze(&dataset.file_name, dataset.contents.clone())
            .await?;
        tracing::info!(
            "✅ Model trained: accuracy {:.4}, best alpha {:.4}",
            analysis.accuracy,
            analysis.best_alpha
        );
        monitor.log_phase("Upload");

        // 模型已訓練完成，存檔失敗只記錄警告
        let artifacts = match artifacts::save_analysis(
            &self.storage,
            &dataset.file_name,
            &analysis,
            &self.artifact_options,
        )
        .await
        {
            Ok(saved) => {
                tracing::info!("📁 Report saved to: {}", saved.report);
                saved
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not save analysis artifacts: {}", e);
                SavedArtifacts {
                    error: Some(e.user_friendly_message()),
                    ..SavedArtifacts::default()
                }
            }
        };
        monitor.log_phase("Save artifacts");
        monitor.log_final();

        Ok(AnalysisOutcome {
            preview,
            analysis,
            artifacts,
        })
    }

    pub async fn predict(&self, form: &PredictionForm) -> Result<PredictionResponse> {
        let mut monitor = PhaseMonitor::new(self.monitoring_enabled);

        let input = form.submit()?;
        let result = self.api.predict(&input).await?;

        let expected = RiskLevel::from_probability(result.probability);
        if expected != result.risk_level {
            tracing::warn!(
                "Service reported risk level {} for probability {:.4}, expected {}",
                result.risk_level,
                result.probability,
                expected
            );
        }
        tracing::info!(
            "✅ Prediction: {} ({:.2}%, {} risk)",
            u8::from(result.prediction),
            result.probability * 100.0,
            result.risk_level
        );
        monitor.log_final();

        Ok(result)
    }
}
