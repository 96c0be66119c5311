use crate::domain::model::{AnalysisResponse, PredictionInput, PredictionResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 回傳檔案在存儲中的完整位置，用於顯示給使用者
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn timeout_seconds(&self) -> Option<u64>;
    fn preview_rows(&self) -> usize;
    fn save_plots(&self) -> bool;
    fn archive(&self) -> bool;
}

/// The two HTTP contracts of the analysis service.
#[async_trait]
pub trait RiskApi: Send + Sync {
    async fn analyze(&self, file_name: &str, contents: Vec<u8>) -> Result<AnalysisResponse>;
    async fn predict(&self, input: &PredictionInput) -> Result<PredictionResponse>;
}
