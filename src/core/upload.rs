use crate::utils::error::{Result, RiskClientError};
use crate::utils::validation::has_extension;
use std::path::{Path, PathBuf};

pub const CSV_MIME_TYPE: &str = "text/csv";

/// A dataset that passed the local checks and is ready to upload.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    pub path: PathBuf,
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl DatasetFile {
    /// 上傳前檢查：必須選擇檔案且為 CSV
    pub async fn select<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let path = path.ok_or(RiskClientError::NoFileSelected)?;
        let path = path.as_ref();

        if !has_extension(path, "csv") {
            tracing::warn!("Rejected non-CSV file: {}", path.display());
            return Err(RiskClientError::InvalidFileType {
                path: path.display().to_string(),
            });
        }

        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("dataset.csv")
            .to_string();

        tracing::debug!("Selected {} ({} bytes)", file_name, contents.len());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            contents,
        })
    }

    pub fn mime_type(&self) -> &'static str {
        CSV_MIME_TYPE
    }
}
