#[cfg(feature = "cli")]
pub mod cli;
pub mod storage;
pub mod toml_config;

use crate::core::client::DEFAULT_API_BASE_URL;
use crate::core::preview::DEFAULT_PREVIEW_ROWS;
use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use toml_config::TomlConfig;

pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Effective settings after merging defaults, the TOML file and CLI flags.
#[derive(Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub timeout_seconds: Option<u64>,
    pub headers: HashMap<String, String>,
    pub output_path: String,
    pub save_plots: bool,
    pub preview_rows: usize,
    pub archive: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: None,
            headers: HashMap::new(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            save_plots: true,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            archive: false,
        }
    }
}

// 標頭可能含有認證資訊，只輸出名稱
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: BTreeMap<&str, &str> = self
            .headers
            .keys()
            .map(|name| (name.as_str(), "***"))
            .collect();

        f.debug_struct("Settings")
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("headers", &headers)
            .field("output_path", &self.output_path)
            .field("save_plots", &self.save_plots)
            .field("preview_rows", &self.preview_rows)
            .field("archive", &self.archive)
            .finish()
    }
}

/// Values given on the command line. `None` leaves the lower layer in place.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub output_path: Option<String>,
    pub save_plots: Option<bool>,
    pub preview_rows: Option<usize>,
    pub archive: Option<bool>,
}

impl Settings {
    pub fn resolve(file: Option<&TomlConfig>, overrides: &SettingsOverrides) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(file) = file {
            file.validate()?;
            settings.apply_file(file);
        }

        // CLI 旗標優先於設定檔
        if let Some(url) = &overrides.api_base_url {
            settings.api_base_url = url.clone();
        }
        if let Some(timeout) = overrides.timeout_seconds {
            settings.timeout_seconds = Some(timeout);
        }
        if let Some(path) = &overrides.output_path {
            settings.output_path = path.clone();
        }
        if let Some(save_plots) = overrides.save_plots {
            settings.save_plots = save_plots;
        }
        if let Some(rows) = overrides.preview_rows {
            settings.preview_rows = rows;
        }
        if let Some(archive) = overrides.archive {
            settings.archive = archive;
        }

        settings.validate()?;
        Ok(settings)
    }

    fn apply_file(&mut self, file: &TomlConfig) {
        if let Some(url) = &file.api.base_url {
            self.api_base_url = url.clone();
        }
        if file.api.timeout_seconds.is_some() {
            self.timeout_seconds = file.api.timeout_seconds;
        }
        self.headers.extend(file.headers());
        if let Some(path) = &file.output.path {
            self.output_path = path.clone();
        }
        if let Some(save_plots) = file.output.save_plots {
            self.save_plots = save_plots;
        }
        if let Some(rows) = file.output.preview_rows {
            self.preview_rows = rows;
        }
        if let Some(archive) = file.output.archive {
            self.archive = archive;
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_url", &self.api_base_url)?;
        validation::validate_path("output_path", &self.output_path)?;
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        validation::validate_positive_number("rows", self.preview_rows as u64, 1)?;
        Ok(())
    }
}

impl ConfigProvider for Settings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn timeout_seconds(&self) -> Option<u64> {
        self.timeout_seconds
    }

    fn preview_rows(&self) -> usize {
        self.preview_rows
    }

    fn save_plots(&self) -> bool {
        self.save_plots
    }

    fn archive(&self) -> bool {
        self.archive
    }
}
