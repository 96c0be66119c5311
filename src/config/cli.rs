use crate::config::toml_config::TomlConfig;
use crate::config::{Settings, SettingsOverrides};
use crate::core::form::PredictionForm;
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "diabetes-risk")]
#[command(about = "Train and query the diabetes risk analysis service")]
pub struct CliConfig {
    #[arg(long, global = true, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Base URL of the analysis service [default: http://localhost:8000]")]
    pub api_url: Option<String>,

    #[arg(long, global = true, help = "Directory for reports and plots [default: ./output]")]
    pub output_path: Option<String>,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log elapsed time and memory per phase")]
    pub monitor: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the first rows of a CSV dataset without uploading it
    Preview {
        file: Option<PathBuf>,

        #[arg(long)]
        rows: Option<usize>,
    },
    /// Upload a CSV dataset to train and evaluate the model
    Analyze {
        file: Option<PathBuf>,

        #[arg(long, help = "Print every cross-validation score")]
        show_all_scores: bool,

        #[arg(long, help = "Do not write the returned plots")]
        no_plots: bool,

        #[arg(long, help = "Bundle the report and plots into a zip file")]
        archive: bool,
    },
    /// Predict diabetes risk from eight health metrics
    Predict(PredictArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct PredictArgs {
    #[arg(long, help = "JSON file with the health metrics")]
    pub input: Option<PathBuf>,

    #[arg(long)]
    pub pregnancies: Option<String>,
    #[arg(long)]
    pub glucose: Option<String>,
    #[arg(long)]
    pub blood_pressure: Option<String>,
    #[arg(long)]
    pub skin_thickness: Option<String>,
    #[arg(long)]
    pub insulin: Option<String>,
    #[arg(long)]
    pub bmi: Option<String>,
    #[arg(long)]
    pub diabetes_pedigree: Option<String>,
    #[arg(long)]
    pub age: Option<String>,
}

impl PredictArgs {
    /// Builds the form: values from `--input` first, then each flag on top.
    pub fn to_form(&self) -> Result<PredictionForm> {
        let mut form = match &self.input {
            Some(path) => PredictionForm::from_json(&std::fs::read(path)?)?,
            None => PredictionForm::new(),
        };

        let flags = [
            ("pregnancies", &self.pregnancies),
            ("glucose", &self.glucose),
            ("blood_pressure", &self.blood_pressure),
            ("skin_thickness", &self.skin_thickness),
            ("insulin", &self.insulin),
            ("bmi", &self.bmi),
            ("diabetes_pedigree", &self.diabetes_pedigree),
            ("age", &self.age),
        ];
        for (field, raw) in flags {
            if let Some(raw) = raw {
                form.set(field, raw)?;
            }
        }

        Ok(form)
    }
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        let mut overrides = SettingsOverrides {
            api_base_url: self.api_url.clone(),
            timeout_seconds: self.timeout_seconds,
            output_path: self.output_path.clone(),
            ..SettingsOverrides::default()
        };

        match &self.command {
            Command::Preview { rows, .. } => overrides.preview_rows = *rows,
            Command::Analyze {
                no_plots, archive, ..
            } => {
                // 只有明確指定的旗標才覆蓋設定檔
                if *no_plots {
                    overrides.save_plots = Some(false);
                }
                if *archive {
                    overrides.archive = Some(true);
                }
            }
            Command::Predict(_) => {}
        }

        overrides
    }

    pub fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };
        Settings::resolve(file.as_ref(), &self.overrides())
    }
}
