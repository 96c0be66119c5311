use crate::domain::model::AnalysisResponse;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_FILE: &str = "analysis.json";
pub const ARCHIVE_FILE: &str = "analysis_bundle.zip";
const PLOTS_DIR: &str = "plots";

/// analysis.json 的內容，圖片另存為 PNG
#[derive(Debug, Serialize)]
struct AnalysisReport<'a> {
    generated_at: DateTime<Utc>,
    source_file: &'a str,
    accuracy: f64,
    best_alpha: f64,
    confusion_matrix: &'a [Vec<u64>],
    feature_importance: &'a BTreeMap<String, f64>,
    cross_val_scores: &'a [f64],
    predictions: &'a [u8],
    plots: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ArtifactOptions {
    pub save_plots: bool,
    pub archive: bool,
}

/// What was written locally. `error` is set when saving stopped part way;
/// the analysis itself is still valid in that case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedArtifacts {
    pub report: String,
    pub plots: Vec<String>,
    pub skipped_plots: Vec<String>,
    pub archive: Option<String>,
    pub error: Option<String>,
}

pub fn decode_plot(encoded: &str) -> Result<Vec<u8>> {
    // 容忍 data URL 前綴
    let encoded = encoded
        .strip_prefix("data:image/png;base64,")
        .unwrap_or(encoded);
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}

/// Decodes the plots that the service rendered.
///
/// `null` entries and entries that are not valid base64 are skipped; the
/// second list holds the names of the undecodable ones.
pub fn decode_plots(analysis: &AnalysisResponse) -> (Vec<(String, Vec<u8>)>, Vec<String>) {
    let mut plots = Vec::new();
    let mut skipped = Vec::new();
    for (name, encoded) in analysis.plots.entries() {
        let Some(encoded) = encoded.filter(|e| !e.is_empty()) else {
            tracing::warn!("Plot '{}' was not rendered by the service", name);
            continue;
        };
        match decode_plot(encoded) {
            Ok(bytes) => plots.push((format!("{}/{}.png", PLOTS_DIR, name), bytes)),
            Err(e) => {
                tracing::warn!("⚠️ Skipping plot '{}': {}", name, e);
                skipped.push(name.to_string());
            }
        }
    }
    (plots, skipped)
}

pub async fn save_analysis<S: Storage>(
    storage: &S,
    source_file: &str,
    analysis: &AnalysisResponse,
    options: &ArtifactOptions,
) -> Result<SavedArtifacts> {
    let mut saved = SavedArtifacts::default();

    let plots = if options.save_plots || options.archive {
        let (plots, skipped) = decode_plots(analysis);
        saved.skipped_plots = skipped;
        plots
    } else {
        Vec::new()
    };

    if options.save_plots {
        for (path, bytes) in &plots {
            tracing::debug!("Writing plot {} ({} bytes)", path, bytes.len());
            storage.write_file(path, bytes).await?;
            saved.plots.push(storage.location(path));
        }
    }

    let report = AnalysisReport {
        generated_at: Utc::now(),
        source_file,
        accuracy: analysis.accuracy,
        best_alpha: analysis.best_alpha,
        confusion_matrix: &analysis.confusion_matrix,
        feature_importance: &analysis.feature_importance,
        cross_val_scores: &analysis.cross_val_scores,
        predictions: &analysis.predictions,
        plots: plots.iter().map(|(path, _)| path.clone()).collect(),
    };
    let report_json = serde_json::to_vec_pretty(&report)?;
    storage.write_file(REPORT_FILE, &report_json).await?;
    saved.report = storage.location(REPORT_FILE);

    if options.archive {
        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            zip.start_file::<_, ()>(REPORT_FILE, FileOptions::default())?;
            zip.write_all(&report_json)?;

            for (path, bytes) in &plots {
                zip.start_file::<_, ()>(path.as_str(), FileOptions::default())?;
                zip.write_all(bytes)?;
            }

            zip.finish()?.into_inner()
        };

        tracing::debug!("Writing archive ({} bytes)", zip_data.len());
        storage.write_file(ARCHIVE_FILE, &zip_data).await?;
        saved.archive = Some(storage.location(ARCHIVE_FILE));
    }

    Ok(saved)
}
