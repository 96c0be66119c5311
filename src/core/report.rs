use crate::core::preview::CsvPreview;
use crate::domain::model::{AnalysisResponse, PredictionResponse};
use std::fmt::Write;

const SCORES_PREVIEW_LEN: usize = 5;

/// Left aligned plain-text table.
#[derive(Debug, Default)]
struct TextTable {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    fn with_header<S: ToString>(header: &[S]) -> Self {
        Self {
            header: Some(header.iter().map(ToString::to_string).collect()),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self) -> String {
        let columns = self
            .header
            .iter()
            .chain(self.rows.iter())
            .map(Vec::len)
            .max()
            .unwrap_or(0);

        let mut widths = vec![0usize; columns];
        for row in self.header.iter().chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let line = |row: &[String]| -> String {
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(&line(header));
            out.push('\n');
            let rule = widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-");
            out.push_str(&rule);
            out.push('\n');
        }
        for row in &self.rows {
            out.push_str(&line(row));
            out.push('\n');
        }
        out
    }
}

pub fn render_preview(preview: &CsvPreview, max_rows: usize) -> String {
    let mut table = TextTable::with_header(preview.headers.as_slice());
    for row in preview.head(max_rows) {
        table.push(row.clone());
    }

    let mut out = table.render();
    if preview.is_truncated(max_rows) {
        let _ = writeln!(
            out,
            "Showing first {} rows of {} total rows",
            max_rows,
            preview.total_rows()
        );
    }
    out
}

pub fn risk_label(prediction: u8) -> &'static str {
    if prediction == 1 {
        "High Risk"
    } else {
        "Low Risk"
    }
}

pub fn render_predictions(predictions: &[u8]) -> String {
    let mut table = TextTable::with_header(&["Row", "Prediction", "Risk Level"]);
    for (index, prediction) in predictions.iter().enumerate() {
        table.push(vec![
            (index + 1).to_string(),
            prediction.to_string(),
            risk_label(*prediction).to_string(),
        ]);
    }
    format!("Prediction Results\n{}", table.render())
}

pub fn format_scores(scores: &[f64], show_all: bool) -> String {
    let shown = if show_all {
        scores
    } else {
        &scores[..scores.len().min(SCORES_PREVIEW_LEN)]
    };
    shown
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(" ; ")
}

pub fn render_metrics(analysis: &AnalysisResponse, show_all_scores: bool) -> String {
    let mut out = String::from("Model Metrics\n");

    let _ = writeln!(out, "\nAccuracy\n{:.4}", analysis.accuracy);

    out.push_str("\nConfusion Matrix\n");
    let mut matrix = TextTable::default();
    for row in &analysis.confusion_matrix {
        matrix.push(row.iter().map(u64::to_string).collect());
    }
    out.push_str(&matrix.render());

    // 依重要性由高到低排列
    out.push_str("\nFeature Importance\n");
    let mut features: Vec<(&String, &f64)> = analysis.feature_importance.iter().collect();
    features.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let mut importance = TextTable::default();
    for (feature, value) in features {
        importance.push(vec![feature.clone(), format!("{:.4}", value)]);
    }
    out.push_str(&importance.render());

    let _ = writeln!(
        out,
        "\nCross-validation Scores\n{}",
        format_scores(&analysis.cross_val_scores, show_all_scores)
    );
    if !show_all_scores && analysis.cross_val_scores.len() > SCORES_PREVIEW_LEN {
        let _ = writeln!(
            out,
            "({} more, use --show-all-scores)",
            analysis.cross_val_scores.len() - SCORES_PREVIEW_LEN
        );
    }

    let _ = writeln!(out, "\nBest Alpha\n{:.4}", analysis.best_alpha);
    out
}

pub fn render_prediction(result: &PredictionResponse) -> String {
    let mut out = String::from("Prediction Result\n");
    let _ = writeln!(
        out,
        "Prediction (0: No Diabetes, 1: Diabetes): {}",
        u8::from(result.prediction)
    );
    let _ = writeln!(out, "Probability: {:.2}%", result.probability * 100.0);
    let _ = writeln!(out, "Risk Level: {}", result.risk_level);
    out
}
