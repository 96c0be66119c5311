use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Columns the analysis service expects in an uploaded dataset.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

/// Result of `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    // 服務端目前不一定回傳逐列預測
    #[serde(default)]
    pub predictions: Vec<u8>,
    pub accuracy: f64,
    pub confusion_matrix: Vec<Vec<u64>>,
    pub feature_importance: BTreeMap<String, f64>,
    pub cross_val_scores: Vec<f64>,
    pub best_alpha: f64,
    pub plots: AnalysisPlots,
}

/// Base64 encoded PNG figures. A figure the service failed to render is `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisPlots {
    #[serde(default)]
    pub decision_tree: Option<String>,
    #[serde(default)]
    pub confusion_matrix: Option<String>,
    #[serde(default)]
    pub accuracy_vs_alpha: Option<String>,
}

impl AnalysisPlots {
    pub fn entries(&self) -> [(&'static str, Option<&str>); 3] {
        [
            ("decision_tree", self.decision_tree.as_deref()),
            ("confusion_matrix", self.confusion_matrix.as_deref()),
            ("accuracy_vs_alpha", self.accuracy_vs_alpha.as_deref()),
        ]
    }
}

/// Body of `POST /api/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub pregnancies: f64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
    pub age: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Diagnosis {
    NoDiabetes,
    Diabetes,
}

impl TryFrom<u8> for Diagnosis {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::NoDiabetes),
            1 => Ok(Self::Diabetes),
            other => Err(format!("prediction must be 0 or 1, got {}", other)),
        }
    }
}

impl From<Diagnosis> for u8 {
    fn from(value: Diagnosis) -> Self {
        match value {
            Diagnosis::NoDiabetes => 0,
            Diagnosis::Diabetes => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Average,
    High,
}

impl RiskLevel {
    /// Same buckets the service applies to the positive-class probability.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.3 {
            Self::Low
        } else if probability < 0.7 {
            Self::Average
        } else {
            Self::High
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "Low",
            Self::Average => "Average",
            Self::High => "High",
        };
        f.write_str(label)
    }
}

/// Result of `POST /api/predict`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: Diagnosis,
    pub probability: f64,
    pub risk_level: RiskLevel,
}
