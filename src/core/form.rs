use crate::domain::model::PredictionInput;
use crate::utils::error::{Result, RiskClientError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthField {
    Pregnancies,
    Glucose,
    BloodPressure,
    SkinThickness,
    Insulin,
    Bmi,
    DiabetesPedigree,
    Age,
}

impl HealthField {
    pub const ALL: [HealthField; 8] = [
        Self::Pregnancies,
        Self::Glucose,
        Self::BloodPressure,
        Self::SkinThickness,
        Self::Insulin,
        Self::Bmi,
        Self::DiabetesPedigree,
        Self::Age,
    ];

    /// Wire name used in the prediction request body.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pregnancies => "pregnancies",
            Self::Glucose => "glucose",
            Self::BloodPressure => "blood_pressure",
            Self::SkinThickness => "skin_thickness",
            Self::Insulin => "insulin",
            Self::Bmi => "bmi",
            Self::DiabetesPedigree => "diabetes_pedigree",
            Self::Age => "age",
        }
    }
}

impl fmt::Display for HealthField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HealthField {
    type Err = RiskClientError;

    fn from_str(s: &str) -> Result<Self> {
        // CLI 旗標使用連字號，JSON 使用底線
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|field| field.name() == normalized)
            .ok_or_else(|| RiskClientError::UnknownField {
                field: s.to_string(),
            })
    }
}

/// Prediction form state. Every field starts empty and the form can only be
/// submitted once all eight are filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionForm {
    pub pregnancies: Option<f64>,
    pub glucose: Option<f64>,
    pub blood_pressure: Option<f64>,
    pub skin_thickness: Option<f64>,
    pub insulin: Option<f64>,
    pub bmi: Option<f64>,
    pub diabetes_pedigree: Option<f64>,
    pub age: Option<f64>,
}

impl PredictionForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }

    fn slot(&mut self, field: HealthField) -> &mut Option<f64> {
        match field {
            HealthField::Pregnancies => &mut self.pregnancies,
            HealthField::Glucose => &mut self.glucose,
            HealthField::BloodPressure => &mut self.blood_pressure,
            HealthField::SkinThickness => &mut self.skin_thickness,
            HealthField::Insulin => &mut self.insulin,
            HealthField::Bmi => &mut self.bmi,
            HealthField::DiabetesPedigree => &mut self.diabetes_pedigree,
            HealthField::Age => &mut self.age,
        }
    }

    pub fn get(&self, field: HealthField) -> Option<f64> {
        match field {
            HealthField::Pregnancies => self.pregnancies,
            HealthField::Glucose => self.glucose,
            HealthField::BloodPressure => self.blood_pressure,
            HealthField::SkinThickness => self.skin_thickness,
            HealthField::Insulin => self.insulin,
            HealthField::Bmi => self.bmi,
            HealthField::DiabetesPedigree => self.diabetes_pedigree,
            HealthField::Age => self.age,
        }
    }

    pub fn set_value(&mut self, field: HealthField, value: Option<f64>) {
        *self.slot(field) = value;
    }

    /// Parses raw input for a field. An empty string clears the field.
    pub fn set(&mut self, field: &str, raw: &str) -> Result<()> {
        let field: HealthField = field.parse()?;
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            self.set_value(field, None);
            return Ok(());
        }

        let value = trimmed
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| RiskClientError::InvalidFieldValue {
                field: field.name().to_string(),
                value: raw.to_string(),
            })?;

        self.set_value(field, Some(value));
        Ok(())
    }

    /// Copies every filled field of `other` over this form.
    pub fn merge(&mut self, other: &PredictionForm) {
        for field in HealthField::ALL {
            if let Some(value) = other.get(field) {
                self.set_value(field, Some(value));
            }
        }
    }

    pub fn missing_fields(&self) -> Vec<HealthField> {
        HealthField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn submit(&self) -> Result<PredictionInput> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(RiskClientError::FormIncomplete {
                missing: missing.iter().map(|f| f.name().to_string()).collect(),
            });
        }

        let value = |field: HealthField| self.get(field).unwrap_or_default();
        Ok(PredictionInput {
            pregnancies: value(HealthField::Pregnancies),
            glucose: value(HealthField::Glucose),
            blood_pressure: value(HealthField::BloodPressure),
            skin_thickness: value(HealthField::SkinThickness),
            insulin: value(HealthField::Insulin),
            bmi: value(HealthField::Bmi),
            diabetes_pedigree: value(HealthField::DiabetesPedigree),
            age: value(HealthField::Age),
        })
    }
}
