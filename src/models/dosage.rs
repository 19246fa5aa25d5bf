use serde::{Deserialize, Serialize};

use super::enums::EvidenceLevel;

/// Marker used in `recommended_dose` for age bands where the medicine must not be given.
pub const CONTRAINDICATED_MARKER: &str = "CONTRAINDICATED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosageGuideline {
    pub id: i64,
    pub medicine_name: String,
    pub age_group: String,
    pub min_age_months: Option<i64>,
    pub max_age_months: Option<i64>,
    pub min_weight_kg: Option<f64>,
    pub max_weight_kg: Option<f64>,
    pub recommended_dose: String,
    pub max_daily_dose: Option<String>,
    pub frequency: Option<String>,
    pub administration_method: Option<String>,
    pub special_instructions: Option<String>,
    pub contraindications: Option<String>,
    pub renal_adjustment: Option<String>,
    pub hepatic_adjustment: Option<String>,
    pub indication: Option<String>,
    pub evidence_level: Option<EvidenceLevel>,
}

impl DosageGuideline {
    pub fn new(medicine_name: &str, age_group: &str, recommended_dose: &str) -> Self {
        Self {
            id: 0,
            medicine_name: medicine_name.to_string(),
            age_group: age_group.to_string(),
            min_age_months: None,
            max_age_months: None,
            min_weight_kg: None,
            max_weight_kg: None,
            recommended_dose: recommended_dose.to_string(),
            max_daily_dose: None,
            frequency: None,
            administration_method: None,
            special_instructions: None,
            contraindications: None,
            renal_adjustment: None,
            hepatic_adjustment: None,
            indication: None,
            evidence_level: None,
        }
    }

    pub fn with_age_months(mut self, min: i64, max: i64) -> Self {
        self.min_age_months = Some(min);
        self.max_age_months = Some(max);
        self
    }

    pub fn with_weight_kg(mut self, min: f64, max: f64) -> Self {
        self.min_weight_kg = Some(min);
        self.max_weight_kg = Some(max);
        self
    }

    pub fn is_contraindicated(&self) -> bool {
        self.recommended_dose.contains(CONTRAINDICATED_MARKER)
    }
}

/// An age band a medicine has guidance for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeBand {
    pub age_group: String,
    pub min_age_months: Option<i64>,
    pub max_age_months: Option<i64>,
}

/// Outcome of checking a medicine against a patient's age.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeAppropriateness {
    pub appropriate: bool,
    pub reason: Option<String>,
    pub available_ages: Vec<AgeBand>,
    pub contraindications: Vec<String>,
    pub guidelines: Vec<DosageGuideline>,
}

impl AgeAppropriateness {
    pub fn appropriate(guidelines: Vec<DosageGuideline>) -> Self {
        Self {
            appropriate: true,
            reason: None,
            available_ages: vec![],
            contraindications: vec![],
            guidelines,
        }
    }

    pub fn inappropriate(reason: String) -> Self {
        Self {
            appropriate: false,
            reason: Some(reason),
            available_ages: vec![],
            contraindications: vec![],
            guidelines: vec![],
        }
    }
}
