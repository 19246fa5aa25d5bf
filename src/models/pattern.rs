use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::{EvidenceLevel, GuidelineAdherence, TrendDirection};

/// How often a medicine (optionally paired) is prescribed for a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionPattern {
    pub id: i64,
    pub condition: String,
    pub primary_medicine: String,
    pub secondary_medicine: Option<String>,
    pub prescription_frequency: Option<f64>,
    pub success_rate: Option<f64>,
    pub age_group: Option<String>,
    pub specialty: Option<String>,
    pub seasonal_trend: Option<String>,
    pub duration_days: Option<i64>,
    pub dose_pattern: Option<String>,
    pub combination_rationale: Option<String>,
    pub monitoring_requirements: Option<String>,
    pub cost_effectiveness: Option<String>,
    pub guideline_adherence: Option<GuidelineAdherence>,
    pub evidence_level: Option<EvidenceLevel>,
    pub trend_direction: Option<TrendDirection>,
    pub last_updated: Option<NaiveDate>,
}

impl PrescriptionPattern {
    pub fn new(condition: &str, primary_medicine: &str) -> Self {
        Self {
            id: 0,
            condition: condition.to_string(),
            primary_medicine: primary_medicine.to_string(),
            secondary_medicine: None,
            prescription_frequency: None,
            success_rate: None,
            age_group: None,
            specialty: None,
            seasonal_trend: None,
            duration_days: None,
            dose_pattern: None,
            combination_rationale: None,
            monitoring_requirements: None,
            cost_effectiveness: None,
            guideline_adherence: None,
            evidence_level: None,
            trend_direction: None,
            last_updated: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonCombination {
    pub id: i64,
    pub condition: String,
    pub medicine1: String,
    pub medicine2: String,
    pub medicine3: Option<String>,
    pub combination_frequency: Option<f64>,
    pub synergy_score: Option<f64>,
    pub safety_profile: Option<String>,
    pub monitoring_needs: Option<String>,
    pub typical_duration: Option<String>,
    pub warnings: Option<String>,
}

impl CommonCombination {
    pub fn new(condition: &str, medicine1: &str, medicine2: &str) -> Self {
        Self {
            id: 0,
            condition: condition.to_string(),
            medicine1: medicine1.to_string(),
            medicine2: medicine2.to_string(),
            medicine3: None,
            combination_frequency: None,
            synergy_score: None,
            safety_profile: None,
            monitoring_needs: None,
            typical_duration: None,
            warnings: None,
        }
    }
}
