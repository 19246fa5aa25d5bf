use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::enums::EvidenceQuality;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectivenessRecord {
    pub id: i64,
    pub medicine_name: String,
    pub condition: String,
    pub effectiveness_rating: i64,
    pub patient_satisfaction: i64,
    pub response_time_days: Option<i64>,
    pub complete_cure_rate: Option<f64>,
    pub improvement_rate: Option<f64>,
    pub sample_size: Option<i64>,
    pub study_duration_weeks: Option<i64>,
    pub age_group: Option<String>,
    pub nnt: Option<i64>,
    pub adherence_rate: Option<f64>,
    pub discontinuation_rate: Option<f64>,
    pub evidence_quality: Option<EvidenceQuality>,
    pub data_source: Option<String>,
    pub last_updated: Option<NaiveDate>,
}

impl EffectivenessRecord {
    pub fn new(medicine_name: &str, condition: &str, effectiveness_rating: i64, patient_satisfaction: i64) -> Self {
        Self {
            id: 0,
            medicine_name: medicine_name.to_string(),
            condition: condition.to_string(),
            effectiveness_rating,
            patient_satisfaction,
            response_time_days: None,
            complete_cure_rate: None,
            improvement_rate: None,
            sample_size: None,
            study_duration_weeks: None,
            age_group: None,
            nnt: None,
            adherence_rate: None,
            discontinuation_rate: None,
            evidence_quality: None,
            data_source: None,
            last_updated: None,
        }
    }
}

/// Side-by-side row used when comparing medicines for one condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectivenessComparison {
    pub medicine_name: String,
    pub effectiveness_rating: i64,
    pub patient_satisfaction: i64,
    pub response_time_days: Option<i64>,
    pub adherence_rate: Option<f64>,
    pub discontinuation_rate: Option<f64>,
    pub nnt: Option<i64>,
    pub evidence_quality: Option<EvidenceQuality>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatisfactionRank {
    pub medicine_name: String,
    pub condition: String,
    pub patient_satisfaction: i64,
    pub effectiveness_rating: i64,
}
