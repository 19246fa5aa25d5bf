use serde::{Deserialize, Serialize};

use super::enums::{ConditionSeverity, EvidenceLevel, TreatmentLine};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalCondition {
    pub id: i64,
    pub condition_name: String,
    pub category: String,
    pub description: Option<String>,
    pub symptoms: Option<String>,
    pub prevalence: Option<String>,
    pub severity_level: Option<ConditionSeverity>,
}

impl MedicalCondition {
    pub fn new(condition_name: &str, category: &str) -> Self {
        Self {
            id: 0,
            condition_name: condition_name.to_string(),
            category: category.to_string(),
            description: None,
            symptoms: None,
            prevalence: None,
            severity_level: None,
        }
    }
}

/// A medicine listed as treatment for a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTreatment {
    pub id: i64,
    pub condition_name: String,
    pub medicine_name: String,
    pub effectiveness_rating: Option<i64>,
    pub dosage_recommendations: Option<String>,
    pub treatment_line: Option<TreatmentLine>,
    pub contraindications: Option<String>,
    pub special_considerations: Option<String>,
    pub evidence_level: Option<EvidenceLevel>,
}

impl ConditionTreatment {
    pub fn new(condition_name: &str, medicine_name: &str) -> Self {
        Self {
            id: 0,
            condition_name: condition_name.to_string(),
            medicine_name: medicine_name.to_string(),
            effectiveness_rating: None,
            dosage_recommendations: None,
            treatment_line: None,
            contraindications: None,
            special_considerations: None,
            evidence_level: None,
        }
    }
}

/// Treatment joined with the condition's category and severity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatmentOption {
    pub treatment: ConditionTreatment,
    pub category: String,
    pub severity_level: Option<ConditionSeverity>,
}

/// Condition joined with the treatment details for one medicine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreatedCondition {
    pub condition: MedicalCondition,
    pub effectiveness_rating: Option<i64>,
    pub dosage_recommendations: Option<String>,
    pub treatment_line: Option<TreatmentLine>,
    pub evidence_level: Option<EvidenceLevel>,
}
