use serde::Serialize;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::enums::{EvidenceLevel, TreatmentLine};
use crate::models::*;

#[derive(Error, Debug)]
pub enum IntelligenceError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// ---------------------------------------------------------------------------
// MedicalInsight
// ---------------------------------------------------------------------------

/// Everything the reference tables know about one medicine, plus derived advice.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MedicalInsight {
    pub medicine_name: String,
    pub condition: Option<String>,
    pub basic_info: Option<Medicine>,
    pub interactions: Vec<Interaction>,
    pub side_effects: Vec<SideEffect>,
    pub dosage_guidelines: Vec<DosageGuideline>,
    pub age_appropriateness: Option<AgeAppropriateness>,
    pub effectiveness_data: Vec<EffectivenessRecord>,
    pub conditions_treated: Vec<TreatedCondition>,
    pub prescription_patterns: Vec<PrescriptionPattern>,
    pub common_combinations: Vec<CommonCombination>,
    pub safety_warnings: Vec<String>,
    pub clinical_recommendations: Vec<String>,
    pub monitoring_requirements: Vec<String>,
}

impl MedicalInsight {
    pub fn new(medicine_name: &str, condition: Option<&str>) -> Self {
        Self {
            medicine_name: medicine_name.to_string(),
            condition: condition.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn serious_side_effects(&self) -> impl Iterator<Item = &SideEffect> {
        self.side_effects.iter().filter(|se| se.is_serious())
    }

    /// Side effects at or above `min_percent` frequency, in stored order.
    pub fn frequent_side_effects(&self, min_percent: f64) -> impl Iterator<Item = &SideEffect> {
        self.side_effects.iter().filter(move |se| se.frequency() >= min_percent)
    }
}

// ---------------------------------------------------------------------------
// Prescription safety
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    LowRisk,
    ModerateRisk,
    HighRisk,
}

impl RiskTier {
    /// Tier for a total number of safety concerns.
    pub fn from_concerns(total: usize) -> Self {
        match total {
            0 => Self::LowRisk,
            1..=2 => Self::ModerateRisk,
            _ => Self::HighRisk,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LowRisk => "LOW_RISK",
            Self::ModerateRisk => "MODERATE_RISK",
            Self::HighRisk => "HIGH_RISK",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeIssue {
    pub medicine: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SevereEffectRisk {
    pub medicine: String,
    pub effect: SideEffect,
}

#[derive(Debug, Clone, Serialize)]
pub struct SafetyAnalysis {
    pub medicines: Vec<String>,
    pub interactions_found: Vec<Interaction>,
    pub age_inappropriate: Vec<AgeIssue>,
    pub severe_side_effects: Vec<SevereEffectRisk>,
    pub overall_safety_score: RiskTier,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl SafetyAnalysis {
    pub fn total_concerns(&self) -> usize {
        self.interactions_found.len() + self.age_inappropriate.len() + self.severe_side_effects.len()
    }
}

// ---------------------------------------------------------------------------
// Condition alternatives and insights
// ---------------------------------------------------------------------------

/// A treatment option for a condition, scored for one patient.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionAlternative {
    pub medicine_name: String,
    pub effectiveness_rating: Option<i64>,
    pub treatment_line: Option<TreatmentLine>,
    pub evidence_level: Option<EvidenceLevel>,
    pub suitability_score: f64,
    pub safety_warnings: Vec<String>,
    pub common_side_effects: Vec<SideEffect>,
    pub age_appropriate: bool,
    pub age_restriction_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidelineEvidence {
    High,
    Moderate,
    Low,
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreatmentGuidelines {
    pub first_line_count: usize,
    pub total_options: usize,
    pub evidence_quality: GuidelineEvidence,
    pub most_prescribed: Option<String>,
    /// Success rate of the most prescribed treatment, formatted "NN.N%".
    pub success_rate: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionInsights {
    pub condition: String,
    pub available_treatments: Vec<TreatmentOption>,
    pub first_line_treatments: Vec<ConditionTreatment>,
    pub effectiveness_comparison: Vec<EffectivenessComparison>,
    pub prescription_patterns: PrescriptionSummary,
    pub common_combinations: Vec<CommonCombination>,
    pub treatment_guidelines: TreatmentGuidelines,
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct SideEffectsSummary {
    pub medicine: String,
    pub total_effects: usize,
    pub very_common: usize,
    pub common: usize,
    pub uncommon: usize,
    /// Rare and very rare combined.
    pub rare: usize,
    pub severe_effects: usize,
    pub most_common_effects: Vec<String>,
    pub severe_effects_list: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BestIndication {
    pub condition: String,
    pub effectiveness: i64,
    pub satisfaction: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EffectivenessSummary {
    pub medicine: String,
    pub conditions_treated: usize,
    pub average_effectiveness: Option<f64>,
    pub average_satisfaction: Option<f64>,
    pub average_response_time: Option<f64>,
    pub best_indication: Option<BestIndication>,
    pub high_quality_evidence: usize,
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MostCommonTreatment {
    pub primary: String,
    pub secondary: Option<String>,
    pub frequency: Option<f64>,
    pub success_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrendCounts {
    pub increasing: usize,
    pub stable: usize,
    pub decreasing: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PrescriptionSummary {
    pub condition: String,
    pub patterns_found: usize,
    pub combinations_found: usize,
    pub most_common_treatment: Option<MostCommonTreatment>,
    pub average_success_rate: Option<f64>,
    pub trend_analysis: TrendCounts,
    pub high_quality_patterns: usize,
    pub percentage_high_quality: f64,
    pub top_medicines: Vec<String>,
    pub specialties_prescribing: Vec<String>,
}
