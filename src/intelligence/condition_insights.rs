use super::{
    ClinicalIntelligence, ConditionInsights, GuidelineEvidence, IntelligenceError, PrescriptionSummary,
    TreatmentGuidelines,
};
use crate::db::repository::*;
use crate::models::enums::EvidenceLevel;
use crate::models::TreatmentOption;

impl ClinicalIntelligence<'_> {
    /// Everything known about treating one condition.
    pub fn get_condition_insights(&self, condition: &str) -> Result<ConditionInsights, IntelligenceError> {
        let available_treatments = get_medicines_for_condition(self.conn, condition)?;
        let first_line_treatments = get_first_line_treatments(self.conn, condition)?;
        let effectiveness_comparison = compare_medicines_for_condition(self.conn, condition)?;
        let prescription_patterns = self.prescription_summary(condition)?;
        let common_combinations = get_common_combinations_for_condition(self.conn, condition)?;

        let treatment_guidelines = treatment_guidelines(
            &available_treatments,
            first_line_treatments.len(),
            &prescription_patterns,
        );

        Ok(ConditionInsights {
            condition: condition.to_string(),
            available_treatments,
            first_line_treatments,
            effectiveness_comparison,
            prescription_patterns,
            common_combinations,
            treatment_guidelines,
        })
    }
}

fn treatment_guidelines(
    options: &[TreatmentOption],
    first_line_count: usize,
    patterns: &PrescriptionSummary,
) -> TreatmentGuidelines {
    let total = options.len();
    let high = options
        .iter()
        .filter(|o| o.treatment.evidence_level == Some(EvidenceLevel::High))
        .count();

    // Ratios compared in integers: 70% and 40% of total
    let evidence_quality = if total == 0 {
        GuidelineEvidence::Unknown
    } else if high * 10 >= total * 7 {
        GuidelineEvidence::High
    } else if high * 10 >= total * 4 {
        GuidelineEvidence::Moderate
    } else {
        GuidelineEvidence::Low
    };

    let most_common = patterns.most_common_treatment.as_ref();
    TreatmentGuidelines {
        first_line_count,
        total_options: total,
        evidence_quality,
        most_prescribed: most_common.map(|t| t.primary.clone()),
        success_rate: most_common
            .and_then(|t| t.success_rate)
            .map(|rate| format!("{rate:.1}%")),
    }
}
