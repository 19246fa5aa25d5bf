use super::{ClinicalIntelligence, ConditionAlternative, IntelligenceError, MedicalInsight, PatientContext};
use crate::db::repository::get_medicines_for_condition;
use crate::models::enums::EvidenceLevel;

const EFFECTIVENESS_WEIGHT: f64 = 0.4;
const SAFETY_WEIGHT: f64 = 0.3;
const EVIDENCE_WEIGHT: f64 = 0.2;
const PENALTY_PER_SERIOUS_EFFECT: f64 = 20.0;
const AGE_APPROPRIATE_BONUS: f64 = 10.0;
const AGE_INAPPROPRIATE_PENALTY: f64 = 30.0;
const MAX_LISTED: usize = 3;

/// Weighted score of how well `insight`'s medicine fits `condition`, capped at 100.
/// Age-inappropriate medicines can go negative.
pub fn calculate_suitability_score(insight: &MedicalInsight, condition: &str) -> f64 {
    let mut score = 0.0;

    if let Some(record) = insight
        .effectiveness_data
        .iter()
        .find(|r| r.condition.eq_ignore_ascii_case(condition))
    {
        score += record.effectiveness_rating as f64 * EFFECTIVENESS_WEIGHT;
    }

    let serious = insight.serious_side_effects().count() as f64;
    score += (100.0 - PENALTY_PER_SERIOUS_EFFECT * serious).max(0.0) * SAFETY_WEIGHT;

    for treated in insight
        .conditions_treated
        .iter()
        .filter(|t| t.condition.condition_name.eq_ignore_ascii_case(condition))
    {
        let level = treated.evidence_level.unwrap_or(EvidenceLevel::Low);
        score += level.bonus() * EVIDENCE_WEIGHT;
    }

    match &insight.age_appropriateness {
        Some(age) if age.appropriate => score += AGE_APPROPRIATE_BONUS,
        Some(_) => score -= AGE_INAPPROPRIATE_PENALTY,
        None => {}
    }

    score.min(100.0)
}

impl ClinicalIntelligence<'_> {
    /// Treatments of `condition` other than `exclude`, best suited first.
    pub fn find_alternatives_for_condition(
        &self,
        condition: &str,
        exclude: &[String],
        age_months: Option<i64>,
    ) -> Result<Vec<ConditionAlternative>, IntelligenceError> {
        let mut alternatives = Vec::new();

        for option in get_medicines_for_condition(self.conn, condition)? {
            let treatment = option.treatment;
            if exclude
                .iter()
                .any(|e| e.trim().eq_ignore_ascii_case(&treatment.medicine_name))
            {
                continue;
            }

            let insight = self.get_comprehensive_medicine_info(
                &treatment.medicine_name,
                &PatientContext {
                    age_months,
                    condition: Some(condition),
                    ..Default::default()
                },
            )?;

            let suitability_score = calculate_suitability_score(&insight, condition);
            let (age_appropriate, age_restriction_reason) = match &insight.age_appropriateness {
                Some(age) => (age.appropriate, age.reason.clone()),
                None => (true, None),
            };

            alternatives.push(ConditionAlternative {
                effectiveness_rating: treatment.effectiveness_rating,
                treatment_line: treatment.treatment_line,
                evidence_level: treatment.evidence_level,
                suitability_score,
                safety_warnings: insight.safety_warnings.iter().take(MAX_LISTED).cloned().collect(),
                common_side_effects: insight
                    .frequent_side_effects(super::MONITOR_FREQUENCY_PERCENT)
                    .take(MAX_LISTED)
                    .cloned()
                    .collect(),
                age_appropriate,
                age_restriction_reason,
                medicine_name: treatment.medicine_name,
            });
        }

        alternatives.sort_by(|a, b| b.suitability_score.total_cmp(&a.suitability_score));
        tracing::debug!(condition, found = alternatives.len(), "Ranked condition alternatives");
        Ok(alternatives)
    }
}
