use std::collections::HashSet;

use super::{
    BestIndication, ClinicalIntelligence, EffectivenessSummary, IntelligenceError, MostCommonTreatment,
    PrescriptionSummary, SideEffectsSummary, TrendCounts,
};
use crate::db::repository::*;
use crate::models::enums::{EvidenceLevel, EvidenceQuality, FrequencyCategory, TrendDirection};
use crate::models::round_to;

const TOP_EFFECTS: usize = 3;
const TOP_MEDICINE_WINDOW: usize = 5;

fn average(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (count > 0).then(|| round_to(sum / count as f64, 1))
}

/// Keep the first occurrence of each value.
fn distinct(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(v.clone())).collect()
}

impl ClinicalIntelligence<'_> {
    pub fn side_effects_summary(&self, medicine: &str) -> Result<SideEffectsSummary, IntelligenceError> {
        let effects = get_side_effects_for_medicine(self.conn, medicine)?;
        let count_category = |pred: fn(FrequencyCategory) -> bool| {
            effects
                .iter()
                .filter(|e| e.frequency_category.is_some_and(pred))
                .count()
        };

        Ok(SideEffectsSummary {
            medicine: medicine.to_string(),
            total_effects: effects.len(),
            very_common: count_category(|c| c == FrequencyCategory::VeryCommon),
            common: count_category(|c| c == FrequencyCategory::Common),
            uncommon: count_category(|c| c == FrequencyCategory::Uncommon),
            rare: count_category(|c| matches!(c, FrequencyCategory::Rare | FrequencyCategory::VeryRare)),
            severe_effects: effects.iter().filter(|e| e.is_serious()).count(),
            most_common_effects: effects.iter().take(TOP_EFFECTS).map(|e| e.side_effect.clone()).collect(),
            severe_effects_list: effects
                .iter()
                .filter(|e| e.is_serious())
                .map(|e| e.side_effect.clone())
                .collect(),
        })
    }

    pub fn effectiveness_summary(&self, medicine: &str) -> Result<EffectivenessSummary, IntelligenceError> {
        let records = get_effectiveness_for_medicine(self.conn, medicine)?;

        let best_indication = records
            .iter()
            .reduce(|best, r| if r.effectiveness_rating > best.effectiveness_rating { r } else { best })
            .map(|r| BestIndication {
                condition: r.condition.clone(),
                effectiveness: r.effectiveness_rating,
                satisfaction: r.patient_satisfaction,
            });

        Ok(EffectivenessSummary {
            medicine: medicine.to_string(),
            conditions_treated: records.len(),
            average_effectiveness: average(records.iter().map(|r| r.effectiveness_rating as f64)),
            average_satisfaction: average(records.iter().map(|r| r.patient_satisfaction as f64)),
            average_response_time: average(records.iter().filter_map(|r| r.response_time_days).map(|d| d as f64)),
            best_indication,
            high_quality_evidence: records
                .iter()
                .filter(|r| r.evidence_quality == Some(EvidenceQuality::High))
                .count(),
            conditions: records.iter().map(|r| r.condition.clone()).collect(),
        })
    }

    pub fn prescription_summary(&self, condition: &str) -> Result<PrescriptionSummary, IntelligenceError> {
        let patterns = get_patterns_for_condition(self.conn, condition)?;
        let combinations = get_common_combinations_for_condition(self.conn, condition)?;

        let trend = |direction: TrendDirection| patterns.iter().filter(|p| p.trend_direction == Some(direction)).count();
        let high_quality_patterns = patterns
            .iter()
            .filter(|p| p.evidence_level == Some(EvidenceLevel::High))
            .count();
        let percentage_high_quality = if patterns.is_empty() {
            0.0
        } else {
            round_to(high_quality_patterns as f64 / patterns.len() as f64 * 100.0, 1)
        };

        Ok(PrescriptionSummary {
            condition: condition.to_string(),
            patterns_found: patterns.len(),
            combinations_found: combinations.len(),
            most_common_treatment: patterns.first().map(|p| MostCommonTreatment {
                primary: p.primary_medicine.clone(),
                secondary: p.secondary_medicine.clone(),
                frequency: p.prescription_frequency,
                success_rate: p.success_rate,
            }),
            average_success_rate: average(patterns.iter().filter_map(|p| p.success_rate)),
            trend_analysis: TrendCounts {
                increasing: trend(TrendDirection::Increasing),
                stable: trend(TrendDirection::Stable),
                decreasing: trend(TrendDirection::Decreasing),
            },
            high_quality_patterns,
            percentage_high_quality,
            top_medicines: distinct(
                patterns
                    .iter()
                    .take(TOP_MEDICINE_WINDOW)
                    .map(|p| p.primary_medicine.clone()),
            ),
            specialties_prescribing: distinct(patterns.iter().filter_map(|p| p.specialty.clone())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::fixtures::clinical_db;

    #[test]
    fn side_effect_counts_by_category() {
        let conn = clinical_db();
        let summary = ClinicalIntelligence::new(&conn).side_effects_summary("Aspirin").unwrap();
        assert_eq!(summary.total_effects, 3);
        assert_eq!((summary.very_common, summary.common, summary.uncommon, summary.rare), (1, 1, 0, 1));
        assert_eq!(summary.severe_effects, 2);
        assert_eq!(summary.most_common_effects, vec!["Stomach upset", "GI bleeding", "Reye's syndrome"]);
        assert_eq!(summary.severe_effects_list, vec!["GI bleeding", "Reye's syndrome"]);
    }

    #[test]
    fn effectiveness_averages_skip_missing_response_times() {
        let conn = clinical_db();
        let summary = ClinicalIntelligence::new(&conn).effectiveness_summary("Aspirin").unwrap();
        assert_eq!(summary.conditions_treated, 2);
        assert_eq!(summary.average_effectiveness, Some(72.5));
        assert_eq!(summary.average_satisfaction, Some(67.5));
        assert_eq!(summary.average_response_time, None);
        let best = summary.best_indication.unwrap();
        assert_eq!((best.condition.as_str(), best.effectiveness, best.satisfaction), ("Fever", 75, 70));
        assert_eq!(summary.high_quality_evidence, 0);
        assert_eq!(summary.conditions, vec!["Fever", "Headache"]);
    }

    #[test]
    fn empty_effectiveness_summary() {
        let conn = clinical_db();
        let summary = ClinicalIntelligence::new(&conn).effectiveness_summary("Unknown").unwrap();
        assert_eq!(summary.conditions_treated, 0);
        assert!(summary.average_effectiveness.is_none());
        assert!(summary.best_indication.is_none());
    }

    #[test]
    fn prescription_summary_for_fever() {
        let conn = clinical_db();
        let summary = ClinicalIntelligence::new(&conn).prescription_summary("Fever").unwrap();
        assert_eq!(summary.patterns_found, 2);
        assert_eq!(summary.combinations_found, 1);

        let top = summary.most_common_treatment.unwrap();
        assert_eq!(top.primary, "Paracetamol");
        assert_eq!(top.frequency, Some(60.0));
        assert_eq!(top.success_rate, Some(88.0));

        assert_eq!(summary.average_success_rate, Some(85.5));
        assert_eq!(summary.trend_analysis, TrendCounts { increasing: 1, stable: 1, decreasing: 0 });
        assert_eq!(summary.high_quality_patterns, 1);
        assert_eq!(summary.percentage_high_quality, 50.0);
        assert_eq!(summary.top_medicines, vec!["Paracetamol", "Ibuprofen"]);
        assert_eq!(summary.specialties_prescribing, vec!["General Practice", "Pediatrics"]);
    }

    #[test]
    fn prescription_summary_without_patterns() {
        let conn = clinical_db();
        let summary = ClinicalIntelligence::new(&conn).prescription_summary("Gout").unwrap();
        assert_eq!(summary.patterns_found, 0);
        assert!(summary.most_common_treatment.is_none());
        assert_eq!(summary.percentage_high_quality, 0.0);
    }
}
