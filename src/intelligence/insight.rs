use std::collections::HashSet;

use super::{ClinicalIntelligence, IntelligenceError, MedicalInsight};
use crate::db::repository::*;

const MAX_SAFETY_WARNINGS: usize = 5;
const MAX_RECOMMENDATIONS: usize = 4;
const MAX_MONITORING: usize = 3;

/// Frequency (percent) at which a side effect is worth monitoring for.
pub const MONITOR_FREQUENCY_PERCENT: f64 = 10.0;

/// Optional patient context for a medicine lookup.
#[derive(Debug, Clone, Default)]
pub struct PatientContext<'c> {
    pub age_months: Option<i64>,
    pub weight_kg: Option<f64>,
    pub other_medicines: &'c [String],
    pub condition: Option<&'c str>,
}

impl ClinicalIntelligence<'_> {
    /// Gather every table's data for `medicine` and derive warnings and advice.
    pub fn get_comprehensive_medicine_info(
        &self,
        medicine: &str,
        patient: &PatientContext<'_>,
    ) -> Result<MedicalInsight, IntelligenceError> {
        let medicine = medicine.trim();
        if medicine.is_empty() {
            return Err(IntelligenceError::InvalidInput("medicine name is empty".into()));
        }

        let mut insight = MedicalInsight::new(medicine, patient.condition);
        insight.basic_info = get_medicine_info(self.conn, medicine)?;

        let mut seen = HashSet::new();
        for other in patient.other_medicines {
            if let Some(interaction) = check_interaction(self.conn, medicine, other)? {
                if seen.insert(interaction.id) {
                    insight.interactions.push(interaction);
                }
            }
        }
        for interaction in get_drug_interactions(self.conn, medicine)? {
            if seen.insert(interaction.id) {
                insight.interactions.push(interaction);
            }
        }

        insight.side_effects = get_side_effects_for_medicine(self.conn, medicine)?;

        insight.dosage_guidelines = get_all_dosing_for_medicine(self.conn, medicine)?;
        if let Some(age) = patient.age_months {
            insight.age_appropriateness = Some(check_age_appropriateness(self.conn, medicine, age)?);
            if let Some(weight) = patient.weight_kg {
                let matched = get_dosage_for_age_weight(self.conn, medicine, age, weight)?;
                if !matched.is_empty() {
                    insight.dosage_guidelines = matched;
                }
            }
        }

        insight.effectiveness_data = get_effectiveness_for_medicine(self.conn, medicine)?;
        insight.conditions_treated = get_conditions_for_medicine(self.conn, medicine)?;

        insight.prescription_patterns = get_patterns_for_medicine(self.conn, medicine)?;
        if let Some(condition) = patient.condition {
            insight.common_combinations = get_common_combinations_for_condition(self.conn, condition)?;
        }

        insight.safety_warnings = safety_warnings(&insight);
        insight.clinical_recommendations = clinical_recommendations(&insight);
        insight.monitoring_requirements = monitoring_requirements(&insight);

        tracing::debug!(
            medicine,
            interactions = insight.interactions.len(),
            side_effects = insight.side_effects.len(),
            warnings = insight.safety_warnings.len(),
            "Built medical insight"
        );
        Ok(insight)
    }
}

pub fn safety_warnings(insight: &MedicalInsight) -> Vec<String> {
    let mut warnings = Vec::new();

    for interaction in insight.interactions.iter().filter(|i| i.severity.is_serious()) {
        warnings.push(format!(
            "SEVERE INTERACTION with {}: {}",
            interaction.counterpart(&insight.medicine_name),
            interaction.description
        ));
    }

    for effect in insight.serious_side_effects() {
        match &effect.description {
            Some(description) => warnings.push(format!("SEVERE SIDE EFFECT: {} - {description}", effect.side_effect)),
            None => warnings.push(format!("SEVERE SIDE EFFECT: {}", effect.side_effect)),
        }
    }

    if let Some(age) = insight.age_appropriateness.as_ref().filter(|a| !a.appropriate) {
        warnings.push(format!("AGE RESTRICTION: {}", age.reason.as_deref().unwrap_or_default()));
    }

    if insight.dosage_guidelines.iter().any(|g| g.is_contraindicated()) {
        warnings.push("CONTRAINDICATED in children - see dosage guidelines".to_string());
    }

    warnings.truncate(MAX_SAFETY_WARNINGS);
    warnings
}

pub fn clinical_recommendations(insight: &MedicalInsight) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(guideline) = insight.dosage_guidelines.first() {
        recommendations.push(format!("Recommended dosing: {}", guideline.recommended_dose));
        if let Some(instructions) = &guideline.special_instructions {
            recommendations.push(format!("Special instructions: {instructions}"));
        }
    }

    // First row wins on ties
    let best = insight
        .effectiveness_data
        .iter()
        .reduce(|best, r| if r.effectiveness_rating > best.effectiveness_rating { r } else { best });
    if let Some(best) = best {
        recommendations.push(format!(
            "Most effective for: {} ({}% effective)",
            best.condition, best.effectiveness_rating
        ));
    }

    if let Some(effect) = insight.frequent_side_effects(MONITOR_FREQUENCY_PERCENT).next() {
        recommendations.push(format!(
            "Monitor for: {} ({}% frequency)",
            effect.side_effect,
            effect.frequency()
        ));
    }

    if let Some(secondary) = insight
        .prescription_patterns
        .first()
        .and_then(|p| p.secondary_medicine.as_deref())
    {
        recommendations.push(format!("Often combined with: {secondary}"));
    }

    recommendations.truncate(MAX_RECOMMENDATIONS);
    recommendations
}

pub fn monitoring_requirements(insight: &MedicalInsight) -> Vec<String> {
    let from_guidelines = insight
        .dosage_guidelines
        .iter()
        .filter_map(|g| g.special_instructions.clone());
    let from_patterns = insight
        .prescription_patterns
        .iter()
        .filter_map(|p| p.monitoring_requirements.clone());
    let from_effects = insight
        .serious_side_effects()
        .filter_map(|se| se.when_to_seek_help.as_ref())
        .map(|help| format!("Seek help if: {help}"));

    let mut seen = HashSet::new();
    from_guidelines
        .chain(from_patterns)
        .chain(from_effects)
        .filter(|item| !item.trim().is_empty() && seen.insert(item.clone()))
        .take(MAX_MONITORING)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::fixtures::clinical_db;
    use crate::models::enums::InteractionSeverity;

    #[test]
    fn comprehensive_info_merges_all_tables() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let others = vec!["Warfarin".to_string()];
        let insight = intel
            .get_comprehensive_medicine_info(
                "Aspirin",
                &PatientContext {
                    age_months: Some(300),
                    other_medicines: &others,
                    condition: Some("Fever"),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(insight.basic_info.as_ref().unwrap().class_name, "NSAID");
        // Warfarin pair is found twice (pairwise + all known) but kept once
        assert_eq!(insight.interactions.len(), 2);
        assert_eq!(insight.side_effects.len(), 3);
        assert_eq!(insight.dosage_guidelines.len(), 2);
        assert!(insight.age_appropriateness.as_ref().unwrap().appropriate);
        assert_eq!(insight.effectiveness_data.len(), 2);
        assert_eq!(insight.conditions_treated.len(), 2);
        assert_eq!(insight.prescription_patterns.len(), 1);
        assert_eq!(insight.common_combinations.len(), 1);
    }

    #[test]
    fn warnings_name_the_counterpart_drug() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let insight = intel
            .get_comprehensive_medicine_info("Aspirin", &PatientContext::default())
            .unwrap();

        assert_eq!(
            insight.safety_warnings,
            vec![
                "SEVERE INTERACTION with Warfarin: Increased bleeding risk".to_string(),
                "SEVERE SIDE EFFECT: GI bleeding - Bleeding in the stomach lining".to_string(),
                "SEVERE SIDE EFFECT: Reye's syndrome".to_string(),
                "CONTRAINDICATED in children - see dosage guidelines".to_string(),
            ]
        );
        assert!(insight
            .interactions
            .iter()
            .any(|i| i.severity == InteractionSeverity::Moderate));
    }

    #[test]
    fn child_patient_gets_age_restriction() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let insight = intel
            .get_comprehensive_medicine_info(
                "Aspirin",
                &PatientContext { age_months: Some(60), ..Default::default() },
            )
            .unwrap();
        assert!(insight
            .safety_warnings
            .contains(&"AGE RESTRICTION: Contraindicated for this age group".to_string()));
    }

    #[test]
    fn weight_match_replaces_dosing_list() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let insight = intel
            .get_comprehensive_medicine_info(
                "Aspirin",
                &PatientContext { age_months: Some(400), weight_kg: Some(70.0), ..Default::default() },
            )
            .unwrap();
        assert_eq!(insight.dosage_guidelines.len(), 1);
        assert_eq!(insight.dosage_guidelines[0].age_group, "Adults");
        // Only the adult band is left, so no pediatric notice
        assert!(!insight.safety_warnings.iter().any(|w| w.starts_with("CONTRAINDICATED")));
        assert_eq!(
            insight.clinical_recommendations,
            vec![
                "Recommended dosing: 300-900 mg every 4-6 hours".to_string(),
                "Special instructions: Take with food".to_string(),
                "Most effective for: Fever (75% effective)".to_string(),
                "Monitor for: Stomach upset (15% frequency)".to_string(),
            ]
        );
    }

    #[test]
    fn monitoring_is_deduplicated_and_capped() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let insight = intel
            .get_comprehensive_medicine_info("Aspirin", &PatientContext::default())
            .unwrap();
        assert_eq!(
            insight.monitoring_requirements,
            vec![
                "Take with food".to_string(),
                "Watch for stomach pain".to_string(),
                "Seek help if: Black or bloody stools".to_string(),
            ]
        );

        let mut doubled = insight.clone();
        doubled.dosage_guidelines.push(doubled.dosage_guidelines[1].clone());
        assert_eq!(monitoring_requirements(&doubled), insight.monitoring_requirements);
    }

    #[test]
    fn unknown_medicine_yields_empty_insight() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let insight = intel
            .get_comprehensive_medicine_info("Unobtainium", &PatientContext::default())
            .unwrap();
        assert!(insight.basic_info.is_none());
        assert!(insight.safety_warnings.is_empty());
        assert!(insight.clinical_recommendations.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let result = intel.get_comprehensive_medicine_info("  ", &PatientContext::default());
        assert!(matches!(result, Err(IntelligenceError::InvalidInput(_))));
    }
}
