use super::{AgeIssue, ClinicalIntelligence, IntelligenceError, RiskTier, SafetyAnalysis, SevereEffectRisk};
use crate::db::repository::*;

impl ClinicalIntelligence<'_> {
    /// Screen a whole prescription for interactions, age issues and severe effects.
    pub fn analyze_prescription_safety(
        &self,
        medicines: &[String],
        age_months: Option<i64>,
    ) -> Result<SafetyAnalysis, IntelligenceError> {
        let interactions_found = check_multiple_interactions(self.conn, medicines)?;

        let mut age_inappropriate = Vec::new();
        let mut severe_side_effects = Vec::new();
        for medicine in medicines {
            if let Some(age) = age_months {
                let check = check_age_appropriateness(self.conn, medicine, age)?;
                if !check.appropriate {
                    age_inappropriate.push(AgeIssue {
                        medicine: medicine.clone(),
                        reason: check.reason.unwrap_or_default(),
                    });
                }
            }
            for effect in get_severe_side_effects(self.conn, medicine)? {
                severe_side_effects.push(SevereEffectRisk { medicine: medicine.clone(), effect });
            }
        }

        let mut analysis = SafetyAnalysis {
            medicines: medicines.to_vec(),
            interactions_found,
            age_inappropriate,
            severe_side_effects,
            overall_safety_score: RiskTier::LowRisk,
            warnings: Vec::new(),
            recommendations: Vec::new(),
        };
        analysis.overall_safety_score = RiskTier::from_concerns(analysis.total_concerns());
        analysis.warnings = safety_analysis_warnings(&analysis);
        analysis.recommendations = safety_analysis_recommendations(&analysis);

        tracing::info!(
            medicines = medicines.len(),
            concerns = analysis.total_concerns(),
            tier = analysis.overall_safety_score.as_str(),
            "Prescription safety analysed"
        );
        Ok(analysis)
    }
}

fn safety_analysis_warnings(analysis: &SafetyAnalysis) -> Vec<String> {
    let mut warnings = Vec::new();

    let serious = analysis
        .interactions_found
        .iter()
        .filter(|i| i.severity.is_serious())
        .count();
    if serious > 0 {
        warnings.push(format!("{serious} SEVERE drug interaction(s) detected"));
    }
    if !analysis.age_inappropriate.is_empty() {
        warnings.push(format!(
            "{} medicine(s) inappropriate for patient age",
            analysis.age_inappropriate.len()
        ));
    }
    if !analysis.severe_side_effects.is_empty() {
        warnings.push(format!(
            "{} severe side effect risk(s)",
            analysis.severe_side_effects.len()
        ));
    }
    warnings
}

fn safety_analysis_recommendations(analysis: &SafetyAnalysis) -> Vec<String> {
    let tier_line = match analysis.overall_safety_score {
        RiskTier::HighRisk => "HIGH RISK prescription - consider alternatives",
        RiskTier::ModerateRisk => "MODERATE RISK - enhanced monitoring recommended",
        RiskTier::LowRisk => "LOW RISK prescription",
    };
    let mut recommendations = vec![tier_line.to_string()];
    if !analysis.interactions_found.is_empty() {
        recommendations.push("Monitor closely for drug interaction symptoms".to_string());
    }
    if !analysis.age_inappropriate.is_empty() {
        recommendations.push("Review age-appropriate alternatives".to_string());
    }
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::fixtures::clinical_db;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aspirin_with_warfarin_is_high_risk() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let analysis = intel
            .analyze_prescription_safety(&names(&["Aspirin", "Warfarin"]), None)
            .unwrap();

        assert_eq!(analysis.interactions_found.len(), 1);
        assert!(analysis.age_inappropriate.is_empty());
        assert_eq!(analysis.severe_side_effects.len(), 2);
        // Life-threatening effects sort first
        assert_eq!(analysis.severe_side_effects[0].effect.side_effect, "Reye's syndrome");
        assert_eq!(analysis.overall_safety_score, RiskTier::HighRisk);
        assert_eq!(
            analysis.warnings,
            vec![
                "1 SEVERE drug interaction(s) detected".to_string(),
                "2 severe side effect risk(s)".to_string(),
            ]
        );
        assert_eq!(
            analysis.recommendations,
            vec![
                "HIGH RISK prescription - consider alternatives".to_string(),
                "Monitor closely for drug interaction symptoms".to_string(),
            ]
        );
    }

    #[test]
    fn mild_interaction_is_moderate_risk_without_severe_warning() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let analysis = intel
            .analyze_prescription_safety(&names(&["Paracetamol", "Warfarin"]), Some(400))
            .unwrap();

        assert_eq!(analysis.interactions_found.len(), 1);
        // Warfarin has no dosing rows in the fixture
        assert_eq!(analysis.age_inappropriate.len(), 1);
        assert_eq!(analysis.age_inappropriate[0].medicine, "Warfarin");
        assert_eq!(analysis.overall_safety_score, RiskTier::ModerateRisk);
        assert_eq!(
            analysis.warnings,
            vec!["1 medicine(s) inappropriate for patient age".to_string()]
        );
        assert_eq!(
            analysis.recommendations,
            vec![
                "MODERATE RISK - enhanced monitoring recommended".to_string(),
                "Monitor closely for drug interaction symptoms".to_string(),
                "Review age-appropriate alternatives".to_string(),
            ]
        );
    }

    #[test]
    fn single_safe_medicine_is_low_risk() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let analysis = intel
            .analyze_prescription_safety(&names(&["Paracetamol"]), Some(400))
            .unwrap();
        assert_eq!(analysis.total_concerns(), 0);
        assert_eq!(analysis.overall_safety_score, RiskTier::LowRisk);
        assert!(analysis.warnings.is_empty());
        assert_eq!(analysis.recommendations, vec!["LOW RISK prescription".to_string()]);
    }

    #[test]
    fn age_is_only_checked_when_given() {
        let conn = clinical_db();
        let intel = ClinicalIntelligence::new(&conn);
        let with_age = intel
            .analyze_prescription_safety(&names(&["Aspirin"]), Some(60))
            .unwrap();
        assert_eq!(with_age.age_inappropriate.len(), 1);
        assert_eq!(with_age.age_inappropriate[0].reason, "Contraindicated for this age group");

        let without_age = intel.analyze_prescription_safety(&names(&["Aspirin"]), None).unwrap();
        assert!(without_age.age_inappropriate.is_empty());
    }
}
