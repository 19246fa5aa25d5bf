//! Clinical intelligence: merges the reference tables for a medicine or a
//! prescription and scores safety and suitability.

mod condition_insights;
mod insight;
mod safety;
mod suitability;
mod summaries;
mod types;

pub use insight::*;
pub use suitability::*;
pub use types::*;

use rusqlite::Connection;

/// Read-only view over every reference table in one database.
pub struct ClinicalIntelligence<'a> {
    pub(crate) conn: &'a Connection,
}

impl<'a> ClinicalIntelligence<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small clinical dataset shared by the intelligence tests.

    use rusqlite::Connection;

    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::*;
    use crate::models::*;

    pub fn clinical_db() -> Connection {
        let conn = open_memory_database().unwrap();

        insert_medicine(&conn, &Medicine::new("Aspirin", "NSAID", 15.0, 80).with_generic("Acetylsalicylic acid")).unwrap();
        insert_medicine(&conn, &Medicine::new("Paracetamol", "Analgesic", 10.0, 120).with_generic("Paracetamol")).unwrap();

        // Interactions
        insert_interaction(&conn, &Interaction::new("Warfarin", "Aspirin", InteractionSeverity::Severe, "Increased bleeding risk", "Avoid combination")).unwrap();
        insert_interaction(&conn, &Interaction::new("Aspirin", "Ibuprofen", InteractionSeverity::Moderate, "Reduced antiplatelet effect", "Take aspirin first")).unwrap();
        insert_interaction(&conn, &Interaction::new("Paracetamol", "Warfarin", InteractionSeverity::Mild, "Slight INR rise", "Monitor INR")).unwrap();

        // Side effects
        let mut stomach = SideEffect::new("Aspirin", "Stomach upset");
        stomach.frequency_percentage = Some(15.0);
        stomach.frequency_category = Some(FrequencyCategory::VeryCommon);
        stomach.severity = Some(SideEffectSeverity::Mild);
        insert_side_effect(&conn, &stomach).unwrap();

        let mut bleeding = SideEffect::new("Aspirin", "GI bleeding");
        bleeding.frequency_percentage = Some(2.0);
        bleeding.frequency_category = Some(FrequencyCategory::Common);
        bleeding.severity = Some(SideEffectSeverity::Severe);
        bleeding.description = Some("Bleeding in the stomach lining".into());
        bleeding.when_to_seek_help = Some("Black or bloody stools".into());
        insert_side_effect(&conn, &bleeding).unwrap();

        let mut reye = SideEffect::new("Aspirin", "Reye's syndrome");
        reye.frequency_percentage = Some(0.01);
        reye.frequency_category = Some(FrequencyCategory::VeryRare);
        reye.severity = Some(SideEffectSeverity::LifeThreatening);
        reye.affected_population = Some("Children under 16".into());
        insert_side_effect(&conn, &reye).unwrap();

        let mut nausea = SideEffect::new("Paracetamol", "Nausea");
        nausea.frequency_percentage = Some(12.0);
        nausea.frequency_category = Some(FrequencyCategory::Common);
        nausea.severity = Some(SideEffectSeverity::Mild);
        insert_side_effect(&conn, &nausea).unwrap();

        // Dosage
        let mut child = DosageGuideline::new("Aspirin", "Children under 16", CONTRAINDICATED_MARKER)
            .with_age_months(0, 191);
        child.contraindications = Some("Reye's syndrome risk in children".into());
        insert_dosage_guideline(&conn, &child).unwrap();

        let mut adult = DosageGuideline::new("Aspirin", "Adults", "300-900 mg every 4-6 hours")
            .with_age_months(192, 1200)
            .with_weight_kg(40.0, 250.0);
        adult.special_instructions = Some("Take with food".into());
        insert_dosage_guideline(&conn, &adult).unwrap();

        let para_child = DosageGuideline::new("Paracetamol", "Children", "15 mg/kg every 6 hours")
            .with_age_months(3, 143)
            .with_weight_kg(5.0, 60.0);
        insert_dosage_guideline(&conn, &para_child).unwrap();
        let mut para_adult = DosageGuideline::new("Paracetamol", "Adults", "500-1000 mg every 6 hours")
            .with_age_months(144, 1200);
        para_adult.special_instructions = Some("Max 4 g per day".into());
        insert_dosage_guideline(&conn, &para_adult).unwrap();

        // Effectiveness
        insert_effectiveness_record(&conn, &EffectivenessRecord::new("Aspirin", "Headache", 70, 65)).unwrap();
        let mut para_fever = EffectivenessRecord::new("Paracetamol", "Fever", 85, 88);
        para_fever.evidence_quality = Some(EvidenceQuality::High);
        insert_effectiveness_record(&conn, &para_fever).unwrap();
        insert_effectiveness_record(&conn, &EffectivenessRecord::new("Aspirin", "Fever", 75, 70)).unwrap();
        insert_effectiveness_record(&conn, &EffectivenessRecord::new("Ibuprofen", "Fever", 90, 80)).unwrap();

        // Conditions
        insert_condition(&conn, &MedicalCondition::new("Fever", "Symptom")).unwrap();
        insert_condition(&conn, &MedicalCondition::new("Headache", "Neurological")).unwrap();
        for (medicine, rating, line, evidence) in [
            ("Paracetamol", 85, TreatmentLine::FirstLine, Some(EvidenceLevel::High)),
            ("Ibuprofen", 88, TreatmentLine::FirstLine, Some(EvidenceLevel::High)),
            ("Aspirin", 75, TreatmentLine::SecondLine, None),
        ] {
            let treatment = ConditionTreatment {
                effectiveness_rating: Some(rating),
                treatment_line: Some(line),
                evidence_level: evidence,
                ..ConditionTreatment::new("Fever", medicine)
            };
            insert_condition_treatment(&conn, &treatment).unwrap();
        }
        let headache = ConditionTreatment {
            effectiveness_rating: Some(70),
            treatment_line: Some(TreatmentLine::FirstLine),
            evidence_level: Some(EvidenceLevel::Moderate),
            ..ConditionTreatment::new("Headache", "Aspirin")
        };
        insert_condition_treatment(&conn, &headache).unwrap();

        // Patterns
        let mut aspirin_pattern = PrescriptionPattern::new("Headache", "Aspirin");
        aspirin_pattern.secondary_medicine = Some("Caffeine".into());
        aspirin_pattern.prescription_frequency = Some(40.0);
        aspirin_pattern.monitoring_requirements = Some("Watch for stomach pain".into());
        insert_prescription_pattern(&conn, &aspirin_pattern).unwrap();

        let mut para_pattern = PrescriptionPattern::new("Fever", "Paracetamol");
        para_pattern.prescription_frequency = Some(60.0);
        para_pattern.success_rate = Some(88.0);
        para_pattern.specialty = Some("General Practice".into());
        para_pattern.trend_direction = Some(TrendDirection::Stable);
        para_pattern.evidence_level = Some(EvidenceLevel::High);
        insert_prescription_pattern(&conn, &para_pattern).unwrap();

        let mut ibu_pattern = PrescriptionPattern::new("Fever", "Ibuprofen");
        ibu_pattern.prescription_frequency = Some(30.0);
        ibu_pattern.success_rate = Some(83.0);
        ibu_pattern.specialty = Some("Pediatrics".into());
        ibu_pattern.trend_direction = Some(TrendDirection::Increasing);
        insert_prescription_pattern(&conn, &ibu_pattern).unwrap();

        let mut combo = CommonCombination::new("Fever", "Paracetamol", "Ibuprofen");
        combo.combination_frequency = Some(10.0);
        insert_common_combination(&conn, &combo).unwrap();

        conn
    }
}
