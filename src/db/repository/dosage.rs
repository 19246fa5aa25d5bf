use rusqlite::{params, Connection, Row};

use super::like_pattern;
use crate::db::DatabaseError;
use crate::models::enums::parse_optional;
use crate::models::*;

const DOSAGE_COLUMNS: &str = "id, medicine_name, age_group, min_age_months, max_age_months,
     min_weight_kg, max_weight_kg, recommended_dose, max_daily_dose, frequency, administration_method,
     special_instructions, contraindications, renal_adjustment, hepatic_adjustment, indication, evidence_level";

/// Weight assumed when only an age is known.
pub const DEFAULT_WEIGHT_KG: f64 = 50.0;

struct DosageRow {
    id: i64,
    medicine_name: String,
    age_group: String,
    min_age_months: Option<i64>,
    max_age_months: Option<i64>,
    min_weight_kg: Option<f64>,
    max_weight_kg: Option<f64>,
    recommended_dose: String,
    max_daily_dose: Option<String>,
    frequency: Option<String>,
    administration_method: Option<String>,
    special_instructions: Option<String>,
    contraindications: Option<String>,
    renal_adjustment: Option<String>,
    hepatic_adjustment: Option<String>,
    indication: Option<String>,
    evidence_level: Option<String>,
}

fn dosage_row(row: &Row<'_>) -> rusqlite::Result<DosageRow> {
    Ok(DosageRow {
        id: row.get(0)?,
        medicine_name: row.get(1)?,
        age_group: row.get(2)?,
        min_age_months: row.get(3)?,
        max_age_months: row.get(4)?,
        min_weight_kg: row.get(5)?,
        max_weight_kg: row.get(6)?,
        recommended_dose: row.get(7)?,
        max_daily_dose: row.get(8)?,
        frequency: row.get(9)?,
        administration_method: row.get(10)?,
        special_instructions: row.get(11)?,
        contraindications: row.get(12)?,
        renal_adjustment: row.get(13)?,
        hepatic_adjustment: row.get(14)?,
        indication: row.get(15)?,
        evidence_level: row.get(16)?,
    })
}

fn guideline_from_row(row: DosageRow) -> Result<DosageGuideline, DatabaseError> {
    Ok(DosageGuideline {
        id: row.id,
        medicine_name: row.medicine_name,
        age_group: row.age_group,
        min_age_months: row.min_age_months,
        max_age_months: row.max_age_months,
        min_weight_kg: row.min_weight_kg,
        max_weight_kg: row.max_weight_kg,
        recommended_dose: row.recommended_dose,
        max_daily_dose: row.max_daily_dose,
        frequency: row.frequency,
        administration_method: row.administration_method,
        special_instructions: row.special_instructions,
        contraindications: row.contraindications,
        renal_adjustment: row.renal_adjustment,
        hepatic_adjustment: row.hepatic_adjustment,
        indication: row.indication,
        evidence_level: parse_optional(row.evidence_level)?,
    })
}

fn query_guidelines(
    conn: &Connection,
    filter: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<DosageGuideline>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {DOSAGE_COLUMNS} FROM dosage_guidelines {filter} ORDER BY min_age_months ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params, dosage_row)?;

    let mut guidelines = Vec::new();
    for row in rows {
        guidelines.push(guideline_from_row(row?)?);
    }
    Ok(guidelines)
}

pub fn insert_dosage_guideline(conn: &Connection, g: &DosageGuideline) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO dosage_guidelines (medicine_name, age_group, min_age_months, max_age_months,
         min_weight_kg, max_weight_kg, recommended_dose, max_daily_dose, frequency, administration_method,
         special_instructions, contraindications, renal_adjustment, hepatic_adjustment, indication, evidence_level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            g.medicine_name,
            g.age_group,
            g.min_age_months,
            g.max_age_months,
            g.min_weight_kg,
            g.max_weight_kg,
            g.recommended_dose,
            g.max_daily_dose,
            g.frequency,
            g.administration_method,
            g.special_instructions,
            g.contraindications,
            g.renal_adjustment,
            g.hepatic_adjustment,
            g.indication,
            g.evidence_level.map(|e| e.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Guidelines whose age and weight bands contain the patient.
/// A missing lower bound means 0, a missing upper bound means unbounded.
pub fn get_dosage_for_age_weight(
    conn: &Connection,
    medicine: &str,
    age_months: i64,
    weight_kg: f64,
) -> Result<Vec<DosageGuideline>, DatabaseError> {
    query_guidelines(
        conn,
        "WHERE medicine_name = ?1
           AND COALESCE(min_age_months, 0) <= ?2
           AND (max_age_months IS NULL OR max_age_months >= ?2)
           AND COALESCE(min_weight_kg, 0) <= ?3
           AND (max_weight_kg IS NULL OR max_weight_kg >= ?3)",
        params![medicine.trim(), age_months, weight_kg],
    )
}

pub fn get_age_specific_dosing(
    conn: &Connection,
    medicine: &str,
    age_group: &str,
) -> Result<Vec<DosageGuideline>, DatabaseError> {
    query_guidelines(
        conn,
        "WHERE medicine_name = ?1 AND age_group LIKE ?2",
        params![medicine.trim(), like_pattern(age_group)],
    )
}

pub fn get_pediatric_contraindications(
    conn: &Connection,
    medicine: &str,
) -> Result<Vec<DosageGuideline>, DatabaseError> {
    query_guidelines(
        conn,
        "WHERE medicine_name = ?1
           AND (contraindications LIKE '%child%'
                OR contraindications LIKE '%pediatric%'
                OR recommended_dose = ?2)",
        params![medicine.trim(), CONTRAINDICATED_MARKER],
    )
}

pub fn get_all_dosing_for_medicine(conn: &Connection, medicine: &str) -> Result<Vec<DosageGuideline>, DatabaseError> {
    query_guidelines(conn, "WHERE medicine_name = ?1", params![medicine.trim()])
}

/// Whether a medicine has usable guidance for a patient of `age_months`.
pub fn check_age_appropriateness(
    conn: &Connection,
    medicine: &str,
    age_months: i64,
) -> Result<AgeAppropriateness, DatabaseError> {
    let matching = get_dosage_for_age_weight(conn, medicine, age_months, DEFAULT_WEIGHT_KG)?;

    if matching.is_empty() {
        let all = get_all_dosing_for_medicine(conn, medicine)?;
        if all.is_empty() {
            return Ok(AgeAppropriateness::inappropriate(
                "No dosing guidelines available for this medicine".into(),
            ));
        }

        let min_age = all.iter().map(|g| g.min_age_months.unwrap_or(0)).min().unwrap_or(0);
        let max_age = if all.iter().any(|g| g.max_age_months.is_none()) {
            "unbounded".to_string()
        } else {
            all.iter()
                .filter_map(|g| g.max_age_months)
                .max()
                .unwrap_or(0)
                .to_string()
        };

        let mut result = AgeAppropriateness::inappropriate(format!(
            "Age {age_months} months is outside recommended range ({min_age}-{max_age} months)"
        ));
        result.available_ages = all
            .into_iter()
            .map(|g| AgeBand {
                age_group: g.age_group,
                min_age_months: g.min_age_months,
                max_age_months: g.max_age_months,
            })
            .collect();
        return Ok(result);
    }

    if matching.iter().any(|g| g.is_contraindicated()) {
        let mut result = AgeAppropriateness::inappropriate("Contraindicated for this age group".into());
        result.contraindications = matching
            .iter()
            .filter(|g| g.is_contraindicated())
            .filter_map(|g| g.contraindications.clone())
            .collect();
        return Ok(result);
    }

    Ok(AgeAppropriateness::appropriate(matching))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::EvidenceLevel;
    use crate::db::sqlite::open_memory_database;

    fn seeded_db() -> Connection {
        let conn = open_memory_database().unwrap();

        let mut infant = DosageGuideline::new("Aspirin", "Children under 16", CONTRAINDICATED_MARKER)
            .with_age_months(0, 191)
            .with_weight_kg(0.0, 80.0);
        infant.contraindications = Some("Risk of Reye's syndrome in children".into());

        let mut adult = DosageGuideline::new("Aspirin", "Adults", "300-900 mg every 4-6 hours")
            .with_age_months(192, 1200)
            .with_weight_kg(40.0, 200.0);
        adult.special_instructions = Some("Take with food".into());
        adult.evidence_level = Some(EvidenceLevel::High);

        let child = DosageGuideline::new("Paracetamol", "Children 6-12 years", "250-500 mg every 6 hours")
            .with_age_months(72, 144)
            .with_weight_kg(20.0, 40.0);
        let mut open_ended = DosageGuideline::new("Paracetamol", "Adults", "500-1000 mg every 6 hours");
        open_ended.min_age_months = Some(144);

        for g in [&infant, &adult, &child, &open_ended] {
            insert_dosage_guideline(&conn, g).unwrap();
        }
        conn
    }

    #[test]
    fn age_and_weight_must_both_fit() {
        let conn = seeded_db();
        let hits = get_dosage_for_age_weight(&conn, "paracetamol", 96, 25.0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].age_group, "Children 6-12 years");

        let too_heavy = get_dosage_for_age_weight(&conn, "Paracetamol", 96, 45.0).unwrap();
        assert!(too_heavy.is_empty());
    }

    #[test]
    fn missing_bounds_are_open() {
        let conn = seeded_db();
        let hits = get_dosage_for_age_weight(&conn, "Paracetamol", 600, 300.0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].age_group, "Adults");
    }

    #[test]
    fn age_group_lookup_and_full_listing() {
        let conn = seeded_db();
        assert_eq!(get_age_specific_dosing(&conn, "Aspirin", "adult").unwrap().len(), 1);
        let all = get_all_dosing_for_medicine(&conn, "Aspirin").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].min_age_months, Some(0));
        assert_eq!(all[1].evidence_level, Some(EvidenceLevel::High));
    }

    #[test]
    fn pediatric_contraindications_found() {
        let conn = seeded_db();
        let rows = get_pediatric_contraindications(&conn, "Aspirin").unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].is_contraindicated());
        assert!(get_pediatric_contraindications(&conn, "Paracetamol").unwrap().is_empty());
    }

    #[test]
    fn contraindicated_age_band_is_inappropriate() {
        let conn = seeded_db();
        let result = check_age_appropriateness(&conn, "Aspirin", 48).unwrap();
        assert!(!result.appropriate);
        assert_eq!(result.reason.as_deref(), Some("Contraindicated for this age group"));
        assert_eq!(result.contraindications, vec!["Risk of Reye's syndrome in children".to_string()]);
    }

    #[test]
    fn age_outside_all_bands_lists_available_ages() {
        let conn = seeded_db();
        // 1300 months is past every Aspirin band
        let result = check_age_appropriateness(&conn, "Aspirin", 1300).unwrap();
        assert!(!result.appropriate);
        assert_eq!(
            result.reason.as_deref(),
            Some("Age 1300 months is outside recommended range (0-1200 months)")
        );
        assert_eq!(result.available_ages.len(), 2);
        assert_eq!(result.available_ages[1].age_group, "Adults");
    }

    #[test]
    fn open_upper_bound_reported_as_unbounded() {
        let conn = seeded_db();
        let result = check_age_appropriateness(&conn, "Paracetamol", 24).unwrap();
        assert!(!result.appropriate);
        assert_eq!(
            result.reason.as_deref(),
            Some("Age 24 months is outside recommended range (72-unbounded months)")
        );
    }

    #[test]
    fn unknown_medicine_has_no_guidelines() {
        let conn = seeded_db();
        let result = check_age_appropriateness(&conn, "Unobtainium", 300).unwrap();
        assert!(!result.appropriate);
        assert_eq!(result.reason.as_deref(), Some("No dosing guidelines available for this medicine"));
        assert!(result.available_ages.is_empty());
    }

    #[test]
    fn adult_aspirin_is_appropriate() {
        let conn = seeded_db();
        let result = check_age_appropriateness(&conn, "Aspirin", 400).unwrap();
        assert!(result.appropriate);
        assert_eq!(result.guidelines.len(), 1);
        assert_eq!(result.guidelines[0].special_instructions.as_deref(), Some("Take with food"));
    }
}
