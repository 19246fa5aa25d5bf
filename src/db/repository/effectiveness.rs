use rusqlite::{params, Connection, Row};

use crate::db::DatabaseError;
use crate::models::enums::parse_optional;
use crate::models::*;

const EFFECTIVENESS_COLUMNS: &str = "id, medicine_name, condition, effectiveness_rating, patient_satisfaction,
     response_time_days, complete_cure_rate, improvement_rate, sample_size, study_duration_weeks, age_group,
     nnt, adherence_rate, discontinuation_rate, evidence_quality, data_source, last_updated";

pub const HIGH_EFFECTIVENESS_RATING: i64 = 85;

struct EffectivenessRow {
    record: EffectivenessRecord,
    evidence_quality: Option<String>,
}

fn effectiveness_row(row: &Row<'_>) -> rusqlite::Result<EffectivenessRow> {
    Ok(EffectivenessRow {
        record: EffectivenessRecord {
            id: row.get(0)?,
            medicine_name: row.get(1)?,
            condition: row.get(2)?,
            effectiveness_rating: row.get(3)?,
            patient_satisfaction: row.get(4)?,
            response_time_days: row.get(5)?,
            complete_cure_rate: row.get(6)?,
            improvement_rate: row.get(7)?,
            sample_size: row.get(8)?,
            study_duration_weeks: row.get(9)?,
            age_group: row.get(10)?,
            nnt: row.get(11)?,
            adherence_rate: row.get(12)?,
            discontinuation_rate: row.get(13)?,
            evidence_quality: None,
            data_source: row.get(15)?,
            last_updated: row.get(16)?,
        },
        evidence_quality: row.get(14)?,
    })
}

fn query_records(
    conn: &Connection,
    filter_and_order: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<EffectivenessRecord>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EFFECTIVENESS_COLUMNS} FROM drug_effectiveness {filter_and_order}"
    ))?;
    let rows = stmt.query_map(params, effectiveness_row)?;

    let mut records = Vec::new();
    for row in rows {
        let EffectivenessRow { mut record, evidence_quality } = row?;
        record.evidence_quality = parse_optional(evidence_quality)?;
        records.push(record);
    }
    Ok(records)
}

pub fn insert_effectiveness_record(conn: &Connection, r: &EffectivenessRecord) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO drug_effectiveness (medicine_name, condition, effectiveness_rating, patient_satisfaction,
         response_time_days, complete_cure_rate, improvement_rate, sample_size, study_duration_weeks, age_group,
         nnt, adherence_rate, discontinuation_rate, evidence_quality, data_source, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            r.medicine_name,
            r.condition,
            r.effectiveness_rating,
            r.patient_satisfaction,
            r.response_time_days,
            r.complete_cure_rate,
            r.improvement_rate,
            r.sample_size,
            r.study_duration_weeks,
            r.age_group,
            r.nnt,
            r.adherence_rate,
            r.discontinuation_rate,
            r.evidence_quality.map(|q| q.as_str()),
            r.data_source,
            r.last_updated,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_effectiveness_for_medicine(
    conn: &Connection,
    medicine: &str,
) -> Result<Vec<EffectivenessRecord>, DatabaseError> {
    query_records(
        conn,
        "WHERE medicine_name = ?1 ORDER BY effectiveness_rating DESC, id ASC",
        params![medicine.trim()],
    )
}

pub fn get_effectiveness_for_condition(
    conn: &Connection,
    condition: &str,
) -> Result<Vec<EffectivenessRecord>, DatabaseError> {
    query_records(
        conn,
        "WHERE condition = ?1 ORDER BY effectiveness_rating DESC, id ASC",
        params![condition.trim()],
    )
}

pub fn get_highly_effective_medicines(
    conn: &Connection,
    min_rating: i64,
) -> Result<Vec<EffectivenessRecord>, DatabaseError> {
    query_records(
        conn,
        "WHERE effectiveness_rating >= ?1
         ORDER BY effectiveness_rating DESC, patient_satisfaction DESC, id ASC",
        params![min_rating],
    )
}

pub fn compare_medicines_for_condition(
    conn: &Connection,
    condition: &str,
) -> Result<Vec<EffectivenessComparison>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT medicine_name, effectiveness_rating, patient_satisfaction, response_time_days,
                adherence_rate, discontinuation_rate, nnt, evidence_quality
         FROM drug_effectiveness
         WHERE condition = ?1
         ORDER BY effectiveness_rating DESC, id ASC",
    )?;
    let rows = stmt.query_map(params![condition.trim()], |row| {
        Ok((
            EffectivenessComparison {
                medicine_name: row.get(0)?,
                effectiveness_rating: row.get(1)?,
                patient_satisfaction: row.get(2)?,
                response_time_days: row.get(3)?,
                adherence_rate: row.get(4)?,
                discontinuation_rate: row.get(5)?,
                nnt: row.get(6)?,
                evidence_quality: None,
            },
            row.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut comparisons = Vec::new();
    for row in rows {
        let (mut comparison, quality) = row?;
        comparison.evidence_quality = parse_optional(quality)?;
        comparisons.push(comparison);
    }
    Ok(comparisons)
}

/// Records ranked by patient satisfaction, optionally for one condition.
pub fn get_patient_satisfaction_ranking(
    conn: &Connection,
    condition: Option<&str>,
) -> Result<Vec<SatisfactionRank>, DatabaseError> {
    let map_row = |row: &Row<'_>| -> rusqlite::Result<SatisfactionRank> {
        Ok(SatisfactionRank {
            medicine_name: row.get(0)?,
            condition: row.get(1)?,
            patient_satisfaction: row.get(2)?,
            effectiveness_rating: row.get(3)?,
        })
    };

    match condition {
        Some(condition) => {
            let mut stmt = conn.prepare(
                "SELECT medicine_name, condition, patient_satisfaction, effectiveness_rating
                 FROM drug_effectiveness WHERE condition = ?1
                 ORDER BY patient_satisfaction DESC, id ASC",
            )?;
            let rows = stmt.query_map(params![condition.trim()], map_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT medicine_name, condition, patient_satisfaction, effectiveness_rating
                 FROM drug_effectiveness
                 ORDER BY patient_satisfaction DESC, id ASC",
            )?;
            let rows = stmt.query_map([], map_row)?;
            rows.map(|r| r.map_err(DatabaseError::from)).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::EvidenceQuality;
    use chrono::NaiveDate;

    fn record(medicine: &str, condition: &str, rating: i64, satisfaction: i64) -> EffectivenessRecord {
        EffectivenessRecord::new(medicine, condition, rating, satisfaction)
    }

    fn seeded_db() -> Connection {
        let conn = open_memory_database().unwrap();
        let mut para_fever = record("Paracetamol", "Fever", 88, 85);
        para_fever.response_time_days = Some(1);
        para_fever.evidence_quality = Some(EvidenceQuality::High);
        para_fever.last_updated = NaiveDate::from_ymd_opt(2024, 3, 1);
        let mut ibu_fever = record("Ibuprofen", "Fever", 90, 80);
        ibu_fever.nnt = Some(3);
        let para_headache = record("Paracetamol", "Headache", 75, 90);
        let aspirin_headache = record("Aspirin", "Headache", 70, 60);

        for r in [&para_fever, &ibu_fever, &para_headache, &aspirin_headache] {
            insert_effectiveness_record(&conn, r).unwrap();
        }
        conn
    }

    #[test]
    fn medicine_records_ordered_by_rating() {
        let conn = seeded_db();
        let rows = get_effectiveness_for_medicine(&conn, "paracetamol").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].condition, "Fever");
        assert_eq!(rows[0].evidence_quality, Some(EvidenceQuality::High));
        assert_eq!(rows[0].last_updated, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn condition_records_ordered_by_rating() {
        let conn = seeded_db();
        let rows = get_effectiveness_for_condition(&conn, "FEVER").unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.medicine_name.as_str()).collect();
        assert_eq!(names, vec!["Ibuprofen", "Paracetamol"]);
    }

    #[test]
    fn highly_effective_threshold() {
        let conn = seeded_db();
        let rows = get_highly_effective_medicines(&conn, HIGH_EFFECTIVENESS_RATING).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].medicine_name, "Ibuprofen");
    }

    #[test]
    fn comparison_projection_keeps_nnt() {
        let conn = seeded_db();
        let rows = compare_medicines_for_condition(&conn, "Fever").unwrap();
        assert_eq!(rows[0].nnt, Some(3));
        assert_eq!(rows[1].evidence_quality, Some(EvidenceQuality::High));
    }

    #[test]
    fn satisfaction_ranking_with_and_without_condition() {
        let conn = seeded_db();
        let all = get_patient_satisfaction_ranking(&conn, None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].patient_satisfaction, 90);

        let headache = get_patient_satisfaction_ranking(&conn, Some("Headache")).unwrap();
        assert_eq!(headache.len(), 2);
        assert_eq!(headache[1].medicine_name, "Aspirin");
    }

    #[test]
    fn rating_outside_range_is_rejected() {
        let conn = seeded_db();
        assert!(insert_effectiveness_record(&conn, &record("X", "Fever", 101, 50)).is_err());
    }
}
