use rusqlite::{params, Connection, Row};

use super::like_pattern;
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const TREATMENT_COLUMNS: &str = "ct.id, ct.condition_name, ct.medicine_name, ct.effectiveness_rating,
     ct.dosage_recommendations, ct.treatment_line, ct.contraindications, ct.special_considerations,
     ct.evidence_level";

const TREATMENT_LINE_ORDER: &str = "CASE ct.treatment_line
     WHEN 'first-line' THEN 1 WHEN 'second-line' THEN 2 WHEN 'third-line' THEN 3
     WHEN 'alternative' THEN 4 ELSE 5 END ASC";

/// Minimum treatment rating returned by `get_high_effectiveness_treatments` by default.
pub const HIGH_TREATMENT_RATING: i64 = 80;

struct ConditionRow {
    id: i64,
    condition_name: String,
    category: String,
    description: Option<String>,
    symptoms: Option<String>,
    prevalence: Option<String>,
    severity_level: Option<String>,
}

fn condition_row(row: &Row<'_>) -> rusqlite::Result<ConditionRow> {
    Ok(ConditionRow {
        id: row.get(0)?,
        condition_name: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        symptoms: row.get(4)?,
        prevalence: row.get(5)?,
        severity_level: row.get(6)?,
    })
}

fn condition_from_row(row: ConditionRow) -> Result<MedicalCondition, DatabaseError> {
    Ok(MedicalCondition {
        id: row.id,
        condition_name: row.condition_name,
        category: row.category,
        description: row.description,
        symptoms: row.symptoms,
        prevalence: row.prevalence,
        severity_level: parse_optional(row.severity_level)?,
    })
}

struct TreatmentRow {
    id: i64,
    condition_name: String,
    medicine_name: String,
    effectiveness_rating: Option<i64>,
    dosage_recommendations: Option<String>,
    treatment_line: Option<String>,
    contraindications: Option<String>,
    special_considerations: Option<String>,
    evidence_level: Option<String>,
}

/// Reads the nine treatment columns starting at `offset`.
fn treatment_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<TreatmentRow> {
    Ok(TreatmentRow {
        id: row.get(offset)?,
        condition_name: row.get(offset + 1)?,
        medicine_name: row.get(offset + 2)?,
        effectiveness_rating: row.get(offset + 3)?,
        dosage_recommendations: row.get(offset + 4)?,
        treatment_line: row.get(offset + 5)?,
        contraindications: row.get(offset + 6)?,
        special_considerations: row.get(offset + 7)?,
        evidence_level: row.get(offset + 8)?,
    })
}

fn treatment_from_row(row: TreatmentRow) -> Result<ConditionTreatment, DatabaseError> {
    Ok(ConditionTreatment {
        id: row.id,
        condition_name: row.condition_name,
        medicine_name: row.medicine_name,
        effectiveness_rating: row.effectiveness_rating,
        dosage_recommendations: row.dosage_recommendations,
        treatment_line: parse_optional(row.treatment_line)?,
        contraindications: row.contraindications,
        special_considerations: row.special_considerations,
        evidence_level: parse_optional(row.evidence_level)?,
    })
}

fn query_treatments(
    conn: &Connection,
    filter_and_order: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ConditionTreatment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TREATMENT_COLUMNS} FROM condition_treatments ct {filter_and_order}"
    ))?;
    let rows = stmt.query_map(params, |row| treatment_row(row, 0))?;

    let mut treatments = Vec::new();
    for row in rows {
        treatments.push(treatment_from_row(row?)?);
    }
    Ok(treatments)
}

pub fn insert_condition(conn: &Connection, condition: &MedicalCondition) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO conditions (condition_name, category, description, symptoms, prevalence, severity_level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            condition.condition_name,
            condition.category,
            condition.description,
            condition.symptoms,
            condition.prevalence,
            condition.severity_level.map(|s| s.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_condition_treatment(conn: &Connection, t: &ConditionTreatment) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO condition_treatments (condition_name, medicine_name, effectiveness_rating,
         dosage_recommendations, treatment_line, contraindications, special_considerations, evidence_level)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            t.condition_name,
            t.medicine_name,
            t.effectiveness_rating,
            t.dosage_recommendations,
            t.treatment_line.map(|l| l.as_str()),
            t.contraindications,
            t.special_considerations,
            t.evidence_level.map(|e| e.as_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Conditions a medicine is listed for, with that treatment's details.
pub fn get_conditions_for_medicine(
    conn: &Connection,
    medicine: &str,
) -> Result<Vec<TreatedCondition>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.condition_name, c.category, c.description, c.symptoms, c.prevalence,
                c.severity_level, ct.effectiveness_rating, ct.dosage_recommendations,
                ct.treatment_line, ct.evidence_level
         FROM conditions c
         JOIN condition_treatments ct ON c.condition_name = ct.condition_name
         WHERE ct.medicine_name = ?1
         ORDER BY ct.effectiveness_rating DESC, c.id ASC",
    )?;
    let rows = stmt.query_map(params![medicine.trim()], |row| {
        Ok((
            condition_row(row)?,
            row.get::<_, Option<i64>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, Option<String>>(9)?,
            row.get::<_, Option<String>>(10)?,
        ))
    })?;

    let mut conditions = Vec::new();
    for row in rows {
        let (condition, rating, dosage, line, evidence) = row?;
        conditions.push(TreatedCondition {
            condition: condition_from_row(condition)?,
            effectiveness_rating: rating,
            dosage_recommendations: dosage,
            treatment_line: parse_optional(line)?,
            evidence_level: parse_optional(evidence)?,
        });
    }
    Ok(conditions)
}

/// Treatments for a condition joined with its category and severity.
/// Best rated first, then by treatment line.
pub fn get_medicines_for_condition(
    conn: &Connection,
    condition: &str,
) -> Result<Vec<TreatmentOption>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TREATMENT_COLUMNS}, c.category, c.severity_level
         FROM condition_treatments ct
         JOIN conditions c ON ct.condition_name = c.condition_name
         WHERE ct.condition_name = ?1
         ORDER BY ct.effectiveness_rating DESC, {TREATMENT_LINE_ORDER}, ct.id ASC"
    ))?;
    let rows = stmt.query_map(params![condition.trim()], |row| {
        Ok((
            treatment_row(row, 0)?,
            row.get::<_, String>(9)?,
            row.get::<_, Option<String>>(10)?,
        ))
    })?;

    let mut options = Vec::new();
    for row in rows {
        let (treatment, category, severity) = row?;
        options.push(TreatmentOption {
            treatment: treatment_from_row(treatment)?,
            category,
            severity_level: parse_optional(severity)?,
        });
    }
    Ok(options)
}

pub fn search_conditions(conn: &Connection, term: &str) -> Result<Vec<MedicalCondition>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, condition_name, category, description, symptoms, prevalence, severity_level
         FROM conditions
         WHERE condition_name LIKE ?1 OR symptoms LIKE ?1 OR description LIKE ?1
         ORDER BY condition_name ASC",
    )?;
    let rows = stmt.query_map(params![like_pattern(term)], condition_row)?;

    let mut conditions = Vec::new();
    for row in rows {
        conditions.push(condition_from_row(row?)?);
    }
    Ok(conditions)
}

pub fn get_first_line_treatments(
    conn: &Connection,
    condition: &str,
) -> Result<Vec<ConditionTreatment>, DatabaseError> {
    query_treatments(
        conn,
        "WHERE ct.condition_name = ?1 AND ct.treatment_line = ?2
         ORDER BY ct.effectiveness_rating DESC, ct.id ASC",
        params![condition.trim(), TreatmentLine::FirstLine.as_str()],
    )
}

pub fn get_high_effectiveness_treatments(
    conn: &Connection,
    condition: &str,
    min_rating: i64,
) -> Result<Vec<ConditionTreatment>, DatabaseError> {
    query_treatments(
        conn,
        "WHERE ct.condition_name = ?1 AND ct.effectiveness_rating >= ?2
         ORDER BY ct.effectiveness_rating DESC, ct.id ASC",
        params![condition.trim(), min_rating],
    )
}
