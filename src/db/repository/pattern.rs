use rusqlite::{params, Connection, Row};

use super::like_pattern;
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const PATTERN_COLUMNS: &str = "id, condition, primary_medicine, secondary_medicine, prescription_frequency,
     success_rate, age_group, specialty, seasonal_trend, duration_days, dose_pattern, combination_rationale,
     monitoring_requirements, cost_effectiveness, guideline_adherence, evidence_level, trend_direction,
     last_updated";

const COMBINATION_COLUMNS: &str = "id, condition, medicine1, medicine2, medicine3, combination_frequency,
     synergy_score, safety_profile, monitoring_needs, typical_duration, warnings";

/// Age group label that matches every patient.
pub const ALL_AGES: &str = "All ages";

pub const HIGH_SUCCESS_RATE: f64 = 85.0;

struct PatternRow {
    pattern: PrescriptionPattern,
    guideline_adherence: Option<String>,
    evidence_level: Option<String>,
    trend_direction: Option<String>,
}

fn pattern_row(row: &Row<'_>) -> rusqlite::Result<PatternRow> {
    Ok(PatternRow {
        pattern: PrescriptionPattern {
            id: row.get(0)?,
            condition: row.get(1)?,
            primary_medicine: row.get(2)?,
            secondary_medicine: row.get(3)?,
            prescription_frequency: row.get(4)?,
            success_rate: row.get(5)?,
            age_group: row.get(6)?,
            specialty: row.get(7)?,
            seasonal_trend: row.get(8)?,
            duration_days: row.get(9)?,
            dose_pattern: row.get(10)?,
            combination_rationale: row.get(11)?,
            monitoring_requirements: row.get(12)?,
            cost_effectiveness: row.get(13)?,
            guideline_adherence: None,
            evidence_level: None,
            trend_direction: None,
            last_updated: row.get(17)?,
        },
        guideline_adherence: row.get(14)?,
        evidence_level: row.get(15)?,
        trend_direction: row.get(16)?,
    })
}

fn query_patterns(
    conn: &Connection,
    filter_and_order: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PATTERN_COLUMNS} FROM prescription_patterns {filter_and_order}"
    ))?;
    let rows = stmt.query_map(params, pattern_row)?;

    let mut patterns = Vec::new();
    for row in rows {
        let PatternRow { mut pattern, guideline_adherence, evidence_level, trend_direction } = row?;
        pattern.guideline_adherence = parse_optional(guideline_adherence)?;
        pattern.evidence_level = parse_optional(evidence_level)?;
        pattern.trend_direction = parse_optional(trend_direction)?;
        patterns.push(pattern);
    }
    Ok(patterns)
}

pub fn insert_prescription_pattern(conn: &Connection, p: &PrescriptionPattern) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO prescription_patterns (condition, primary_medicine, secondary_medicine,
         prescription_frequency, success_rate, age_group, specialty, seasonal_trend, duration_days,
         dose_pattern, combination_rationale, monitoring_requirements, cost_effectiveness,
         guideline_adherence, evidence_level, trend_direction, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            p.condition,
            p.primary_medicine,
            p.secondary_medicine,
            p.prescription_frequency,
            p.success_rate,
            p.age_group,
            p.specialty,
            p.seasonal_trend,
            p.duration_days,
            p.dose_pattern,
            p.combination_rationale,
            p.monitoring_requirements,
            p.cost_effectiveness,
            p.guideline_adherence.map(|g| g.as_str()),
            p.evidence_level.map(|e| e.as_str()),
            p.trend_direction.map(|t| t.as_str()),
            p.last_updated,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_common_combination(conn: &Connection, c: &CommonCombination) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO common_combinations (condition, medicine1, medicine2, medicine3, combination_frequency,
         synergy_score, safety_profile, monitoring_needs, typical_duration, warnings)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            c.condition,
            c.medicine1,
            c.medicine2,
            c.medicine3,
            c.combination_frequency,
            c.synergy_score,
            c.safety_profile,
            c.monitoring_needs,
            c.typical_duration,
            c.warnings,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patterns_for_condition(conn: &Connection, condition: &str) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    query_patterns(
        conn,
        "WHERE condition = ?1 ORDER BY prescription_frequency DESC, id ASC",
        params![condition.trim()],
    )
}

/// Patterns where the medicine is prescribed as primary or secondary.
pub fn get_patterns_for_medicine(conn: &Connection, medicine: &str) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    query_patterns(
        conn,
        "WHERE primary_medicine = ?1 OR secondary_medicine = ?1
         ORDER BY prescription_frequency DESC, id ASC",
        params![medicine.trim()],
    )
}

pub fn get_common_combinations_for_condition(
    conn: &Connection,
    condition: &str,
) -> Result<Vec<CommonCombination>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COMBINATION_COLUMNS} FROM common_combinations
         WHERE condition = ?1
         ORDER BY combination_frequency DESC, id ASC"
    ))?;
    let rows = stmt.query_map(params![condition.trim()], |row| {
        Ok(CommonCombination {
            id: row.get(0)?,
            condition: row.get(1)?,
            medicine1: row.get(2)?,
            medicine2: row.get(3)?,
            medicine3: row.get(4)?,
            combination_frequency: row.get(5)?,
            synergy_score: row.get(6)?,
            safety_profile: row.get(7)?,
            monitoring_needs: row.get(8)?,
            typical_duration: row.get(9)?,
            warnings: row.get(10)?,
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_trending_prescriptions(
    conn: &Connection,
    direction: TrendDirection,
) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    query_patterns(
        conn,
        "WHERE trend_direction = ?1 ORDER BY prescription_frequency DESC, id ASC",
        params![direction.as_str()],
    )
}

pub fn get_high_success_patterns(conn: &Connection, min_success: f64) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    query_patterns(
        conn,
        "WHERE success_rate >= ?1 ORDER BY success_rate DESC, prescription_frequency DESC, id ASC",
        params![min_success],
    )
}

/// Patterns for an age group, including those marked for all ages.
pub fn get_age_specific_patterns(conn: &Connection, age_group: &str) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    query_patterns(
        conn,
        "WHERE age_group = ?1 COLLATE NOCASE OR age_group = ?2
         ORDER BY prescription_frequency DESC, id ASC",
        params![age_group.trim(), ALL_AGES],
    )
}

pub fn get_seasonal_patterns(conn: &Connection, season: &str) -> Result<Vec<PrescriptionPattern>, DatabaseError> {
    query_patterns(
        conn,
        "WHERE seasonal_trend LIKE ?1 ORDER BY prescription_frequency DESC, id ASC",
        params![like_pattern(season)],
    )
}
