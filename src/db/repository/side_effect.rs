use rusqlite::{params, Connection, Row};

use super::like_pattern;
use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

const SIDE_EFFECT_COLUMNS: &str = "id, medicine_name, side_effect, frequency_percentage, frequency_category,
     severity, onset_timing, affected_population, description, management_advice, when_to_seek_help,
     reversible, dose_related, system_affected";

/// Minimum frequency (percent) for a side effect to count as common.
pub const COMMON_FREQUENCY_PERCENT: f64 = 5.0;

struct SideEffectRow {
    id: i64,
    medicine_name: String,
    side_effect: String,
    frequency_percentage: Option<f64>,
    frequency_category: Option<String>,
    severity: Option<String>,
    onset_timing: Option<String>,
    affected_population: Option<String>,
    description: Option<String>,
    management_advice: Option<String>,
    when_to_seek_help: Option<String>,
    reversible: Option<bool>,
    dose_related: Option<bool>,
    system_affected: Option<String>,
}

fn side_effect_row(row: &Row<'_>) -> rusqlite::Result<SideEffectRow> {
    Ok(SideEffectRow {
        id: row.get(0)?,
        medicine_name: row.get(1)?,
        side_effect: row.get(2)?,
        frequency_percentage: row.get(3)?,
        frequency_category: row.get(4)?,
        severity: row.get(5)?,
        onset_timing: row.get(6)?,
        affected_population: row.get(7)?,
        description: row.get(8)?,
        management_advice: row.get(9)?,
        when_to_seek_help: row.get(10)?,
        reversible: row.get(11)?,
        dose_related: row.get(12)?,
        system_affected: row.get(13)?,
    })
}

fn side_effect_from_row(row: SideEffectRow) -> Result<SideEffect, DatabaseError> {
    Ok(SideEffect {
        id: row.id,
        medicine_name: row.medicine_name,
        side_effect: row.side_effect,
        frequency_percentage: row.frequency_percentage,
        frequency_category: parse_optional(row.frequency_category)?,
        severity: parse_optional(row.severity)?,
        onset_timing: row.onset_timing,
        affected_population: row.affected_population,
        description: row.description,
        management_advice: row.management_advice,
        when_to_seek_help: row.when_to_seek_help,
        reversible: row.reversible,
        dose_related: row.dose_related,
        system_affected: row.system_affected,
    })
}

fn query_side_effects(
    conn: &Connection,
    filter_and_order: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<SideEffect>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {SIDE_EFFECT_COLUMNS} FROM side_effects {filter_and_order}"
    ))?;
    let rows = stmt.query_map(params, side_effect_row)?;

    let mut effects = Vec::new();
    for row in rows {
        effects.push(side_effect_from_row(row?)?);
    }
    Ok(effects)
}

pub fn insert_side_effect(conn: &Connection, effect: &SideEffect) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO side_effects (medicine_name, side_effect, frequency_percentage, frequency_category,
         severity, onset_timing, affected_population, description, management_advice, when_to_seek_help,
         reversible, dose_related, system_affected)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            effect.medicine_name,
            effect.side_effect,
            effect.frequency_percentage,
            effect.frequency_category.map(|c| c.as_str()),
            effect.severity.map(|s| s.as_str()),
            effect.onset_timing,
            effect.affected_population,
            effect.description,
            effect.management_advice,
            effect.when_to_seek_help,
            effect.reversible,
            effect.dose_related,
            effect.system_affected,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All side effects of a medicine, most frequent first.
pub fn get_side_effects_for_medicine(conn: &Connection, medicine: &str) -> Result<Vec<SideEffect>, DatabaseError> {
    query_side_effects(
        conn,
        "WHERE medicine_name = ?1 ORDER BY frequency_percentage DESC, id ASC",
        params![medicine.trim()],
    )
}

pub fn get_common_side_effects(conn: &Connection, medicine: &str) -> Result<Vec<SideEffect>, DatabaseError> {
    query_side_effects(
        conn,
        "WHERE medicine_name = ?1 AND frequency_percentage >= ?2
         ORDER BY frequency_percentage DESC, id ASC",
        params![medicine.trim(), COMMON_FREQUENCY_PERCENT],
    )
}

/// Severe and life-threatening effects, worst first, then by frequency.
pub fn get_severe_side_effects(conn: &Connection, medicine: &str) -> Result<Vec<SideEffect>, DatabaseError> {
    query_side_effects(
        conn,
        "WHERE medicine_name = ?1 AND severity IN (?2, ?3)
         ORDER BY CASE severity WHEN 'life_threatening' THEN 2 ELSE 1 END DESC,
                  frequency_percentage DESC, id ASC",
        params![
            medicine.trim(),
            SideEffectSeverity::Severe.as_str(),
            SideEffectSeverity::LifeThreatening.as_str()
        ],
    )
}

pub fn get_pediatric_concerns(conn: &Connection, medicine: &str) -> Result<Vec<SideEffect>, DatabaseError> {
    query_side_effects(
        conn,
        "WHERE medicine_name = ?1
           AND (affected_population LIKE '%child%'
                OR affected_population LIKE '%pediatric%'
                OR side_effect LIKE '%growth%'
                OR side_effect LIKE '%development%'
                OR side_effect = 'Reye''s syndrome' COLLATE NOCASE)
         ORDER BY frequency_percentage DESC, id ASC",
        params![medicine.trim()],
    )
}

pub fn search_side_effects_by_symptom(conn: &Connection, symptom: &str) -> Result<Vec<SideEffect>, DatabaseError> {
    query_side_effects(
        conn,
        "WHERE side_effect LIKE ?1 OR description LIKE ?1
         ORDER BY frequency_percentage DESC, id ASC",
        params![like_pattern(symptom)],
    )
}
