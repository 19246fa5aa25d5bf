use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::DatabaseError;
use crate::models::enums::InteractionSeverity;
use crate::models::*;

const INTERACTION_COLUMNS: &str = "id, drug1_name, drug2_name, interaction_severity, description,
     symptoms, recommendation, mechanism, clinical_significance";

/// Most dangerous first.
const SEVERITY_ORDER: &str = "CASE interaction_severity
     WHEN 'contraindicated' THEN 4 WHEN 'severe' THEN 3 WHEN 'moderate' THEN 2 ELSE 1 END DESC";

struct InteractionRow {
    id: i64,
    drug1_name: String,
    drug2_name: String,
    severity: String,
    description: String,
    symptoms: Option<String>,
    recommendation: String,
    mechanism: Option<String>,
    clinical_significance: Option<String>,
}

fn interaction_row(row: &Row<'_>) -> rusqlite::Result<InteractionRow> {
    Ok(InteractionRow {
        id: row.get(0)?,
        drug1_name: row.get(1)?,
        drug2_name: row.get(2)?,
        severity: row.get(3)?,
        description: row.get(4)?,
        symptoms: row.get(5)?,
        recommendation: row.get(6)?,
        mechanism: row.get(7)?,
        clinical_significance: row.get(8)?,
    })
}

fn interaction_from_row(row: InteractionRow) -> Result<Interaction, DatabaseError> {
    Ok(Interaction {
        id: row.id,
        drug1_name: row.drug1_name,
        drug2_name: row.drug2_name,
        severity: row.severity.parse()?,
        description: row.description,
        symptoms: row.symptoms,
        recommendation: row.recommendation,
        mechanism: row.mechanism,
        clinical_significance: row.clinical_significance,
    })
}

fn collect_interactions(
    rows: impl Iterator<Item = rusqlite::Result<InteractionRow>>,
) -> Result<Vec<Interaction>, DatabaseError> {
    let mut interactions = Vec::new();
    for row in rows {
        interactions.push(interaction_from_row(row?)?);
    }
    Ok(interactions)
}

/// Insert an interaction. A pair already stored in either order is rejected.
pub fn insert_interaction(conn: &Connection, interaction: &Interaction) -> Result<i64, DatabaseError> {
    if check_interaction(conn, &interaction.drug1_name, &interaction.drug2_name)?.is_some() {
        return Err(DatabaseError::ConstraintViolation(format!(
            "interaction between {} and {} already exists",
            interaction.drug1_name, interaction.drug2_name
        )));
    }

    conn.execute(
        "INSERT INTO drug_interactions (drug1_name, drug2_name, interaction_severity, description,
         symptoms, recommendation, mechanism, clinical_significance)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            interaction.drug1_name,
            interaction.drug2_name,
            interaction.severity.as_str(),
            interaction.description,
            interaction.symptoms,
            interaction.recommendation,
            interaction.mechanism,
            interaction.clinical_significance,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The interaction recorded for a pair, looked up in both orders.
pub fn check_interaction(
    conn: &Connection,
    drug1: &str,
    drug2: &str,
) -> Result<Option<Interaction>, DatabaseError> {
    let row = conn
        .query_row(
            &format!(
                "SELECT {INTERACTION_COLUMNS} FROM drug_interactions
                 WHERE (drug1_name = ?1 AND drug2_name = ?2)
                    OR (drug1_name = ?2 AND drug2_name = ?1)
                 LIMIT 1"
            ),
            params![drug1.trim(), drug2.trim()],
            interaction_row,
        )
        .optional()?;
    row.map(interaction_from_row).transpose()
}

/// Every recorded interaction among the unordered pairs of `medicines`.
pub fn check_multiple_interactions(
    conn: &Connection,
    medicines: &[String],
) -> Result<Vec<Interaction>, DatabaseError> {
    let mut found = Vec::new();
    for (i, first) in medicines.iter().enumerate() {
        for second in &medicines[i + 1..] {
            if let Some(interaction) = check_interaction(conn, first, second)? {
                found.push(interaction);
            }
        }
    }
    Ok(found)
}

/// All interactions involving a drug on either side, most serious first.
pub fn get_drug_interactions(conn: &Connection, drug: &str) -> Result<Vec<Interaction>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INTERACTION_COLUMNS} FROM drug_interactions
         WHERE drug1_name = ?1 OR drug2_name = ?1
         ORDER BY {SEVERITY_ORDER}, id ASC"
    ))?;
    let rows = stmt.query_map(params![drug.trim()], interaction_row)?;
    collect_interactions(rows)
}

pub fn get_severe_interactions(conn: &Connection) -> Result<Vec<Interaction>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {INTERACTION_COLUMNS} FROM drug_interactions
         WHERE interaction_severity IN (?1, ?2)
         ORDER BY {SEVERITY_ORDER}, drug1_name ASC"
    ))?;
    let rows = stmt.query_map(
        params![
            InteractionSeverity::Severe.as_str(),
            InteractionSeverity::Contraindicated.as_str()
        ],
        interaction_row,
    )?;
    collect_interactions(rows)
}
