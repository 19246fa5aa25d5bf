use rusqlite::{params, Connection, OptionalExtension, Row};

use super::like_pattern;
use crate::db::DatabaseError;
use crate::models::*;

const MEDICINE_COLUMNS: &str =
    "id, name, class, price, stock_quantity, generic_name, dosage_form, strength, manufacturer";

fn medicine_from_row(row: &Row<'_>) -> rusqlite::Result<Medicine> {
    Ok(Medicine {
        id: row.get(0)?,
        name: row.get(1)?,
        class_name: row.get(2)?,
        price: row.get(3)?,
        stock_quantity: row.get(4)?,
        generic_name: row.get(5)?,
        dosage_form: row.get(6)?,
        strength: row.get(7)?,
        manufacturer: row.get(8)?,
    })
}

pub fn insert_medicine(conn: &Connection, med: &Medicine) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO medicines (name, class, price, stock_quantity, generic_name, dosage_form, strength, manufacturer)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            med.name,
            med.class_name,
            med.price,
            med.stock_quantity,
            med.generic_name,
            med.dosage_form,
            med.strength,
            med.manufacturer,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_medicine(conn: &Connection, id: i64) -> Result<Medicine, DatabaseError> {
    conn.query_row(
        &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE id = ?1"),
        params![id],
        medicine_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "Medicine".into(),
            id: id.to_string(),
        },
        other => DatabaseError::from(other),
    })
}

/// Stock level update, e.g. after a sale.
pub fn update_stock_quantity(conn: &Connection, id: i64, stock_quantity: i64) -> Result<(), DatabaseError> {
    let updated = conn.execute(
        "UPDATE medicines SET stock_quantity = ?1 WHERE id = ?2",
        params![stock_quantity, id],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Medicine".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Exact (case-insensitive) name match first, then a substring match.
pub fn get_medicine_info(conn: &Connection, name: &str) -> Result<Option<Medicine>, DatabaseError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(None);
    }

    let exact = conn
        .query_row(
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE name = ?1 ORDER BY id LIMIT 1"),
            params![name],
            medicine_from_row,
        )
        .optional()?;
    if exact.is_some() {
        return Ok(exact);
    }

    let partial = conn
        .query_row(
            &format!("SELECT {MEDICINE_COLUMNS} FROM medicines WHERE name LIKE ?1 ORDER BY id LIMIT 1"),
            params![like_pattern(name)],
            medicine_from_row,
        )
        .optional()?;
    Ok(partial)
}

/// In-stock medicines sharing a generic name, cheapest first.
pub fn get_medicines_by_generic(
    conn: &Connection,
    generic_name: &str,
    min_stock: i64,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE generic_name = ?1 AND stock_quantity >= ?2
         ORDER BY price ASC, id ASC"
    ))?;
    let rows = stmt.query_map(params![generic_name.trim(), min_stock], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

/// Average catalogue price for a generic name, or `default` when nothing matches.
pub fn get_market_price_estimate(
    conn: &Connection,
    generic_name: &str,
    default: f64,
) -> Result<f64, DatabaseError> {
    let avg: Option<f64> = conn.query_row(
        "SELECT AVG(price) FROM medicines WHERE generic_name = ?1",
        params![generic_name.trim()],
        |row| row.get(0),
    )?;
    Ok(avg.map(|p| round_to(p, 2)).unwrap_or(default))
}

pub fn check_stock_availability(
    conn: &Connection,
    name: &str,
    required_quantity: i64,
) -> Result<bool, DatabaseError> {
    let stock: Option<i64> = conn
        .query_row(
            "SELECT MAX(stock_quantity) FROM medicines WHERE name = ?1",
            params![name.trim()],
            |row| row.get(0),
        )?;
    Ok(stock.is_some_and(|s| s >= required_quantity))
}

pub fn search_medicines(conn: &Connection, term: &str, limit: usize) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE name LIKE ?1 OR generic_name LIKE ?1
         ORDER BY price ASC, id ASC
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![like_pattern(term), limit as i64], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_medicines_by_class(
    conn: &Connection,
    class_name: &str,
    limit: usize,
) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines
         WHERE class = ?1 COLLATE NOCASE
         ORDER BY price ASC, id ASC
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![class_name.trim(), limit as i64], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn list_class_summaries(conn: &Connection) -> Result<Vec<ClassSummary>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT class, COUNT(*), MIN(price), MAX(price), AVG(price)
         FROM medicines
         GROUP BY class
         ORDER BY COUNT(*) DESC, class ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ClassSummary {
            class_name: row.get(0)?,
            count: row.get(1)?,
            min_price: row.get(2)?,
            max_price: row.get(3)?,
            avg_price: round_to(row.get::<_, f64>(4)?, 2),
        })
    })?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

pub fn get_catalog_stats(conn: &Connection) -> Result<CatalogStats, DatabaseError> {
    let stats = conn.query_row(
        "SELECT COUNT(*), COUNT(DISTINCT class),
                MIN(price), MAX(price), AVG(price),
                CAST(MIN(stock_quantity) AS REAL), CAST(MAX(stock_quantity) AS REAL),
                AVG(stock_quantity)
         FROM medicines",
        [],
        |row| {
            let range = |min: Option<f64>, max: Option<f64>, avg: Option<f64>| ValueRange {
                min: min.unwrap_or(0.0),
                max: max.unwrap_or(0.0),
                avg: round_to(avg.unwrap_or(0.0), 2),
            };
            Ok(CatalogStats {
                total_medicines: row.get(0)?,
                total_classes: row.get(1)?,
                price_range: range(row.get(2)?, row.get(3)?, row.get(4)?),
                stock_range: range(row.get(5)?, row.get(6)?, row.get(7)?),
            })
        },
    )?;
    Ok(stats)
}

/// Every medicine with a usable name.
pub fn list_all_medicines(conn: &Connection) -> Result<Vec<Medicine>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEDICINE_COLUMNS} FROM medicines WHERE TRIM(name) != '' ORDER BY id ASC"
    ))?;
    let rows = stmt.query_map([], medicine_from_row)?;
    rows.map(|r| r.map_err(DatabaseError::from)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn seeded_db() -> Connection {
        let conn = open_memory_database().unwrap();
        let meds = [
            Medicine::new("Crocin 500", "Analgesic", 30.0, 100).with_generic("Paracetamol"),
            Medicine::new("Dolo 650", "Analgesic", 32.5, 50).with_generic("Paracetamol"),
            Medicine::new("Calpol", "Analgesic", 18.0, 5).with_generic("Paracetamol"),
            Medicine::new("Pacimol", "Analgesic", 12.0, 40).with_generic("Paracetamol"),
            Medicine::new("Brufen", "NSAID", 45.0, 20).with_generic("Ibuprofen"),
        ];
        for m in &meds {
            insert_medicine(&conn, m).unwrap();
        }
        conn
    }

    #[test]
    fn lookup_by_id_and_stock_update() {
        let conn = seeded_db();
        let zincovit = Medicine::new("Zincovit", "Supplement", 12.0, 5).with_manufacturer("Apex Labs");
        let id = insert_medicine(&conn, &zincovit).unwrap();
        update_stock_quantity(&conn, id, 40).unwrap();
        let stored = get_medicine(&conn, id).unwrap();
        assert_eq!(stored.stock_quantity, 40);
        assert_eq!(stored.manufacturer.as_deref(), Some("Apex Labs"));

        match get_medicine(&conn, 9999).unwrap_err() {
            DatabaseError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Medicine");
                assert_eq!(id, "9999");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            update_stock_quantity(&conn, 9999, 1),
            Err(DatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn exact_match_is_case_insensitive() {
        let conn = seeded_db();
        let med = get_medicine_info(&conn, "CALPOL").unwrap().unwrap();
        assert_eq!(med.name, "Calpol");
        assert_eq!(med.generic_name.as_deref(), Some("Paracetamol"));
    }

    #[test]
    fn falls_back_to_substring_match() {
        let conn = seeded_db();
        let med = get_medicine_info(&conn, "dolo").unwrap().unwrap();
        assert_eq!(med.name, "Dolo 650");
        assert!(get_medicine_info(&conn, "zzz").unwrap().is_none());
        assert!(get_medicine_info(&conn, "  ").unwrap().is_none());
    }

    #[test]
    fn generic_lookup_respects_stock_and_price_order() {
        let conn = seeded_db();
        let meds = get_medicines_by_generic(&conn, "paracetamol", 10).unwrap();
        let names: Vec<_> = meds.iter().map(|m| m.name.as_str()).collect();
        // Calpol has only 5 in stock
        assert_eq!(names, vec!["Pacimol", "Crocin 500", "Dolo 650"]);
    }

    #[test]
    fn price_estimate_averages_or_defaults() {
        let conn = seeded_db();
        let avg = get_market_price_estimate(&conn, "Paracetamol", 25.0).unwrap();
        assert_eq!(avg, 23.13);
        let fallback = get_market_price_estimate(&conn, "Cetirizine", 25.0).unwrap();
        assert_eq!(fallback, 25.0);
    }

    #[test]
    fn stock_availability_requires_exact_name() {
        let conn = seeded_db();
        assert!(check_stock_availability(&conn, "brufen", 20).unwrap());
        assert!(!check_stock_availability(&conn, "Brufen", 21).unwrap());
        assert!(!check_stock_availability(&conn, "Bru", 1).unwrap());
    }

    #[test]
    fn search_matches_name_or_generic() {
        let conn = seeded_db();
        let hits = search_medicines(&conn, "ibu", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Brufen");

        let limited = search_medicines(&conn, "paracetamol", 2).unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].name, "Pacimol");
    }

    #[test]
    fn class_queries_and_summaries() {
        let conn = seeded_db();
        let analgesics = get_medicines_by_class(&conn, "analgesic", 10).unwrap();
        assert_eq!(analgesics.len(), 4);
        assert_eq!(analgesics[0].price, 12.0);

        let summaries = list_class_summaries(&conn).unwrap();
        assert_eq!(summaries[0].class_name, "Analgesic");
        assert_eq!(summaries[0].count, 4);
        assert_eq!(summaries[0].min_price, 12.0);
        assert_eq!(summaries[0].max_price, 32.5);
        assert_eq!(summaries[1].class_name, "NSAID");
    }

    #[test]
    fn catalog_stats_cover_price_and_stock() {
        let conn = seeded_db();
        let stats = get_catalog_stats(&conn).unwrap();
        assert_eq!(stats.total_medicines, 5);
        assert_eq!(stats.total_classes, 2);
        assert_eq!(stats.price_range.min, 12.0);
        assert_eq!(stats.price_range.max, 45.0);
        assert_eq!(stats.stock_range.min, 5.0);
        assert_eq!(stats.stock_range.max, 100.0);
        assert_eq!(stats.stock_range.avg, 43.0);
    }

    #[test]
    fn catalog_stats_on_empty_catalogue() {
        let conn = open_memory_database().unwrap();
        let stats = get_catalog_stats(&conn).unwrap();
        assert_eq!(stats.total_medicines, 0);
        assert_eq!(stats.price_range.max, 0.0);
    }

    #[test]
    fn list_all_skips_blank_names() {
        let conn = seeded_db();
        insert_medicine(&conn, &Medicine::new("  ", "Analgesic", 1.0, 1)).unwrap();
        assert_eq!(list_all_medicines(&conn).unwrap().len(), 5);
    }
}
