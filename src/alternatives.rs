//! Cost-saving substitutions: cheaper in-stock products with the same generic name.

use std::sync::LazyLock;

use regex::Regex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::db::repository::{get_market_price_estimate, get_medicine_info, get_medicines_by_generic};
use crate::db::DatabaseError;
use crate::models::{round_to, Medicine};

static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// First integer in a quantity string ("10 tablets" is 10), or 1.
/// Digit runs too long for a `u64` saturate.
pub fn extract_quantity_number(quantity: &str) -> u64 {
    FIRST_INTEGER
        .find(quantity)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(1)
}

/// Resolves a brand or unknown name to its generic name.
pub trait GenericResolver {
    fn resolve_generic(&self, medicine_name: &str) -> String;
}

/// A medicine requested on a prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRequest {
    pub name: String,
    pub quantity: String,
}

impl MedicineRequest {
    pub fn new(name: &str, quantity: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity: quantity.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Alternative {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub savings_amount: f64,
    pub savings_percent: f64,
    pub total_savings: f64,
    pub quantity_needed: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Catalogue,
    MarketEstimate,
}

#[derive(Debug, Clone, Serialize)]
pub struct MedicineAlternatives {
    pub name: String,
    pub quantity: String,
    pub generic: String,
    pub original_price: f64,
    pub price_source: PriceSource,
    pub alternatives: Vec<Alternative>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlternativesSummary {
    pub total_medicines: usize,
    pub medicines_with_alternatives: usize,
    pub total_alternatives_found: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AlternativesReport {
    pub medicines: Vec<MedicineAlternatives>,
    pub summary: AlternativesSummary,
}

impl AlternativesReport {
    pub fn from_medicines(medicines: Vec<MedicineAlternatives>) -> Self {
        let summary = AlternativesSummary {
            total_medicines: medicines.len(),
            medicines_with_alternatives: medicines.iter().filter(|m| !m.alternatives.is_empty()).count(),
            total_alternatives_found: medicines.iter().map(|m| m.alternatives.len()).sum(),
        };
        Self { medicines, summary }
    }
}

/// Cheaper in-stock products sharing `generic_name`, cheapest first.
pub fn find_cheapest_alternatives(
    conn: &Connection,
    medicine_name: &str,
    generic_name: &str,
    original_price: f64,
    quantity_needed: &str,
    min_stock: i64,
    limit: usize,
) -> Result<Vec<Alternative>, DatabaseError> {
    let quantity_number = extract_quantity_number(quantity_needed) as f64;
    let candidates = get_medicines_by_generic(conn, generic_name, min_stock)?;

    let alternatives = candidates
        .into_iter()
        .filter(|m| !m.name.eq_ignore_ascii_case(medicine_name.trim()))
        .filter(|m| m.price < original_price)
        .take(limit)
        .map(|medicine| {
            let savings = original_price - medicine.price;
            let percent = if original_price > 0.0 { savings / original_price * 100.0 } else { 0.0 };
            Alternative {
                savings_amount: round_to(savings, 2),
                savings_percent: round_to(percent, 1),
                total_savings: round_to(savings * quantity_number, 2),
                quantity_needed: quantity_needed.to_string(),
                medicine,
            }
        })
        .collect();
    Ok(alternatives)
}

/// Limits applied when searching for substitutes.
#[derive(Debug, Clone, Copy)]
pub struct FinderSettings {
    pub min_stock: i64,
    pub limit: usize,
    pub default_price: f64,
}

impl From<&AppConfig> for FinderSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_stock: config.min_stock,
            limit: config.alternatives_limit,
            default_price: config.default_price,
        }
    }
}

impl Default for FinderSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

pub struct AlternativeFinder<'a> {
    conn: &'a Connection,
    resolver: &'a dyn GenericResolver,
    settings: FinderSettings,
}

impl<'a> AlternativeFinder<'a> {
    pub fn new(conn: &'a Connection, resolver: &'a dyn GenericResolver, settings: FinderSettings) -> Self {
        Self { conn, resolver, settings }
    }

    /// Price and generic name from the catalogue when known, otherwise resolved and estimated.
    pub fn process_medicine(&self, request: &MedicineRequest) -> Result<MedicineAlternatives, DatabaseError> {
        let catalogued = get_medicine_info(self.conn, &request.name)?;

        let (generic, original_price, price_source) = match catalogued {
            Some(med) => {
                let generic = match med.generic_name.filter(|g| !g.trim().is_empty()) {
                    Some(g) => g,
                    None => self.resolver.resolve_generic(&request.name),
                };
                tracing::debug!(medicine = %request.name, %generic, price = med.price, "Found in catalogue");
                (generic, med.price, PriceSource::Catalogue)
            }
            None => {
                let generic = self.resolver.resolve_generic(&request.name);
                let price = get_market_price_estimate(self.conn, &generic, self.settings.default_price)?;
                tracing::debug!(medicine = %request.name, %generic, price, "Estimated from market average");
                (generic, price, PriceSource::MarketEstimate)
            }
        };

        let alternatives = find_cheapest_alternatives(
            self.conn,
            &request.name,
            &generic,
            original_price,
            &request.quantity,
            self.settings.min_stock,
            self.settings.limit,
        )?;

        Ok(MedicineAlternatives {
            name: request.name.clone(),
            quantity: request.quantity.clone(),
            generic,
            original_price,
            price_source,
            alternatives,
        })
    }

    pub fn suggest_alternatives(&self, requests: &[MedicineRequest]) -> Result<AlternativesReport, DatabaseError> {
        let medicines = requests
            .iter()
            .map(|r| self.process_medicine(r))
            .collect::<Result<Vec<_>, _>>()?;
        let report = AlternativesReport::from_medicines(medicines);
        tracing::info!(
            medicines = report.summary.total_medicines,
            with_alternatives = report.summary.medicines_with_alternatives,
            "Alternative search complete"
        );
        Ok(report)
    }
}
