use serde::{Deserialize, Serialize};

/// A priced, stocked product in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub price: f64,
    pub stock_quantity: i64,
    pub generic_name: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
}

impl Medicine {
    pub fn new(name: &str, class_name: &str, price: f64, stock_quantity: i64) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            class_name: class_name.to_string(),
            price,
            stock_quantity,
            generic_name: None,
            dosage_form: None,
            strength: None,
            manufacturer: None,
        }
    }

    pub fn with_generic(mut self, generic_name: &str) -> Self {
        self.generic_name = Some(generic_name.to_string());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: &str) -> Self {
        self.manufacturer = Some(manufacturer.to_string());
        self
    }
}

/// Per-class price overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSummary {
    #[serde(rename = "class")]
    pub class_name: String,
    pub count: i64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
}

/// Min / max / average triple for a numeric catalogue column.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_medicines: i64,
    pub total_classes: i64,
    pub price_range: ValueRange,
    pub stock_range: ValueRange,
}
