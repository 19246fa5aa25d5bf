use serde::{Deserialize, Serialize};

use super::enums::{FrequencyCategory, SideEffectSeverity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideEffect {
    pub id: i64,
    pub medicine_name: String,
    pub side_effect: String,
    pub frequency_percentage: Option<f64>,
    pub frequency_category: Option<FrequencyCategory>,
    pub severity: Option<SideEffectSeverity>,
    pub onset_timing: Option<String>,
    pub affected_population: Option<String>,
    pub description: Option<String>,
    pub management_advice: Option<String>,
    pub when_to_seek_help: Option<String>,
    pub reversible: Option<bool>,
    pub dose_related: Option<bool>,
    pub system_affected: Option<String>,
}

impl SideEffect {
    pub fn new(medicine_name: &str, side_effect: &str) -> Self {
        Self {
            id: 0,
            medicine_name: medicine_name.to_string(),
            side_effect: side_effect.to_string(),
            frequency_percentage: None,
            frequency_category: None,
            severity: None,
            onset_timing: None,
            affected_population: None,
            description: None,
            management_advice: None,
            when_to_seek_help: None,
            reversible: None,
            dose_related: None,
            system_affected: None,
        }
    }

    pub fn is_serious(&self) -> bool {
        self.severity.is_some_and(|s| s.is_serious())
    }

    /// Frequency as a percentage, 0 when unknown.
    pub fn frequency(&self) -> f64 {
        self.frequency_percentage.unwrap_or(0.0)
    }
}
