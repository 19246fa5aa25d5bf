use serde::{Deserialize, Serialize};

use super::enums::InteractionSeverity;

/// A drug-drug interaction, stored once per unordered pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: i64,
    pub drug1_name: String,
    pub drug2_name: String,
    pub severity: InteractionSeverity,
    pub description: String,
    pub symptoms: Option<String>,
    pub recommendation: String,
    pub mechanism: Option<String>,
    pub clinical_significance: Option<String>,
}

impl Interaction {
    pub fn new(
        drug1_name: &str,
        drug2_name: &str,
        severity: InteractionSeverity,
        description: &str,
        recommendation: &str,
    ) -> Self {
        Self {
            id: 0,
            drug1_name: drug1_name.to_string(),
            drug2_name: drug2_name.to_string(),
            severity,
            description: description.to_string(),
            symptoms: None,
            recommendation: recommendation.to_string(),
            mechanism: None,
            clinical_significance: None,
        }
    }

    /// The drug on the other side of the pair, seen from `medicine`.
    pub fn counterpart(&self, medicine: &str) -> &str {
        if self.drug1_name.eq_ignore_ascii_case(medicine) {
            &self.drug2_name
        } else {
            &self.drug1_name
        }
    }
}
