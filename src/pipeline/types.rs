use serde::{Deserialize, Serialize};

use super::PipelineError;
use crate::alternatives::MedicineRequest;

/// LLM client abstraction (allows mocking)
pub trait LlmClient {
    fn generate(&self, model: &str, prompt: &str, system: &str) -> Result<String, PipelineError>;

    fn is_model_available(&self, model: &str) -> Result<bool, PipelineError>;

    fn list_models(&self) -> Result<Vec<String>, PipelineError>;
}

/// A medicine read off a prescription, after fuzzy correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedMedicine {
    pub name: String,
    pub quantity: String,
    /// The name as the LLM returned it, when the catalogue corrected it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    pub fuzzy_enhanced: bool,
}

impl ExtractedMedicine {
    pub fn unchanged(request: MedicineRequest) -> Self {
        Self {
            name: request.name,
            quantity: request.quantity,
            original_name: None,
            fuzzy_enhanced: false,
        }
    }

    pub fn to_request(&self) -> MedicineRequest {
        MedicineRequest::new(&self.name, &self.quantity)
    }
}
