use rusqlite::Connection;

use super::parser::parse_medicine_list;
use super::prompt::{build_extraction_prompt, EXTRACTION_SYSTEM_PROMPT};
use super::types::{ExtractedMedicine, LlmClient};
use super::PipelineError;
use crate::alternatives::MedicineRequest;
use crate::search::FuzzySearcher;

/// Reads medicines off prescription text with the LLM, then snaps the names
/// onto the catalogue when the fuzzy match is good enough.
pub struct MedicineExtractor<'a> {
    llm: &'a dyn LlmClient,
    model: String,
    searcher: FuzzySearcher<'a>,
    accept_score: u8,
}

impl<'a> MedicineExtractor<'a> {
    pub fn new(conn: &'a Connection, llm: &'a dyn LlmClient, model: &str, accept_score: u8) -> Self {
        Self {
            llm,
            model: model.to_string(),
            searcher: FuzzySearcher::new(conn),
            accept_score,
        }
    }

    pub fn extract(&mut self, text: &str) -> Result<Vec<ExtractedMedicine>, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::InputTooShort);
        }

        let prompt = build_extraction_prompt(text);
        let response = self.llm.generate(&self.model, &prompt, EXTRACTION_SYSTEM_PROMPT)?;
        let parsed = parse_medicine_list(&response);
        tracing::info!(count = parsed.len(), "Medicines extracted from prescription");

        parsed.into_iter().map(|request| self.enhance(request)).collect()
    }

    fn enhance(&mut self, request: MedicineRequest) -> Result<ExtractedMedicine, PipelineError> {
        let result = self.searcher.search_with_suggestions(&request.name, 1)?;
        let corrected = result
            .best_match()
            .filter(|m| result.confidence.is_actionable() && m.similarity_score >= self.accept_score)
            .map(|m| m.medicine.name.clone());

        let Some(corrected) = corrected else {
            return Ok(ExtractedMedicine::unchanged(request));
        };

        let changed = corrected.to_lowercase() != request.name.to_lowercase();
        if changed {
            tracing::info!(from = %request.name, to = %corrected, "Fuzzy search corrected medicine name");
        }
        Ok(ExtractedMedicine {
            name: corrected,
            quantity: request.quantity,
            original_name: changed.then_some(request.name),
            fuzzy_enhanced: changed,
        })
    }
}
