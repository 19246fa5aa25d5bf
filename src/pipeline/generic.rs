use super::prompt::{build_generic_name_prompt, GENERIC_NAME_SYSTEM_PROMPT};
use super::types::LlmClient;
use crate::alternatives::GenericResolver;

/// Resolves generic names by asking the LLM. Never fails: the medicine name
/// itself is the fallback answer.
pub struct LlmGenericResolver<'a> {
    llm: &'a dyn LlmClient,
    model: String,
}

impl<'a> LlmGenericResolver<'a> {
    pub fn new(llm: &'a dyn LlmClient, model: &str) -> Self {
        Self {
            llm,
            model: model.to_string(),
        }
    }
}

impl GenericResolver for LlmGenericResolver<'_> {
    fn resolve_generic(&self, medicine_name: &str) -> String {
        let prompt = build_generic_name_prompt(medicine_name);
        match self.llm.generate(&self.model, &prompt, GENERIC_NAME_SYSTEM_PROMPT) {
            Ok(answer) => {
                let generic = clean_answer(&answer);
                if generic.is_empty() {
                    tracing::warn!(medicine = medicine_name, "LLM gave no generic name, using medicine name");
                    medicine_name.to_string()
                } else {
                    tracing::debug!(medicine = medicine_name, generic = %generic, "Resolved generic name");
                    generic
                }
            }
            Err(e) => {
                tracing::warn!(medicine = medicine_name, error = %e, "Generic lookup failed, using medicine name");
                medicine_name.to_string()
            }
        }
    }
}

fn clean_answer(answer: &str) -> String {
    answer
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
        .to_string()
}
