pub const EXTRACTION_SYSTEM_PROMPT: &str = r#"
You read prescriptions and medicine lists. Your ONLY role is to list the
medicines that are written in the text, with their quantities.

RULES:
1. Include ONLY medicines that are clearly mentioned with a quantity.
2. NEVER invent medicines or quantities.
3. If a medicine appears several times, combine the quantities when possible.
4. Keep quantity formats as written (tablets, capsules, mg, ml, ...).
5. Output MUST be a JSON array and nothing else.
"#;

pub const GENERIC_NAME_SYSTEM_PROMPT: &str = r#"
You are a pharmacist. Answer with the active ingredient of a medicine and
nothing else: no sentence, no dose, no punctuation.
"#;

/// Build the extraction prompt for one prescription text.
pub fn build_extraction_prompt(text: &str) -> String {
    format!(
        r#"<prescription>
{text}
</prescription>

List every medicine in the prescription above with its quantity.
Return the result in exactly this format:

[
  {{"name": "Medicine Name", "quantity": "10 tablets"}},
  {{"name": "Another Medicine", "quantity": "500mg"}}
]
"#
    )
}

pub fn build_generic_name_prompt(medicine_name: &str) -> String {
    format!("What is the generic name (active ingredient) of the medicine \"{medicine_name}\"?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_prompt_wraps_text() {
        let prompt = build_extraction_prompt("Augmentin 625 - 10 tablets");
        assert!(prompt.contains("<prescription>\nAugmentin 625 - 10 tablets\n</prescription>"));
        assert!(prompt.contains(r#"{"name": "Medicine Name", "quantity": "10 tablets"}"#));
    }

    #[test]
    fn extraction_prompt_does_not_ask_for_generics() {
        assert!(!build_extraction_prompt("x").contains("generic name"));
    }

    #[test]
    fn generic_prompt_quotes_the_name() {
        let prompt = build_generic_name_prompt("Crocin");
        assert!(prompt.contains("\"Crocin\""));
        assert!(prompt.contains("generic name"));
    }

    #[test]
    fn system_prompts_restrict_output() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("JSON array"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("NEVER invent"));
        assert!(GENERIC_NAME_SYSTEM_PROMPT.contains("active ingredient"));
    }
}
