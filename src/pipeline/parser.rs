use serde_json::Value;

use crate::alternatives::MedicineRequest;

/// Parse the LLM's medicine list. Anything that is not a JSON array of
/// `{name, quantity}` objects is skipped, so a bad reply yields an empty list.
pub fn parse_medicine_list(response: &str) -> Vec<MedicineRequest> {
    let Some(json_str) = extract_json_array(response) else {
        tracing::warn!("No JSON array in LLM response");
        return Vec::new();
    };

    let items: Vec<Value> = match serde_json::from_str(json_str) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Could not parse LLM medicine list");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| {
            let name = stringify(item.get("name")?)?;
            let quantity = stringify(item.get("quantity")?)?;
            Some(MedicineRequest { name, quantity })
        })
        .collect()
}

/// Slice from the first `[` to the last `]`.
fn extract_json_array(response: &str) -> Option<&str> {
    let start = response.find('[')?;
    let end = response.rfind(']')?;
    (end > start).then(|| &response[start..=end])
}

fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string().trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_wrapped_in_prose() {
        let response = r#"Sure, here are the medicines:
[
  {"name": " Augmentin 625 ", "quantity": "10 tablets"},
  {"name": "Calpol", "quantity": "1 bottle"}
]
Let me know if you need anything else."#;
        let list = parse_medicine_list(response);
        assert_eq!(
            list,
            vec![
                MedicineRequest::new("Augmentin 625", "10 tablets"),
                MedicineRequest::new("Calpol", "1 bottle"),
            ]
        );
    }

    #[test]
    fn non_string_values_are_stringified() {
        let list = parse_medicine_list(r#"[{"name": "Zinc", "quantity": 30}]"#);
        assert_eq!(list, vec![MedicineRequest::new("Zinc", "30")]);
    }

    #[test]
    fn incomplete_entries_are_dropped() {
        let response = r#"[
            {"name": "Calpol"},
            {"quantity": "5"},
            {"name": null, "quantity": "2"},
            "just a string",
            {"name": "Crocin", "quantity": "15 tablets", "notes": "after food"}
        ]"#;
        assert_eq!(parse_medicine_list(response), vec![MedicineRequest::new("Crocin", "15 tablets")]);
    }

    #[test]
    fn missing_or_broken_json_gives_empty_list() {
        assert!(parse_medicine_list("I could not find any medicines.").is_empty());
        assert!(parse_medicine_list("[{\"name\": \"Calpol\", ").is_empty());
        assert!(parse_medicine_list("] backwards [").is_empty());
        assert!(parse_medicine_list("[not json]").is_empty());
    }

    #[test]
    fn array_inside_an_object_is_found() {
        let list = parse_medicine_list(r#"{"medicines": [{"name": "Calpol", "quantity": "1"}]}"#);
        assert_eq!(list, vec![MedicineRequest::new("Calpol", "1")]);
    }

    #[test]
    fn array_of_scalars_gives_empty_list() {
        assert!(parse_medicine_list("[1, 2, 3]").is_empty());
    }
}
