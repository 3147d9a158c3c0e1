use schemars::schema_for;

use crate::exchange::StrategyDocument;

/// JSON Schema for `StrategyDocument`, pretty-printed.
pub fn get_schema_json() -> String {
    let schema = schema_for!(StrategyDocument);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Serialization error: {}", e) }).to_string()
    })
}

/// Generate and print the JSON Schema for `StrategyDocument`.
pub fn run() -> anyhow::Result<()> {
    let schema = schema_for!(StrategyDocument);
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_document_fields() {
        let json: serde_json::Value = serde_json::from_str(&get_schema_json()).unwrap();
        let props = &json["properties"];
        for field in ["name", "symbol", "timeframe", "blocks", "connections"] {
            assert!(props.get(field).is_some(), "schema missing `{field}`");
        }
    }
}
