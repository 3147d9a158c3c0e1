use wasm_bindgen::prelude::*;

use crate::catalog::Catalog;
use crate::exchange::{self, StrategyDocument};
use crate::validate;

#[wasm_bindgen]
pub fn validate_strategy_json(json: &str) -> String {
    let doc: StrategyDocument = match serde_json::from_str(json) {
        Ok(d) => d,
        Err(e) => {
            return serde_json::json!({
                "valid": false,
                "errors": [format!("JSON parse error: {}", e)]
            })
            .to_string();
        }
    };
    match validate::validate(&Catalog::standard(), &doc) {
        Ok(()) => serde_json::json!({ "valid": true }).to_string(),
        Err(errors) => {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            serde_json::json!({
                "valid": false,
                "errors": error_strings
            })
            .to_string()
        }
    }
}

/// Import a document and export it again, normalising defaults and minting
/// fresh ids.
#[wasm_bindgen]
pub fn normalize_strategy_json(json: &str) -> String {
    let result = exchange::from_json(&Catalog::standard(), json)
        .map_err(|e| e.to_string())
        .and_then(|s| exchange::to_json(&s).map_err(|e| format!("Serialization error: {}", e)));
    match result {
        Ok(out) => out,
        Err(e) => serde_json::json!({ "error": e }).to_string(),
    }
}

#[wasm_bindgen]
pub fn list_block_types() -> String {
    serde_json::to_string(Catalog::standard().templates()).unwrap_or_else(|e| {
        serde_json::json!({ "error": format!("Serialization error: {}", e) }).to_string()
    })
}

#[wasm_bindgen]
pub fn get_schema() -> String {
    crate::schema::get_schema_json()
}
