use std::collections::HashMap;
use std::io::Write;

use block_flow::catalog::Catalog;
use block_flow::exchange::{self, ImportError, StrategyDocument};
use block_flow::model::{Placement, Strategy};
use block_flow::store::{StoreError, StrategyStore};
use block_flow::templates;
use block_flow::validate::{self, ValidationError};

// ── Helpers ─────────────────────────────────────────────────────────

fn sample(catalog: &Catalog) -> Strategy {
    let mut s = templates::bollinger_breakout(catalog, "bands", "SOL/USDT", "15m", 10, 3).unwrap();
    let first = s.blocks()[0].id.clone();
    s.move_block(&first, Placement::new(12.5, -4.0)).unwrap();
    let last = s.blocks().last().unwrap().id.clone();
    s.set_block_enabled(&last, false).unwrap();
    s
}

/// Documents are equal up to block and connection ids.
fn assert_same_shape(a: &StrategyDocument, b: &StrategyDocument) {
    assert_eq!(a.name, b.name);
    assert_eq!(a.symbol, b.symbol);
    assert_eq!(a.timeframe, b.timeframe);
    assert_eq!(a.enabled, b.enabled);
    assert_eq!(a.blocks.len(), b.blocks.len());

    let mut ids: HashMap<&str, &str> = HashMap::new();
    for (x, y) in a.blocks.iter().zip(&b.blocks) {
        assert_eq!(x.block_type, y.block_type);
        assert_eq!(x.enabled, y.enabled);
        assert_eq!(x.parameters, y.parameters);
        assert_eq!(x.placement, y.placement);
        ids.insert(x.id.as_str(), y.id.as_str());
    }

    assert_eq!(a.connections.len(), b.connections.len());
    for (x, y) in a.connections.iter().zip(&b.connections) {
        assert_eq!(ids[x.source_block.as_str()], y.source_block);
        assert_eq!(ids[x.target_block.as_str()], y.target_block);
        assert_eq!(x.source_port, y.source_port);
        assert_eq!(x.target_port, y.target_port);
    }
}

fn doc_from(json: serde_json::Value) -> StrategyDocument {
    serde_json::from_value(json).unwrap()
}

// ── Round trip ──────────────────────────────────────────────────────

#[test]
fn test_export_import_round_trip() {
    let catalog = Catalog::standard();
    let original = sample(&catalog);
    let exported = exchange::export(&original);

    let imported = exchange::import(&catalog, &exported).unwrap();
    assert_same_shape(&exported, &exchange::export(&imported));
}

#[test]
fn test_json_round_trip() {
    let catalog = Catalog::standard();
    let original = sample(&catalog);
    let json = exchange::to_json(&original).unwrap();

    let imported = exchange::from_json(&catalog, &json).unwrap();
    assert_same_shape(&exchange::export(&original), &exchange::export(&imported));
}

#[test]
fn test_import_mints_fresh_ids() {
    let catalog = Catalog::standard();
    let original = sample(&catalog);
    let imported = exchange::import(&catalog, &exchange::export(&original)).unwrap();

    assert_ne!(imported.id, original.id);
    for block in imported.blocks() {
        assert!(original.block(&block.id).is_none());
    }
    for conn in imported.connections() {
        assert!(original.connection(&conn.id).is_none());
    }
}

#[test]
fn test_import_fills_defaults() {
    let catalog = Catalog::standard();
    let doc = doc_from(serde_json::json!({
        "name": "minimal",
        "symbol": "BTC/USDT",
        "timeframe": "1d",
        "blocks": [
            { "id": "fast", "type": "ema", "parameters": { "period": 5 } },
            { "id": "slow", "type": "ema" },
            { "id": "x", "type": "crossover" },
            { "id": "go", "type": "buy" }
        ],
        "connections": [
            { "source_block": "fast", "source_port": "value", "target_block": "x", "target_port": "fast" },
            { "source_block": "slow", "source_port": "value", "target_block": "x", "target_port": "slow" },
            { "source_block": "x", "source_port": "cross_up", "target_block": "go", "target_port": "trigger" }
        ]
    }));

    let s = exchange::import(&catalog, &doc).unwrap();
    assert!(s.enabled);
    let blocks = s.blocks();
    assert_eq!(blocks[0].number("period"), Some(5.0));
    assert_eq!(blocks[1].number("period"), Some(14.0));
    assert!(blocks.iter().all(|b| b.enabled));
    assert_eq!(s.connections().len(), 3);
    assert!(blocks[3].input("trigger").unwrap().is_bound());
}

// ── Rejection ───────────────────────────────────────────────────────

#[test]
fn test_validation_collects_every_error() {
    let catalog = Catalog::standard();
    let doc = doc_from(serde_json::json!({
        "name": "broken",
        "symbol": "BTC/USDT",
        "timeframe": "1h",
        "blocks": [
            { "id": "a", "type": "sma", "parameters": { "period": 2.5, "colour": "red" } },
            { "id": "a", "type": "price" },
            { "id": "b", "type": "vwap" },
            { "id": "c", "type": "threshold" }
        ],
        "connections": [
            { "source_block": "a", "source_port": "candle", "target_block": "c", "target_port": "value" },
            { "source_block": "ghost", "source_port": "value", "target_block": "c", "target_port": "value" }
        ]
    }));

    let errors = validate::validate(&catalog, &doc).unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, ValidationError::DuplicateBlockId { .. })));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownBlockType { .. })));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownBlock { .. })));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::UnknownParameter { .. })));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidParameterValue { .. })));
}

#[test]
fn test_cyclic_document_rejected() {
    let catalog = Catalog::standard();
    let doc = doc_from(serde_json::json!({
        "name": "loop",
        "symbol": "BTC/USDT",
        "timeframe": "1h",
        "blocks": [
            { "id": "m1", "type": "math" },
            { "id": "m2", "type": "math" },
            { "id": "m3", "type": "math" }
        ],
        "connections": [
            { "source_block": "m1", "source_port": "result", "target_block": "m2", "target_port": "a" },
            { "source_block": "m2", "source_port": "result", "target_block": "m1", "target_port": "a" },
            { "source_block": "m3", "source_port": "result", "target_block": "m3", "target_port": "b" }
        ]
    }));

    match exchange::import(&catalog, &doc) {
        Err(ImportError::Invalid(errors)) => {
            assert!(errors.iter().any(|e| matches!(e, ValidationError::CycleDetected)));
            assert!(errors.iter().any(|e| matches!(e, ValidationError::SelfLoop { .. })));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn test_kind_mismatch_in_document() {
    let catalog = Catalog::standard();
    let doc = doc_from(serde_json::json!({
        "name": "mismatch",
        "symbol": "BTC/USDT",
        "timeframe": "1h",
        "blocks": [
            { "id": "p", "type": "price" },
            { "id": "t", "type": "threshold" },
            { "id": "s", "type": "sell" }
        ],
        "connections": [
            { "source_block": "p", "source_port": "candle", "target_block": "t", "target_port": "value" },
            { "source_block": "t", "source_port": "result", "target_block": "s", "target_port": "fired" }
        ]
    }));

    let errors = validate::validate(&catalog, &doc).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], ValidationError::KindMismatch { .. }));
    assert!(matches!(
        errors[1],
        ValidationError::UnknownPort { direction: "input", .. }
    ));
}

#[test]
fn test_malformed_json_rejected() {
    let catalog = Catalog::standard();
    assert!(matches!(
        exchange::from_json(&catalog, "{ not json"),
        Err(ImportError::Json(_))
    ));
}

#[test]
fn test_load_and_validate_file() {
    let catalog = Catalog::standard();
    let strategy = templates::by_name(&catalog, "rsi_reversal", "BTC/USDT", "1h")
        .unwrap()
        .unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", exchange::to_json(&strategy).unwrap()).unwrap();
    file.flush().unwrap();

    let doc = validate::load_and_validate(&catalog, file.path()).unwrap();
    assert_eq!(doc.name, "RSI Reversal 14");
    assert_eq!(doc.blocks.len(), strategy.blocks().len());

    let missing = validate::load_and_validate(&catalog, &file.path().with_extension("missing"));
    assert!(matches!(missing.unwrap_err()[0], ValidationError::Io(_)));
}

// ── Store ───────────────────────────────────────────────────────────

#[test]
fn test_failed_import_leaves_store_unchanged() {
    let catalog = Catalog::standard();
    let mut store = StrategyStore::new();
    let id = store.create("first", "BTC/USDT", "1h");

    let bad = doc_from(serde_json::json!({
        "name": "bad",
        "symbol": "BTC/USDT",
        "timeframe": "1h",
        "blocks": [ { "id": "x", "type": "nope" } ]
    }));
    assert!(matches!(
        store.import(&catalog, &bad),
        Err(StoreError::Import(ImportError::Invalid(_)))
    ));
    assert_eq!(store.len(), 1);
    assert!(store.get(&id).is_ok());
}

#[test]
fn test_store_import_export_delete() {
    let catalog = Catalog::standard();
    let mut store = StrategyStore::new();
    let source = sample(&catalog);

    let id = store.import(&catalog, &exchange::export(&source)).unwrap();
    let json = store.export_json(&id).unwrap();
    let copy = store.import_json(&catalog, &json).unwrap();
    assert_ne!(id, copy);
    assert_eq!(store.len(), 2);
    assert_same_shape(&store.export(&id).unwrap(), &store.export(&copy).unwrap());

    let removed = store.delete(&id).unwrap();
    assert_eq!(removed.id, id);
    assert_eq!(store.len(), 1);
    assert!(matches!(
        store.get(&id),
        Err(StoreError::UnknownStrategy { .. })
    ));
    assert!(matches!(
        store.delete(&id),
        Err(StoreError::UnknownStrategy { .. })
    ));
}

#[test]
fn test_store_edits_in_place() {
    let catalog = Catalog::standard();
    let mut store = StrategyStore::new();
    let id = store.create("edit", "ETH/USDT", "5m");

    let strategy = store.get_mut(&id).unwrap();
    let block = strategy
        .add_block(&catalog, "atr", Placement::default())
        .unwrap()
        .id
        .clone();
    strategy.update_block_parameter(&block, "period", 7.0).unwrap();

    let stored = store.get(&id).unwrap();
    assert_eq!(stored.blocks().len(), 1);
    assert_eq!(stored.version, 2);
    assert_eq!(store.list().count(), 1);
}

// ── Templates ───────────────────────────────────────────────────────

#[test]
fn test_templates_export_valid_documents() {
    let catalog = Catalog::standard();
    for name in templates::TEMPLATE_NAMES {
        let strategy = templates::by_name(&catalog, name, "BTC/USDT", "1h")
            .unwrap()
            .unwrap();
        let doc = exchange::export(&strategy);
        assert!(validate::validate(&catalog, &doc).is_ok(), "{name}");
        assert!(doc.blocks.iter().any(|b| catalog
            .template(&b.block_type)
            .is_some_and(|t| t.category == block_flow::model::BlockCategory::Action)));
    }
    assert!(templates::by_name(&catalog, "martingale", "BTC/USDT", "1h").is_none());
}
