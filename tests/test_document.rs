use block_flow::catalog::Catalog;
use block_flow::model::{BlockId, DocumentError, ParamValue, Placement, Strategy, ValueKind};

// ── Helpers ─────────────────────────────────────────────────────────

fn strategy() -> Strategy {
    Strategy::new("test", "BTC/USDT", "1h")
}

fn add(s: &mut Strategy, catalog: &Catalog, block_type: &str) -> BlockId {
    s.add_block(catalog, block_type, Placement::default())
        .unwrap()
        .id
        .clone()
}

// ── Blocks ──────────────────────────────────────────────────────────

#[test]
fn test_add_block_copies_template() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let id = add(&mut s, &catalog, "sma");

    let block = s.block(&id).unwrap();
    assert_eq!(block.block_type, "sma");
    assert!(block.enabled);
    assert_eq!(block.number("period"), Some(14.0));
    assert_eq!(block.text("source"), Some("close"));
    assert!(block.inputs.is_empty());
    assert_eq!(block.output("value").unwrap().kind, ValueKind::Number);
    assert_eq!(s.version, 1);
}

#[test]
fn test_block_ids_are_unique() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let a = add(&mut s, &catalog, "sma");
    let b = add(&mut s, &catalog, "sma");
    assert_ne!(a, b);
    assert_eq!(s.blocks().len(), 2);
}

#[test]
fn test_unknown_template_leaves_document_unchanged() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    add(&mut s, &catalog, "price");
    let before = s.clone();

    let err = s
        .add_block(&catalog, "vwap", Placement::default())
        .unwrap_err();
    assert_eq!(
        err,
        DocumentError::UnknownTemplate {
            block_type: "vwap".into()
        }
    );
    assert_eq!(s.blocks(), before.blocks());
    assert_eq!(s.version, before.version);
}

#[test]
fn test_unknown_block_errors() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    add(&mut s, &catalog, "price");
    let version = s.version;

    assert!(matches!(
        s.set_block_enabled("missing", false),
        Err(DocumentError::UnknownBlock { .. })
    ));
    assert!(matches!(
        s.move_block("missing", Placement::new(1.0, 2.0)),
        Err(DocumentError::UnknownBlock { .. })
    ));
    assert!(matches!(
        s.remove_block("missing"),
        Err(DocumentError::UnknownBlock { .. })
    ));
    assert!(matches!(
        s.update_block_parameter("missing", "period", 3.0),
        Err(DocumentError::UnknownBlock { .. })
    ));
    assert_eq!(s.version, version);
}

#[test]
fn test_move_and_disable_block() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let id = add(&mut s, &catalog, "ema");

    s.move_block(&id, Placement::new(40.0, 80.0)).unwrap();
    s.set_block_enabled(&id, false).unwrap();

    let block = s.block(&id).unwrap();
    assert_eq!(block.placement, Placement::new(40.0, 80.0));
    assert!(!block.enabled);
}

// ── Parameters ──────────────────────────────────────────────────────

#[test]
fn test_parameter_kinds_enforced() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let sma = add(&mut s, &catalog, "sma");
    let threshold = add(&mut s, &catalog, "threshold");

    s.update_block_parameter(&sma, "period", 20.0).unwrap();
    assert_eq!(s.block(&sma).unwrap().number("period"), Some(20.0));

    // Integer parameters reject fractions and text; nothing is coerced.
    assert!(matches!(
        s.update_block_parameter(&sma, "period", 14.5),
        Err(DocumentError::InvalidParameterValue { .. })
    ));
    assert!(matches!(
        s.update_block_parameter(&sma, "period", "14"),
        Err(DocumentError::InvalidParameterValue { .. })
    ));

    // Choices must be one of the declared options.
    s.update_block_parameter(&threshold, "operator", "<=").unwrap();
    assert!(matches!(
        s.update_block_parameter(&threshold, "operator", "~"),
        Err(DocumentError::InvalidParameterValue { .. })
    ));
    assert!(matches!(
        s.update_block_parameter(&threshold, "threshold", true),
        Err(DocumentError::InvalidParameterValue { .. })
    ));

    assert_eq!(s.block(&sma).unwrap().number("period"), Some(20.0));
    assert_eq!(s.block(&threshold).unwrap().text("operator"), Some("<="));
}

#[test]
fn test_parameter_bounds_not_enforced() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let sma = add(&mut s, &catalog, "sma");

    let spec = s.block(&sma).unwrap().param_spec("period").unwrap().clone();
    assert_eq!(spec.max, Some(500.0));

    s.update_block_parameter(&sma, "period", 10_000.0).unwrap();
    s.update_block_parameter(&sma, "period", 0.0).unwrap();
    assert_eq!(
        s.block(&sma).unwrap().param("period"),
        Some(&ParamValue::Number(0.0))
    );
}

#[test]
fn test_unknown_parameter_rejected() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let sma = add(&mut s, &catalog, "sma");
    let err = s.update_block_parameter(&sma, "length", 5.0).unwrap_err();
    assert_eq!(
        err,
        DocumentError::UnknownParameter {
            block_id: sma.clone(),
            name: "length".into()
        }
    );
}

// ── Connections ─────────────────────────────────────────────────────

#[test]
fn test_connect_binds_input() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let sma = add(&mut s, &catalog, "sma");
    let threshold = add(&mut s, &catalog, "threshold");

    let conn = s
        .create_connection(&sma, "value", &threshold, "value")
        .unwrap()
        .clone();
    assert_eq!(conn.source_block, sma);
    assert_eq!(conn.target_port, "value");

    let port = s.block(&threshold).unwrap().input("value").unwrap();
    assert_eq!(port.bound.as_deref(), Some(conn.id.as_str()));
    assert_eq!(s.connection_into(&threshold, "value"), Some(&conn));
}

#[test]
fn test_connect_rejects_kind_mismatch() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let price = add(&mut s, &catalog, "price");
    let threshold = add(&mut s, &catalog, "threshold");
    let version = s.version;

    let err = s
        .create_connection(&price, "candle", &threshold, "value")
        .unwrap_err();
    match err {
        DocumentError::TypeMismatch {
            source_kind,
            target_kind,
            ..
        } => {
            assert_eq!(source_kind, ValueKind::Candle);
            assert_eq!(target_kind, ValueKind::Number);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert!(s.connections().is_empty());
    assert!(!s.block(&threshold).unwrap().input("value").unwrap().is_bound());
    assert_eq!(s.version, version);
}

#[test]
fn test_any_port_accepts_every_kind() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let price = add(&mut s, &catalog, "price");
    let previous = add(&mut s, &catalog, "previous");

    s.create_connection(&price, "candle", &previous, "value")
        .unwrap();
    s.create_connection(&price, "close", &previous, "value")
        .unwrap();
    assert_eq!(s.connections().len(), 1);
}

#[test]
fn test_rebinding_replaces_connection() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let first = add(&mut s, &catalog, "constant");
    let second = add(&mut s, &catalog, "constant");
    let threshold = add(&mut s, &catalog, "threshold");

    let old = s
        .create_connection(&first, "value", &threshold, "value")
        .unwrap()
        .id
        .clone();
    let new = s
        .create_connection(&second, "value", &threshold, "value")
        .unwrap()
        .id
        .clone();

    assert_eq!(s.connections().len(), 1);
    assert!(s.connection(&old).is_none());
    let bound = s.connection_into(&threshold, "value").unwrap();
    assert_eq!(bound.id, new);
    assert_eq!(bound.source_block, second);
}

#[test]
fn test_unknown_ports_rejected() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let sma = add(&mut s, &catalog, "sma");
    let threshold = add(&mut s, &catalog, "threshold");

    assert_eq!(
        s.create_connection(&sma, "signal", &threshold, "value")
            .unwrap_err(),
        DocumentError::UnknownPort {
            block_id: sma.clone(),
            port_id: "signal".into(),
            direction: "output",
        }
    );
    assert_eq!(
        s.create_connection(&sma, "value", &threshold, "input")
            .unwrap_err(),
        DocumentError::UnknownPort {
            block_id: threshold.clone(),
            port_id: "input".into(),
            direction: "input",
        }
    );
    assert!(matches!(
        s.create_connection("ghost", "value", &threshold, "value"),
        Err(DocumentError::UnknownBlock { .. })
    ));
    assert!(s.connections().is_empty());
}

#[test]
fn test_cycles_rejected_at_connect() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let a = add(&mut s, &catalog, "math");
    let b = add(&mut s, &catalog, "math");

    s.create_connection(&a, "result", &b, "a").unwrap();
    assert!(matches!(
        s.create_connection(&b, "result", &a, "a"),
        Err(DocumentError::CyclicGraph { .. })
    ));
    assert!(matches!(
        s.create_connection(&a, "result", &a, "b"),
        Err(DocumentError::CyclicGraph { .. })
    ));
    assert_eq!(s.connections().len(), 1);
}

#[test]
fn test_remove_connection_clears_binding() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let rsi = add(&mut s, &catalog, "rsi");
    let threshold = add(&mut s, &catalog, "threshold");
    let id = s
        .create_connection(&rsi, "value", &threshold, "value")
        .unwrap()
        .id
        .clone();

    let removed = s.remove_connection(&id).unwrap();
    assert_eq!(removed.id, id);
    assert!(s.connections().is_empty());
    assert!(!s.block(&threshold).unwrap().input("value").unwrap().is_bound());

    assert_eq!(
        s.remove_connection(&id).unwrap_err(),
        DocumentError::UnknownConnection { connection_id: id }
    );
}

#[test]
fn test_remove_block_cascades() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let sma = add(&mut s, &catalog, "sma");
    let threshold = add(&mut s, &catalog, "threshold");
    let buy = add(&mut s, &catalog, "buy");
    let keep = add(&mut s, &catalog, "rsi");
    let other = add(&mut s, &catalog, "threshold");

    s.create_connection(&sma, "value", &threshold, "value")
        .unwrap();
    s.create_connection(&threshold, "result", &buy, "trigger")
        .unwrap();
    s.create_connection(&keep, "value", &other, "value")
        .unwrap();

    let removed = s.remove_block(&threshold).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(s.block(&threshold).is_none());
    assert_eq!(s.connections().len(), 1);
    assert!(s.connections().iter().all(|c| !c.touches(&threshold)));
    assert!(!s.block(&buy).unwrap().input("trigger").unwrap().is_bound());
    assert!(s.block(&other).unwrap().input("value").unwrap().is_bound());
}

#[test]
fn test_previous_cannot_close_feedback_loop() {
    let catalog = Catalog::standard();
    let mut s = strategy();
    let math = add(&mut s, &catalog, "math");
    let prev = add(&mut s, &catalog, "previous");

    s.create_connection(&math, "result", &prev, "value").unwrap();
    assert!(matches!(
        s.create_connection(&prev, "value", &math, "a"),
        Err(DocumentError::CyclicGraph { .. })
    ));
    assert_eq!(s.connections().len(), 1);
}
