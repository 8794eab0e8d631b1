//! End-to-end tests: condition text in, fragment and bind values out.

use condsql::prelude::*;
use pretty_assertions::assert_eq;

fn translate_str(condition: &str, config: &QueryConfig) -> CondResult<Fragment> {
    let expr = condsql::parse(condition)?;
    translate(&expr, config)
}

fn int(n: i32) -> BoundValue {
    BoundValue::Constant {
        value: Value::Int(n),
        ty: AttrType::Int,
    }
}

#[test]
fn test_bind_order_matches_marker_order() {
    let fragment = translate_str("(a = 5 and b = 'x') or c = 7", &QueryConfig::default()).unwrap();

    assert_eq!(fragment.text(), "(((t.a = ? )AND (t.b = ? ))OR (t.c = ? ))");
    assert_eq!(
        fragment.parameters().values(),
        &[
            int(5),
            BoundValue::Constant {
                value: Value::String("x".to_string()),
                ty: AttrType::String,
            },
            int(7),
        ]
    );
}

#[test]
fn test_marker_count_equals_parameters() {
    let conditions = [
        "a = 1",
        "a = 1 and b != 2",
        "(a > 1 or b < 2) and (c >= 3 or d <= 4)",
        "x = 'a' or (y = 'b' and (z = 'c' or w = 'd'))",
    ];
    for condition in conditions {
        let expr = condsql::parse(condition).unwrap();
        let fragment = translate(&expr, &QueryConfig::default()).unwrap();
        let markers = fragment.text().matches('?').count();
        assert_eq!(markers, fragment.parameters().len(), "{}", condition);
        assert_eq!(markers, expr.bind_leaf_count(), "{}", condition);
    }
}

#[test]
fn test_postgres_marker_numbers_follow_ordinals() {
    let config = QueryConfig::for_dialect(Dialect::Postgres);
    let fragment =
        translate_str("StockStream.price > price * 2 and volume < $0:long", &config).unwrap();

    assert_eq!(
        fragment.text(),
        "(($1 > (t.price * $2 ))AND (t.volume < $3 ))"
    );
    let sources: Vec<String> = fragment
        .parameters()
        .iter()
        .map(|(_, v)| v.to_string())
        .collect();
    assert_eq!(
        sources,
        vec!["StockStream.price (OBJECT)", "2 (INT)", "$0 (LONG)"]
    );
}

#[test]
fn test_arithmetic_grouping() {
    let fragment = translate_str("a + b * c", &QueryConfig::default()).unwrap();
    assert_eq!(fragment.text(), "(t.a + (t.b * t.c ))");
}

#[test]
fn test_is_null_fragment() {
    let fragment = translate_str("col is null", &QueryConfig::default()).unwrap();
    assert!(fragment.text().ends_with("IS NULL"));
    assert_eq!(fragment.parameters().len(), 0);

    let fragment = translate_str("col is not null", &QueryConfig::default()).unwrap();
    assert_eq!(fragment.text(), "NOT t.col IS NULL");
}

#[test]
fn test_namespaced_function_cannot_be_pushed_down() {
    let err = translate_str("ns:foo(x) > 1", &QueryConfig::default()).unwrap_err();
    assert!(matches!(err, CondError::UnsupportedFeature { .. }));
}

#[test]
fn test_same_tree_same_output() {
    let expr = condsql::parse("a = 1 or (b = StockStream.b and c > $0)").unwrap();
    let config = QueryConfig::for_dialect(Dialect::Oracle);
    assert_eq!(
        translate(&expr, &config).unwrap(),
        translate(&expr, &config).unwrap()
    );
}

#[test]
fn test_config_from_toml() {
    let config = QueryConfig::from_toml_str(
        r#"
        dialect = "mysql"
        table_alias = "trades"
        not_equal = "<>"
        "#,
    )
    .unwrap();
    let fragment = translate_str("symbol != 'IBM'", &config).unwrap();
    assert_eq!(fragment.text(), "(trades.symbol <> ? )");
}

#[test]
fn test_json_tree_input() {
    let json = r#"{
        "compare": {
            "left": { "store_variable": { "attribute": "price", "ty": "double" } },
            "op": "Gte",
            "right": { "constant": { "value": { "Double": 9.5 }, "ty": "double" } }
        }
    }"#;
    let expr: Expr = serde_json::from_str(json).unwrap();
    let fragment = translate(&expr, &QueryConfig::default()).unwrap();
    assert_eq!(fragment.text(), "(t.price >= ? )");
    assert_eq!(
        fragment.parameters().get(0),
        Some(&BoundValue::Constant {
            value: Value::Double(9.5),
            ty: AttrType::Double,
        })
    );
}

#[test]
fn test_fragment_serializes() {
    let fragment = translate_str("a = 1", &QueryConfig::default()).unwrap();
    let json = serde_json::to_value(&fragment).unwrap();
    assert_eq!(json["sql"], "(t.a = ? )");
    assert_eq!(json["parameters"][0]["constant"]["ty"], "int");
}
