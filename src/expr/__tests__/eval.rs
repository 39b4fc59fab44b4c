use serde_json::{Value, json};

use crate::expr::{Scope, eval, eval_test, parse};
use crate::value::ParamObject;

/// Простое окружение поверх одиночного объекта параметров.
struct ObjScope(ParamObject);

impl Scope for ObjScope {
    fn resolve(&self, name: &str) -> crate::value::Result<Value> {
        self.0.lookup(name)
    }
}

fn scope(v: Value) -> ObjScope {
    ObjScope(ParamObject::Single(v))
}

fn eval_str(src: &str, root: Value) -> Value {
    eval(&parse(src).unwrap(), &scope(root)).unwrap()
}

fn test_str(src: &str, root: Value) -> bool {
    eval_test(&parse(src).unwrap(), &scope(root)).unwrap()
}

#[test]
fn path_resolution() {
    let root = json!({"user": {"name": "ann", "tags": ["a", "b"]}});
    assert_eq!(eval_str("user.name", root.clone()), json!("ann"));
    assert_eq!(eval_str("user.tags[1]", root.clone()), json!("b"));
    assert_eq!(eval_str("user['name']", root.clone()), json!("ann"));
    // промах по пути — Null, не ошибка
    assert_eq!(eval_str("user.missing.deeper", root), Value::Null);
}

#[test]
fn truthiness_rules() {
    assert!(!test_str("x", json!({"x": null})));
    assert!(!test_str("x", json!({"x": false})));
    assert!(test_str("x", json!({"x": true})));
    assert!(!test_str("x", json!({"x": 0})));
    assert!(test_str("x", json!({"x": 7})));
    assert!(!test_str("x", json!({"x": ""})));
    assert!(test_str("x", json!({"x": "s"})));
    assert!(!test_str("x", json!({"x": []})));
    assert!(test_str("x", json!({"x": [1]})));
}

#[test]
fn null_comparisons() {
    assert!(test_str("x == null", json!({"x": null})));
    assert!(test_str("x != null", json!({"x": 5})));
    assert!(!test_str("x != null", json!({"x": null})));
    // отсутствующее свойство одиночного объекта — Null
    assert!(test_str("missing == null", json!({"x": 1})));
}

#[test]
fn numeric_comparisons() {
    assert!(test_str("age > 18", json!({"age": 21})));
    assert!(!test_str("age > 18", json!({"age": 18})));
    assert!(test_str("age >= 18", json!({"age": 18})));
    // целое и дробное сравниваются между собой
    assert!(test_str("age < 18.5", json!({"age": 18})));
    assert!(test_str("age == 18.0", json!({"age": 18})));
}

#[test]
fn string_comparisons() {
    assert!(test_str("name == 'ann'", json!({"name": "ann"})));
    assert!(test_str("a < b", json!({"a": "abc", "b": "abd"})));
}

#[test]
fn mixed_comparison_is_a_type_error() {
    let e = eval(&parse("a > b").unwrap(), &scope(json!({"a": 1, "b": "x"})));
    assert!(e.is_err());
}

#[test]
fn boolean_combinators_short_circuit() {
    let root = json!({"a": 1, "b": 0});
    assert!(test_str("a != 0 or b.no.such.path", root.clone()));
    assert!(!test_str("b != 0 and a < 'oops'", root)); // rhs не успевает упасть
}

#[test]
fn not_operator() {
    assert!(test_str("!x", json!({"x": 0})));
    assert!(test_str("not x", json!({"x": ""})));
    assert!(!test_str("!x", json!({"x": 3})));
}

#[test]
fn arithmetic() {
    assert_eq!(eval_str("a + b", json!({"a": 2, "b": 3})), json!(5));
    assert_eq!(eval_str("a - 1", json!({"a": 2})), json!(1));
    assert_eq!(eval_str("-a", json!({"a": 2})), json!(-2));
    assert_eq!(eval_str("a + 0.5", json!({"a": 2})), json!(2.5));
}

#[test]
fn string_concat_bind_idiom() {
    // классика для <bind>: '%' + name + '%'
    assert_eq!(
        eval_str("'%' + name + '%'", json!({"name": "ann"})),
        json!("%ann%")
    );
    // числа приклеиваются строковой формой
    assert_eq!(eval_str("'v' + n", json!({"n": 7})), json!("v7"));
}

#[test]
fn strict_map_root_lookup_fails_with_names() {
    struct MapScope(ParamObject);
    impl Scope for MapScope {
        fn resolve(&self, name: &str) -> crate::value::Result<Value> {
            self.0.lookup(name)
        }
    }
    let mut map = crate::value::ParamMap::new();
    map.insert("id", json!(1));
    map.insert("name", json!("ann"));
    let s = MapScope(ParamObject::Map(map));

    let err = eval(&parse("missing").unwrap(), &s).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("'missing'"), "{msg}");
    assert!(msg.contains("id, name"), "{msg}");
}

#[test]
fn repeated_evaluation_is_stable() {
    let expr = parse("a != null and a > 2").unwrap();
    let s = scope(json!({"a": 3}));
    let first = eval(&expr, &s).unwrap();
    let second = eval(&expr, &s).unwrap();
    assert_eq!(first, second);
}
