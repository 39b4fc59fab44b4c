use serde_json::{Value, json};

use crate::session::{Configuration, Error, ResultHandler, RowBounds, SqlSession};
use crate::tests::fake_session::{Call, FakeSession};
use crate::value::ParamObject;

fn rows() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "ann"}),
        json!({"id": 2, "name": "bob"}),
        json!({"id": 3, "name": "cat"}),
    ]
}

fn session_with_rows(rows: Vec<Value>) -> FakeSession {
    FakeSession::new(Configuration::default()).with_rows(rows)
}

#[test]
fn select_one_returns_single_row() {
    let s = session_with_rows(vec![json!({"id": 1})]);
    let v = s.select_one("q", &ParamObject::None).unwrap();
    assert_eq!(v, json!({"id": 1}));
}

#[test]
fn select_one_on_empty_is_null() {
    let s = session_with_rows(vec![]);
    assert_eq!(s.select_one("q", &ParamObject::None).unwrap(), Value::Null);
}

#[test]
fn select_one_on_many_fails() {
    let s = session_with_rows(rows());
    let err = s.select_one("q", &ParamObject::None).unwrap_err();
    assert!(matches!(err, Error::TooManyResults { count: 3, .. }));
}

#[test]
fn select_map_keys_rows_by_property() {
    let s = session_with_rows(rows());
    let m = s
        .select_map("q", &ParamObject::None, "name", RowBounds::DEFAULT)
        .unwrap();
    assert_eq!(m["ann"], json!({"id": 1, "name": "ann"}));
    assert_eq!(m["cat"], json!({"id": 3, "name": "cat"}));
    assert_eq!(m.as_object().unwrap().len(), 3);
}

#[test]
fn select_map_stringifies_non_string_keys() {
    let s = session_with_rows(rows());
    let m = s
        .select_map("q", &ParamObject::None, "id", RowBounds::DEFAULT)
        .unwrap();
    assert_eq!(m["2"], json!({"id": 2, "name": "bob"}));
}

#[test]
fn select_cursor_iterates_lazily_over_rows() {
    let s = session_with_rows(rows());
    let cursor = s
        .select_cursor("q", &ParamObject::None, RowBounds::DEFAULT)
        .unwrap();
    let got: Vec<Value> = cursor.map(|r| r.unwrap()).collect();
    assert_eq!(got, rows());
}

#[test]
fn select_with_handler_feeds_each_row() {
    let s = session_with_rows(rows());
    let mut seen = Vec::new();
    let mut handler = |row: Value| seen.push(row);
    s.select_with_handler(
        "q",
        &ParamObject::None,
        RowBounds::DEFAULT,
        &mut handler as &mut dyn ResultHandler,
    )
    .unwrap();
    assert_eq!(seen.len(), 3);
}

#[test]
fn row_bounds_slice_rows() {
    let s = session_with_rows(rows());
    let page = s
        .select_list("q", &ParamObject::None, RowBounds::new(1, 1))
        .unwrap();
    assert_eq!(page, vec![json!({"id": 2, "name": "bob"})]);
    // вызов зафиксирован с переданными границами
    assert!(matches!(
        s.calls().as_slice(),
        [Call::SelectList { bounds, .. }] if *bounds == RowBounds::new(1, 1)
    ));
}

#[test]
fn row_bounds_default_is_everything() {
    assert!(RowBounds::DEFAULT.is_default());
    let all = RowBounds::DEFAULT.apply(rows());
    assert_eq!(all.len(), 3);
}
