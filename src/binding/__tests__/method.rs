use serde_json::{Value, json};

use crate::binding::{
    Error, MapperArgs, MapperInterface, MapperMethod, MapperOutput, MethodSpec, ReturnSpec,
};
use crate::session::{Configuration, ResultHandler, RowBounds, SqlSession};
use crate::tests::fake_session::{Call, FakeSession};
use crate::value::ParamObject;

const MAPPER: &str = r#"
<mapper namespace="app.UserMapper">
  <select id="find_by_id">SELECT * FROM users WHERE id = #{id}</select>
  <select id="list_all">SELECT * FROM users</select>
  <insert id="create">INSERT INTO users(name) VALUES (#{name})</insert>
  <update id="rename">UPDATE users SET name = #{name} WHERE id = #{id}</update>
  <delete id="remove">DELETE FROM users WHERE id = #{id}</delete>
</mapper>
"#;

fn config() -> Configuration {
    let mut cfg = Configuration::default();
    cfg.load_mapper(MAPPER).unwrap();
    cfg
}

fn method(session: &FakeSession, spec: &MethodSpec) -> MapperMethod {
    let iface = MapperInterface::new("app.UserMapper");
    MapperMethod::new(session.configuration(), &iface, spec).unwrap()
}

fn value_of(out: MapperOutput) -> Value {
    out.into_value().expect("ожидали Value, а не Cursor")
}

// ---- коерция счётчика строк ----

fn dml_result(returns: ReturnSpec, affected: u64) -> crate::binding::Result<Value> {
    let session = FakeSession::new(config()).with_affected(affected);
    let spec = MethodSpec::new("create", returns).arg();
    let m = method(&session, &spec);
    let out = m.execute(&session, MapperArgs::from_values(vec![json!({"name": "x"})]))?;
    Ok(value_of(out))
}

#[test]
fn row_count_to_void_is_null() {
    assert_eq!(dml_result(ReturnSpec::Void, 3).unwrap(), Value::Null);
}

#[test]
fn row_count_to_int_and_long() {
    assert_eq!(dml_result(ReturnSpec::Int, 3).unwrap(), json!(3));
    assert_eq!(dml_result(ReturnSpec::Long, 3).unwrap(), json!(3));
}

#[test]
fn row_count_to_bool() {
    assert_eq!(dml_result(ReturnSpec::Bool, 3).unwrap(), json!(true));
    assert_eq!(dml_result(ReturnSpec::Bool, 0).unwrap(), json!(false));
}

#[test]
fn row_count_to_entity_is_unsupported() {
    let err = dml_result(ReturnSpec::Scalar, 3).unwrap_err();
    assert!(matches!(err, Error::UnsupportedReturnType { .. }));
}

// ---- диспетчеризация по виду команды ----

#[test]
fn insert_goes_to_session_insert_with_converted_param() {
    let session = FakeSession::new(config());
    let spec = MethodSpec::new("create", ReturnSpec::Int).arg();
    let m = method(&session, &spec);
    m.execute(&session, MapperArgs::from_values(vec![json!({"name": "ann"})]))
        .unwrap();

    assert_eq!(
        session.calls(),
        vec![Call::Insert {
            statement: "app.UserMapper.create".into(),
            param: ParamObject::Single(json!({"name": "ann"})),
        }]
    );
}

#[test]
fn update_and_delete_dispatch() {
    let session = FakeSession::new(config());
    let update = MethodSpec::new("rename", ReturnSpec::Int)
        .named_arg("id")
        .named_arg("name");
    let m = method(&session, &update);
    m.execute(
        &session,
        MapperArgs::from_values(vec![json!(1), json!("bob")]),
    )
    .unwrap();

    let delete = MethodSpec::new("remove", ReturnSpec::Int).arg();
    let m = method(&session, &delete);
    m.execute(&session, MapperArgs::from_values(vec![json!(1)]))
        .unwrap();

    let calls = session.calls();
    assert!(matches!(calls[0], Call::Update { .. }));
    assert!(matches!(calls[1], Call::Delete { .. }));
}

#[test]
fn select_many_returns_rows_array() {
    let rows = vec![json!({"id": 1}), json!({"id": 2})];
    let session = FakeSession::new(config()).with_rows(rows.clone());
    let spec = MethodSpec::new("list_all", ReturnSpec::List);
    let m = method(&session, &spec);
    let v = value_of(m.execute(&session, MapperArgs::new()).unwrap());
    assert_eq!(v, Value::Array(rows));
}

#[test]
fn select_many_passes_row_bounds_from_args() {
    let session = FakeSession::new(config()).with_rows(vec![
        json!({"id": 1}),
        json!({"id": 2}),
        json!({"id": 3}),
    ]);
    let spec = MethodSpec::new("list_all", ReturnSpec::List).row_bounds();
    let m = method(&session, &spec);
    let v = value_of(
        m.execute(&session, MapperArgs::new().page(RowBounds::new(1, 1)))
            .unwrap(),
    );
    assert_eq!(v, json!([{"id": 2}]));
    assert!(matches!(
        session.calls().as_slice(),
        [Call::SelectList { bounds, .. }] if *bounds == RowBounds::new(1, 1)
    ));
}

#[test]
fn select_one_returns_scalar_row() {
    let session = FakeSession::new(config()).with_rows(vec![json!({"id": 7})]);
    let spec = MethodSpec::new("find_by_id", ReturnSpec::Scalar).arg();
    let m = method(&session, &spec);
    let v = value_of(
        m.execute(&session, MapperArgs::from_values(vec![json!(7)]))
            .unwrap(),
    );
    assert_eq!(v, json!({"id": 7}));
}

#[test]
fn select_null_into_primitive_fails() {
    let session = FakeSession::new(config()).with_rows(vec![]);
    let spec = MethodSpec::new("find_by_id", ReturnSpec::Int).arg();
    let m = method(&session, &spec);
    let err = m
        .execute(&session, MapperArgs::from_values(vec![json!(7)]))
        .unwrap_err();
    assert!(matches!(err, Error::NullIntoPrimitive { .. }));
}

#[test]
fn select_null_into_optional_is_fine() {
    let session = FakeSession::new(config()).with_rows(vec![]);
    let spec = MethodSpec::new("find_by_id", ReturnSpec::Optional).arg();
    let m = method(&session, &spec);
    let v = value_of(
        m.execute(&session, MapperArgs::from_values(vec![json!(7)]))
            .unwrap(),
    );
    assert_eq!(v, Value::Null);
}

#[test]
fn select_map_uses_declared_key() {
    let session = FakeSession::new(config()).with_rows(vec![
        json!({"id": 1, "name": "ann"}),
        json!({"id": 2, "name": "bob"}),
    ]);
    let spec = MethodSpec::new("list_all", ReturnSpec::Map).map_key("name");
    let m = method(&session, &spec);
    let v = value_of(m.execute(&session, MapperArgs::new()).unwrap());
    assert_eq!(v["ann"], json!({"id": 1, "name": "ann"}));
    assert_eq!(v["bob"], json!({"id": 2, "name": "bob"}));
}

#[test]
fn select_cursor_returns_cursor_output() {
    let session = FakeSession::new(config()).with_rows(vec![json!({"id": 1}), json!({"id": 2})]);
    let spec = MethodSpec::new("list_all", ReturnSpec::Cursor);
    let m = method(&session, &spec);
    match m.execute(&session, MapperArgs::new()).unwrap() {
        MapperOutput::Cursor(cursor) => {
            let rows: Vec<Value> = cursor.map(|r| r.unwrap()).collect();
            assert_eq!(rows.len(), 2);
        }
        MapperOutput::Value(v) => panic!("ожидали Cursor, получили {v:?}"),
    }
}

#[test]
fn void_select_with_handler_feeds_rows_and_returns_null() {
    let session = FakeSession::new(config()).with_rows(vec![json!({"id": 1}), json!({"id": 2})]);
    let spec = MethodSpec::new("list_all", ReturnSpec::Void).result_handler();
    let m = method(&session, &spec);

    let mut seen = Vec::new();
    let mut collect = |row: Value| seen.push(row);
    let out = m
        .execute(
            &session,
            MapperArgs::new().handler(&mut collect as &mut dyn ResultHandler),
        )
        .unwrap();
    assert_eq!(value_of(out), Value::Null);
    assert_eq!(seen.len(), 2);
}

#[test]
fn flush_dispatches_to_flush_statements() {
    let session = FakeSession::new(config()).with_affected(4);
    let spec = MethodSpec::new("flush_all", ReturnSpec::Long).flush();
    let m = method(&session, &spec);
    let v = value_of(m.execute(&session, MapperArgs::new()).unwrap());
    assert_eq!(v, json!(4));
    assert_eq!(session.calls(), vec![Call::Flush]);
}

#[test]
fn misplaced_argument_kind_is_an_error() {
    let session = FakeSession::new(config());
    let spec = MethodSpec::new("find_by_id", ReturnSpec::Scalar).arg();
    let m = method(&session, &spec);
    let err = m
        .execute(&session, MapperArgs::new().page(RowBounds::new(0, 1)))
        .unwrap_err();
    assert!(matches!(err, Error::ArgumentMismatch { .. }));
}
