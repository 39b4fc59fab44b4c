use serde_json::json;

use crate::param::Param;
use crate::scripting::{PlaceholderStyle, build_source_from_str};
use crate::session::resolve_parameters;
use crate::types::TypeHandlerRegistry;
use crate::value::{ParamMap, ParamObject};

fn bound(script: &str, param: &ParamObject) -> crate::mapping::BoundSql {
    build_source_from_str(script, PlaceholderStyle::Question)
        .unwrap()
        .bind(param)
        .unwrap()
}

fn resolve(script: &str, param: ParamObject) -> Vec<Param> {
    let b = bound(script, &param);
    resolve_parameters(&b, &param, &TypeHandlerRegistry::new())
        .unwrap()
        .into_vec()
}

#[test]
fn simple_property_binding() {
    let params = resolve(
        "SELECT * FROM t WHERE id = #{id}",
        ParamObject::Single(json!({"id": 7})),
    );
    assert_eq!(params, vec![Param::I64(7)]);
}

#[test]
fn nested_property_path() {
    let params = resolve(
        "SELECT * FROM t WHERE city = #{user.address.city} AND tag = #{user.tags[1]}",
        ParamObject::Single(json!({"user": {"address": {"city": "riga"}, "tags": ["a", "b"]}})),
    );
    assert_eq!(
        params,
        vec![Param::Str("riga".into()), Param::Str("b".into())]
    );
}

#[test]
fn bare_scalar_argument_binds_itself() {
    let params = resolve(
        "SELECT * FROM t WHERE id = #{id}",
        ParamObject::Single(json!(99)),
    );
    assert_eq!(params, vec![Param::I64(99)]);
}

#[test]
fn named_map_with_param_aliases() {
    let mut map = ParamMap::new();
    map.insert("name", json!("ann"));
    map.insert("param1", json!("ann"));
    let params = resolve(
        "SELECT * FROM t WHERE a = #{name} AND b = #{param1}",
        ParamObject::Map(map),
    );
    assert_eq!(
        params,
        vec![Param::Str("ann".into()), Param::Str("ann".into())]
    );
}

#[test]
fn strict_map_missing_name_fails_with_enumeration() {
    let mut map = ParamMap::new();
    map.insert("id", json!(1));
    map.insert("param1", json!(1));
    let param = ParamObject::Map(map);
    let b = bound("SELECT * FROM t WHERE a = #{nope}", &param);
    let err = resolve_parameters(&b, &param, &TypeHandlerRegistry::new()).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("'nope'"), "{msg}");
    assert!(msg.contains("id, param1"), "{msg}");
}

#[test]
fn additional_bindings_win_over_parameter_object() {
    let param = ParamObject::Single(json!({"ids": [10, 20], "x": "shadowed"}));
    let script = r#"<script>SELECT * FROM t WHERE id IN <foreach collection="ids" item="x" open="(" close=")" separator=",">#{x}</foreach></script>"#;
    let b = bound(script, &param);
    let params = resolve_parameters(&b, &param, &TypeHandlerRegistry::new()).unwrap();
    assert_eq!(params.as_slice(), &[Param::I64(10), Param::I64(20)]);
}

#[test]
fn bind_variable_resolves_from_additional_bindings() {
    let param = ParamObject::Single(json!({"name": "ann"}));
    let script = r#"<script><bind name="pattern" value="'%' + name + '%'"/>SELECT 1 WHERE n LIKE #{pattern}</script>"#;
    let b = bound(script, &param);
    let params = resolve_parameters(&b, &param, &TypeHandlerRegistry::new()).unwrap();
    assert_eq!(params.as_slice(), &[Param::Str("%ann%".into())]);
}

#[test]
fn jdbc_hint_shapes_null_binding() {
    let params = resolve(
        "UPDATE t SET age = #{age,jdbcType=INTEGER}",
        ParamObject::Single(json!({"age": null})),
    );
    assert_eq!(params, vec![Param::NullI64]);
}

#[test]
fn unknown_type_handler_fails() {
    let param = ParamObject::Single(json!({"id": 1}));
    let b = bound("SELECT #{id,typeHandler=missing}", &param);
    assert!(resolve_parameters(&b, &param, &TypeHandlerRegistry::new()).is_err());
}

#[test]
fn order_follows_placeholders() {
    let params = resolve(
        "INSERT INTO t(a, b, c) VALUES (#{a}, #{b}, #{c})",
        ParamObject::Single(json!({"a": 1, "b": "x", "c": true})),
    );
    assert_eq!(
        params,
        vec![Param::I64(1), Param::Str("x".into()), Param::Bool(true)]
    );
}
