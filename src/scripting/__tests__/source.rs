use serde_json::json;

use crate::scripting::{PlaceholderStyle, build_source_from_str};
use crate::value::ParamObject;

fn q(script: &str) -> crate::scripting::SqlSource {
    build_source_from_str(script, PlaceholderStyle::Question).unwrap()
}

fn single(v: serde_json::Value) -> ParamObject {
    ParamObject::Single(v)
}

/// Число драйверных плейсхолдеров должно совпадать с длиной списка параметров.
fn assert_placeholder_invariant(bound: &crate::mapping::BoundSql) {
    assert_eq!(
        bound.sql.matches('?').count(),
        bound.parameters.len(),
        "sql: {}",
        bound.sql
    );
}

#[test]
fn simple_select_by_id() {
    let src = q("SELECT * FROM t WHERE id = #{id}");
    let bound = src.bind(&single(json!({"id": 7}))).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t WHERE id = ?");
    assert_eq!(bound.parameters.len(), 1);
    assert_eq!(bound.parameters[0].property, "id");
    assert_placeholder_invariant(&bound);
}

#[test]
fn static_template_is_raw_and_parameter_independent() {
    let src = q("SELECT * FROM t WHERE id = #{id}");
    assert!(!src.is_dynamic());
    let a = src.bind(&single(json!({"id": 1}))).unwrap();
    let b = src.bind(&single(json!({"id": 999, "extra": "x"}))).unwrap();
    assert_eq!(a.sql, b.sql);
    assert_eq!(a, b);
}

#[test]
fn static_text_round_trips_byte_for_byte() {
    let text = "SELECT  a,\n  b FROM t WHERE x = 'y'";
    let src = q(text);
    let bound = src.bind(&ParamObject::None).unwrap();
    assert_eq!(bound.sql, text);
}

#[test]
fn dynamic_where_with_if() {
    let script = r#"<script>SELECT * FROM t<where><if test="name != null">AND name = #{name}</if><if test="age != null">AND age > #{age}</if></where></script>"#;
    let src = q(script);
    assert!(src.is_dynamic());

    let bound = src.bind(&single(json!({"name": null, "age": 18}))).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t WHERE age > ?");
    assert_eq!(bound.parameters.len(), 1);
    assert_eq!(bound.parameters[0].property, "age");

    let bound = src.bind(&single(json!({"name": null, "age": null}))).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t");
    assert!(bound.parameters.is_empty());

    let bound = src
        .bind(&single(json!({"name": "ann", "age": 18})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t WHERE name = ? AND age > ?");
    assert_eq!(bound.parameters.len(), 2);
    assert_placeholder_invariant(&bound);
}

#[test]
fn foreach_in_list() {
    let script = r#"<script>SELECT * FROM t WHERE id IN <foreach collection="ids" item="x" open="(" close=")" separator=",">#{x}</foreach></script>"#;
    let src = q(script);

    let bound = src.bind(&single(json!({"ids": [1, 2, 3]}))).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t WHERE id IN (?,?,?)");
    assert_eq!(bound.parameters.len(), 3);
    assert_placeholder_invariant(&bound);

    // каждое вхождение — свое уникальное имя, значения связаны в контексте
    for (i, expected) in [1, 2, 3].iter().enumerate() {
        let name = &bound.parameters[i].property;
        assert!(name.starts_with("__frch_x_"), "{name}");
        assert_eq!(bound.additional_binding(name), Some(&json!(expected)));
    }

    let bound = src.bind(&single(json!({"ids": []}))).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t WHERE id IN ()");
    assert!(bound.parameters.is_empty());
}

#[test]
fn foreach_over_object_binds_index_to_key() {
    let script = r#"<script><foreach collection="attrs" item="v" index="k" separator=" AND ">${k} = #{v}</foreach></script>"#;
    let src = q(script);
    let bound = src
        .bind(&single(json!({"attrs": {"a": 1, "b": 2}})))
        .unwrap();
    assert_eq!(bound.sql, "a = ? AND b = ?");
    assert_eq!(bound.parameters.len(), 2);
    assert_placeholder_invariant(&bound);
}

#[test]
fn substitution_vs_parameter() {
    let src = q("ORDER BY ${col} ASC LIMIT #{n}");
    assert!(src.is_dynamic());

    let bound = src
        .bind(&single(json!({"col": "created_at", "n": 10})))
        .unwrap();
    assert_eq!(bound.sql, "ORDER BY created_at ASC LIMIT ?");
    assert_eq!(bound.parameters.len(), 1);
    assert_eq!(bound.parameters[0].property, "n");

    // подстановка текстовая и непараметризованная — документированно небезопасна
    let bound = src
        .bind(&single(json!({"col": "x; DROP TABLE t", "n": 10})))
        .unwrap();
    assert_eq!(bound.sql, "ORDER BY x; DROP TABLE t ASC LIMIT ?");
}

#[test]
fn two_binds_of_same_tree_are_equal() {
    let script = r#"<script>SELECT * FROM t<where><if test="a != null">AND a = #{a}</if></where> ORDER BY ${col}</script>"#;
    let src = q(script);
    let p = single(json!({"a": 5, "col": "id"}));
    assert_eq!(src.bind(&p).unwrap(), src.bind(&p).unwrap());
}

#[test]
fn numbered_placeholders_for_postgres_dialect() {
    let script = r#"<script>UPDATE t<set><if test="name != null">name = #{name},</if><if test="age != null">age = #{age},</if></set>WHERE id = #{id}</script>"#;
    let src = build_source_from_str(script, PlaceholderStyle::Numbered).unwrap();
    let bound = src
        .bind(&single(json!({"name": "ann", "age": 7, "id": 3})))
        .unwrap();
    assert_eq!(bound.sql, "UPDATE t SET name = $1, age = $2 WHERE id = $3");
    assert_eq!(bound.parameters.len(), 3);
}

#[test]
fn bind_variable_is_visible_to_parameters_and_bindings() {
    let script = r#"<script><bind name="pattern" value="'%' + name + '%'"/>SELECT * FROM t WHERE name LIKE #{pattern}</script>"#;
    let src = q(script);
    let bound = src.bind(&single(json!({"name": "ann"}))).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM t WHERE name LIKE ?");
    assert_eq!(bound.parameters[0].property, "pattern");
    assert_eq!(bound.additional_binding("pattern"), Some(&json!("%ann%")));
}

#[test]
fn parameter_token_attributes_survive_foreach_rewrite() {
    let script = r#"<script>IN <foreach collection="ids" item="x" open="(" close=")" separator=",">#{x,jdbcType=BIGINT}</foreach></script>"#;
    let src = q(script);
    let bound = src.bind(&single(json!({"ids": [10, 20]}))).unwrap();
    assert_eq!(bound.sql, "IN (?,?)");
    for m in &bound.parameters {
        assert_eq!(m.jdbc_type, Some(crate::types::JdbcType::BigInt));
        assert!(m.property.starts_with("__frch_x_"));
    }
}

#[test]
fn escaped_hash_token_stays_literal() {
    let src = q(r"SELECT '\#{not a param}' FROM t");
    let bound = src.bind(&ParamObject::None).unwrap();
    assert_eq!(bound.sql, "SELECT '#{not a param}' FROM t");
    assert!(bound.parameters.is_empty());
}

#[test]
fn nested_foreach_uses_distinct_unique_names() {
    let script = r#"<script><foreach collection="groups" item="g" separator=";"><foreach collection="g" item="x" open="(" close=")" separator=",">#{x}</foreach></foreach></script>"#;
    let src = q(script);
    let bound = src
        .bind(&single(json!({"groups": [[1, 2], [3]]})))
        .unwrap();
    assert_eq!(bound.sql, "(?,?);(?)");
    assert_eq!(bound.parameters.len(), 3);
    // все имена различны
    let mut names: Vec<_> = bound.parameters.iter().map(|m| m.property.clone()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 3);
}

#[test]
fn unknown_jdbc_type_fails() {
    let r = build_source_from_str(
        "SELECT * FROM t WHERE id = #{id,jdbcType=NOPE}",
        PlaceholderStyle::Question,
    );
    assert!(r.is_err());
}

#[test]
fn unknown_parameter_attribute_fails() {
    let r = build_source_from_str(
        "SELECT * FROM t WHERE id = #{id,bogus=1}",
        PlaceholderStyle::Question,
    );
    assert!(r.is_err());
}
