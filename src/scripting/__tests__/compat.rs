//! Санити-проверка: собранный SQL разбирается сторонним парсером.

use serde_json::json;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::scripting::{PlaceholderStyle, build_source_from_str};
use crate::value::ParamObject;

fn assert_parses(sql: &str) {
    Parser::parse_sql(&GenericDialect {}, sql)
        .unwrap_or_else(|e| panic!("SQL не разобрался: {e}\n{sql}"));
}

fn render(script: &str, param: serde_json::Value) -> String {
    build_source_from_str(script, PlaceholderStyle::Question)
        .unwrap()
        .bind(&ParamObject::Single(param))
        .unwrap()
        .sql
}

#[test]
fn where_shape_parses() {
    let sql = render(
        r#"<script>SELECT * FROM t<where><if test="name != null">AND name = ${name}</if><if test="age != null">AND age > ${age}</if></where></script>"#,
        json!({"name": "'ann'", "age": 18}),
    );
    assert_eq!(sql, "SELECT * FROM t WHERE name = 'ann' AND age > 18");
    assert_parses(&sql);
}

#[test]
fn set_shape_parses() {
    let sql = render(
        r#"<script>UPDATE t<set><if test="name != null">name = ${name},</if>age = ${age},</set>WHERE id = ${id}</script>"#,
        json!({"name": "'b'", "age": 2, "id": 3}),
    );
    assert_eq!(sql, "UPDATE t SET name = 'b', age = 2 WHERE id = 3");
    assert_parses(&sql);
}

#[test]
fn foreach_in_list_parses_with_placeholders() {
    let sql = render(
        r#"<script>SELECT * FROM t WHERE id IN <foreach collection="ids" item="x" open="(" close=")" separator=",">#{x}</foreach></script>"#,
        json!({"ids": [1, 2, 3]}),
    );
    assert_eq!(sql, "SELECT * FROM t WHERE id IN (?,?,?)");
    assert_parses(&sql);
}
