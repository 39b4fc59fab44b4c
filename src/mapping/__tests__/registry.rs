use serde_json::json;

use crate::mapping::{Error, SqlCommandType, StatementRegistry, load_mapper_xml};
use crate::scripting::PlaceholderStyle;
use crate::value::ParamObject;

const MAPPER: &str = r#"
<mapper namespace="app.UserMapper">
  <select id="find_by_id">SELECT * FROM users WHERE id = #{id}</select>
  <select id="search">SELECT * FROM users<where><if test="name != null">AND name = #{name}</if></where></select>
  <insert id="create">INSERT INTO users(name) VALUES (#{name})</insert>
  <update id="rename">UPDATE users SET name = #{name} WHERE id = #{id}</update>
  <delete id="remove">DELETE FROM users WHERE id = #{id}</delete>
</mapper>
"#;

fn loaded() -> StatementRegistry {
    let mut reg = StatementRegistry::new();
    load_mapper_xml(&mut reg, MAPPER, PlaceholderStyle::Question).unwrap();
    reg
}

#[test]
fn statements_get_namespaced_ids_and_kinds() {
    let reg = loaded();
    assert_eq!(reg.len(), 5);
    assert!(reg.has("app.UserMapper.find_by_id"));
    assert_eq!(
        reg.get("app.UserMapper.create").unwrap().kind,
        SqlCommandType::Insert
    );
    assert_eq!(
        reg.get("app.UserMapper.rename").unwrap().kind,
        SqlCommandType::Update
    );
    assert_eq!(
        reg.get("app.UserMapper.remove").unwrap().kind,
        SqlCommandType::Delete
    );
    assert_eq!(
        reg.get("app.UserMapper.search").unwrap().kind,
        SqlCommandType::Select
    );
}

#[test]
fn loaded_statement_binds() {
    let reg = loaded();
    let ms = reg.get("app.UserMapper.search").unwrap();
    let bound = ms
        .bound_sql(&ParamObject::Single(json!({"name": "ann"})))
        .unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE name = ?");
}

#[test]
fn statement_body_whitespace_is_kept() {
    let reg = loaded();
    let ms = reg.get("app.UserMapper.find_by_id").unwrap();
    let bound = ms.bound_sql(&ParamObject::None).unwrap();
    assert_eq!(bound.sql, "SELECT * FROM users WHERE id = ?");
}

#[test]
fn duplicate_statement_id_is_an_error() {
    let xml = r#"<mapper namespace="m"><select id="a">SELECT 1</select><select id="a">SELECT 2</select></mapper>"#;
    let mut reg = StatementRegistry::new();
    let err = load_mapper_xml(&mut reg, xml, PlaceholderStyle::Question).unwrap_err();
    assert!(matches!(err, Error::DuplicateStatement { .. }));
}

#[test]
fn missing_namespace_is_an_error() {
    let xml = r#"<mapper><select id="a">SELECT 1</select></mapper>"#;
    let mut reg = StatementRegistry::new();
    assert!(matches!(
        load_mapper_xml(&mut reg, xml, PlaceholderStyle::Question),
        Err(Error::MissingNamespace)
    ));
}

#[test]
fn missing_statement_id_is_an_error() {
    let xml = r#"<mapper namespace="m"><select>SELECT 1</select></mapper>"#;
    let mut reg = StatementRegistry::new();
    assert!(matches!(
        load_mapper_xml(&mut reg, xml, PlaceholderStyle::Question),
        Err(Error::MissingStatementId { .. })
    ));
}

#[test]
fn non_mapper_root_is_an_error() {
    let mut reg = StatementRegistry::new();
    let err = load_mapper_xml(&mut reg, "<mappers/>", PlaceholderStyle::Question).unwrap_err();
    assert!(matches!(err, Error::NotAMapperDocument { .. }));
}

#[test]
fn unknown_template_element_fails_the_load() {
    let xml = r#"<mapper namespace="m"><select id="a">SELECT 1<loop>x</loop></select></mapper>"#;
    let mut reg = StatementRegistry::new();
    let err = load_mapper_xml(&mut reg, xml, PlaceholderStyle::Question).unwrap_err();
    assert!(matches!(err, Error::Script(_)));
}

#[test]
fn unsupported_mapper_elements_are_skipped() {
    let xml = r#"<mapper namespace="m"><cache/><select id="a">SELECT 1</select></mapper>"#;
    let mut reg = StatementRegistry::new();
    load_mapper_xml(&mut reg, xml, PlaceholderStyle::Question).unwrap();
    assert_eq!(reg.ids(), vec!["m.a"]);
}
