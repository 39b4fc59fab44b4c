use crate::scripting::{Error, PlaceholderStyle, build_source_from_str};

fn build(script: &str) -> crate::scripting::Result<crate::scripting::SqlSource> {
    build_source_from_str(script, PlaceholderStyle::Question)
}

#[test]
fn plain_text_is_static() {
    let src = build("SELECT 1").unwrap();
    assert!(!src.is_dynamic());
}

#[test]
fn hash_tokens_alone_do_not_make_a_template_dynamic() {
    let src = build("SELECT * FROM t WHERE id = #{id}").unwrap();
    assert!(!src.is_dynamic());
}

#[test]
fn dollar_tokens_make_a_template_dynamic() {
    let src = build("SELECT * FROM ${table}").unwrap();
    assert!(src.is_dynamic());
}

#[test]
fn any_element_makes_a_template_dynamic() {
    let src = build(r#"<script>SELECT 1<if test="a != null">+ 1</if></script>"#).unwrap();
    assert!(src.is_dynamic());
}

#[test]
fn unknown_element_is_a_build_error() {
    let err = build(r#"<script>SELECT 1<loop over="xs">x</loop></script>"#).unwrap_err();
    match err {
        Error::UnknownElement { name } => assert_eq!(name, "loop"),
        other => panic!("ожидали UnknownElement, получили {other:?}"),
    }
}

#[test]
fn if_requires_test_attribute() {
    let err = build(r#"<script><if>x</if></script>"#).unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { .. }));
}

#[test]
fn bind_requires_name_and_value() {
    let err = build(r#"<script><bind value="1"/></script>"#).unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { .. }));
    let err = build(r#"<script><bind name="x"/></script>"#).unwrap_err();
    assert!(matches!(err, Error::MissingAttribute { .. }));
}

#[test]
fn malformed_test_expression_is_a_build_error() {
    let err = build(r#"<script><if test="a ==">x</if></script>"#).unwrap_err();
    assert!(matches!(err, Error::Expr(_)));
}

#[test]
fn choose_rejects_two_otherwise() {
    let err = build(
        r#"<script><choose><when test="a != null">A</when><otherwise>B</otherwise><otherwise>C</otherwise></choose></script>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::TooManyOtherwise));
}

#[test]
fn choose_rejects_foreign_children() {
    let err = build(
        r#"<script><choose><if test="a != null">A</if></choose></script>"#,
    )
    .unwrap_err();
    assert!(matches!(err, Error::MisplacedChooseChild { .. }));
}

#[test]
fn malformed_script_xml_is_a_build_error() {
    let err = build("<script>SELECT 1").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
}

#[test]
fn pretty_printed_template_keeps_text_whitespace_but_drops_blank_nodes() {
    let src = build(
        "<script>\n  SELECT * FROM t\n  <where>\n    <if test=\"a != null\">AND a = #{a}</if>\n  </where>\n</script>",
    )
    .unwrap();
    let bound = src
        .bind(&crate::value::ParamObject::Single(serde_json::json!({"a": 1})))
        .unwrap();
    // пробелы внутри текстового узла сохраняются как есть; чисто пробельные
    // узлы между элементами не порождают фрагментов
    assert_eq!(bound.sql, "\n  SELECT * FROM t\n  WHERE a = ?");
}
