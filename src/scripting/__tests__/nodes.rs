use serde_json::json;

use crate::scripting::context::DynamicContext;
use crate::scripting::node::SqlNode;
use crate::value::ParamObject;

fn static_node(s: &str) -> SqlNode {
    SqlNode::StaticText(s.to_string())
}

fn render(node: &SqlNode, param: ParamObject) -> String {
    let mut ctx = DynamicContext::new(&param);
    node.apply(&mut ctx).unwrap();
    ctx.sql().to_string()
}

#[test]
fn fragments_join_with_single_space() {
    let node = SqlNode::Mixed(vec![static_node("SELECT * FROM t"), static_node("WHERE a = 1")]);
    assert_eq!(render(&node, ParamObject::None), "SELECT * FROM t WHERE a = 1");
}

#[test]
fn no_extra_space_when_either_side_has_one() {
    let node = SqlNode::Mixed(vec![static_node("SELECT * FROM t WHERE id IN "), static_node("(1,2)")]);
    assert_eq!(
        render(&node, ParamObject::None),
        "SELECT * FROM t WHERE id IN (1,2)"
    );
}

#[test]
fn static_text_is_preserved_byte_for_byte() {
    let text = "SELECT  a,\n\tb FROM t  WHERE x = 'y z'";
    assert_eq!(render(&static_node(text), ParamObject::None), text);
}

#[test]
fn where_strips_leading_and_case_insensitively() {
    let node = SqlNode::Where(Box::new(static_node("AND name = #{name}")));
    assert_eq!(render(&node, ParamObject::None), "WHERE name = #{name}");

    let node = SqlNode::Where(Box::new(static_node("and name = 1")));
    assert_eq!(render(&node, ParamObject::None), "WHERE name = 1");

    let node = SqlNode::Where(Box::new(static_node("OR name = 1")));
    assert_eq!(render(&node, ParamObject::None), "WHERE name = 1");
}

#[test]
fn where_with_empty_body_emits_nothing() {
    let node = SqlNode::Mixed(vec![
        static_node("SELECT * FROM t"),
        SqlNode::Where(Box::new(static_node(""))),
    ]);
    assert_eq!(render(&node, ParamObject::None), "SELECT * FROM t");

    // одни пробелы — тоже пусто
    let node = SqlNode::Where(Box::new(static_node("   \n  ")));
    assert_eq!(render(&node, ParamObject::None), "");
}

#[test]
fn where_never_emits_bare_keyword() {
    // после снятия префикса не осталось ничего
    let node = SqlNode::Where(Box::new(static_node("AND ")));
    assert_eq!(render(&node, ParamObject::None), "");
}

#[test]
fn where_keeps_inner_connectors() {
    let node = SqlNode::Where(Box::new(static_node("AND a = 1 AND b = 2")));
    assert_eq!(render(&node, ParamObject::None), "WHERE a = 1 AND b = 2");
}

#[test]
fn set_strips_trailing_comma() {
    let node = SqlNode::Set(Box::new(static_node("name = #{name}, age = #{age},")));
    assert_eq!(
        render(&node, ParamObject::None),
        "SET name = #{name}, age = #{age}"
    );
}

#[test]
fn set_with_empty_body_emits_nothing() {
    let node = SqlNode::Set(Box::new(static_node("")));
    assert_eq!(render(&node, ParamObject::None), "");
}

#[test]
fn trim_applies_prefix_and_suffix_only_when_non_empty() {
    let trim = |body: &str| {
        SqlNode::Trim(crate::scripting::TrimNode {
            body: Box::new(static_node(body)),
            prefix: Some("(".into()),
            prefix_overrides: vec![],
            suffix: Some(")".into()),
            suffix_overrides: vec![",".into()],
        })
    };
    assert_eq!(render(&trim("a = 1,"), ParamObject::None), "( a = 1 )");
    assert_eq!(render(&trim(""), ParamObject::None), "");
}

#[test]
fn trim_with_empty_overrides_still_applies_prefix() {
    let node = SqlNode::Trim(crate::scripting::TrimNode {
        body: Box::new(static_node("x = 1")),
        prefix: Some("WHERE".into()),
        prefix_overrides: vec![],
        suffix: None,
        suffix_overrides: vec![],
    });
    assert_eq!(render(&node, ParamObject::None), "WHERE x = 1");
}

#[test]
fn if_applies_body_only_when_truthy() {
    let node = SqlNode::Mixed(vec![
        static_node("SELECT 1"),
        SqlNode::If(crate::scripting::IfNode {
            test: crate::expr::parse("flag").unwrap(),
            body: Box::new(static_node("AND flag = 1")),
        }),
    ]);
    assert_eq!(
        render(&node, ParamObject::Single(json!({"flag": true}))),
        "SELECT 1 AND flag = 1"
    );
    assert_eq!(
        render(&node, ParamObject::Single(json!({"flag": false}))),
        "SELECT 1"
    );
}

#[test]
fn choose_takes_first_truthy_when_else_otherwise() {
    let choose = SqlNode::Choose(crate::scripting::ChooseNode {
        whens: vec![
            crate::scripting::IfNode {
                test: crate::expr::parse("a != null").unwrap(),
                body: Box::new(static_node("BY_A")),
            },
            crate::expr::parse("b != null")
                .map(|test| crate::scripting::IfNode {
                    test,
                    body: Box::new(static_node("BY_B")),
                })
                .unwrap(),
        ],
        otherwise: Some(Box::new(static_node("BY_DEFAULT"))),
    });

    assert_eq!(
        render(&choose, ParamObject::Single(json!({"a": 1, "b": 2}))),
        "BY_A"
    );
    assert_eq!(
        render(&choose, ParamObject::Single(json!({"b": 2}))),
        "BY_B"
    );
    assert_eq!(render(&choose, ParamObject::Single(json!({}))), "BY_DEFAULT");
}

#[test]
fn bind_declares_a_context_binding() {
    let node = SqlNode::Mixed(vec![
        SqlNode::Bind(crate::scripting::BindNode {
            name: "pattern".into(),
            value: crate::expr::parse("'%' + name + '%'").unwrap(),
        }),
        SqlNode::Text("name LIKE '${pattern}'".into()),
    ]);
    assert_eq!(
        render(&node, ParamObject::Single(json!({"name": "ann"}))),
        "name LIKE '%ann%'"
    );
}

#[test]
fn foreach_missing_collection_fails_at_apply_time() {
    let node = SqlNode::ForEach(crate::scripting::ForEachNode {
        body: Box::new(static_node("#{x}")),
        collection: None,
        item: Some("x".into()),
        index: None,
        open: String::new(),
        close: String::new(),
        separator: String::new(),
    });
    let param = ParamObject::None;
    let mut ctx = DynamicContext::new(&param);
    assert!(node.apply(&mut ctx).is_err());
}

#[test]
fn foreach_null_collection_fails_at_apply_time() {
    let node = SqlNode::ForEach(crate::scripting::ForEachNode {
        body: Box::new(static_node("#{x}")),
        collection: Some((crate::expr::parse("ids").unwrap(), "ids".into())),
        item: Some("x".into()),
        index: None,
        open: "(".into(),
        close: ")".into(),
        separator: ",".into(),
    });
    let param = ParamObject::Single(json!({"ids": null}));
    let mut ctx = DynamicContext::new(&param);
    assert!(node.apply(&mut ctx).is_err());
}

#[test]
fn foreach_restores_prior_item_binding() {
    let param = ParamObject::Single(json!({"ids": [1, 2]}));
    let mut ctx = DynamicContext::new(&param);
    ctx.bind("x", json!("outer"));

    let node = SqlNode::ForEach(crate::scripting::ForEachNode {
        body: Box::new(static_node("#{x}")),
        collection: Some((crate::expr::parse("ids").unwrap(), "ids".into())),
        item: Some("x".into()),
        index: None,
        open: "(".into(),
        close: ")".into(),
        separator: ",".into(),
    });
    node.apply(&mut ctx).unwrap();
    assert_eq!(ctx.binding("x"), Some(&json!("outer")));
}
