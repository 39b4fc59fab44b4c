use std::sync::Arc;

use crate::binding::{Error, MapperInterface, MethodSpec, ReturnSpec, SqlCommand};
use crate::mapping::{MappedStatement, SqlCommandType};
use crate::scripting::{PlaceholderStyle, build_source_from_str};
use crate::session::Configuration;

fn config_with(xml: &str) -> Configuration {
    let mut cfg = Configuration::default();
    cfg.load_mapper(xml).unwrap();
    cfg
}

#[test]
fn resolves_statement_by_composed_id() {
    let cfg = config_with(
        r#"<mapper namespace="app.UserMapper"><select id="find">SELECT 1</select></mapper>"#,
    );
    let iface = MapperInterface::new("app.UserMapper");
    let spec = MethodSpec::new("find", ReturnSpec::Scalar).arg();

    let cmd = SqlCommand::resolve(&cfg, &iface, &spec).unwrap();
    assert_eq!(cmd.name.as_deref(), Some("app.UserMapper.find"));
    assert_eq!(cmd.kind, SqlCommandType::Select);
}

#[test]
fn missing_statement_reports_composed_id() {
    let cfg = Configuration::default();
    let iface = MapperInterface::new("app.UserMapper");
    let spec = MethodSpec::new("find", ReturnSpec::Scalar);

    let err = SqlCommand::resolve(&cfg, &iface, &spec).unwrap_err();
    match err {
        Error::MissingStatement { id } => assert_eq!(id, "app.UserMapper.find"),
        other => panic!("ожидали MissingStatement, получили {other:?}"),
    }
}

#[test]
fn inherited_method_resolves_on_declaring_interface() {
    // Child расширяет Parent; стейтмент объявлен только у Parent
    let cfg = config_with(
        r#"<mapper namespace="app.Parent"><select id="find">SELECT 1</select></mapper>"#,
    );
    let parent = Arc::new(
        MapperInterface::new("app.Parent")
            .with_method(MethodSpec::new("find", ReturnSpec::Scalar).arg()),
    );
    let child = MapperInterface::new("app.Child").with_parent(parent);
    let spec = child.find_method("find").unwrap();

    let cmd = SqlCommand::resolve(&cfg, &child, spec).unwrap();
    // имя — родительское, не app.Child.find
    assert_eq!(cmd.name.as_deref(), Some("app.Parent.find"));
}

#[test]
fn child_statement_shadows_parent() {
    let cfg = config_with(
        r#"<mapper namespace="app.Child"><select id="find">SELECT 2</select></mapper>"#,
    );
    let parent = Arc::new(
        MapperInterface::new("app.Parent")
            .with_method(MethodSpec::new("find", ReturnSpec::Scalar)),
    );
    let child = MapperInterface::new("app.Child").with_parent(parent);
    let spec = child.find_method("find").unwrap();

    let cmd = SqlCommand::resolve(&cfg, &child, spec).unwrap();
    assert_eq!(cmd.name.as_deref(), Some("app.Child.find"));
}

#[test]
fn parent_walk_is_declaration_ordered() {
    let mut cfg = config_with(
        r#"<mapper namespace="app.A"><select id="find">SELECT 1</select></mapper>"#,
    );
    cfg.load_mapper(r#"<mapper namespace="app.B"><select id="find">SELECT 2</select></mapper>"#)
        .unwrap();

    let a = Arc::new(
        MapperInterface::new("app.A").with_method(MethodSpec::new("find", ReturnSpec::Scalar)),
    );
    let b = Arc::new(
        MapperInterface::new("app.B").with_method(MethodSpec::new("find", ReturnSpec::Scalar)),
    );
    let child = MapperInterface::new("app.Child")
        .with_parent(a)
        .with_parent(b);
    let spec = child.find_method("find").unwrap();

    // первый объявленный родитель выигрывает
    let cmd = SqlCommand::resolve(&cfg, &child, spec).unwrap();
    assert_eq!(cmd.name.as_deref(), Some("app.A.find"));
}

#[test]
fn flush_marker_allows_missing_statement() {
    let cfg = Configuration::default();
    let iface = MapperInterface::new("app.UserMapper");
    let spec = MethodSpec::new("flush_all", ReturnSpec::Void).flush();

    let cmd = SqlCommand::resolve(&cfg, &iface, &spec).unwrap();
    assert_eq!(cmd.name, None);
    assert_eq!(cmd.kind, SqlCommandType::Flush);
}

#[test]
fn unknown_statement_kind_is_rejected() {
    let mut cfg = Configuration::default();
    let source = build_source_from_str("SELECT 1", PlaceholderStyle::Question).unwrap();
    cfg.statements
        .add(MappedStatement::new(
            "app.UserMapper.odd",
            SqlCommandType::Unknown,
            source,
        ))
        .unwrap();

    let iface = MapperInterface::new("app.UserMapper");
    let spec = MethodSpec::new("odd", ReturnSpec::Scalar);
    let err = SqlCommand::resolve(&cfg, &iface, &spec).unwrap_err();
    assert!(matches!(err, Error::UnknownStatementKind { .. }));
}
