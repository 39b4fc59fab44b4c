use std::sync::Arc;

use serde_json::{Value, json};

use crate::binding::{
    Error, MapperArgs, MapperInterface, MapperOutput, MapperProxyFactory, MapperRegistry,
    MethodSpec, ReturnSpec,
};
use crate::mapping::SqlCommandType;
use crate::session::Configuration;
use crate::tests::fake_session::{Call, FakeSession};

const MAPPER: &str = r#"
<mapper namespace="app.UserMapper">
  <select id="find_by_id">SELECT * FROM users WHERE id = #{id}</select>
  <select id="list_all">SELECT * FROM users</select>
  <insert id="create">INSERT INTO users(name) VALUES (#{name})</insert>
</mapper>
"#;

fn config() -> Configuration {
    let mut cfg = Configuration::default();
    cfg.load_mapper(MAPPER).unwrap();
    cfg
}

fn user_interface() -> Arc<MapperInterface> {
    Arc::new(
        MapperInterface::new("app.UserMapper")
            .with_method(MethodSpec::new("find_by_id", ReturnSpec::Scalar).arg())
            .with_method(MethodSpec::new("list_all", ReturnSpec::List))
            .with_method(MethodSpec::new("create", ReturnSpec::Int).arg()),
    )
}

fn session_with_rows(rows: Vec<Value>) -> Arc<FakeSession> {
    Arc::new(FakeSession::new(config()).with_rows(rows))
}

#[test]
fn invoke_routes_through_cached_executor() {
    let session = session_with_rows(vec![json!({"id": 7})]);
    let factory = MapperProxyFactory::new(user_interface());
    let proxy = factory.create(session.clone());

    let v = proxy.invoke_value("find_by_id", vec![json!(7)]).unwrap();
    assert_eq!(v, json!({"id": 7}));
    assert_eq!(proxy.cached_method_count(), 1);

    // повторный вызов не создаёт второй исполнитель
    proxy.invoke_value("find_by_id", vec![json!(7)]).unwrap();
    assert_eq!(proxy.cached_method_count(), 1);
}

#[test]
fn method_cache_is_shared_between_proxies_of_one_factory() {
    let factory = MapperProxyFactory::new(user_interface());
    let p1 = factory.create(session_with_rows(vec![]));
    let p2 = factory.create(session_with_rows(vec![]));

    p1.invoke_value("list_all", vec![]).unwrap();
    assert_eq!(p2.cached_method_count(), 1);
    p2.invoke_value("list_all", vec![]).unwrap();
    assert_eq!(p2.cached_method_count(), 1);
}

#[test]
fn unknown_method_is_an_error() {
    let proxy = MapperProxyFactory::new(user_interface()).create(session_with_rows(vec![]));
    let err = proxy.invoke_value("nope", vec![]).unwrap_err();
    assert!(matches!(err, Error::UnknownMethod { .. }));
}

#[test]
fn inherited_method_dispatches_with_parent_statement_id() {
    let mut cfg = Configuration::default();
    cfg.load_mapper(r#"<mapper namespace="app.Parent"><select id="find">SELECT 1</select></mapper>"#)
        .unwrap();
    let session = Arc::new(FakeSession::new(cfg).with_rows(vec![json!({"n": 1})]));

    let parent = Arc::new(
        MapperInterface::new("app.Parent")
            .with_method(MethodSpec::new("find", ReturnSpec::Scalar).arg()),
    );
    let child = Arc::new(MapperInterface::new("app.Child").with_parent(parent));

    let proxy = MapperProxyFactory::new(child).create(session.clone());
    proxy.invoke_value("find", vec![json!(1)]).unwrap();

    assert!(matches!(
        session.calls().as_slice(),
        [Call::SelectList { statement, .. }] if statement == "app.Parent.find"
    ));
}

#[test]
fn default_body_runs_on_proxy_without_touching_session() {
    let session = session_with_rows(vec![json!({"id": 1})]);
    let iface = Arc::new(
        MapperInterface::new("app.UserMapper")
            .with_method(MethodSpec::new("find_by_id", ReturnSpec::Scalar).arg())
            .with_method(
                MethodSpec::new("find_first", ReturnSpec::Scalar).default_body(
                    |proxy: &crate::binding::MapperProxy, _args: MapperArgs<'_>| {
                        // default-метод волен переиспользовать обычные
                        proxy.invoke("find_by_id", MapperArgs::from_values(vec![json!(1)]))
                    },
                ),
            ),
    );
    let proxy = MapperProxyFactory::new(iface).create(session.clone());

    let v = proxy.invoke_value("find_first", vec![]).unwrap();
    assert_eq!(v, json!({"id": 1}));
    // сессию трогал только вложенный find_by_id
    assert_eq!(session.calls().len(), 1);
}

#[test]
fn identity_is_plain_trait_impls() {
    let factory = MapperProxyFactory::new(user_interface());
    let session = session_with_rows(vec![]);
    let p1 = factory.create(session.clone());
    let p2 = factory.create(session.clone());
    let other = MapperProxyFactory::new(user_interface()).create(session);

    assert_eq!(p1, p2);
    assert_ne!(p1, other);
    assert!(format!("{p1:?}").contains("app.UserMapper"));
}

#[test]
fn registry_creates_proxies_and_rejects_duplicates() {
    let mut cfg = config();
    let mut registry = MapperRegistry::new();
    registry.add_mapper(&mut cfg, user_interface()).unwrap();
    assert!(registry.has_mapper("app.UserMapper"));

    let err = registry.add_mapper(&mut cfg, user_interface()).unwrap_err();
    assert!(matches!(err, Error::AlreadyRegistered { .. }));

    let session = Arc::new(FakeSession::new(cfg).with_rows(vec![]));
    assert!(registry.mapper("app.UserMapper", session.clone()).is_ok());
    assert!(matches!(
        registry.mapper("app.Other", session),
        Err(Error::NotRegistered { .. })
    ));
}

#[test]
fn registry_analyzes_methods_eagerly() {
    let mut cfg = config();
    let broken = Arc::new(
        MapperInterface::new("app.Broken")
            .with_method(MethodSpec::new("by_name", ReturnSpec::Map)), // нет map_key
    );
    let err = MapperRegistry::new().add_mapper(&mut cfg, broken).unwrap_err();
    assert!(matches!(err, Error::MissingMapKey { .. }));
}

#[test]
fn registry_registers_inline_statements() {
    let mut cfg = Configuration::default();
    let iface = Arc::new(MapperInterface::new("app.Notes").with_method(
        MethodSpec::new("touch", ReturnSpec::Int).arg().inline(
            SqlCommandType::Update,
            "UPDATE notes SET ts = #{ts}",
        ),
    ));
    let mut registry = MapperRegistry::new();
    registry.add_mapper(&mut cfg, iface).unwrap();
    assert!(cfg.has_statement("app.Notes.touch"));

    let session = Arc::new(FakeSession::new(cfg).with_affected(2));
    let proxy = registry.mapper("app.Notes", session.clone()).unwrap();
    let v = proxy.invoke_value("touch", vec![json!(123)]).unwrap();
    assert_eq!(v, json!(2));
    assert!(matches!(
        session.calls().as_slice(),
        [Call::Update { statement, .. }] if statement == "app.Notes.touch"
    ));
}

#[test]
fn cursor_output_collects_via_invoke_value() {
    let session = session_with_rows(vec![json!({"id": 1}), json!({"id": 2})]);
    let iface = Arc::new(
        MapperInterface::new("app.UserMapper")
            .with_method(MethodSpec::new("list_all", ReturnSpec::Cursor)),
    );
    let proxy = MapperProxyFactory::new(iface).create(session);

    // через invoke — курсор
    match proxy.invoke("list_all", MapperArgs::new()).unwrap() {
        MapperOutput::Cursor(_) => {}
        MapperOutput::Value(v) => panic!("ожидали Cursor, получили {v:?}"),
    }
    // через invoke_value — собранный массив
    let v = proxy.invoke_value("list_all", vec![]).unwrap();
    assert_eq!(v, json!([{"id": 1}, {"id": 2}]));
}
