use std::sync::Arc;

use serde_json::{Value, json};

use crate::param::Param;
use crate::types::{DefaultTypeHandler, JdbcType, TypeHandler, TypeHandlerRegistry};

fn lower(v: Value) -> Param {
    DefaultTypeHandler.to_param("p", &v, None).unwrap()
}

#[test]
fn scalars() {
    assert_eq!(lower(json!(7)), Param::I64(7));
    assert_eq!(lower(json!(2.5)), Param::F64(2.5));
    assert_eq!(lower(json!(true)), Param::Bool(true));
    assert_eq!(lower(json!("ann")), Param::Str("ann".into()));
}

#[test]
fn null_respects_jdbc_hint() {
    let h = DefaultTypeHandler;
    assert_eq!(
        h.to_param("p", &Value::Null, Some(JdbcType::BigInt)).unwrap(),
        Param::NullI64
    );
    assert_eq!(
        h.to_param("p", &Value::Null, Some(JdbcType::Double)).unwrap(),
        Param::NullF64
    );
    assert_eq!(
        h.to_param("p", &Value::Null, Some(JdbcType::Boolean)).unwrap(),
        Param::NullBool
    );
    assert_eq!(
        h.to_param("p", &Value::Null, Some(JdbcType::Blob)).unwrap(),
        Param::NullBytes
    );
    assert_eq!(h.to_param("p", &Value::Null, None).unwrap(), Param::NullText);
}

#[test]
fn containers_become_json_text() {
    assert_eq!(lower(json!([1, 2])), Param::Str("[1,2]".into()));
    assert_eq!(lower(json!({"a": 1})), Param::Str("{\"a\":1}".into()));
}

#[test]
fn jdbc_type_parsing() {
    assert_eq!("BIGINT".parse::<JdbcType>().unwrap(), JdbcType::BigInt);
    assert_eq!("VARCHAR".parse::<JdbcType>().unwrap(), JdbcType::Varchar);
    assert!("bigint".parse::<JdbcType>().is_err()); // регистр значим
    assert!("NOPE".parse::<JdbcType>().is_err());
}

#[test]
fn registry_resolves_named_and_default() {
    struct Upper;
    impl TypeHandler for Upper {
        fn to_param(
            &self,
            _property: &str,
            value: &Value,
            _jdbc: Option<JdbcType>,
        ) -> crate::types::Result<Param> {
            Ok(Param::Str(
                value.as_str().unwrap_or_default().to_uppercase(),
            ))
        }
    }

    let mut reg = TypeHandlerRegistry::new();
    reg.register("upper", Arc::new(Upper));

    let h = reg.resolve(Some("upper")).unwrap();
    assert_eq!(h.to_param("p", &json!("ann"), None).unwrap(), Param::Str("ANN".into()));

    assert!(reg.resolve(None).is_ok());
    assert!(reg.resolve(Some("missing")).is_err());
}
