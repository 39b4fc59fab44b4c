use serde_json::json;

use crate::binding::{Error, MethodSignature, MethodSpec, ReturnSpec};
use crate::value::ParamObject;

fn analyze(spec: MethodSpec) -> crate::binding::Result<MethodSignature> {
    MethodSignature::analyze("app.UserMapper", &spec)
}

#[test]
fn duplicate_row_bounds_is_an_analysis_error() {
    let err = analyze(
        MethodSpec::new("page", ReturnSpec::List)
            .arg()
            .row_bounds()
            .row_bounds(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DuplicateRowBounds { .. }));
}

#[test]
fn duplicate_result_handler_is_an_analysis_error() {
    let err = analyze(
        MethodSpec::new("scan", ReturnSpec::Void)
            .result_handler()
            .result_handler(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DuplicateResultHandler { .. }));
}

#[test]
fn special_parameter_indices_are_recorded() {
    let sig = analyze(
        MethodSpec::new("page", ReturnSpec::List)
            .arg()
            .row_bounds()
            .result_handler(),
    )
    .unwrap();
    assert_eq!(sig.row_bounds_index(), Some(1));
    assert_eq!(sig.result_handler_index(), Some(2));
}

#[test]
fn map_return_requires_map_key() {
    let err = analyze(MethodSpec::new("by_name", ReturnSpec::Map)).unwrap_err();
    assert!(matches!(err, Error::MissingMapKey { .. }));

    let sig = analyze(MethodSpec::new("by_name", ReturnSpec::Map).map_key("name")).unwrap();
    assert_eq!(sig.map_key(), Some("name"));
}

#[test]
fn map_key_on_non_map_return_is_ignored() {
    let sig = analyze(MethodSpec::new("one", ReturnSpec::Scalar).map_key("name")).unwrap();
    assert_eq!(sig.map_key(), None);
}

#[test]
fn single_unnamed_argument_passes_through() {
    let sig = analyze(MethodSpec::new("find", ReturnSpec::Scalar).arg()).unwrap();
    let p = sig.convert_args(&[json!({"id": 1})]).unwrap();
    assert_eq!(p, ParamObject::Single(json!({"id": 1})));

    // имя из объявления не мешает прямой передаче
    let sig = analyze(MethodSpec::new("find", ReturnSpec::Scalar).declared_arg("id")).unwrap();
    let p = sig.convert_args(&[json!(7)]).unwrap();
    assert_eq!(p, ParamObject::Single(json!(7)));
}

#[test]
fn single_explicitly_named_argument_becomes_a_map() {
    let sig = analyze(MethodSpec::new("find", ReturnSpec::Scalar).named_arg("id")).unwrap();
    let p = sig.convert_args(&[json!(7)]).unwrap();
    let ParamObject::Map(map) = p else {
        panic!("ожидали Map");
    };
    assert_eq!(map.get("id"), Some(&json!(7)));
    assert_eq!(map.get("param1"), Some(&json!(7)));
}

#[test]
fn multiple_arguments_get_names_and_aliases() {
    let sig = analyze(
        MethodSpec::new("search", ReturnSpec::List)
            .named_arg("name")
            .declared_arg("age")
            .arg(),
    )
    .unwrap();
    let p = sig
        .convert_args(&[json!("ann"), json!(18), json!(true)])
        .unwrap();
    let ParamObject::Map(map) = p else {
        panic!("ожидали Map");
    };
    // явное имя
    assert_eq!(map.get("name"), Some(&json!("ann")));
    // имя из объявления
    assert_eq!(map.get("age"), Some(&json!(18)));
    // безымянный — только алиас
    assert_eq!(map.get("param3"), Some(&json!(true)));
    // алиасы есть у всех
    assert_eq!(map.get("param1"), Some(&json!("ann")));
    assert_eq!(map.get("param2"), Some(&json!(18)));
}

#[test]
fn special_positions_are_skipped_in_naming() {
    let sig = analyze(
        MethodSpec::new("page", ReturnSpec::List)
            .row_bounds()
            .named_arg("name")
            .declared_arg("age"),
    )
    .unwrap();
    // convert_args принимает только доменные значения
    let p = sig.convert_args(&[json!("ann"), json!(20)]).unwrap();
    let ParamObject::Map(map) = p else {
        panic!("ожидали Map");
    };
    assert_eq!(map.get("param1"), Some(&json!("ann")));
    assert_eq!(map.get("param2"), Some(&json!(20)));
}

#[test]
fn zero_arguments_resolve_to_none() {
    let sig = analyze(MethodSpec::new("all", ReturnSpec::List)).unwrap();
    assert_eq!(sig.convert_args(&[]).unwrap(), ParamObject::None);
}

#[test]
fn arity_mismatch_is_an_error() {
    let sig = analyze(MethodSpec::new("find", ReturnSpec::Scalar).arg()).unwrap();
    let err = sig.convert_args(&[]).unwrap_err();
    assert!(matches!(err, Error::ArgumentCount { .. }));
}

#[test]
fn strict_map_lookup_reports_available_names() {
    let sig = analyze(
        MethodSpec::new("search", ReturnSpec::List)
            .named_arg("name")
            .named_arg("age"),
    )
    .unwrap();
    let p = sig.convert_args(&[json!("ann"), json!(18)]).unwrap();
    let ParamObject::Map(map) = p else {
        panic!("ожидали Map");
    };
    let err = map.get_strict("missing").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("age, name, param1, param2"), "{msg}");
}
