use std::time::Duration;

use crate::session::SessionConfig;

#[test]
fn dsn_pool_parameters_are_parsed() {
    let cfg = SessionConfig::from_dsn(
        "postgres://u:p@localhost:5432/db?pool.max=7&pool.min=2&pool.acquire_timeout=250ms&pool.idle_timeout=5s&pool.test_before_acquire=1",
    )
    .unwrap();

    assert_eq!(cfg.max_connections, Some(7));
    assert_eq!(cfg.min_connections, Some(2));
    assert_eq!(cfg.acquire_timeout, Some(Duration::from_millis(250)));
    assert_eq!(cfg.idle_timeout, Some(Duration::from_secs(5)));
    assert_eq!(cfg.test_before_acquire, Some(true));
    assert!(cfg.database_url.as_deref().unwrap().starts_with("postgres://"));
}

#[test]
fn dsn_schema_and_init_sql() {
    let cfg = SessionConfig::from_dsn(
        "postgres://localhost/db?schema=app&init=SET%20x%3D1&init=SET%20y%3D2",
    )
    .unwrap();
    assert_eq!(cfg.schema.as_deref(), Some("app"));
    assert_eq!(cfg.after_connect_sql.as_deref(), Some("SET x=1; SET y=2"));
}

#[test]
fn unknown_dsn_parameters_are_ignored() {
    let cfg = SessionConfig::from_dsn("sqlite::memory:?whatever=1").unwrap();
    assert!(cfg.schema.is_none());
}

#[test]
fn invalid_numbers_and_durations_fail() {
    assert!(SessionConfig::from_dsn("postgres://h/db?pool.max=abc").is_err());
    assert!(SessionConfig::from_dsn("postgres://h/db?pool.idle_timeout=xyz").is_err());
    assert!(SessionConfig::from_dsn("postgres://h/db?pool.test_before_acquire=da").is_err());
}

#[test]
fn builder_fields_override_dsn_on_merge() {
    let from_builder = SessionConfig::builder()
        .database_url("postgres://h/db?pool.max=3")
        .max_connections(42)
        .build();
    let from_dsn = SessionConfig::from_dsn("postgres://h/db?pool.max=3").unwrap();
    let merged = from_builder.merge_override(from_dsn);
    // builder выигрывает
    assert_eq!(merged.max_connections, Some(42));
    // недостающее добирается из DSN
    assert!(merged.database_url.is_some());
}

#[test]
fn malformed_url_is_an_error() {
    assert!(SessionConfig::from_dsn("not a url").is_err());
}
