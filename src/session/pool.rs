use std::future::Future;

use log::{debug, warn};
use serde_json::Value;
use sqlx::Executor;

#[cfg(feature = "mysql")]
use sqlx::mysql::{MySqlPool, MySqlPoolOptions, MySqlRow};
#[cfg(feature = "postgres")]
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};

use super::{
    Configuration, Error, Result, RowBounds, SessionConfig, SqlSession, resolve_parameters,
};
use crate::param::Param;
use crate::value::ParamObject;

// алиасы под активную БД
#[cfg(feature = "postgres")]
pub type DbRow = PgRow;
#[cfg(feature = "mysql")]
pub type DbRow = MySqlRow;
#[cfg(feature = "sqlite")]
pub type DbRow = SqliteRow;

#[derive(Clone, Debug)]
pub enum DbPool {
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
    #[cfg(feature = "mysql")]
    MySql(MySqlPool),
    #[cfg(feature = "sqlite")]
    Sqlite(SqlitePool),
}

/// Сессия поверх sqlx-пула: синхронный фасад, внутри — футуры, догоняемые
/// на собственном рантайме либо через `block_in_place` на внешнем.
pub struct PooledSession {
    pool: DbPool,
    configuration: Configuration,
    runtime: Option<tokio::runtime::Runtime>,
}

impl PooledSession {
    /// Подключиться по конфигу: либо используем готовый pool, либо создаём
    /// через database_url. Builder-поля перекрывают параметры DSN.
    pub fn connect(cfg: SessionConfig, configuration: Configuration) -> Result<Self> {
        let cfg = if let Some(ref dsn) = cfg.database_url {
            let from_dsn = SessionConfig::from_dsn(dsn)?;
            cfg.merge_override(from_dsn)
        } else {
            cfg
        };

        // если передан готовый пул — используем его
        if let Some(pool) = cfg.pool.clone() {
            return Ok(Self::from_pool(pool, configuration));
        }

        let url = cfg.database_url.clone().ok_or(Error::MissingConnection)?;
        let scheme = url::Url::parse(&url)
            .map_err(Error::InvalidUrl)?
            .scheme()
            .to_string();

        let runtime = own_runtime()?;
        let pool = match &runtime {
            Some(rt) => rt.block_on(build_pool(&cfg, &url, &scheme))?,
            None => tokio::task::block_in_place(|| {
                tokio::runtime::Handle::current().block_on(build_pool(&cfg, &url, &scheme))
            })?,
        };
        Ok(Self {
            pool,
            configuration,
            runtime,
        })
    }

    /// Обернуть уже созданный пул (например, сконфигурированный снаружи).
    pub fn from_pool(pool: DbPool, configuration: Configuration) -> Self {
        Self {
            pool,
            configuration,
            runtime: own_runtime().ok().flatten(),
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn as_sqlite_pool(&self) -> Option<&SqlitePool> {
        #[allow(irrefutable_let_patterns)]
        if let DbPool::Sqlite(pool) = &self.pool {
            Some(pool)
        } else {
            None
        }
    }

    #[cfg(feature = "postgres")]
    pub fn as_pg_pool(&self) -> Option<&PgPool> {
        #[allow(irrefutable_let_patterns)]
        if let DbPool::Postgres(pool) = &self.pool {
            Some(pool)
        } else {
            None
        }
    }

    #[cfg(feature = "mysql")]
    pub fn as_mysql_pool(&self) -> Option<&MySqlPool> {
        #[allow(irrefutable_let_patterns)]
        if let DbPool::MySql(pool) = &self.pool {
            Some(pool)
        } else {
            None
        }
    }

    /// Догнать футуру до результата в синхронном фасаде.
    fn run<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            return tokio::task::block_in_place(|| handle.block_on(fut));
        }
        match &self.runtime {
            Some(rt) => rt.block_on(fut),
            None => {
                // ни внешнего, ни своего рантайма — разовый
                let rt = tokio::runtime::Runtime::new().map_err(io_err)?;
                rt.block_on(fut)
            }
        }
    }

    fn run_dml(&self, id: &str, param: &ParamObject) -> Result<u64> {
        let ms = self.configuration.statement(id)?;
        let bound = ms.bound_sql(param)?;
        let params = resolve_parameters(&bound, param, &self.configuration.type_handlers)?;
        debug!("executing '{id}' [{} params]: {}", params.len(), bound.sql);

        let sql = bound.sql.as_str();
        match &self.pool {
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => self.run(async move {
                let mut q = sqlx::query(sql);
                for p in params {
                    q = bind_pg(q, p);
                }
                Ok(q.execute(pool).await?.rows_affected())
            }),
            #[cfg(feature = "mysql")]
            DbPool::MySql(pool) => self.run(async move {
                let mut q = sqlx::query(sql);
                for p in params {
                    q = bind_mysql(q, p);
                }
                Ok(q.execute(pool).await?.rows_affected())
            }),
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => self.run(async move {
                let mut q = sqlx::query(sql);
                for p in params {
                    q = bind_sqlite(q, p);
                }
                Ok(q.execute(pool).await?.rows_affected())
            }),
        }
    }

    fn run_select(&self, id: &str, param: &ParamObject, bounds: RowBounds) -> Result<Vec<Value>> {
        let ms = self.configuration.statement(id)?;
        let bound = ms.bound_sql(param)?;
        let params = resolve_parameters(&bound, param, &self.configuration.type_handlers)?;
        debug!("querying '{id}' [{} params]: {}", params.len(), bound.sql);

        let sql = bound.sql.as_str();
        let rows = match &self.pool {
            #[cfg(feature = "postgres")]
            DbPool::Postgres(pool) => self.run(async move {
                let mut q = sqlx::query(sql);
                for p in params {
                    q = bind_pg(q, p);
                }
                let fetched = q.fetch_all(pool).await?;
                Ok(fetched.iter().map(row_to_value).collect::<Vec<_>>())
            })?,
            #[cfg(feature = "mysql")]
            DbPool::MySql(pool) => self.run(async move {
                let mut q = sqlx::query(sql);
                for p in params {
                    q = bind_mysql(q, p);
                }
                let fetched = q.fetch_all(pool).await?;
                Ok(fetched.iter().map(row_to_value).collect::<Vec<_>>())
            })?,
            #[cfg(feature = "sqlite")]
            DbPool::Sqlite(pool) => self.run(async move {
                let mut q = sqlx::query(sql);
                for p in params {
                    q = bind_sqlite(q, p);
                }
                let fetched = q.fetch_all(pool).await?;
                Ok(fetched.iter().map(row_to_value).collect::<Vec<_>>())
            })?,
        };
        Ok(bounds.apply(rows))
    }
}

impl SqlSession for PooledSession {
    fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn insert(&self, statement: &str, param: &ParamObject) -> Result<u64> {
        self.run_dml(statement, param)
    }

    fn update(&self, statement: &str, param: &ParamObject) -> Result<u64> {
        self.run_dml(statement, param)
    }

    fn delete(&self, statement: &str, param: &ParamObject) -> Result<u64> {
        self.run_dml(statement, param)
    }

    fn select_list(
        &self,
        statement: &str,
        param: &ParamObject,
        bounds: RowBounds,
    ) -> Result<Vec<Value>> {
        self.run_select(statement, param, bounds)
    }
}

fn io_err(e: std::io::Error) -> Error {
    Error::Sqlx(sqlx::Error::Io(e))
}

/// Свой рантайм нужен, только если снаружи его нет.
fn own_runtime() -> Result<Option<tokio::runtime::Runtime>> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Ok(None);
    }
    Ok(Some(tokio::runtime::Runtime::new().map_err(io_err)?))
}

/// Собрать пул по схеме URL (драйвер выбирается фичей сборки).
async fn build_pool(cfg: &SessionConfig, url: &str, scheme: &str) -> Result<DbPool> {
    // дефолты / опции пула
    let max_conn = cfg.max_connections.unwrap_or(10);
    let min_conn = cfg.min_connections.unwrap_or(0);
    let acquire = cfg.acquire_timeout;
    let idle = cfg.idle_timeout;
    let life = cfg.max_lifetime;
    let test_before = cfg.test_before_acquire.unwrap_or(false);
    let init_sql_all = cfg.after_connect_sql.clone();
    #[cfg(feature = "postgres")]
    let schema = cfg.schema.clone();

    let pool = match scheme {
        #[cfg(feature = "postgres")]
        "postgres" | "postgresql" => {
            let mut opts = PgPoolOptions::new()
                .max_connections(max_conn)
                .min_connections(min_conn)
                .test_before_acquire(test_before);
            if let Some(d) = acquire {
                opts = opts.acquire_timeout(d);
            }
            if let Some(d) = idle {
                opts = opts.idle_timeout(d);
            }
            if let Some(d) = life {
                opts = opts.max_lifetime(d);
            }

            let init_sql_outer = init_sql_all.clone();
            let schema_outer = schema.clone();

            let pool = opts
                .after_connect(move |conn, _| {
                    let init_sql = init_sql_outer.clone();
                    let schema = schema_outer.clone();
                    Box::pin(async move {
                        if let Some(sql) = init_sql.as_deref() {
                            conn.execute(sql).await?;
                        }
                        if let Some(s) = schema {
                            let set_path = format!("SET search_path TO {}", s);
                            let _ = conn.execute(set_path.as_str()).await;
                        }
                        Ok(())
                    })
                })
                .connect(url)
                .await?;
            DbPool::Postgres(pool)
        }

        #[cfg(feature = "mysql")]
        "mysql" | "mariadb" => {
            let mut opts = MySqlPoolOptions::new()
                .max_connections(max_conn)
                .min_connections(min_conn)
                .test_before_acquire(test_before);
            if let Some(d) = acquire {
                opts = opts.acquire_timeout(d);
            }
            if let Some(d) = idle {
                opts = opts.idle_timeout(d);
            }
            if let Some(d) = life {
                opts = opts.max_lifetime(d);
            }

            let pool = opts
                .after_connect(move |conn, _| {
                    let init_sql = init_sql_all.clone();
                    Box::pin(async move {
                        if let Some(sql) = init_sql {
                            conn.execute(sql.as_str()).await?;
                        }
                        Ok::<_, sqlx::Error>(())
                    })
                })
                .connect(url)
                .await?;
            DbPool::MySql(pool)
        }

        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let mut opts = SqlitePoolOptions::new()
                .max_connections(max_conn)
                .min_connections(min_conn)
                .test_before_acquire(test_before);
            if let Some(d) = acquire {
                opts = opts.acquire_timeout(d);
            }
            if let Some(d) = idle {
                opts = opts.idle_timeout(d);
            }
            if let Some(d) = life {
                opts = opts.max_lifetime(d);
            }

            let pool = opts
                .after_connect(move |conn, _| {
                    let init_sql = init_sql_all.clone();
                    Box::pin(async move {
                        if let Some(sql) = init_sql {
                            conn.execute(sql.as_str()).await?;
                        }
                        Ok::<_, sqlx::Error>(())
                    })
                })
                .connect(url)
                .await?;
            DbPool::Sqlite(pool)
        }

        // сборка без нужной фичи — осмысленная ошибка
        _ => return Err(Error::UnsupportedScheme(scheme.to_string())),
    };

    Ok(pool)
}

#[cfg(feature = "postgres")]
fn bind_pg<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    p: Param,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    match p {
        Param::I8(v) => q.bind(v),
        Param::I16(v) => q.bind(v),
        Param::I32(v) => q.bind(v),
        Param::I64(v) => q.bind(v),
        Param::F32(v) => q.bind(v as f64),
        Param::F64(v) => q.bind(v),
        Param::Bool(v) => q.bind(v),
        Param::Str(v) => q.bind(v),
        Param::Bytes(v) => q.bind(v),
        Param::NullText => q.bind(Option::<String>::None),
        Param::NullBytes => q.bind(Option::<Vec<u8>>::None),
        Param::NullBool => q.bind(Option::<bool>::None),
        Param::NullI64 => q.bind(Option::<i64>::None),
        Param::NullF64 => q.bind(Option::<f64>::None),
    }
}

#[cfg(feature = "mysql")]
fn bind_mysql<'q>(
    q: sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>,
    p: Param,
) -> sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments> {
    match p {
        Param::I8(v) => q.bind(v),
        Param::I16(v) => q.bind(v),
        Param::I32(v) => q.bind(v),
        Param::I64(v) => q.bind(v),
        Param::F32(v) => q.bind(v as f64),
        Param::F64(v) => q.bind(v),
        Param::Bool(v) => q.bind(v),
        Param::Str(v) => q.bind(v),
        Param::Bytes(v) => q.bind(v),
        Param::NullText => q.bind(Option::<String>::None),
        Param::NullBytes => q.bind(Option::<Vec<u8>>::None),
        Param::NullBool => q.bind(Option::<bool>::None),
        Param::NullI64 => q.bind(Option::<i64>::None),
        Param::NullF64 => q.bind(Option::<f64>::None),
    }
}

#[cfg(feature = "sqlite")]
fn bind_sqlite<'q>(
    q: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    p: Param,
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    match p {
        Param::I8(v) => q.bind(v),
        Param::I16(v) => q.bind(v),
        Param::I32(v) => q.bind(v),
        Param::I64(v) => q.bind(v),
        Param::F32(v) => q.bind(v as f64),
        Param::F64(v) => q.bind(v),
        Param::Bool(v) => q.bind(v),
        Param::Str(v) => q.bind(v),
        Param::Bytes(v) => q.bind(v),
        Param::NullText => q.bind(Option::<String>::None),
        Param::NullBytes => q.bind(Option::<Vec<u8>>::None),
        Param::NullBool => q.bind(Option::<bool>::None),
        Param::NullI64 => q.bind(Option::<i64>::None),
        Param::NullF64 => q.bind(Option::<f64>::None),
    }
}

/// Строка результата -> объект, ключованный именами колонок.
fn row_to_value(row: &DbRow) -> Value {
    use sqlx::{Column as _, Row as _};
    let mut obj = serde_json::Map::with_capacity(row.len());
    for (i, col) in row.columns().iter().enumerate() {
        obj.insert(col.name().to_string(), column_value(row, i));
    }
    Value::Object(obj)
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn bytes_value(bytes: Vec<u8>) -> Value {
    Value::Array(bytes.into_iter().map(|b| Value::from(b as u64)).collect())
}

#[cfg(feature = "sqlite")]
fn column_value(row: &DbRow, i: usize) -> Value {
    use sqlx::{Row as _, TypeInfo as _, ValueRef as _};
    let ty = {
        let Ok(raw) = row.try_get_raw(i) else {
            return Value::Null;
        };
        if raw.is_null() {
            return Value::Null;
        }
        raw.type_info().name().to_string()
    };
    match ty.as_str() {
        "INTEGER" => row.try_get::<i64, _>(i).map(Value::from).unwrap_or(Value::Null),
        "REAL" => row
            .try_get::<f64, _>(i)
            .map(float_value)
            .unwrap_or(Value::Null),
        "TEXT" => row
            .try_get::<String, _>(i)
            .map(Value::String)
            .unwrap_or(Value::Null),
        "BOOLEAN" => row
            .try_get::<bool, _>(i)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "BLOB" => row
            .try_get::<Vec<u8>, _>(i)
            .map(bytes_value)
            .unwrap_or(Value::Null),
        other => {
            warn!("unhandled sqlite column type {other}; returning null");
            Value::Null
        }
    }
}

#[cfg(feature = "postgres")]
fn column_value(row: &DbRow, i: usize) -> Value {
    use sqlx::{Row as _, TypeInfo as _, ValueRef as _};
    let ty = {
        let Ok(raw) = row.try_get_raw(i) else {
            return Value::Null;
        };
        if raw.is_null() {
            return Value::Null;
        }
        raw.type_info().name().to_string()
    };
    match ty.as_str() {
        "INT2" => row
            .try_get::<i16, _>(i)
            .map(|v| Value::from(v as i64))
            .unwrap_or(Value::Null),
        "INT4" => row
            .try_get::<i32, _>(i)
            .map(|v| Value::from(v as i64))
            .unwrap_or(Value::Null),
        "INT8" => row.try_get::<i64, _>(i).map(Value::from).unwrap_or(Value::Null),
        "FLOAT4" => row
            .try_get::<f32, _>(i)
            .map(|v| float_value(v as f64))
            .unwrap_or(Value::Null),
        "FLOAT8" => row
            .try_get::<f64, _>(i)
            .map(float_value)
            .unwrap_or(Value::Null),
        "BOOL" => row
            .try_get::<bool, _>(i)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => row
            .try_get::<String, _>(i)
            .map(Value::String)
            .unwrap_or(Value::Null),
        "BYTEA" => row
            .try_get::<Vec<u8>, _>(i)
            .map(bytes_value)
            .unwrap_or(Value::Null),
        other => {
            warn!("unhandled postgres column type {other}; returning null");
            Value::Null
        }
    }
}

#[cfg(feature = "mysql")]
fn column_value(row: &DbRow, i: usize) -> Value {
    use sqlx::{Row as _, TypeInfo as _, ValueRef as _};
    let ty = {
        let Ok(raw) = row.try_get_raw(i) else {
            return Value::Null;
        };
        if raw.is_null() {
            return Value::Null;
        }
        raw.type_info().name().to_string()
    };
    match ty.as_str() {
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "TINYINT UNSIGNED"
        | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => row
            .try_get::<i64, _>(i)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "BIGINT UNSIGNED" => row
            .try_get::<u64, _>(i)
            .map(Value::from)
            .unwrap_or(Value::Null),
        "FLOAT" => row
            .try_get::<f32, _>(i)
            .map(|v| float_value(v as f64))
            .unwrap_or(Value::Null),
        "DOUBLE" => row
            .try_get::<f64, _>(i)
            .map(float_value)
            .unwrap_or(Value::Null),
        "BOOLEAN" => row
            .try_get::<bool, _>(i)
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" => row
            .try_get::<String, _>(i)
            .map(Value::String)
            .unwrap_or(Value::Null),
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "VARBINARY" | "BINARY" => row
            .try_get::<Vec<u8>, _>(i)
            .map(bytes_value)
            .unwrap_or(Value::Null),
        other => {
            warn!("unhandled mysql column type {other}; returning null");
            Value::Null
        }
    }
}
