use std::borrow::Cow;
use std::time::Duration;

use url::Url;

use super::pool::DbPool;
use super::{Error, Result};

fn parse_u32(v: &str, key: &str) -> Result<u32> {
    v.parse::<u32>().map_err(|_| Error::InvalidInt {
        key: Cow::Owned(key.to_string()),
        value: v.to_string(),
    })
}

fn parse_bool(v: &str, key: &str) -> Result<bool> {
    match v {
        "1" | "true" | "TRUE" => Ok(true),
        "0" | "false" | "FALSE" => Ok(false),
        _ => Err(Error::InvalidBool {
            key: Cow::Owned(key.to_string()),
            value: v.to_string(),
        }),
    }
}

fn parse_duration(v: &str, key: &str) -> Result<Duration> {
    humantime::parse_duration(v).map_err(|_| Error::InvalidDuration {
        key: Cow::Owned(key.to_string()),
        value: v.to_string(),
    })
}

/// Конфиг для инициализации PooledSession.
/// Можно либо передать `database_url` (тогда мы соберём пул),
/// либо `pool` (тогда просто обёрнём его).
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub database_url: Option<String>,
    pub pool: Option<DbPool>,

    /// Необязательная схема по умолчанию (для Postgres -> search_path).
    pub schema: Option<String>,

    /// Тайминги и размер пула
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
    pub test_before_acquire: Option<bool>,

    /// Необязательный SQL, который выполняется на каждом подключении.
    pub after_connect_sql: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            pool: None,
            schema: None,
            max_connections: None,
            min_connections: None,
            acquire_timeout: None,
            idle_timeout: Some(Duration::from_secs(30)),
            max_lifetime: Some(Duration::from_secs(60 * 60)),
            test_before_acquire: None,
            after_connect_sql: None,
        }
    }
}

pub struct SessionConfigBuilder {
    pub(crate) cfg: SessionConfig,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            cfg: SessionConfig::default(),
        }
    }

    /// Создать конфиг из DSN, разбирая query-параметры по нашим правилам.
    /// Все распознанные параметры выставляются в конфиг.
    /// Сама строка кладётся в `database_url`.
    pub fn from_dsn(dsn: &str) -> Result<Self> {
        let url = Url::parse(dsn).map_err(Error::InvalidUrl)?;
        let mut cfg = SessionConfig::default();
        cfg.database_url = Some(dsn.to_string());

        // собираем несколько init
        let mut inits: Vec<String> = Vec::new();

        for (k, v) in url.query_pairs() {
            let key = k.as_ref();
            let val = v.as_ref();

            match key {
                // schema
                "schema" | "search_path" => {
                    if !val.is_empty() {
                        cfg.schema = Some(val.to_string());
                    }
                }

                // pool.* (ints)
                "pool.max" => cfg.max_connections = Some(parse_u32(val, "pool.max")?),
                "pool.min" => cfg.min_connections = Some(parse_u32(val, "pool.min")?),

                // timeouts (durations)
                "pool.acquire_timeout" => cfg.acquire_timeout = Some(parse_duration(val, key)?),
                "pool.idle_timeout" => cfg.idle_timeout = Some(parse_duration(val, key)?),
                "pool.max_lifetime" => cfg.max_lifetime = Some(parse_duration(val, key)?),

                // bool
                "pool.test_before_acquire" => {
                    cfg.test_before_acquire = Some(parse_bool(val, key)?);
                }

                // init SQL (многоразовый)
                "init" => {
                    if !val.is_empty() {
                        inits.push(val.to_string());
                    }
                }

                // нераспознанное — игнорируем
                _ => {}
            }
        }

        if !inits.is_empty() {
            // соединим с '; ' чтобы было читаемо
            cfg.after_connect_sql = Some(inits.join("; "));
        }

        Ok(cfg)
    }

    /// Мердж текущего конфига с «перекрытием» полями из другого конфига.
    /// Используем, чтобы Builder-параметры имели приоритет над DSN.
    pub fn merge_override(mut self, other: SessionConfig) -> Self {
        if self.database_url.is_none() {
            self.database_url = other.database_url;
        }
        if self.pool.is_none() {
            self.pool = other.pool;
        }
        if self.schema.is_none() {
            self.schema = other.schema;
        }
        if self.max_connections.is_none() {
            self.max_connections = other.max_connections;
        }
        if self.min_connections.is_none() {
            self.min_connections = other.min_connections;
        }
        if self.acquire_timeout.is_none() {
            self.acquire_timeout = other.acquire_timeout;
        }
        if self.idle_timeout.is_none() {
            self.idle_timeout = other.idle_timeout;
        }
        if self.max_lifetime.is_none() {
            self.max_lifetime = other.max_lifetime;
        }
        if self.test_before_acquire.is_none() {
            self.test_before_acquire = other.test_before_acquire;
        }
        if self.after_connect_sql.is_none() {
            self.after_connect_sql = other.after_connect_sql;
        }
        self
    }
}

impl SessionConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.cfg.database_url = Some(url.into());
        self
    }
    pub fn pool(mut self, pool: DbPool) -> Self {
        self.cfg.pool = Some(pool);
        self
    }
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.cfg.schema = Some(schema.into());
        self
    }
    pub fn max_connections(mut self, v: u32) -> Self {
        self.cfg.max_connections = Some(v);
        self
    }
    pub fn min_connections(mut self, v: u32) -> Self {
        self.cfg.min_connections = Some(v);
        self
    }
    pub fn acquire_timeout(mut self, v: Duration) -> Self {
        self.cfg.acquire_timeout = Some(v);
        self
    }
    pub fn idle_timeout(mut self, v: Duration) -> Self {
        self.cfg.idle_timeout = Some(v);
        self
    }
    pub fn max_lifetime(mut self, v: Duration) -> Self {
        self.cfg.max_lifetime = Some(v);
        self
    }
    pub fn test_before_acquire(mut self, v: bool) -> Self {
        self.cfg.test_before_acquire = Some(v);
        self
    }
    pub fn after_connect_sql(mut self, sql: impl Into<String>) -> Self {
        self.cfg.after_connect_sql = Some(sql.into());
        self
    }
    pub fn build(self) -> SessionConfig {
        self.cfg
    }
}
