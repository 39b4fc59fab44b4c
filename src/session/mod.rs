mod __tests__;
mod config;
mod error;
mod params;
mod pool;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::{Error, Result};
pub use params::resolve_parameters;
pub use pool::{DbPool, PooledSession};

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::mapping::{MappedStatement, Result as MappingResult, StatementRegistry, load_mapper_xml};
use crate::scripting::Dialect;
use crate::types::TypeHandlerRegistry;
use crate::value::ParamObject;

/// Глобальная конфигурация: реестр стейтментов, реестр type handler-ов
/// и диалект (он же — стиль плейсхолдеров).
#[derive(Debug)]
pub struct Configuration {
    pub statements: StatementRegistry,
    pub type_handlers: TypeHandlerRegistry,
    pub dialect: Dialect,
}

impl Configuration {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            statements: StatementRegistry::new(),
            type_handlers: TypeHandlerRegistry::new(),
            dialect,
        }
    }

    #[inline]
    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.has(id)
    }

    pub fn statement(&self, id: &str) -> Result<&Arc<MappedStatement>> {
        self.statements.get(id).ok_or_else(|| Error::UnknownStatement {
            id: id.to_string(),
        })
    }

    /// Загрузить mapper-документ; тела компилируются под диалект конфигурации.
    pub fn load_mapper(&mut self, xml: &str) -> MappingResult<()> {
        load_mapper_xml(&mut self.statements, xml, self.dialect.placeholders())
    }
}

impl Default for Configuration {
    fn default() -> Self {
        // диалект по умолчанию — под активную фичу драйвера
        #[cfg(feature = "postgres")]
        let dialect = Dialect::Postgres;
        #[cfg(feature = "mysql")]
        let dialect = Dialect::MySQL;
        #[cfg(feature = "sqlite")]
        let dialect = Dialect::SQLite;
        Self::new(dialect)
    }
}

/// Пейджинг, распознаваемый по позиции аргумента: смещение и лимит,
/// применяются к уже полученным строкам.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RowBounds {
    pub offset: u64,
    pub limit: u64,
}

impl RowBounds {
    pub const DEFAULT: RowBounds = RowBounds {
        offset: 0,
        limit: u64::MAX,
    };

    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Срез выбранных строк по границам.
    pub fn apply(self, rows: Vec<Value>) -> Vec<Value> {
        if self.is_default() {
            return rows;
        }
        rows.into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

impl Default for RowBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Потребитель строк результата: вызывается по строке за раз вместо
/// материализации всего списка у вызывающего.
pub trait ResultHandler {
    fn handle(&mut self, row: Value);
}

impl<F: FnMut(Value)> ResultHandler for F {
    fn handle(&mut self, row: Value) {
        self(row)
    }
}

/// Ленивая последовательность строк результата.
pub struct Cursor {
    iter: Box<dyn Iterator<Item = Result<Value>> + Send>,
}

impl Cursor {
    pub fn new(iter: impl Iterator<Item = Result<Value>> + Send + 'static) -> Self {
        Self {
            iter: Box::new(iter),
        }
    }

    pub fn from_rows(rows: Vec<Value>) -> Self {
        Self::new(rows.into_iter().map(Ok))
    }
}

impl Iterator for Cursor {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Cursor(..)")
    }
}

/// Фасад сессии: именованные операции над стейтментами реестра.
///
/// Синхронный и объектно-безопасный; прокси маппера держит
/// `Arc<dyn SqlSession>`. `select_one`/`select_map`/`select_cursor`/
/// `select_with_handler` имеют дефолтные реализации поверх `select_list`.
pub trait SqlSession: Send + Sync {
    fn configuration(&self) -> &Configuration;

    fn insert(&self, statement: &str, param: &ParamObject) -> Result<u64>;
    fn update(&self, statement: &str, param: &ParamObject) -> Result<u64>;
    fn delete(&self, statement: &str, param: &ParamObject) -> Result<u64>;

    fn select_list(
        &self,
        statement: &str,
        param: &ParamObject,
        bounds: RowBounds,
    ) -> Result<Vec<Value>>;

    /// Ровно одна строка; пусто — `Null`, больше одной — ошибка.
    fn select_one(&self, statement: &str, param: &ParamObject) -> Result<Value> {
        let mut rows = self.select_list(statement, param, RowBounds::DEFAULT)?;
        if rows.len() > 1 {
            return Err(Error::TooManyResults {
                statement: statement.to_string(),
                count: rows.len(),
            });
        }
        Ok(rows.pop().unwrap_or(Value::Null))
    }

    /// Объект, ключованный значением свойства `map_key` каждой строки.
    fn select_map(
        &self,
        statement: &str,
        param: &ParamObject,
        map_key: &str,
        bounds: RowBounds,
    ) -> Result<Value> {
        let rows = self.select_list(statement, param, bounds)?;
        let mut out = serde_json::Map::with_capacity(rows.len());
        for row in rows {
            let key = match crate::value::member(&row, map_key) {
                Value::String(s) => s,
                other => other.to_string(),
            };
            out.insert(key, row);
        }
        Ok(Value::Object(out))
    }

    fn select_cursor(
        &self,
        statement: &str,
        param: &ParamObject,
        bounds: RowBounds,
    ) -> Result<Cursor> {
        Ok(Cursor::from_rows(self.select_list(statement, param, bounds)?))
    }

    fn select_with_handler(
        &self,
        statement: &str,
        param: &ParamObject,
        bounds: RowBounds,
        handler: &mut dyn ResultHandler,
    ) -> Result<()> {
        for row in self.select_list(statement, param, bounds)? {
            handler.handle(row);
        }
        Ok(())
    }

    /// Сброс отложенных стейтментов; возвращает их число.
    fn flush_statements(&self) -> Result<u64> {
        Ok(0)
    }
}
