mod __tests__;
mod error;
mod registry;

pub use error::{Error, Result};
pub use registry::{StatementRegistry, load_mapper_xml};

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::expr::PathExpr;
use crate::scripting::SqlSource;
use crate::types::JdbcType;
use crate::value::ParamObject;

/// Вид SQL-команды стейтмента. `Unknown` легален на уровне модели,
/// но диспетчер метода на него отвечает ошибкой.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlCommandType {
    Unknown,
    Insert,
    Update,
    Delete,
    Select,
    Flush,
}

impl fmt::Display for SqlCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SqlCommandType::Unknown => "UNKNOWN",
            SqlCommandType::Insert => "INSERT",
            SqlCommandType::Update => "UPDATE",
            SqlCommandType::Delete => "DELETE",
            SqlCommandType::Select => "SELECT",
            SqlCommandType::Flush => "FLUSH",
        })
    }
}

/// Как связать один драйверный плейсхолдер: исходное выражение-путь
/// плюс объявленные в токене `jdbcType`/`typeHandler`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
    /// Текст выражения, как он был записан в `#{...}`.
    pub property: String,
    pub path: PathExpr,
    pub jdbc_type: Option<JdbcType>,
    pub type_handler: Option<String>,
}

/// Результат привязки скомпилированного источника к объекту параметров:
/// финальный SQL, упорядоченный список параметров и дополнительные
/// связывания (`<bind>`, локальные имена `<foreach>`).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub parameters: Vec<ParameterMapping>,
    pub additional_bindings: BTreeMap<String, Value>,
}

impl BoundSql {
    pub fn new(sql: String, parameters: Vec<ParameterMapping>) -> Self {
        Self {
            sql,
            parameters,
            additional_bindings: BTreeMap::new(),
        }
    }

    /// Доп. связывание видно резолву параметров раньше объекта параметров.
    pub fn additional_binding(&self, name: &str) -> Option<&Value> {
        self.additional_bindings.get(name)
    }
}

/// Именованный SQL-стейтмент: id вида `namespace.id`, вид команды
/// и скомпилированный источник.
#[derive(Debug)]
pub struct MappedStatement {
    pub id: String,
    pub kind: SqlCommandType,
    pub source: SqlSource,
}

impl MappedStatement {
    pub fn new(id: impl Into<String>, kind: SqlCommandType, source: SqlSource) -> Self {
        Self {
            id: id.into(),
            kind,
            source,
        }
    }

    /// Собрать финальный SQL под конкретный объект параметров.
    #[inline]
    pub fn bound_sql(&self, param: &ParamObject) -> crate::scripting::Result<BoundSql> {
        self.source.bind(param)
    }
}
