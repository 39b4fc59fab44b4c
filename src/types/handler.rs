use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use serde_json::Value;

use super::{Error, JdbcType, Result};
use crate::param::Param;

/// Конвертер прикладного значения в драйверный параметр.
/// Объектно-безопасный: реестр хранит `Arc<dyn TypeHandler>`.
pub trait TypeHandler: Send + Sync {
    fn to_param(&self, property: &str, value: &Value, jdbc: Option<JdbcType>) -> Result<Param>;
}

/// Обработчик по умолчанию. Контейнеры уходят компактным JSON-текстом:
/// драйверного JSON-типа у нас нет, а текст принимает любая СУБД.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTypeHandler;

impl TypeHandler for DefaultTypeHandler {
    fn to_param(&self, property: &str, value: &Value, jdbc: Option<JdbcType>) -> Result<Param> {
        Ok(match value {
            Value::Null => null_param(jdbc),
            Value::Bool(b) => Param::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Param::I64(i)
                } else if let Some(f) = n.as_f64() {
                    Param::F64(f)
                } else {
                    // u64 за пределами i64
                    return Err(Error::Unbindable {
                        property: property.to_string(),
                        kind: "number",
                    });
                }
            }
            Value::String(s) => Param::Str(s.clone()),
            container @ (Value::Array(_) | Value::Object(_)) => {
                warn!("parameter '{property}' is a container; binding as JSON text");
                Param::Str(container.to_string())
            }
        })
    }
}

/// NULL с учётом заявленного jdbcType.
fn null_param(jdbc: Option<JdbcType>) -> Param {
    match jdbc {
        Some(t) if t.is_integral() => Param::NullI64,
        Some(t) if t.is_floating() => Param::NullF64,
        Some(t) if t.is_binary() => Param::NullBytes,
        Some(JdbcType::Boolean) => Param::NullBool,
        _ => Param::NullText,
    }
}

/// Реестр именованных обработчиков + дефолтный.
#[derive(Clone)]
pub struct TypeHandlerRegistry {
    named: HashMap<String, Arc<dyn TypeHandler>>,
    default: Arc<dyn TypeHandler>,
}

impl TypeHandlerRegistry {
    pub fn new() -> Self {
        Self {
            named: HashMap::new(),
            default: Arc::new(DefaultTypeHandler),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn TypeHandler>) {
        self.named.insert(name.into(), handler);
    }

    /// Обработчик по имени из `typeHandler=...`; `None` — дефолтный.
    pub fn resolve(&self, name: Option<&str>) -> Result<&Arc<dyn TypeHandler>> {
        match name {
            None => Ok(&self.default),
            Some(n) => self.named.get(n).ok_or_else(|| Error::UnknownTypeHandler {
                name: n.to_string(),
            }),
        }
    }
}

impl Default for TypeHandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeHandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHandlerRegistry")
            .field("named", &self.named.keys().collect::<Vec<_>>())
            .finish()
    }
}
