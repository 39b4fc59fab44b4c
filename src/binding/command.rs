use std::sync::Arc;

use super::interface::{MapperInterface, MethodSpec};
use super::{Error, Result};
use crate::mapping::{MappedStatement, SqlCommandType};
use crate::session::Configuration;

/// Команда метода: id стейтмента (составной `интерфейс.метод`) и вид.
/// У flush-методов без стейтмента id отсутствует.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlCommand {
    pub name: Option<String>,
    pub kind: SqlCommandType,
}

impl SqlCommand {
    /// Разрешить стейтмент для метода, вызванного через `interface`.
    ///
    /// Сначала пробуем `interface.метод`; при промахе — родительские
    /// интерфейсы в глубину, в порядке объявления (детерминированно).
    /// Унаследованный метод получает id объявившего интерфейса.
    pub fn resolve(
        config: &Configuration,
        interface: &MapperInterface,
        spec: &MethodSpec,
    ) -> Result<Self> {
        match find_statement(config, interface, &spec.name) {
            Some(ms) => {
                if ms.kind == SqlCommandType::Unknown {
                    return Err(Error::UnknownStatementKind { id: ms.id.clone() });
                }
                Ok(Self {
                    name: Some(ms.id.clone()),
                    kind: ms.kind,
                })
            }
            None if spec.flush => Ok(Self {
                name: None,
                kind: SqlCommandType::Flush,
            }),
            None => Err(Error::MissingStatement {
                id: format!("{}.{}", interface.name(), spec.name),
            }),
        }
    }

    /// Id для сообщений и вызовов сессии ("" у flush-команд).
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

fn find_statement<'a>(
    config: &'a Configuration,
    interface: &MapperInterface,
    method: &str,
) -> Option<&'a Arc<MappedStatement>> {
    let id = format!("{}.{}", interface.name(), method);
    if let Some(ms) = config.statements.get(&id) {
        return Some(ms);
    }
    for parent in interface.parents() {
        if let Some(ms) = find_statement(config, parent, method) {
            return Some(ms);
        }
    }
    None
}
