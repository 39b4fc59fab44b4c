use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::{Error, MappedStatement, Result, SqlCommandType};
use crate::scripting::{PlaceholderStyle, build_source_from_node};

/// Реестр именованных стейтментов: `namespace.id -> MappedStatement`.
#[derive(Debug, Default)]
pub struct StatementRegistry {
    statements: HashMap<String, Arc<MappedStatement>>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self {
            statements: HashMap::new(),
        }
    }

    #[inline]
    pub fn has(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Arc<MappedStatement>> {
        self.statements.get(id)
    }

    pub fn add(&mut self, statement: MappedStatement) -> Result<()> {
        if self.has(&statement.id) {
            return Err(Error::DuplicateStatement {
                id: statement.id.clone(),
            });
        }
        debug!("registered statement '{}' ({})", statement.id, statement.kind);
        self.statements.insert(statement.id.clone(), Arc::new(statement));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Отсортированные id — для диагностики и детерминированных сообщений.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.statements.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Загрузить документ `<mapper namespace="...">` в реестр.
///
/// Поддерживаются дочерние `<select>/<insert>/<update>/<delete>`;
/// id стейтмента — `namespace.id`. Прочие элементы (resultMap, cache)
/// пропускаются с предупреждением: материализация результатов — забота
/// сессии, а не реестра.
pub fn load_mapper_xml(
    registry: &mut StatementRegistry,
    xml: &str,
    style: PlaceholderStyle,
) -> Result<()> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "mapper" {
        return Err(Error::NotAMapperDocument {
            found: root.tag_name().name().to_string(),
        });
    }
    let namespace = root.attribute("namespace").ok_or(Error::MissingNamespace)?;

    for child in root.children() {
        if !child.is_element() {
            continue;
        }
        let element = child.tag_name().name();
        let kind = match element {
            "select" => SqlCommandType::Select,
            "insert" => SqlCommandType::Insert,
            "update" => SqlCommandType::Update,
            "delete" => SqlCommandType::Delete,
            other => {
                warn!("skipping unsupported mapper element <{other}> in namespace '{namespace}'");
                continue;
            }
        };
        let id = child.attribute("id").ok_or_else(|| Error::MissingStatementId {
            element: element.to_string(),
        })?;
        let source = build_source_from_node(child, style)?;
        registry.add(MappedStatement::new(
            format!("{namespace}.{id}"),
            kind,
            source,
        ))?;
    }
    Ok(())
}
