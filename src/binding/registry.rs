use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use super::interface::MapperInterface;
use super::proxy::{MapperProxy, MapperProxyFactory};
use super::signature::MethodSignature;
use super::{Error, Result};
use crate::mapping::MappedStatement;
use crate::scripting::build_source_from_str;
use crate::session::{Configuration, SqlSession};

/// Реестр интерфейсов мапперов: фабрика прокси на интерфейс.
///
/// Регистрация — момент «сборки»: все сигнатуры анализируются сразу, и
/// инлайновые стейтменты методов компилируются в реестр конфигурации.
/// Ошибки объявлений всплывают здесь, а не при первом вызове.
#[derive(Debug, Default)]
pub struct MapperRegistry {
    factories: HashMap<String, MapperProxyFactory>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    #[inline]
    pub fn has_mapper(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn add_mapper(
        &mut self,
        config: &mut Configuration,
        interface: Arc<MapperInterface>,
    ) -> Result<()> {
        let name = interface.name().to_string();
        if self.has_mapper(&name) {
            return Err(Error::AlreadyRegistered { name });
        }

        for spec in interface.methods() {
            MethodSignature::analyze(interface.name(), spec)?;

            if let Some(inline) = &spec.inline {
                let id = format!("{}.{}", interface.name(), spec.name);
                let source =
                    build_source_from_str(&inline.template, config.dialect.placeholders())?;
                config
                    .statements
                    .add(MappedStatement::new(id, inline.kind, source))?;
            }
        }

        debug!("registered mapper interface '{name}'");
        self.factories.insert(name, MapperProxyFactory::new(interface));
        Ok(())
    }

    /// Прокси для зарегистрированного интерфейса поверх сессии.
    pub fn mapper(&self, name: &str, session: Arc<dyn SqlSession>) -> Result<MapperProxy> {
        let factory = self.factories.get(name).ok_or_else(|| Error::NotRegistered {
            name: name.to_string(),
        })?;
        Ok(factory.create(session))
    }

    /// Фабрика интерфейса (для шаринга кэша исполнителей).
    pub fn factory(&self, name: &str) -> Option<&MapperProxyFactory> {
        self.factories.get(name)
    }
}
