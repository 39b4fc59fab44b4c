use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use log::trace;
use serde_json::Value;

use super::interface::MapperInterface;
use super::method::{MapperArgs, MapperMethod, MapperOutput};
use super::{Error, Result};
use crate::session::SqlSession;

type MethodCache = Arc<RwLock<HashMap<String, Arc<MapperMethod>>>>;

/// Фабрика прокси для одного интерфейса. Кэш исполнителей один на
/// интерфейс и шарится всеми прокси фабрики.
pub struct MapperProxyFactory {
    interface: Arc<MapperInterface>,
    method_cache: MethodCache,
}

impl MapperProxyFactory {
    pub fn new(interface: Arc<MapperInterface>) -> Self {
        Self {
            interface,
            method_cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    #[inline]
    pub fn interface(&self) -> &Arc<MapperInterface> {
        &self.interface
    }

    pub fn create(&self, session: Arc<dyn SqlSession>) -> MapperProxy {
        MapperProxy {
            session,
            interface: self.interface.clone(),
            method_cache: self.method_cache.clone(),
        }
    }
}

impl fmt::Debug for MapperProxyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperProxyFactory")
            .field("interface", &self.interface.name())
            .finish()
    }
}

/// Прокси интерфейса маппера: каждый вызов уходит через кэшированный
/// исполнитель в сессию. Методы идентичности (Debug/PartialEq) — обычные
/// impl-ы на самом типе и сессию не трогают; default-методы выполняются
/// своим телом на прокси.
pub struct MapperProxy {
    session: Arc<dyn SqlSession>,
    interface: Arc<MapperInterface>,
    method_cache: MethodCache,
}

impl MapperProxy {
    #[inline]
    pub fn interface(&self) -> &MapperInterface {
        &self.interface
    }

    #[inline]
    pub fn session(&self) -> &Arc<dyn SqlSession> {
        &self.session
    }

    /// Диспетчеризация одного вызова по имени метода.
    pub fn invoke(&self, method: &str, args: MapperArgs<'_>) -> Result<MapperOutput> {
        let spec = self
            .interface
            .find_method(method)
            .ok_or_else(|| Error::UnknownMethod {
                interface: self.interface.name().to_string(),
                method: method.to_string(),
            })?;

        if let Some(body) = &spec.default_body {
            trace!("invoking default body of {}.{method}", self.interface.name());
            return body(self, args);
        }

        let executor = self.cached_method(method, || {
            MapperMethod::new(self.session.configuration(), &self.interface, spec)
        })?;
        trace!("dispatching {}.{method}", self.interface.name());
        executor.execute(self.session.as_ref(), args)
    }

    /// Удобный вызов с простыми значениями; курсор собирается в массив.
    pub fn invoke_value(&self, method: &str, values: Vec<Value>) -> Result<Value> {
        match self.invoke(method, MapperArgs::from_values(values))? {
            MapperOutput::Value(v) => Ok(v),
            MapperOutput::Cursor(cursor) => {
                let rows = cursor
                    .collect::<crate::session::Result<Vec<Value>>>()
                    .map_err(Error::Session)?;
                Ok(Value::Array(rows))
            }
        }
    }

    /// Кэш compute-if-absent. Сборка идёт вне write-блокировки: возможная
    /// двойная сборка даёт эквивалентное значение, выигрывает последняя.
    fn cached_method<F>(&self, name: &str, build: F) -> Result<Arc<MapperMethod>>
    where
        F: FnOnce() -> Result<MapperMethod>,
    {
        {
            let cache = self
                .method_cache
                .read()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(m) = cache.get(name) {
                return Ok(m.clone());
            }
        }

        let built = Arc::new(build()?);
        let mut cache = self
            .method_cache
            .write()
            .unwrap_or_else(|e| e.into_inner());
        let entry = cache.entry(name.to_string()).or_insert_with(|| {
            trace!("caching mapper method executor for '{name}'");
            built.clone()
        });
        Ok(entry.clone())
    }

    /// Сколько исполнителей уже собрано (диагностика и тесты кэша).
    pub fn cached_method_count(&self) -> usize {
        self.method_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl fmt::Debug for MapperProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperProxy")
            .field("interface", &self.interface.name())
            .field("cached_methods", &self.cached_method_count())
            .finish()
    }
}

impl PartialEq for MapperProxy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.interface, &other.interface) && Arc::ptr_eq(&self.session, &other.session)
    }
}
