use log::warn;
use serde_json::Value;

use super::interface::{ArgSpec, MethodSpec, ParamSpec, ReturnSpec};
use super::{Error, Result};
use crate::value::{ParamMap, ParamObject};

/// Результат анализа объявления метода: форма возврата, позиции особых
/// параметров и резолвер имён аргументов. Считается один раз на метод.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    method: String,
    returns: ReturnSpec,
    map_key: Option<String>,
    row_bounds_index: Option<usize>,
    result_handler_index: Option<usize>,
    resolver: ParamNameResolver,
}

impl MethodSignature {
    pub fn analyze(interface: &str, spec: &MethodSpec) -> Result<Self> {
        let method = format!("{interface}.{}", spec.name);

        let mut row_bounds_index = None;
        let mut result_handler_index = None;
        let mut args: Vec<ArgSpec> = Vec::new();

        for (i, p) in spec.params.iter().enumerate() {
            match p {
                ParamSpec::RowBounds => {
                    if row_bounds_index.replace(i).is_some() {
                        return Err(Error::DuplicateRowBounds { method: method.clone() });
                    }
                }
                ParamSpec::ResultHandler => {
                    if result_handler_index.replace(i).is_some() {
                        return Err(Error::DuplicateResultHandler { method: method.clone() });
                    }
                }
                ParamSpec::Arg(a) => args.push(a.clone()),
            }
        }

        // map-ключ читается только при map-возврате
        let map_key = match (spec.returns, &spec.map_key) {
            (ReturnSpec::Map, Some(k)) => Some(k.clone()),
            (ReturnSpec::Map, None) => return Err(Error::MissingMapKey { method }),
            (_, Some(_)) => {
                warn!("method '{method}' declares a map key but does not return a map; ignored");
                None
            }
            (_, None) => None,
        };

        Ok(Self {
            method,
            returns: spec.returns,
            map_key,
            row_bounds_index,
            result_handler_index,
            resolver: ParamNameResolver::new(args),
        })
    }

    #[inline]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[inline]
    pub fn returns(&self) -> ReturnSpec {
        self.returns
    }

    #[inline]
    pub fn returns_void(&self) -> bool {
        self.returns == ReturnSpec::Void
    }

    #[inline]
    pub fn returns_many(&self) -> bool {
        self.returns.is_many()
    }

    #[inline]
    pub fn returns_map(&self) -> bool {
        self.returns == ReturnSpec::Map
    }

    #[inline]
    pub fn returns_cursor(&self) -> bool {
        self.returns == ReturnSpec::Cursor
    }

    #[inline]
    pub fn returns_optional(&self) -> bool {
        self.returns == ReturnSpec::Optional
    }

    #[inline]
    pub fn map_key(&self) -> Option<&str> {
        self.map_key.as_deref()
    }

    #[inline]
    pub fn row_bounds_index(&self) -> Option<usize> {
        self.row_bounds_index
    }

    #[inline]
    pub fn result_handler_index(&self) -> Option<usize> {
        self.result_handler_index
    }

    #[inline]
    pub fn has_row_bounds(&self) -> bool {
        self.row_bounds_index.is_some()
    }

    #[inline]
    pub fn has_result_handler(&self) -> bool {
        self.result_handler_index.is_some()
    }

    /// Преобразовать доменные аргументы в объект параметров.
    pub fn convert_args(&self, values: &[Value]) -> Result<ParamObject> {
        self.resolver.convert(&self.method, values)
    }
}

/// Резолвер имён доменных аргументов (особые позиции уже отфильтрованы).
///
/// Правила: единственный аргумент без явного имени уходит как есть; иначе
/// строится строгая мапа, где каждый аргумент доступен по своему имени
/// (явному или из объявления) и по алиасу `param<k>`, k — с единицы.
#[derive(Debug, Clone)]
pub struct ParamNameResolver {
    args: Vec<ArgSpec>,
}

impl ParamNameResolver {
    pub fn new(args: Vec<ArgSpec>) -> Self {
        Self { args }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.args.len()
    }

    fn convert(&self, method: &str, values: &[Value]) -> Result<ParamObject> {
        if values.len() != self.args.len() {
            return Err(Error::ArgumentCount {
                method: method.to_string(),
                expected: self.args.len(),
                got: values.len(),
            });
        }
        match self.args.as_slice() {
            [] => Ok(ParamObject::None),
            [only] if only.explicit.is_none() => Ok(ParamObject::Single(values[0].clone())),
            _ => {
                let mut map = ParamMap::new();
                for (i, (spec, value)) in self.args.iter().zip(values).enumerate() {
                    let alias = format!("param{}", i + 1);
                    let primary = spec
                        .explicit
                        .as_deref()
                        .or(spec.declared.as_deref())
                        .unwrap_or(alias.as_str());
                    map.insert(primary, value.clone());
                    if !map.contains(&alias) {
                        map.insert(alias.clone(), value.clone());
                    }
                }
                Ok(ParamObject::Map(map))
            }
        }
    }
}
