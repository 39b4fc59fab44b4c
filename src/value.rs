use std::collections::BTreeMap;

use serde_json::Value;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Строгая мапа параметров: имя не найдено. В сообщении перечисляем
    /// доступные имена, чтобы опечатку было видно сразу.
    #[error("Parameter '{name}' not found. Available parameters are [{available}]")]
    MissingParameter { name: String, available: String },
}

/// Именованная мапа аргументов метода маппера. Строгая: чтение отсутствующего
/// ключа — ошибка, а не `Null`. BTreeMap — чтобы перечисление имён в ошибках
/// было детерминированным.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap(BTreeMap<String, Value>);

impl ParamMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Строгое чтение: отсутствие ключа — `MissingParameter`.
    pub fn get_strict(&self, name: &str) -> Result<&Value> {
        self.0.get(name).ok_or_else(|| Error::MissingParameter {
            name: name.to_string(),
            available: self.0.keys().cloned().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ParamMap> for Value {
    fn from(map: ParamMap) -> Self {
        Value::Object(map.0.into_iter().collect())
    }
}

/// Результат `convert_args`: то, что уходит в сессию как «объект параметров».
///
/// - `Single` — ровно один доменный аргумент без явного имени: обращения
///   к свойствам идут по нему напрямую (отсутствующее свойство = `Null`);
/// - `Map` — строгая именованная мапа (`name`/`param1`/...);
/// - `None` — метод без доменных аргументов.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamObject {
    None,
    Single(Value),
    Map(ParamMap),
}

impl ParamObject {
    /// Поиск корневого имени выражения в объекте параметров.
    ///
    /// Строгая мапа на отсутствующее имя отвечает ошибкой; одиночный объект —
    /// `Null` (обычный доступ к свойству).
    pub fn lookup(&self, name: &str) -> Result<Value> {
        match self {
            ParamObject::None => Ok(Value::Null),
            ParamObject::Single(v) => Ok(member(v, name)),
            ParamObject::Map(map) => map.get_strict(name).cloned(),
        }
    }

    /// Всё содержимое одним `Value` (для `_parameter`).
    pub fn as_value(&self) -> Value {
        match self {
            ParamObject::None => Value::Null,
            ParamObject::Single(v) => v.clone(),
            ParamObject::Map(map) => map.clone().into(),
        }
    }
}

/// Доступ к свойству объекта; всё остальное (скаляры, массивы, null) — `Null`.
#[inline]
pub fn member(v: &Value, name: &str) -> Value {
    match v {
        Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Истинность значения в тестовых выражениях:
/// null — ложь; bool — сам; число — ненулевое; строка — непустая;
/// массив/объект — непустой.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i != 0
            } else if let Some(u) = n.as_u64() {
                u != 0
            } else {
                n.as_f64().map(|f| f != 0.0).unwrap_or(false)
            }
        }
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Строковая форма для `${...}`-подстановки: строки без кавычек,
/// числа/булевы как есть, контейнеры — компактный JSON.
pub fn text_form(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
