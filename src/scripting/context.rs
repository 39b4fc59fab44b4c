use std::collections::BTreeMap;

use serde_json::Value;

use crate::expr::Scope;
use crate::value::ParamObject;

/// Имя, под которым объект параметров целиком виден выражениям.
pub const PARAMETER_BINDING: &str = "_parameter";

/// Контекст одного вычисления дерева SQL-узлов.
///
/// Живёт на стеке одного вызова `bind` и между потоками не шарится:
/// связывания, накопитель SQL и счётчик уникальных имён — всё здесь.
pub struct DynamicContext<'a> {
    param: &'a ParamObject,
    bindings: BTreeMap<String, Value>,
    buf: String,
    unique: u32,
}

impl<'a> DynamicContext<'a> {
    pub fn new(param: &'a ParamObject) -> Self {
        Self {
            param,
            bindings: BTreeMap::new(),
            buf: String::with_capacity(128),
            unique: 0,
        }
    }

    /// Добавить фрагмент SQL. Пустые фрагменты не меняют накопитель;
    /// стык двух фрагментов получает ровно один пробел, если ни одна из
    /// сторон не принесла свой.
    pub fn append(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        let needs_space = !self.buf.is_empty()
            && !self.buf.ends_with(|c: char| c.is_whitespace())
            && !fragment.starts_with(|c: char| c.is_whitespace());
        if needs_space {
            self.buf.push(' ');
        }
        self.buf.push_str(fragment);
    }

    #[inline]
    pub fn sql(&self) -> &str {
        &self.buf
    }

    /// Вынуть текущий накопитель, подменив его пустым. Парный
    /// `restore_buf` возвращает прежний. Так `<trim>`/`<foreach>`
    /// вычисляют детей в под-буфер без второго контекста.
    pub fn take_buf(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }

    pub fn restore_buf(&mut self, saved: String) -> String {
        std::mem::replace(&mut self.buf, saved)
    }

    pub fn bind(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Снять связывание, вернув прежнее значение (для восстановления
    /// имён `item`/`index` после цикла).
    pub fn unbind(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    #[inline]
    pub fn binding(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Очередной уникальный номер для локальных имён `<foreach>`.
    pub fn next_unique(&mut self) -> u32 {
        let n = self.unique;
        self.unique += 1;
        n
    }

    #[inline]
    pub fn param(&self) -> &ParamObject {
        self.param
    }

    /// Все связывания (кроме `_parameter`) — в `BoundSql.additional_bindings`.
    pub fn into_bindings(self) -> BTreeMap<String, Value> {
        self.bindings
    }
}

impl Scope for DynamicContext<'_> {
    fn resolve(&self, name: &str) -> crate::value::Result<Value> {
        if name == PARAMETER_BINDING {
            return Ok(self.param.as_value());
        }
        if let Some(v) = self.bindings.get(name) {
            return Ok(v.clone());
        }
        self.param.lookup(name)
    }
}
