use std::fmt;
use std::sync::Arc;

use super::method::{MapperArgs, MapperOutput};
use super::proxy::MapperProxy;
use crate::mapping::SqlCommandType;

/// Заявленная форма возврата метода маппера.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnSpec {
    Void,
    /// 32-битный счётчик строк.
    Int,
    /// 64-битный счётчик строк.
    Long,
    Bool,
    /// Одиночная сущность/скаляр.
    Scalar,
    /// Одиночная, допускающая отсутствие.
    Optional,
    List,
    Array,
    /// Объект, ключованный свойством `map_key`.
    Map,
    Cursor,
}

impl ReturnSpec {
    #[inline]
    pub fn is_many(self) -> bool {
        matches!(self, ReturnSpec::List | ReturnSpec::Array)
    }

    /// «Примитив»: null в такой возврат недопустим.
    #[inline]
    pub fn is_primitive(self) -> bool {
        matches!(self, ReturnSpec::Int | ReturnSpec::Long | ReturnSpec::Bool)
    }
}

/// Доменный аргумент: явное имя (аннотация) и/или имя из объявления.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgSpec {
    pub explicit: Option<String>,
    pub declared: Option<String>,
}

impl ArgSpec {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Явно названный аргумент (приоритетнее имени из объявления).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            explicit: Some(name.into()),
            declared: None,
        }
    }

    /// Имя, известное только из объявления метода.
    pub fn declared(name: impl Into<String>) -> Self {
        Self {
            explicit: None,
            declared: Some(name.into()),
        }
    }
}

/// Позиция в списке параметров метода.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamSpec {
    Arg(ArgSpec),
    RowBounds,
    ResultHandler,
}

/// Инлайновый (аннотационный) стейтмент при методе: регистрируется под
/// составным id при регистрации интерфейса.
#[derive(Debug, Clone)]
pub struct InlineStatement {
    pub kind: SqlCommandType,
    pub template: String,
}

/// Тело default-метода: выполняется на прокси, минуя сессию.
pub type DefaultBody =
    Arc<dyn for<'a> Fn(&MapperProxy, MapperArgs<'a>) -> super::Result<MapperOutput> + Send + Sync>;

/// Объявление одного метода интерфейса маппера. Rust не даёт пройтись по
/// trait-методам рефлексией, поэтому интерфейс описывается таблицей таких
/// деклараций, а анализ сигнатур выполняется при регистрации.
#[derive(Clone)]
pub struct MethodSpec {
    pub name: String,
    pub returns: ReturnSpec,
    pub params: Vec<ParamSpec>,
    pub map_key: Option<String>,
    pub flush: bool,
    pub inline: Option<InlineStatement>,
    pub default_body: Option<DefaultBody>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>, returns: ReturnSpec) -> Self {
        Self {
            name: name.into(),
            returns,
            params: Vec::new(),
            map_key: None,
            flush: false,
            inline: None,
            default_body: None,
        }
    }

    pub fn arg(mut self) -> Self {
        self.params.push(ParamSpec::Arg(ArgSpec::anonymous()));
        self
    }

    pub fn named_arg(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec::Arg(ArgSpec::named(name)));
        self
    }

    pub fn declared_arg(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec::Arg(ArgSpec::declared(name)));
        self
    }

    pub fn row_bounds(mut self) -> Self {
        self.params.push(ParamSpec::RowBounds);
        self
    }

    pub fn result_handler(mut self) -> Self {
        self.params.push(ParamSpec::ResultHandler);
        self
    }

    pub fn map_key(mut self, key: impl Into<String>) -> Self {
        self.map_key = Some(key.into());
        self
    }

    /// Маркер flush: допускает метод без стейтмента в реестре.
    pub fn flush(mut self) -> Self {
        self.flush = true;
        self
    }

    pub fn inline(mut self, kind: SqlCommandType, template: impl Into<String>) -> Self {
        self.inline = Some(InlineStatement {
            kind,
            template: template.into(),
        });
        self
    }

    pub fn default_body<F>(mut self, body: F) -> Self
    where
        F: for<'a> Fn(&MapperProxy, MapperArgs<'a>) -> super::Result<MapperOutput>
            + Send
            + Sync
            + 'static,
    {
        self.default_body = Some(Arc::new(body));
        self
    }
}

impl fmt::Debug for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSpec")
            .field("name", &self.name)
            .field("returns", &self.returns)
            .field("params", &self.params)
            .field("map_key", &self.map_key)
            .field("flush", &self.flush)
            .field("inline", &self.inline.as_ref().map(|i| i.kind))
            .field("default_body", &self.default_body.is_some())
            .finish()
    }
}

/// Декларация интерфейса маппера: полное имя, родители (в порядке
/// объявления) и методы.
#[derive(Debug)]
pub struct MapperInterface {
    name: String,
    parents: Vec<Arc<MapperInterface>>,
    methods: Vec<MethodSpec>,
}

impl MapperInterface {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parents: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: Arc<MapperInterface>) -> Self {
        self.parents.push(parent);
        self
    }

    pub fn with_method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn parents(&self) -> &[Arc<MapperInterface>] {
        &self.parents
    }

    #[inline]
    pub fn methods(&self) -> &[MethodSpec] {
        &self.methods
    }

    /// Только собственные методы.
    pub fn declared_method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Свои методы, затем родительские — в глубину, в порядке объявления.
    pub fn find_method(&self, name: &str) -> Option<&MethodSpec> {
        if let Some(m) = self.declared_method(name) {
            return Some(m);
        }
        for parent in &self.parents {
            if let Some(m) = parent.find_method(name) {
                return Some(m);
            }
        }
        None
    }
}
