use serde_json::Value;

use super::command::SqlCommand;
use super::interface::{MapperInterface, MethodSpec, ReturnSpec};
use super::signature::MethodSignature;
use super::{Error, Result};
use crate::session::{Configuration, Cursor, ResultHandler, RowBounds, SqlSession};

/// Аргумент вызова метода маппера, по позиции объявления.
pub enum MapperArg<'a> {
    Value(Value),
    Page(RowBounds),
    Handler(&'a mut dyn ResultHandler),
}

impl std::fmt::Debug for MapperArg<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapperArg::Value(v) => f.debug_tuple("Value").field(v).finish(),
            MapperArg::Page(b) => f.debug_tuple("Page").field(b).finish(),
            MapperArg::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Массив аргументов вызова.
#[derive(Debug, Default)]
pub struct MapperArgs<'a>(pub Vec<MapperArg<'a>>);

impl<'a> MapperArgs<'a> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self(values.into_iter().map(MapperArg::Value).collect())
    }

    pub fn value(mut self, v: Value) -> Self {
        self.0.push(MapperArg::Value(v));
        self
    }

    pub fn page(mut self, bounds: RowBounds) -> Self {
        self.0.push(MapperArg::Page(bounds));
        self
    }

    pub fn handler(mut self, h: &'a mut dyn ResultHandler) -> Self {
        self.0.push(MapperArg::Handler(h));
        self
    }
}

/// Результат диспетчеризации: значение либо курсор.
#[derive(Debug)]
pub enum MapperOutput {
    Value(Value),
    Cursor(Cursor),
}

impl MapperOutput {
    /// Значение или ошибка-несоответствие (для вызывающих, не ждущих курсор).
    pub fn into_value(self) -> Option<Value> {
        match self {
            MapperOutput::Value(v) => Some(v),
            MapperOutput::Cursor(_) => None,
        }
    }
}

/// Исполнитель одного метода маппера: команда + сигнатура. Строится один
/// раз и кэшируется прокси; сам по себе неизменяем.
#[derive(Debug)]
pub struct MapperMethod {
    command: SqlCommand,
    signature: MethodSignature,
}

impl MapperMethod {
    pub fn new(
        config: &Configuration,
        interface: &MapperInterface,
        spec: &MethodSpec,
    ) -> Result<Self> {
        Ok(Self {
            command: SqlCommand::resolve(config, interface, spec)?,
            signature: MethodSignature::analyze(interface.name(), spec)?,
        })
    }

    #[inline]
    pub fn command(&self) -> &SqlCommand {
        &self.command
    }

    #[inline]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Один вызов — один поход в сессию, результат приводится к заявленной
    /// форме возврата.
    pub fn execute(
        &self,
        session: &dyn SqlSession,
        args: MapperArgs<'_>,
    ) -> Result<MapperOutput> {
        let (values, bounds, handler) = self.split_args(args)?;
        let name = self.command.name();

        match self.command.kind {
            crate::mapping::SqlCommandType::Insert => {
                let param = self.signature.convert_args(&values)?;
                let n = session.insert(name, &param)?;
                Ok(MapperOutput::Value(self.row_count_result(n)?))
            }
            crate::mapping::SqlCommandType::Update => {
                let param = self.signature.convert_args(&values)?;
                let n = session.update(name, &param)?;
                Ok(MapperOutput::Value(self.row_count_result(n)?))
            }
            crate::mapping::SqlCommandType::Delete => {
                let param = self.signature.convert_args(&values)?;
                let n = session.delete(name, &param)?;
                Ok(MapperOutput::Value(self.row_count_result(n)?))
            }
            crate::mapping::SqlCommandType::Select => {
                self.execute_select(session, &values, bounds, handler)
            }
            crate::mapping::SqlCommandType::Flush => {
                let n = session.flush_statements()?;
                Ok(MapperOutput::Value(if self.signature.returns_void() {
                    Value::Null
                } else {
                    Value::from(n)
                }))
            }
            crate::mapping::SqlCommandType::Unknown => Err(Error::UnknownStatementKind {
                id: self.signature.method().to_string(),
            }),
        }
    }

    fn execute_select<'a>(
        &self,
        session: &dyn SqlSession,
        values: &[Value],
        bounds: Option<RowBounds>,
        handler: Option<&'a mut dyn ResultHandler>,
    ) -> Result<MapperOutput> {
        let name = self.command.name();
        let bounds = bounds.unwrap_or_default();
        let param = self.signature.convert_args(values)?;

        if self.signature.returns_void() && self.signature.has_result_handler() {
            let h = handler.ok_or_else(|| Error::ArgumentMismatch {
                method: self.signature.method().to_string(),
                index: self.signature.result_handler_index().unwrap_or_default(),
            })?;
            session.select_with_handler(name, &param, bounds, h)?;
            return Ok(MapperOutput::Value(Value::Null));
        }
        if self.signature.returns_many() {
            let rows = session.select_list(name, &param, bounds)?;
            return Ok(MapperOutput::Value(Value::Array(rows)));
        }
        if self.signature.returns_map() {
            // ключ гарантирован анализом сигнатуры
            let key = self.signature.map_key().unwrap_or_default();
            let map = session.select_map(name, &param, key, bounds)?;
            return Ok(MapperOutput::Value(map));
        }
        if self.signature.returns_cursor() {
            let cursor = session.select_cursor(name, &param, bounds)?;
            return Ok(MapperOutput::Cursor(cursor));
        }

        let row = session.select_one(name, &param)?;
        if row.is_null() && self.signature.returns().is_primitive() {
            return Err(Error::NullIntoPrimitive {
                method: self.signature.method().to_string(),
            });
        }
        Ok(MapperOutput::Value(row))
    }

    /// Коерция счётчика строк DML к заявленному возврату.
    fn row_count_result(&self, n: u64) -> Result<Value> {
        Ok(match self.signature.returns() {
            ReturnSpec::Void => Value::Null,
            ReturnSpec::Int | ReturnSpec::Long => Value::from(n),
            ReturnSpec::Bool => Value::Bool(n > 0),
            _ => {
                return Err(Error::UnsupportedReturnType {
                    method: self.signature.method().to_string(),
                });
            }
        })
    }

    /// Разложить массив аргументов по позициям сигнатуры.
    fn split_args<'a>(
        &self,
        args: MapperArgs<'a>,
    ) -> Result<(Vec<Value>, Option<RowBounds>, Option<&'a mut dyn ResultHandler>)> {
        let mut values = Vec::with_capacity(args.0.len());
        let mut bounds = None;
        let mut handler = None;

        for (i, arg) in args.0.into_iter().enumerate() {
            let mismatch = || Error::ArgumentMismatch {
                method: self.signature.method().to_string(),
                index: i,
            };
            if self.signature.row_bounds_index() == Some(i) {
                match arg {
                    MapperArg::Page(b) => bounds = Some(b),
                    _ => return Err(mismatch()),
                }
            } else if self.signature.result_handler_index() == Some(i) {
                match arg {
                    MapperArg::Handler(h) => handler = Some(h),
                    _ => return Err(mismatch()),
                }
            } else {
                match arg {
                    MapperArg::Value(v) => values.push(v),
                    _ => return Err(mismatch()),
                }
            }
        }

        Ok((values, bounds, handler))
    }
}
