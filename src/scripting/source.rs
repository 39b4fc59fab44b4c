use log::debug;

use super::config::PlaceholderStyle;
use super::context::DynamicContext;
use super::node::SqlNode;
use super::writer::SqlWriter;
use super::{Error, Result};
use crate::expr;
use crate::mapping::{BoundSql, ParameterMapping};
use crate::value::ParamObject;

/// Скомпилированный источник SQL. Динамический вариант прогоняет дерево на
/// каждое связывание; статический — посчитан один раз при сборке.
#[derive(Debug)]
pub enum SqlSource {
    Dynamic(DynamicSqlSource),
    Raw(RawSqlSource),
}

impl SqlSource {
    /// Собрать `BoundSql` под объект параметров.
    pub fn bind(&self, param: &ParamObject) -> Result<BoundSql> {
        match self {
            SqlSource::Dynamic(src) => src.bind(param),
            SqlSource::Raw(src) => Ok(src.bound.clone()),
        }
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, SqlSource::Dynamic(_))
    }
}

/// Дерево с динамическими конструкциями (`<if>`, `${}` и т.д.).
#[derive(Debug)]
pub struct DynamicSqlSource {
    root: SqlNode,
    style: PlaceholderStyle,
}

impl DynamicSqlSource {
    pub fn new(root: SqlNode, style: PlaceholderStyle) -> Self {
        Self { root, style }
    }

    fn bind(&self, param: &ParamObject) -> Result<BoundSql> {
        let mut ctx = DynamicContext::new(param);
        self.root.apply(&mut ctx)?;
        let (sql, parameters) = lower_placeholders(ctx.sql(), self.style)?;
        debug!(
            "bound dynamic statement: {} parameter(s), sql: {sql}",
            parameters.len()
        );
        Ok(BoundSql {
            sql,
            parameters,
            additional_bindings: ctx.into_bindings(),
        })
    }
}

/// Полностью статическое дерево: `BoundSql` посчитан при сборке,
/// связывание — дешёвый клон.
#[derive(Debug)]
pub struct RawSqlSource {
    bound: BoundSql,
}

impl RawSqlSource {
    /// Вычислить статическое дерево один раз с пустым контекстом.
    pub fn new(root: &SqlNode, style: PlaceholderStyle) -> Result<Self> {
        let empty = ParamObject::None;
        let mut ctx = DynamicContext::new(&empty);
        root.apply(&mut ctx)?;
        let (sql, parameters) = lower_placeholders(ctx.sql(), style)?;
        Ok(Self {
            bound: BoundSql::new(sql, parameters),
        })
    }
}

/// Опустить `#{...}`-токены до драйверных плейсхолдеров, собрав
/// упорядоченный список `ParameterMapping`. Инвариант: плейсхолдеров в
/// выходном SQL ровно столько, сколько элементов в списке, и в том же
/// порядке.
pub(crate) fn lower_placeholders(
    sql: &str,
    style: PlaceholderStyle,
) -> Result<(String, Vec<ParameterMapping>)> {
    let mut w = SqlWriter::new(sql.len() + 8, style);
    let mut mappings = Vec::new();
    let mut rest = sql;

    while let Some(start) = rest.find("#{") {
        if start > 0 && rest.as_bytes()[start - 1] == b'\\' {
            // экранированный токен — литерал, бэкслеш съедаем
            w.push(&rest[..start - 1]);
            w.push("#{");
            rest = &rest[start + 2..];
            continue;
        }
        w.push(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                mappings.push(parse_parameter_token(&after[..end])?);
                w.push_placeholder();
                rest = &after[end + 1..];
            }
            None => {
                // незакрытый — литерал
                w.push("#{");
                rest = after;
            }
        }
    }
    w.push(rest);
    Ok((w.finish(), mappings))
}

/// Разобрать тело `#{expr[,jdbcType=...][,typeHandler=...]}`.
pub(crate) fn parse_parameter_token(content: &str) -> Result<ParameterMapping> {
    let mut parts = content.split(',');
    let property = parts.next().unwrap_or("").trim();
    if property.is_empty() {
        return Err(Error::MalformedParameter {
            content: content.to_string(),
            reason: "empty property expression".into(),
        });
    }
    let path = expr::parse_path(property).map_err(|e| Error::MalformedParameter {
        content: content.to_string(),
        reason: format!("{e}").into(),
    })?;

    let mut jdbc_type = None;
    let mut type_handler = None;
    for attr in parts {
        let Some((key, value)) = attr.split_once('=') else {
            return Err(Error::MalformedParameter {
                content: content.to_string(),
                reason: "expected key=value attribute".into(),
            });
        };
        match key.trim() {
            "jdbcType" => jdbc_type = Some(value.trim().parse()?),
            "typeHandler" => type_handler = Some(value.trim().to_string()),
            other => {
                return Err(Error::MalformedParameter {
                    content: content.to_string(),
                    reason: format!("unknown attribute '{other}'").into(),
                });
            }
        }
    }

    Ok(ParameterMapping {
        property: property.to_string(),
        path,
        jdbc_type,
        type_handler,
    })
}
