use log::trace;
use serde_json::Value;
use smallvec::SmallVec;

use super::Result;
use crate::expr;
use crate::mapping::{BoundSql, ParameterMapping};
use crate::param::Param;
use crate::types::TypeHandlerRegistry;
use crate::value::ParamObject;

/// Разрешить все `ParameterMapping` связанного SQL в драйверные параметры,
/// в порядке плейсхолдеров.
///
/// Порядок поиска значения: дополнительные связывания (`<bind>`, локальные
/// имена `<foreach>`) — затем объект параметров. Одиночный скалярный
/// аргумент связывается целиком, на какое бы имя ни ссылался токен.
pub fn resolve_parameters(
    bound: &BoundSql,
    param: &ParamObject,
    handlers: &TypeHandlerRegistry,
) -> Result<SmallVec<[Param; 8]>> {
    let mut out: SmallVec<[Param; 8]> = SmallVec::with_capacity(bound.parameters.len());
    for mapping in &bound.parameters {
        let value = resolve_value(bound, param, mapping)?;
        trace!("parameter '{}' -> {value}", mapping.property);
        let handler = handlers.resolve(mapping.type_handler.as_deref())?;
        out.push(handler.to_param(&mapping.property, &value, mapping.jdbc_type)?);
    }
    Ok(out)
}

fn resolve_value(
    bound: &BoundSql,
    param: &ParamObject,
    mapping: &ParameterMapping,
) -> Result<Value> {
    if let Some(root) = bound.additional_bindings.get(&mapping.path.head) {
        let mut current = root.clone();
        for step in &mapping.path.steps {
            current = expr::apply_step(&current, step);
        }
        return Ok(current);
    }

    // одиночный скаляр: `#{id}` при вызове с голым значением
    if let ParamObject::Single(v) = param {
        if !v.is_object() && !v.is_array() {
            return Ok(v.clone());
        }
    }

    let mut current = param.lookup(&mapping.path.head)?;
    for step in &mapping.path.steps {
        current = expr::apply_step(&current, step);
    }
    Ok(current)
}
