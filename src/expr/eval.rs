use serde_json::{Number, Value};

use super::{BinOp, Error, Expr, PathExpr, PathStep, Result, UnaryOp};
use crate::value::truthy;

/// Источник имён при вычислении: контекст связывания поверх объекта
/// параметров. Резолв обязан быть чистым (без побочных эффектов).
pub trait Scope {
    fn resolve(&self, name: &str) -> crate::value::Result<Value>;
}

/// Вычислить выражение в заданном окружении.
pub fn eval(expr: &Expr, scope: &dyn Scope) -> Result<Value> {
    match expr {
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Int(i) => Ok(Value::Number(Number::from(*i))),
        Expr::Float(f) => Ok(Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Path(path) => resolve_path(path, scope),
        Expr::Unary { op, expr } => {
            let v = eval(expr, scope)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!truthy(&v))),
                UnaryOp::Neg => match &v {
                    Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            Ok(Value::Number(Number::from(-i)))
                        } else {
                            Ok(Number::from_f64(-n.as_f64().unwrap_or(0.0))
                                .map(Value::Number)
                                .unwrap_or(Value::Null))
                        }
                    }
                    other => Err(Error::TypeMismatch {
                        op: "-",
                        lhs: kind(other),
                        rhs: "nothing",
                    }),
                },
            }
        }
        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, scope),
    }
}

/// Вычислить тестовое выражение (`<if test>`, `<when test>`) до истинности.
#[inline]
pub fn eval_test(expr: &Expr, scope: &dyn Scope) -> Result<bool> {
    Ok(truthy(&eval(expr, scope)?))
}

/// Разрешить путь: голова — через окружение, шаги — мягко (Null при промахе).
pub fn resolve_path(path: &PathExpr, scope: &dyn Scope) -> Result<Value> {
    let mut current = scope.resolve(&path.head)?;
    for step in &path.steps {
        current = apply_step(&current, step);
    }
    Ok(current)
}

/// Один шаг пути поверх уже разрешённого значения.
pub(crate) fn apply_step(v: &Value, step: &PathStep) -> Value {
    match step {
        PathStep::Member(name) | PathStep::Key(name) => crate::value::member(v, name),
        PathStep::Index(i) => match v {
            Value::Array(items) => items.get(*i).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        },
    }
}

fn eval_binary(op: BinOp, lhs: &Expr, rhs: &Expr, scope: &dyn Scope) -> Result<Value> {
    // and/or — ленивые
    match op {
        BinOp::And => {
            let l = eval(lhs, scope)?;
            if !truthy(&l) {
                return Ok(Value::Bool(false));
            }
            let r = eval(rhs, scope)?;
            return Ok(Value::Bool(truthy(&r)));
        }
        BinOp::Or => {
            let l = eval(lhs, scope)?;
            if truthy(&l) {
                return Ok(Value::Bool(true));
            }
            let r = eval(rhs, scope)?;
            return Ok(Value::Bool(truthy(&r)));
        }
        _ => {}
    }

    let l = eval(lhs, scope)?;
    let r = eval(rhs, scope)?;
    match op {
        BinOp::Eq => Ok(Value::Bool(loose_eq(&l, &r))),
        BinOp::Ne => Ok(Value::Bool(!loose_eq(&l, &r))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ord = compare(op, &l, &r)?;
            Ok(Value::Bool(match op {
                BinOp::Lt => ord == std::cmp::Ordering::Less,
                BinOp::Le => ord != std::cmp::Ordering::Greater,
                BinOp::Gt => ord == std::cmp::Ordering::Greater,
                BinOp::Ge => ord != std::cmp::Ordering::Less,
                _ => unreachable!(),
            }))
        }
        BinOp::Add => add(&l, &r),
        BinOp::Sub => {
            let (a, b) = both_numbers(op, &l, &r)?;
            Ok(number(a - b, &l, &r))
        }
        BinOp::And | BinOp::Or => unreachable!(),
    }
}

/// Равенство со сглаживанием числовых типов: 1 == 1.0.
fn loose_eq(l: &Value, r: &Value) -> bool {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => l == r,
    }
}

fn compare(op: BinOp, l: &Value, r: &Value) -> Result<std::cmp::Ordering> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return Ok(x.cmp(&y));
            }
            let x = a.as_f64().unwrap_or(f64::NAN);
            let y = b.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).ok_or(Error::TypeMismatch {
                op: op.symbol(),
                lhs: "number",
                rhs: "number",
            })
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(Error::TypeMismatch {
            op: op.symbol(),
            lhs: kind(l),
            rhs: kind(r),
        }),
    }
}

/// `+`: строка с любой стороны — конкатенация, числа — сложение.
fn add(l: &Value, r: &Value) -> Result<Value> {
    match (l, r) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            let mut out = as_concat(l);
            out.push_str(&as_concat(r));
            Ok(Value::String(out))
        }
        (Value::Number(_), Value::Number(_)) => {
            let (a, b) = both_numbers(BinOp::Add, l, r)?;
            Ok(number(a + b, l, r))
        }
        _ => Err(Error::TypeMismatch {
            op: "+",
            lhs: kind(l),
            rhs: kind(r),
        }),
    }
}

fn as_concat(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => crate::value::text_form(other),
    }
}

fn both_numbers(op: BinOp, l: &Value, r: &Value) -> Result<(f64, f64)> {
    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok((
            a.as_f64().unwrap_or(f64::NAN),
            b.as_f64().unwrap_or(f64::NAN),
        )),
        _ => Err(Error::TypeMismatch {
            op: op.symbol(),
            lhs: kind(l),
            rhs: kind(r),
        }),
    }
}

/// Если оба операнда были целыми и результат целый — оставляем целым.
fn number(result: f64, l: &Value, r: &Value) -> Value {
    let both_ints = matches!((l, r), (Value::Number(a), Value::Number(b))
        if a.as_i64().is_some() && b.as_i64().is_some());
    if both_ints && result.fract() == 0.0 && result.abs() < i64::MAX as f64 {
        Value::Number(Number::from(result as i64))
    } else {
        Number::from_f64(result).map(Value::Number).unwrap_or(Value::Null)
    }
}

pub(crate) fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
