use serde_json::{Number, Value};

use super::context::DynamicContext;
use super::tokens;
use super::{Error, Result};
use crate::expr::{self, Expr};
use crate::value::text_form;

/// Узел дерева динамического SQL. Закрытый набор вариантов; после парсинга
/// дерево неизменяемо и свободно шарится между потоками.
#[derive(Debug, Clone)]
pub enum SqlNode {
    /// Литеральный текст без `${}` (`#{}` внутри опускается позже).
    StaticText(String),
    /// Текст с `${}`-подстановками — вычисляется при каждом связывании.
    Text(String),
    /// Упорядоченная композиция детей.
    Mixed(Vec<SqlNode>),
    If(IfNode),
    Choose(ChooseNode),
    Where(Box<SqlNode>),
    Set(Box<SqlNode>),
    Trim(TrimNode),
    ForEach(ForEachNode),
    /// `<bind name value>` — вычислить и связать в текущем контексте.
    Bind(BindNode),
}

#[derive(Debug, Clone)]
pub struct IfNode {
    pub test: Expr,
    pub body: Box<SqlNode>,
}

#[derive(Debug, Clone)]
pub struct ChooseNode {
    pub whens: Vec<IfNode>,
    pub otherwise: Option<Box<SqlNode>>,
}

#[derive(Debug, Clone)]
pub struct TrimNode {
    pub body: Box<SqlNode>,
    pub prefix: Option<String>,
    pub prefix_overrides: Vec<String>,
    pub suffix: Option<String>,
    pub suffix_overrides: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ForEachNode {
    pub body: Box<SqlNode>,
    /// Выражение коллекции + его исходный текст для сообщений об ошибках.
    /// Отсутствие атрибута — ошибка на этапе вычисления, не парсинга.
    pub collection: Option<(Expr, String)>,
    pub item: Option<String>,
    pub index: Option<String>,
    pub open: String,
    pub close: String,
    pub separator: String,
}

#[derive(Debug, Clone)]
pub struct BindNode {
    pub name: String,
    pub value: Expr,
}

// префиксы, снимаемые <where>; пробел в конце — граница токена
const WHERE_OVERRIDES: &[&str] = &["AND ", "OR "];
const SET_OVERRIDES: &[&str] = &[","];

impl SqlNode {
    /// Применить узел к контексту: дописать свой вклад в накопитель.
    /// Возвращает, сработал ли узел (у `If` — прошёл ли тест).
    pub fn apply(&self, ctx: &mut DynamicContext<'_>) -> Result<bool> {
        match self {
            SqlNode::StaticText(text) => {
                ctx.append(text);
                Ok(true)
            }
            SqlNode::Text(text) => {
                let substituted = {
                    let scope: &DynamicContext<'_> = ctx;
                    tokens::parse_tokens(text, "${", "}", |content| {
                        let parsed = expr::parse(content)?;
                        let v = expr::eval(&parsed, scope)?;
                        Ok(text_form(&v))
                    })?
                };
                ctx.append(&substituted);
                Ok(true)
            }
            SqlNode::Mixed(children) => {
                for child in children {
                    child.apply(ctx)?;
                }
                Ok(true)
            }
            SqlNode::If(node) => {
                if expr::eval_test(&node.test, &*ctx)? {
                    node.body.apply(ctx)?;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            SqlNode::Choose(node) => {
                // первый истинный when побеждает, порядок документа
                for when in &node.whens {
                    if expr::eval_test(&when.test, &*ctx)? {
                        when.body.apply(ctx)?;
                        return Ok(true);
                    }
                }
                if let Some(otherwise) = &node.otherwise {
                    otherwise.apply(ctx)?;
                    return Ok(true);
                }
                Ok(false)
            }
            SqlNode::Where(body) => {
                apply_trim(ctx, body, Some("WHERE"), WHERE_OVERRIDES, None, &[])
            }
            SqlNode::Set(body) => {
                apply_trim(ctx, body, Some("SET"), SET_OVERRIDES, None, SET_OVERRIDES)
            }
            SqlNode::Trim(node) => {
                let prefix_ov: Vec<&str> =
                    node.prefix_overrides.iter().map(String::as_str).collect();
                let suffix_ov: Vec<&str> =
                    node.suffix_overrides.iter().map(String::as_str).collect();
                apply_trim(
                    ctx,
                    &node.body,
                    node.prefix.as_deref(),
                    &prefix_ov,
                    node.suffix.as_deref(),
                    &suffix_ov,
                )
            }
            SqlNode::ForEach(node) => node.apply(ctx),
            SqlNode::Bind(node) => {
                let v = expr::eval(&node.value, &*ctx)?;
                ctx.bind(node.name.clone(), v);
                Ok(true)
            }
        }
    }
}

/// Общая механика `<trim>`/`<where>`/`<set>`: тело — в под-буфер,
/// пост-обработка по правилам, результат — одним фрагментом наверх.
/// Пустое (после обрезки) тело не эмитит ничего, включая prefix/suffix.
fn apply_trim(
    ctx: &mut DynamicContext<'_>,
    body: &SqlNode,
    prefix: Option<&str>,
    prefix_overrides: &[&str],
    suffix: Option<&str>,
    suffix_overrides: &[&str],
) -> Result<bool> {
    let saved = ctx.take_buf();
    let applied = body.apply(ctx)?;
    let sub = ctx.restore_buf(saved);

    let mut content = sub.trim();
    if content.is_empty() {
        return Ok(applied);
    }

    for ov in prefix_overrides {
        if let Some(n) = match_override_start(content, ov) {
            content = content[n..].trim_start();
            break;
        }
    }
    for ov in suffix_overrides {
        if let Some(n) = match_override_end(content, ov) {
            content = content[..content.len() - n].trim_end();
            break;
        }
    }
    if content.is_empty() {
        return Ok(applied);
    }

    let mut frag =
        String::with_capacity(content.len() + prefix.map_or(0, |p| p.len() + 1) + 8);
    if let Some(p) = prefix {
        frag.push_str(p);
        frag.push(' ');
    }
    frag.push_str(content);
    if let Some(s) = suffix {
        frag.push(' ');
        frag.push_str(s);
    }
    ctx.append(&frag);
    Ok(applied)
}

/// Сопоставление override в начале буфера: ASCII без учёта регистра.
/// Пробел в хвосте override означает границу токена: дальше либо
/// whitespace, либо конец буфера («AND » снимает и одинокое «AND»).
fn match_override_start(s: &str, ov: &str) -> Option<usize> {
    let token = ov.trim_end_matches(' ');
    let needs_boundary = token.len() != ov.len();
    let sb = s.as_bytes();
    let tb = token.as_bytes();
    if tb.is_empty() || sb.len() < tb.len() {
        return None;
    }
    for i in 0..tb.len() {
        if !sb[i].eq_ignore_ascii_case(&tb[i]) {
            return None;
        }
    }
    if needs_boundary {
        match sb.get(tb.len()) {
            None => {}
            Some(b) if b.is_ascii_whitespace() => {}
            Some(_) => return None,
        }
    }
    Some(tb.len())
}

fn match_override_end(s: &str, ov: &str) -> Option<usize> {
    let token = ov.trim();
    let needs_boundary = token.len() != ov.len();
    let sb = s.as_bytes();
    let tb = token.as_bytes();
    if tb.is_empty() || sb.len() < tb.len() {
        return None;
    }
    let base = sb.len() - tb.len();
    for i in 0..tb.len() {
        if !sb[base + i].eq_ignore_ascii_case(&tb[i]) {
            return None;
        }
    }
    if needs_boundary && base > 0 && !sb[base - 1].is_ascii_whitespace() {
        return None;
    }
    Some(tb.len())
}

impl ForEachNode {
    fn apply(&self, ctx: &mut DynamicContext<'_>) -> Result<bool> {
        let (collection_expr, collection_src) = self
            .collection
            .as_ref()
            .ok_or(Error::MissingCollection)?;
        let resolved = expr::eval(collection_expr, &*ctx)?;

        let entries: Vec<(Value, Value)> = match resolved {
            Value::Null => {
                return Err(Error::NullCollection {
                    expr: collection_src.clone(),
                });
            }
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Value::Number(Number::from(i as i64)), v))
                .collect(),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (Value::String(k), v))
                .collect(),
            other => {
                return Err(Error::NotIterable {
                    expr: collection_src.clone(),
                    kind: kind_name(&other),
                });
            }
        };

        // прежние значения item/index вернём после цикла
        let saved_item = self.item.as_ref().map(|n| (n, ctx.binding(n).cloned()));
        let saved_index = self.index.as_ref().map(|n| (n, ctx.binding(n).cloned()));

        let mut parts: Vec<String> = Vec::with_capacity(entries.len());
        for (index_value, item_value) in entries {
            let unique = ctx.next_unique();
            if let Some(name) = &self.index {
                ctx.bind(name.clone(), index_value.clone());
                ctx.bind(itemized(name, unique), index_value);
            }
            if let Some(name) = &self.item {
                ctx.bind(name.clone(), item_value.clone());
                ctx.bind(itemized(name, unique), item_value);
            }

            let saved_buf = ctx.take_buf();
            self.body.apply(ctx)?;
            let frag = ctx.restore_buf(saved_buf);
            let frag = rewrite_parameter_names(
                &frag,
                self.item.as_deref(),
                self.index.as_deref(),
                unique,
            )?;
            if !frag.is_empty() {
                parts.push(frag);
            }
        }

        for (name, prior) in [saved_item, saved_index].into_iter().flatten() {
            match prior {
                Some(v) => ctx.bind(name.clone(), v),
                None => {
                    ctx.unbind(name);
                }
            }
        }

        let mut out = String::with_capacity(
            self.open.len()
                + self.close.len()
                + parts.iter().map(String::len).sum::<usize>()
                + self.separator.len() * parts.len(),
        );
        out.push_str(&self.open);
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                out.push_str(&self.separator);
            }
            out.push_str(part);
        }
        out.push_str(&self.close);
        ctx.append(&out);
        Ok(true)
    }
}

#[inline]
fn itemized(name: &str, unique: u32) -> String {
    format!("__frch_{name}_{unique}")
}

/// Переписать `#{item...}` / `#{index...}` внутри фрагмента итерации на
/// уникальные имена, под которыми значения уже связаны в контексте.
fn rewrite_parameter_names(
    frag: &str,
    item: Option<&str>,
    index: Option<&str>,
    unique: u32,
) -> Result<String> {
    if item.is_none() && index.is_none() {
        return Ok(frag.to_string());
    }
    tokens::parse_tokens(frag, "#{", "}", |content| {
        let (prop, attrs) = match content.find(',') {
            Some(i) => (&content[..i], &content[i..]),
            None => (content, ""),
        };
        let rewritten = item
            .and_then(|n| itemize_property(prop, n, unique))
            .or_else(|| index.and_then(|n| itemize_property(prop, n, unique)))
            .unwrap_or_else(|| prop.to_string());
        Ok(format!("#{{{rewritten}{attrs}}}"))
    })
}

/// Заменить головной идентификатор `name` на `__frch_name_<n>`, если за ним
/// граница пути (конец, `.`, `[`, `:` или пробел).
fn itemize_property(prop: &str, name: &str, unique: u32) -> Option<String> {
    let lead = prop.len() - prop.trim_start().len();
    let body = &prop[lead..];
    if !body.starts_with(name) {
        return None;
    }
    let boundary = match body.as_bytes().get(name.len()) {
        None => true,
        Some(b) => matches!(b, b'.' | b'[' | b':') || b.is_ascii_whitespace(),
    };
    if !boundary {
        return None;
    }
    Some(format!(
        "{}{}{}",
        &prop[..lead],
        itemized(name, unique),
        &body[name.len()..]
    ))
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
