use super::config::PlaceholderStyle;
use super::node::{BindNode, ChooseNode, ForEachNode, IfNode, SqlNode, TrimNode};
use super::source::{DynamicSqlSource, RawSqlSource, SqlSource};
use super::{Error, Result, tokens};
use crate::expr;

/// Собрать источник из XML-элемента тела стейтмента
/// (`<select>...</select>`, `<script>...</script>`).
pub fn build_source_from_node(
    node: roxmltree::Node<'_, '_>,
    style: PlaceholderStyle,
) -> Result<SqlSource> {
    let (root, dynamic) = parse_dynamic_tags(node)?;
    finish_source(root, dynamic, style)
}

/// Источник из строки: `<script>...` включает динамическую XML-грамматику,
/// любой другой текст — тело как есть (`${}` делает его динамическим).
pub fn build_source_from_str(script: &str, style: PlaceholderStyle) -> Result<SqlSource> {
    let trimmed = script.trim();
    if trimmed.starts_with("<script") {
        let doc = roxmltree::Document::parse(trimmed)?;
        return build_source_from_node(doc.root_element(), style);
    }
    let (node, dynamic) = text_node(script);
    finish_source(SqlNode::Mixed(vec![node]), dynamic, style)
}

fn finish_source(root: SqlNode, dynamic: bool, style: PlaceholderStyle) -> Result<SqlSource> {
    if dynamic {
        Ok(SqlSource::Dynamic(DynamicSqlSource::new(root, style)))
    } else {
        Ok(SqlSource::Raw(RawSqlSource::new(&root, style)?))
    }
}

/// Текст с `${}` — динамический `Text`, иначе `StaticText`.
fn text_node(data: &str) -> (SqlNode, bool) {
    if tokens::contains_token(data, "${", "}") {
        (SqlNode::Text(data.to_string()), true)
    } else {
        (SqlNode::StaticText(data.to_string()), false)
    }
}

/// Рекурсивный разбор детей элемента в `Mixed`-узел.
///
/// Текст/CDATA — текстовые узлы (пробельные целиком — опускаются);
/// элементы — по закрытой таблице обработчиков, незнакомый — ошибка.
fn parse_dynamic_tags(node: roxmltree::Node<'_, '_>) -> Result<(SqlNode, bool)> {
    let mut contents = Vec::new();
    let mut dynamic = false;

    for child in node.children() {
        if child.is_text() {
            let data = child.text().unwrap_or("");
            if data.trim().is_empty() {
                continue;
            }
            let (n, d) = text_node(data);
            dynamic |= d;
            contents.push(n);
        } else if child.is_element() {
            dynamic = true;
            contents.push(parse_element(child)?);
        }
        // комментарии и PI игнорируем
    }

    Ok((SqlNode::Mixed(contents), dynamic))
}

fn parse_element(el: roxmltree::Node<'_, '_>) -> Result<SqlNode> {
    match el.tag_name().name() {
        "trim" => {
            let (body, _) = parse_dynamic_tags(el)?;
            Ok(SqlNode::Trim(TrimNode {
                body: Box::new(body),
                prefix: el.attribute("prefix").map(str::to_string),
                prefix_overrides: split_overrides(el.attribute("prefixOverrides")),
                suffix: el.attribute("suffix").map(str::to_string),
                suffix_overrides: split_overrides(el.attribute("suffixOverrides")),
            }))
        }
        "where" => {
            let (body, _) = parse_dynamic_tags(el)?;
            Ok(SqlNode::Where(Box::new(body)))
        }
        "set" => {
            let (body, _) = parse_dynamic_tags(el)?;
            Ok(SqlNode::Set(Box::new(body)))
        }
        "foreach" => {
            let (body, _) = parse_dynamic_tags(el)?;
            let collection = match el.attribute("collection") {
                // отсутствие атрибута — ошибка применения, не парсинга
                None => None,
                Some(src) => Some((expr::parse(src)?, src.to_string())),
            };
            Ok(SqlNode::ForEach(ForEachNode {
                body: Box::new(body),
                collection,
                item: el.attribute("item").map(str::to_string),
                index: el.attribute("index").map(str::to_string),
                open: el.attribute("open").unwrap_or("").to_string(),
                close: el.attribute("close").unwrap_or("").to_string(),
                separator: el.attribute("separator").unwrap_or("").to_string(),
            }))
        }
        "if" | "when" => Ok(SqlNode::If(parse_if(el)?)),
        "choose" => parse_choose(el),
        // одиночный <otherwise> вне <choose> — просто его содержимое
        "otherwise" => Ok(parse_dynamic_tags(el)?.0),
        "bind" => {
            let name = required_attribute(el, "bind", "name")?;
            let value_src = required_attribute(el, "bind", "value")?;
            Ok(SqlNode::Bind(BindNode {
                name: name.to_string(),
                value: expr::parse(value_src)?,
            }))
        }
        other => Err(Error::UnknownElement {
            name: other.to_string(),
        }),
    }
}

fn parse_if(el: roxmltree::Node<'_, '_>) -> Result<IfNode> {
    let test_src = required_attribute(el, "if", "test")?;
    let (body, _) = parse_dynamic_tags(el)?;
    Ok(IfNode {
        test: expr::parse(test_src)?,
        body: Box::new(body),
    })
}

/// `<choose>`: только `<when>`/`<otherwise>`; первый истинный when
/// побеждает; otherwise — не больше одного.
fn parse_choose(el: roxmltree::Node<'_, '_>) -> Result<SqlNode> {
    let mut whens = Vec::new();
    let mut otherwise: Option<Box<SqlNode>> = None;

    for child in el.children() {
        if child.is_text() {
            if child.text().unwrap_or("").trim().is_empty() {
                continue;
            }
            return Err(Error::MisplacedChooseChild {
                name: "#text".to_string(),
            });
        }
        if !child.is_element() {
            continue;
        }
        match child.tag_name().name() {
            "when" => whens.push(parse_if(child)?),
            "otherwise" => {
                if otherwise.is_some() {
                    return Err(Error::TooManyOtherwise);
                }
                otherwise = Some(Box::new(parse_dynamic_tags(child)?.0));
            }
            other => {
                return Err(Error::MisplacedChooseChild {
                    name: other.to_string(),
                });
            }
        }
    }

    Ok(SqlNode::Choose(ChooseNode { whens, otherwise }))
}

fn required_attribute<'a>(
    el: roxmltree::Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<&'a str> {
    el.attribute(attribute)
        .ok_or(Error::MissingAttribute { element, attribute })
}

fn split_overrides(attr: Option<&str>) -> Vec<String> {
    attr.map(|s| {
        s.split('|')
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
