use super::Result;

/// Сканер токенов вида `open ... close` (`#{...}`, `${...}`).
///
/// На каждый найденный токен вызывает `handle(содержимое)` и вклеивает
/// результат вместо токена. Экранирование: `\#{...}` проходит литералом
/// (бэкслеш съедается). Незакрытый токен не считается токеном и уходит
/// в вывод как есть.
pub fn parse_tokens<F>(text: &str, open: &str, close: &str, mut handle: F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(open) {
        // экранированный открывающий токен
        if start > 0 && rest.as_bytes()[start - 1] == b'\\' {
            out.push_str(&rest[..start - 1]);
            out.push_str(open);
            rest = &rest[start + open.len()..];
            continue;
        }

        out.push_str(&rest[..start]);
        let after_open = &rest[start + open.len()..];
        match after_open.find(close) {
            Some(end) => {
                out.push_str(&handle(&after_open[..end])?);
                rest = &after_open[end + close.len()..];
            }
            None => {
                // незакрытый — литерал
                out.push_str(open);
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Есть ли в тексте незаэкранированный токен `open...close`.
pub fn contains_token(text: &str, open: &str, close: &str) -> bool {
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        if start > 0 && rest.as_bytes()[start - 1] == b'\\' {
            rest = &rest[start + open.len()..];
            continue;
        }
        return rest[start + open.len()..].contains(close);
    }
    false
}
