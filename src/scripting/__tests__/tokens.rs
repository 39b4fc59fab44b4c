use crate::scripting::tokens::{contains_token, parse_tokens};

fn upper(text: &str) -> String {
    parse_tokens(text, "${", "}", |c| Ok(c.to_uppercase())).unwrap()
}

#[test]
fn replaces_tokens_in_order() {
    assert_eq!(upper("a ${x} b ${y} c"), "a X b Y c");
}

#[test]
fn no_tokens_passes_through() {
    assert_eq!(upper("plain text, no tokens"), "plain text, no tokens");
}

#[test]
fn unterminated_token_is_literal() {
    assert_eq!(upper("a ${x b"), "a ${x b");
}

#[test]
fn escaped_token_is_literal_and_eats_backslash() {
    assert_eq!(upper(r"a \${x} b"), "a ${x} b");
    // экранирован только первый, второй работает
    assert_eq!(upper(r"\${x} ${y}"), "${x} Y");
}

#[test]
fn empty_token_body() {
    assert_eq!(upper("${}"), "");
}

#[test]
fn handler_errors_bubble_up() {
    let r = parse_tokens("a ${x}", "${", "}", |_| {
        Err(crate::scripting::Error::MissingCollection)
    });
    assert!(r.is_err());
}

#[test]
fn contains_token_respects_escape_and_closure() {
    assert!(contains_token("a ${x}", "${", "}"));
    assert!(!contains_token("a $x", "${", "}"));
    assert!(!contains_token("a ${x", "${", "}"));
    assert!(!contains_token(r"a \${x}", "${", "}"));
    assert!(contains_token("#{id}", "#{", "}"));
}
