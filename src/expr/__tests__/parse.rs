use crate::expr::{BinOp, Expr, PathStep, parse, parse_path};

#[test]
fn literals() {
    assert_eq!(parse("null").unwrap(), Expr::Null);
    assert_eq!(parse("true").unwrap(), Expr::Bool(true));
    assert_eq!(parse("false").unwrap(), Expr::Bool(false));
    assert_eq!(parse("42").unwrap(), Expr::Int(42));
    assert_eq!(parse("3.5").unwrap(), Expr::Float(3.5));
    assert_eq!(parse("'abc'").unwrap(), Expr::Str("abc".into()));
    assert_eq!(parse("\"abc\"").unwrap(), Expr::Str("abc".into()));
}

#[test]
fn simple_path() {
    let p = parse_path("user.address.city").unwrap();
    assert_eq!(p.head, "user");
    assert_eq!(
        p.steps,
        vec![
            PathStep::Member("address".into()),
            PathStep::Member("city".into())
        ]
    );
}

#[test]
fn indexed_and_keyed_path() {
    let p = parse_path("items[0]").unwrap();
    assert_eq!(p.steps, vec![PathStep::Index(0)]);

    let p = parse_path("attrs['color']").unwrap();
    assert_eq!(p.steps, vec![PathStep::Key("color".into())]);

    let p = parse_path("attrs[\"size\"]").unwrap();
    assert_eq!(p.steps, vec![PathStep::Key("size".into())]);
}

#[test]
fn not_a_path() {
    assert!(parse_path("a + b").is_err());
    assert!(parse_path("1").is_err());
}

#[test]
fn comparison_operators() {
    for (src, op) in [
        ("a == b", BinOp::Eq),
        ("a != b", BinOp::Ne),
        ("a < b", BinOp::Lt),
        ("a <= b", BinOp::Le),
        ("a > b", BinOp::Gt),
        ("a >= b", BinOp::Ge),
    ] {
        match parse(src).unwrap() {
            Expr::Binary { op: got, .. } => assert_eq!(got, op, "{src}"),
            other => panic!("{src}: ожидали Binary, получили {other:?}"),
        }
    }
}

#[test]
fn keyword_and_symbol_boolean_ops() {
    // одинаковый разбор для символьной и словесной формы
    assert_eq!(
        parse("a != null and b != null").unwrap(),
        parse("a != null && b != null").unwrap()
    );
    assert_eq!(parse("a or b").unwrap(), parse("a || b").unwrap());
}

#[test]
fn precedence_and_over_or() {
    // a or b and c == a or (b and c)
    let expr = parse("a or b and c").unwrap();
    match expr {
        Expr::Binary { op: BinOp::Or, rhs, .. } => match *rhs {
            Expr::Binary { op: BinOp::And, .. } => {}
            other => panic!("ожидали And справа, получили {other:?}"),
        },
        other => panic!("ожидали Or сверху, получили {other:?}"),
    }
}

#[test]
fn parens_override_precedence() {
    let expr = parse("(a or b) and c").unwrap();
    match expr {
        Expr::Binary { op: BinOp::And, .. } => {}
        other => panic!("ожидали And сверху, получили {other:?}"),
    }
}

#[test]
fn identifier_prefixes_of_keywords() {
    // "order" начинается с "or", но это путь
    let p = parse_path("order.total").unwrap();
    assert_eq!(p.head, "order");
    assert!(parse_path("notes").is_ok());
    assert!(parse_path("android").is_ok());
}

#[test]
fn trailing_garbage_is_an_error() {
    assert!(parse("a b").is_err());
    assert!(parse("a )").is_err());
}

#[test]
fn unterminated_string_is_an_error() {
    assert!(parse("'abc").is_err());
}

#[test]
fn string_escapes() {
    assert_eq!(parse(r"'a\'b'").unwrap(), Expr::Str("a'b".into()));
    assert_eq!(parse(r#""a\"b""#).unwrap(), Expr::Str("a\"b".into()));
}
