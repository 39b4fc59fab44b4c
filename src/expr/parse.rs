use std::borrow::Cow;

use super::{BinOp, Error, Expr, PathExpr, PathStep, Result, UnaryOp};

/// Разбор выражения целиком. Остаток после выражения — ошибка.
pub fn parse(input: &str) -> Result<Expr> {
    let mut p = Parser::new(input);
    let expr = p.parse_or()?;
    p.skip_ws();
    if !p.at_end() {
        return Err(p.err("unexpected trailing input"));
    }
    Ok(expr)
}

/// Разбор «чистого» пути к свойству (тело `#{...}` до атрибутов).
pub fn parse_path(input: &str) -> Result<PathExpr> {
    match parse(input)? {
        Expr::Path(path) => Ok(path),
        _ => Err(Error::NotAPath {
            expr: input.to_string(),
        }),
    }
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn err(&self, reason: impl Into<Cow<'static, str>>) -> Error {
        Error::Parse {
            expr: self.src.to_string(),
            pos: self.pos,
            reason: reason.into(),
        }
    }

    #[inline]
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Съесть литеральную последовательность, если она следующая.
    fn eat(&mut self, tok: &str) -> bool {
        if self.src[self.pos..].starts_with(tok) {
            self.pos += tok.len();
            true
        } else {
            false
        }
    }

    /// Съесть ключевое слово (за ним не должно идти «словесного» символа).
    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.src[self.pos..].starts_with(kw) {
            let after = self.bytes.get(self.pos + kw.len()).copied();
            let boundary = match after {
                None => true,
                Some(b) => !(b.is_ascii_alphanumeric() || b == b'_'),
            };
            if boundary {
                self.pos += kw.len();
                return true;
            }
        }
        false
    }

    // or -> and -> equality -> relational -> additive -> unary -> primary
    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        loop {
            self.skip_ws();
            if self.eat("||") || self.eat_keyword("or") {
                let rhs = self.parse_and()?;
                lhs = binary(BinOp::Or, lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_equality()?;
        loop {
            self.skip_ws();
            if self.eat("&&") || self.eat_keyword("and") {
                let rhs = self.parse_equality()?;
                lhs = binary(BinOp::And, lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_equality(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_relational()?;
        loop {
            self.skip_ws();
            if self.eat("==") {
                let rhs = self.parse_relational()?;
                lhs = binary(BinOp::Eq, lhs, rhs);
            } else if self.eat("!=") {
                let rhs = self.parse_relational()?;
                lhs = binary(BinOp::Ne, lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_relational(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_additive()?;
        loop {
            self.skip_ws();
            // порядок важен: "<=" раньше "<"
            if self.eat("<=") {
                let rhs = self.parse_additive()?;
                lhs = binary(BinOp::Le, lhs, rhs);
            } else if self.eat(">=") {
                let rhs = self.parse_additive()?;
                lhs = binary(BinOp::Ge, lhs, rhs);
            } else if self.peek() == Some(b'<') {
                self.pos += 1;
                let rhs = self.parse_additive()?;
                lhs = binary(BinOp::Lt, lhs, rhs);
            } else if self.peek() == Some(b'>') {
                self.pos += 1;
                let rhs = self.parse_additive()?;
                lhs = binary(BinOp::Gt, lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            self.skip_ws();
            if self.peek() == Some(b'+') {
                self.pos += 1;
                let rhs = self.parse_unary()?;
                lhs = binary(BinOp::Add, lhs, rhs);
            } else if self.peek() == Some(b'-') {
                self.pos += 1;
                let rhs = self.parse_unary()?;
                lhs = binary(BinOp::Sub, lhs, rhs);
            } else {
                return Ok(lhs);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        self.skip_ws();
        if self.eat_keyword("not") {
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(inner),
            });
        }
        // "!" но не "!="
        if self.peek() == Some(b'!') && self.bytes.get(self.pos + 1) != Some(&b'=') {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                expr: Box::new(inner),
            });
        }
        if self.peek() == Some(b'-') {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::Unary {
                op: UnaryOp::Neg,
                expr: Box::new(inner),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.err("unexpected end of expression")),
            Some(b'(') => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.skip_ws();
                if !self.eat(")") {
                    return Err(self.err("expected ')'"));
                }
                Ok(inner)
            }
            Some(b'\'') | Some(b'"') => self.parse_string().map(Expr::Str),
            Some(b) if b.is_ascii_digit() => self.parse_number(),
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => {
                if self.eat_keyword("null") {
                    return Ok(Expr::Null);
                }
                if self.eat_keyword("true") {
                    return Ok(Expr::Bool(true));
                }
                if self.eat_keyword("false") {
                    return Ok(Expr::Bool(false));
                }
                let head = self.parse_ident()?;
                let steps = self.parse_path_steps()?;
                Ok(Expr::Path(PathExpr { head, steps }))
            }
            Some(_) => Err(self.err("unexpected character")),
        }
    }

    fn parse_ident(&mut self) -> Result<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.err("expected identifier"));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn parse_path_steps(&mut self) -> Result<Vec<PathStep>> {
        let mut steps = Vec::new();
        loop {
            match self.peek() {
                Some(b'.') => {
                    self.pos += 1;
                    steps.push(PathStep::Member(self.parse_ident()?));
                }
                Some(b'[') => {
                    self.pos += 1;
                    self.skip_ws();
                    match self.peek() {
                        Some(b'\'') | Some(b'"') => {
                            let key = self.parse_string()?;
                            self.skip_ws();
                            if !self.eat("]") {
                                return Err(self.err("expected ']'"));
                            }
                            steps.push(PathStep::Key(key));
                        }
                        Some(b) if b.is_ascii_digit() => {
                            let start = self.pos;
                            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                                self.pos += 1;
                            }
                            let idx: usize = self.src[start..self.pos]
                                .parse()
                                .map_err(|_| self.err("index out of range"))?;
                            self.skip_ws();
                            if !self.eat("]") {
                                return Err(self.err("expected ']'"));
                            }
                            steps.push(PathStep::Index(idx));
                        }
                        _ => return Err(self.err("expected index or quoted key")),
                    }
                }
                _ => return Ok(steps),
            }
        }
    }

    fn parse_number(&mut self) -> Result<Expr> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut is_float = false;
        // дробная часть: точка + цифра (иначе это шаг пути)
        if self.peek() == Some(b'.')
            && matches!(self.bytes.get(self.pos + 1), Some(b) if b.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        let text = &self.src[start..self.pos];
        if is_float {
            text.parse::<f64>()
                .map(Expr::Float)
                .map_err(|_| self.err("malformed number"))
        } else {
            text.parse::<i64>()
                .map(Expr::Int)
                .map_err(|_| self.err("integer out of range"))
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        let quote = self.peek().expect("caller checked quote");
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.err("unterminated string literal")),
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'\\') => out.push('\\'),
                        Some(b'\'') => out.push('\''),
                        Some(b'"') => out.push('"'),
                        Some(b'n') => out.push('\n'),
                        Some(b't') => out.push('\t'),
                        _ => return Err(self.err("unknown escape in string literal")),
                    }
                    self.pos += 1;
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(_) => {
                    // кусок до следующего спец-символа, чтобы не байтить по одному
                    let rest = &self.src[self.pos..];
                    let stop = rest
                        .find(|c: char| c == quote as char || c == '\\')
                        .unwrap_or(rest.len());
                    out.push_str(&rest[..stop]);
                    self.pos += stop;
                }
            }
        }
    }
}

#[inline]
fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}
