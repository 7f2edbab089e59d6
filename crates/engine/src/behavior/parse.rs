//! Lexer and recursive-descent parser for the behavior DSL.
//!
//! Grammar (whitespace-insensitive, `#` comments to end of line):
//!
//! ```text
//! program := "behavior" "update" stmt* "end"
//! stmt    := "let" IDENT "=" expr
//!          | ("x" | "y" | "angle") "=" expr
//!          | "advance" expr
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "%") unary)*
//! unary   := "-" unary | primary
//! primary := NUMBER | IDENT | IDENT "(" expr ("," expr)* ")" | "(" expr ")"
//! ```
//!
//! Functions and their arities are resolved here; variable names are not
//! (see the module docs in `behavior`).

use super::BehaviorError;

// ── Tokens ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Equals,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Ident(name) => format!("`{name}`"),
            Token::Plus => "`+`".into(),
            Token::Minus => "`-`".into(),
            Token::Star => "`*`".into(),
            Token::Slash => "`/`".into(),
            Token::Percent => "`%`".into(),
            Token::LParen => "`(`".into(),
            Token::RParen => "`)`".into(),
            Token::Comma => "`,`".into(),
            Token::Equals => "`=`".into(),
        }
    }
}

fn lex(source: &str) -> Result<Vec<(Token, usize)>, BehaviorError> {
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '\n' => {
                line += 1;
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => {
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                }
            }
            '0'..='9' => {
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        text.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = text.parse::<f64>().map_err(|_| BehaviorError::Syntax {
                    line,
                    message: format!("malformed number `{text}`"),
                })?;
                tokens.push((Token::Number(value), line));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Ident(name), line));
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    '=' => Token::Equals,
                    other => {
                        return Err(BehaviorError::Syntax {
                            line,
                            message: format!("unexpected character `{other}`"),
                        });
                    }
                };
                chars.next();
                tokens.push((token, line));
            }
        }
    }

    Ok(tokens)
}

// ── AST ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Expr {
    Number(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Func,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// The closed function table. Nothing outside it is callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Atan2,
    Abs,
    Sqrt,
    Floor,
    Min,
    Max,
    Clamp,
    Pow,
    Hypot,
    Wrap,
    Rand,
    RandRange,
}

impl Func {
    fn lookup(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "atan2" => Func::Atan2,
            "abs" => Func::Abs,
            "sqrt" => Func::Sqrt,
            "floor" => Func::Floor,
            "min" => Func::Min,
            "max" => Func::Max,
            "clamp" => Func::Clamp,
            "pow" => Func::Pow,
            "hypot" => Func::Hypot,
            "wrap" => Func::Wrap,
            "rand" => Func::Rand,
            "rand_range" => Func::RandRange,
            _ => return None,
        })
    }

    fn arity(&self) -> usize {
        match self {
            Func::Rand => 0,
            Func::Sin | Func::Cos | Func::Tan | Func::Abs | Func::Sqrt | Func::Floor
            | Func::Wrap => 1,
            Func::Atan2 | Func::Min | Func::Max | Func::Pow | Func::Hypot | Func::RandRange => 2,
            Func::Clamp => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let(String, Expr),
    SetX(Expr),
    SetY(Expr),
    SetAngle(Expr),
    Advance(Expr),
}

/// A compiled behavior, ready to interpret.
#[derive(Debug, Clone)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

// ── Parser ───────────────────────────────────────────────────────────────

const KEYWORDS: &[&str] = &["behavior", "update", "end", "let", "advance"];

fn is_reserved(name: &str) -> bool {
    KEYWORDS.contains(&name)
        || matches!(name, "x" | "y" | "angle")
        || Func::lookup(name).is_some()
}

pub fn parse(source: &str) -> Result<Program, BehaviorError> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.program()
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn program(&mut self) -> Result<Program, BehaviorError> {
        self.expect_ident("behavior")?;
        self.expect_ident("update")?;

        let mut stmts = Vec::new();
        loop {
            if self.peek_ident("end") {
                self.pos += 1;
                break;
            }
            if self.peek().is_none() {
                return Err(self.error("expected `end` before end of source"));
            }
            stmts.push(self.statement()?);
        }

        if let Some((token, _)) = self.peek() {
            return Err(self.error(format!("unexpected {} after `end`", token.describe())));
        }
        Ok(Program { stmts })
    }

    fn statement(&mut self) -> Result<Stmt, BehaviorError> {
        let Some((token, _)) = self.next() else {
            return Err(self.error("expected a statement, found end of source"));
        };
        let Token::Ident(name) = token else {
            let found = token.describe();
            return Err(self.error(format!("expected a statement, found {found}")));
        };
        match name.as_str() {
            "let" => {
                let target = self.ident()?;
                if is_reserved(&target) {
                    return Err(self.error(format!("`{target}` is a reserved name")));
                }
                self.expect(Token::Equals)?;
                Ok(Stmt::Let(target, self.expression()?))
            }
            "advance" => Ok(Stmt::Advance(self.expression()?)),
            "x" => {
                self.expect(Token::Equals)?;
                Ok(Stmt::SetX(self.expression()?))
            }
            "y" => {
                self.expect(Token::Equals)?;
                Ok(Stmt::SetY(self.expression()?))
            }
            "angle" => {
                self.expect(Token::Equals)?;
                Ok(Stmt::SetAngle(self.expression()?))
            }
            other => Err(self.error(format!(
                "`{other}` cannot start a statement; only x, y and angle are assignable"
            ))),
        }
    }

    fn expression(&mut self) -> Result<Expr, BehaviorError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some((Token::Plus, _)) => BinOp::Add,
                Some((Token::Minus, _)) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(self.term()?),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, BehaviorError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some((Token::Star, _)) => BinOp::Mul,
                Some((Token::Slash, _)) => BinOp::Div,
                Some((Token::Percent, _)) => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(self.unary()?),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, BehaviorError> {
        if matches!(self.peek(), Some((Token::Minus, _))) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, BehaviorError> {
        let Some((token, _)) = self.next() else {
            return Err(self.error("expected an expression, found end of source"));
        };
        match token {
            Token::Number(value) => Ok(Expr::Number(value)),
            Token::LParen => {
                let inner = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Token::Ident(name) => {
                if matches!(self.peek(), Some((Token::LParen, _))) {
                    self.pos += 1;
                    let Some(func) = Func::lookup(&name) else {
                        return Err(self.error(format!("unknown function `{name}`")));
                    };
                    let args = self.arguments()?;
                    if args.len() != func.arity() {
                        return Err(self.error(format!(
                            "`{name}` takes {} argument(s), got {}",
                            func.arity(),
                            args.len()
                        )));
                    }
                    Ok(Expr::Call { func, args })
                } else if is_reserved_keyword(&name) {
                    Err(self.error(format!("`{name}` is not usable in an expression")))
                } else {
                    Ok(Expr::Var(name))
                }
            }
            other => {
                let found = other.describe();
                Err(self.error(format!("expected an expression, found {found}")))
            }
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, BehaviorError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Some((Token::RParen, _))) {
            self.pos += 1;
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            match self.next() {
                Some((Token::Comma, _)) => continue,
                Some((Token::RParen, _)) => break,
                _ => return Err(self.error("expected `,` or `)` in argument list")),
            }
        }
        Ok(args)
    }

    // ── Token helpers ────────────────────────────────────────────────

    fn peek(&self) -> Option<&(Token, usize)> {
        self.tokens.get(self.pos)
    }

    fn peek_ident(&self, expected: &str) -> bool {
        matches!(self.peek(), Some((Token::Ident(name), _)) if name == expected)
    }

    fn next(&mut self) -> Option<(Token, usize)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn ident(&mut self) -> Result<String, BehaviorError> {
        match self.next() {
            Some((Token::Ident(name), _)) => Ok(name),
            Some((other, _)) => {
                let found = other.describe();
                Err(self.error(format!("expected a name, found {found}")))
            }
            None => Err(self.error("expected a name, found end of source")),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), BehaviorError> {
        match self.next() {
            Some((token, _)) if token == expected => Ok(()),
            Some((other, _)) => {
                let found = other.describe();
                let wanted = expected.describe();
                Err(self.error(format!("expected {wanted}, found {found}")))
            }
            None => Err(self.error(format!(
                "expected {}, found end of source",
                expected.describe()
            ))),
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<(), BehaviorError> {
        match self.next() {
            Some((Token::Ident(name), _)) if name == expected => Ok(()),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.error(format!("expected `{expected}` (the entry block is `behavior update … end`)")))
            }
        }
    }

    /// Current line number for error reporting: the token just consumed,
    /// falling back to the last line of the source.
    fn error(&self, message: impl Into<String>) -> BehaviorError {
        let line = self
            .tokens
            .get(self.pos.saturating_sub(1))
            .or_else(|| self.tokens.last())
            .map(|(_, line)| *line)
            .unwrap_or(1);
        BehaviorError::Syntax {
            line,
            message: message.into(),
        }
    }
}

fn is_reserved_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}
