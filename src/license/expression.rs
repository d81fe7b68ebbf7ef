//! SPDX license expression tokenizer and recursive descent parser.
//!
//! Grammar (`WITH` binds tightest, then `AND`, then `OR`):
//! ```text
//! expr     := or_expr
//! or_expr  := and_expr ( "OR" and_expr )*
//! and_expr := atom ( "AND" atom )*
//! atom     := "(" expr ")" | license ( "WITH" exception )?
//! license  := idstring [ "+" ]
//! ```
//!
//! Operators are matched case-insensitively; identifiers are kept verbatim.

use std::fmt;

use thiserror::Error;

/// Boolean connective or exception suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
    With,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::And => write!(f, "AND"),
            Operator::Or => write!(f, "OR"),
            Operator::With => write!(f, "WITH"),
        }
    }
}

/// Reasons an expression fails to parse. Offsets are zero-based character positions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("license expression is empty")]
    Empty,

    #[error("invalid character '{ch}' in license identifier at offset {offset}")]
    InvalidCharacter { ch: char, offset: usize },

    #[error("empty parentheses at offset {0}")]
    EmptyGroup(usize),

    #[error("unclosed '(' at offset {0}")]
    UnclosedParen(usize),

    #[error("unexpected ')' at offset {0}")]
    UnexpectedCloseParen(usize),

    #[error("{op} at offset {offset} is missing an operand")]
    DanglingOperator { op: Operator, offset: usize },

    #[error("expected AND or OR before '{token}' at offset {offset}")]
    MissingOperator { token: String, offset: usize },

    #[error("WITH at offset {0} must be followed by an exception identifier")]
    MissingException(usize),

    #[error("WITH at offset {0} must follow a license identifier, not a group")]
    MisplacedWith(usize),

    #[error("parentheses nested deeper than {max} levels at offset {0}", max = MAX_DEPTH)]
    TooDeep(usize),
}

/// Maximum parenthesis nesting accepted by [`parse`].
pub const MAX_DEPTH: usize = 64;

/// A single license term: `id[+] [WITH exception]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseTerm {
    pub id: String,
    pub or_later: bool,
    pub exception: Option<String>,
}

impl fmt::Display for LicenseTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)?;
        if self.or_later {
            write!(f, "+")?;
        }
        if let Some(exception) = &self.exception {
            write!(f, " WITH {}", exception)?;
        }
        Ok(())
    }
}

/// Parsed expression tree.
///
/// Chains of the same operator are kept flat (`A AND B AND C` is one `And`
/// with three operands), so the tree is only as deep as the parenthesis
/// nesting, which [`parse`] caps at [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    License(LicenseTerm),
    And(Vec<Expression>),
    Or(Vec<Expression>),
}

impl Expression {
    /// All license terms in source order.
    pub fn terms(&self) -> Vec<&LicenseTerm> {
        let mut out = Vec::new();
        self.collect_terms(&mut out);
        out
    }

    fn collect_terms<'a>(&'a self, out: &mut Vec<&'a LicenseTerm>) {
        match self {
            Expression::License(term) => out.push(term),
            Expression::And(operands) | Expression::Or(operands) => {
                for operand in operands {
                    operand.collect_terms(out);
                }
            }
        }
    }
}

impl fmt::Display for Expression {
    /// Canonical form with the minimum parentheses needed to keep the grouping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::License(term) => write!(f, "{}", term),
            Expression::Or(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " OR ")?;
                    }
                    write!(f, "{}", operand)?;
                }
                Ok(())
            }
            Expression::And(operands) => {
                for (i, operand) in operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, " AND ")?;
                    }
                    match operand {
                        Expression::Or(_) => write!(f, "({})", operand)?,
                        _ => write!(f, "{}", operand)?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl std::str::FromStr for Expression {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Tokens produced by [`tokenize`].
#[derive(Debug, PartialEq, Clone)]
enum Token {
    Id(String),
    Op(Operator),
    LParen,
    RParen,
}

#[derive(Debug, Clone)]
struct Spanned {
    token: Token,
    offset: usize,
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '+')
}

/// Tokenize an SPDX license expression into a flat list of positioned tokens.
fn tokenize(expr: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().enumerate().peekable();
    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '(' {
            tokens.push(Spanned { token: Token::LParen, offset });
            chars.next();
        } else if c == ')' {
            tokens.push(Spanned { token: Token::RParen, offset });
            chars.next();
        } else {
            let mut s = String::new();
            while let Some(&(pos, c)) = chars.peek() {
                if c.is_whitespace() || c == '(' || c == ')' {
                    break;
                }
                if !is_id_char(c) {
                    return Err(ExpressionError::InvalidCharacter { ch: c, offset: pos });
                }
                s.push(c);
                chars.next();
            }
            // `+` is only allowed as a trailing "or later" marker
            if let Some(idx) = s.find('+') {
                if idx == 0 || idx != s.len() - 1 {
                    return Err(ExpressionError::InvalidCharacter {
                        ch: '+',
                        offset: offset + s[..idx].chars().count(),
                    });
                }
            }
            let token = if s.eq_ignore_ascii_case("AND") {
                Token::Op(Operator::And)
            } else if s.eq_ignore_ascii_case("OR") {
                Token::Op(Operator::Or)
            } else if s.eq_ignore_ascii_case("WITH") {
                Token::Op(Operator::With)
            } else {
                Token::Id(s)
            };
            tokens.push(Spanned { token, offset });
        }
    }
    Ok(tokens)
}

/// Parse a license expression into an [`Expression`] tree.
pub fn parse(expr: &str) -> Result<Expression, ExpressionError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let mut parser = ExprParser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let tree = parser.parse_or()?;

    match parser.peek() {
        None => Ok(tree),
        Some(next) => Err(parser.unexpected(next.clone())),
    }
}

struct ExprParser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl ExprParser {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.pos)
    }

    fn previous(&self) -> Option<&Spanned> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    fn consume(&mut self) -> Option<Spanned> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    /// Error for a token that follows a complete operand where only an operator or `)` fits.
    fn unexpected(&self, next: Spanned) -> ExpressionError {
        match next.token {
            Token::RParen => ExpressionError::UnexpectedCloseParen(next.offset),
            Token::Op(Operator::With) => ExpressionError::MisplacedWith(next.offset),
            Token::Id(id) => ExpressionError::MissingOperator {
                token: id,
                offset: next.offset,
            },
            Token::LParen => ExpressionError::MissingOperator {
                token: "(".to_string(),
                offset: next.offset,
            },
            // and/or loops consume these, so they never trail an operand
            Token::Op(op) => ExpressionError::DanglingOperator {
                op,
                offset: next.offset,
            },
        }
    }

    /// Parse an OR-level expression (lowest precedence).
    fn parse_or(&mut self) -> Result<Expression, ExpressionError> {
        let mut operands = vec![self.parse_and()?];
        while matches!(self.peek(), Some(Spanned { token: Token::Op(Operator::Or), .. })) {
            self.consume();
            operands.push(self.parse_and()?);
        }
        Ok(Self::chain(operands, Expression::Or))
    }

    /// Parse an AND-level expression (higher precedence than OR).
    fn parse_and(&mut self) -> Result<Expression, ExpressionError> {
        let mut operands = vec![self.parse_atom()?];
        while matches!(self.peek(), Some(Spanned { token: Token::Op(Operator::And), .. })) {
            self.consume();
            operands.push(self.parse_atom()?);
        }
        Ok(Self::chain(operands, Expression::And))
    }

    /// A lone operand stands for itself; two or more become one flat node.
    fn chain(
        mut operands: Vec<Expression>,
        node: fn(Vec<Expression>) -> Expression,
    ) -> Expression {
        if operands.len() == 1 {
            if let Some(single) = operands.pop() {
                return single;
            }
        }
        node(operands)
    }

    /// Parse an atom: a parenthesised sub-expression or a single license term.
    fn parse_atom(&mut self) -> Result<Expression, ExpressionError> {
        let Some(next) = self.peek().cloned() else {
            return Err(self.missing_operand());
        };

        match next.token {
            Token::LParen => {
                self.consume();
                if self.depth == MAX_DEPTH {
                    return Err(ExpressionError::TooDeep(next.offset));
                }
                self.depth += 1;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.consume() {
                    Some(Spanned { token: Token::RParen, .. }) => {}
                    Some(other) => return Err(self.unexpected(other)),
                    None => return Err(ExpressionError::UnclosedParen(next.offset)),
                }
                if let Some(Spanned { token: Token::Op(Operator::With), offset }) = self.peek() {
                    return Err(ExpressionError::MisplacedWith(*offset));
                }
                Ok(inner)
            }
            Token::Id(raw) => {
                self.consume();
                let (id, or_later) = match raw.strip_suffix('+') {
                    Some(base) => (base.to_string(), true),
                    None => (raw, false),
                };
                let exception = self.parse_exception()?;
                Ok(Expression::License(LicenseTerm {
                    id,
                    or_later,
                    exception,
                }))
            }
            Token::RParen => Err(match self.previous() {
                Some(Spanned { token: Token::LParen, offset }) => {
                    ExpressionError::EmptyGroup(*offset)
                }
                Some(Spanned { token: Token::Op(op), offset }) => ExpressionError::DanglingOperator {
                    op: *op,
                    offset: *offset,
                },
                _ => ExpressionError::UnexpectedCloseParen(next.offset),
            }),
            Token::Op(op) => Err(ExpressionError::DanglingOperator {
                op,
                offset: next.offset,
            }),
        }
    }

    /// Parse an optional `WITH <exception>` suffix after a license identifier.
    fn parse_exception(&mut self) -> Result<Option<String>, ExpressionError> {
        let Some(Spanned { token: Token::Op(Operator::With), offset }) = self.peek().cloned()
        else {
            return Ok(None);
        };
        self.consume();
        match self.consume() {
            // `+` means "or later" and only applies to licenses
            Some(Spanned { token: Token::Id(exception), offset }) if exception.ends_with('+') => {
                Err(ExpressionError::InvalidCharacter {
                    ch: '+',
                    offset: offset + exception.chars().count() - 1,
                })
            }
            Some(Spanned { token: Token::Id(exception), .. }) => Ok(Some(exception)),
            _ => Err(ExpressionError::MissingException(offset)),
        }
    }

    /// Error for running out of input where an operand was required.
    fn missing_operand(&self) -> ExpressionError {
        match self.previous() {
            Some(Spanned { token: Token::LParen, offset }) => ExpressionError::UnclosedParen(*offset),
            Some(Spanned { token: Token::Op(op), offset }) => ExpressionError::DanglingOperator {
                op: *op,
                offset: *offset,
            },
            _ => ExpressionError::Empty,
        }
    }
}
