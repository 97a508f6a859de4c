//! Lexer and recursive-descent parser for path queries.
//!
//! The lexer resolves the two classic ambiguities of the grammar: `*` is a
//! multiplication and `and`/`or`/`div`/`mod` are operators only when a
//! preceding token exists and is not `@`, `::`, `(`, `[`, `,` or another
//! operator.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::ast::{ArithOp, Axis, CompareOp, Expr, FunctionName, LocationPath, LogicalOp, NodeTest, Step};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors produced while parsing or evaluating a path query.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum XPathError {
    /// A character that cannot start any token.
    #[error("Unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar {
        /// The offending character.
        ch: char,
        /// Byte offset in the query.
        offset: usize,
    },
    /// A string literal without its closing quote.
    #[error("Unterminated string literal")]
    UnterminatedLiteral,
    /// An unexpected token was encountered.
    #[error("Unexpected token: expected {expected}, found {found}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },
    /// A function name that is not supported.
    #[error("Unknown function: {name}")]
    UnknownFunction {
        /// The function name.
        name: String,
    },
    /// An axis name that is not supported.
    #[error("Unknown axis: {name}")]
    UnknownAxis {
        /// The axis name.
        name: String,
    },
    /// A function called with the wrong number of arguments.
    #[error("Wrong number of arguments for {function}(): expected {expected}, found {found}")]
    WrongArity {
        /// The function name.
        function: String,
        /// Accepted argument counts.
        expected: String,
        /// Supplied argument count.
        found: usize,
    },
    /// Syntax that is valid XPath but not supported here.
    #[error("Unsupported feature: {0}")]
    Unsupported(String),
    /// The query nests sub-expressions beyond the supported depth.
    #[error("Query nests deeper than {limit} levels")]
    TooDeep {
        /// The maximum nesting depth.
        limit: usize,
    },
    /// A value of the wrong type was supplied during evaluation.
    #[error("Type mismatch: {message}")]
    TypeMismatch {
        /// Explanation.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Token type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Dot,
    DotDot,
    At,
    Comma,
    DoubleColon,
    Pipe,
    Plus,
    Minus,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// `*` as a name test.
    Star,
    /// `*` as multiplication.
    Multiply,
    And,
    Or,
    Div,
    Mod,
    Name(String),
    Literal(String),
    Number(f64),
    Eof,
}

impl Token {
    fn is_operator(&self) -> bool {
        matches!(
            self,
            Self::And
                | Self::Or
                | Self::Div
                | Self::Mod
                | Self::Multiply
                | Self::Slash
                | Self::DoubleSlash
                | Self::Pipe
                | Self::Plus
                | Self::Minus
                | Self::Eq
                | Self::Ne
                | Self::Lt
                | Self::Le
                | Self::Gt
                | Self::Ge
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slash => write!(f, "'/'"),
            Self::DoubleSlash => write!(f, "'//'"),
            Self::LParen => write!(f, "'('"),
            Self::RParen => write!(f, "')'"),
            Self::LBracket => write!(f, "'['"),
            Self::RBracket => write!(f, "']'"),
            Self::Dot => write!(f, "'.'"),
            Self::DotDot => write!(f, "'..'"),
            Self::At => write!(f, "'@'"),
            Self::Comma => write!(f, "','"),
            Self::DoubleColon => write!(f, "'::'"),
            Self::Pipe => write!(f, "'|'"),
            Self::Plus => write!(f, "'+'"),
            Self::Minus => write!(f, "'-'"),
            Self::Eq => write!(f, "'='"),
            Self::Ne => write!(f, "'!='"),
            Self::Lt => write!(f, "'<'"),
            Self::Le => write!(f, "'<='"),
            Self::Gt => write!(f, "'>'"),
            Self::Ge => write!(f, "'>='"),
            Self::Star | Self::Multiply => write!(f, "'*'"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Div => write!(f, "div"),
            Self::Mod => write!(f, "mod"),
            Self::Name(s) => write!(f, "name '{s}'"),
            Self::Literal(s) => write!(f, "literal \"{s}\""),
            Self::Number(n) => write!(f, "{n}"),
            Self::Eof => write!(f, "EOF"),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexer
// ---------------------------------------------------------------------------

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, XPathError> {
        loop {
            let tok = self.next_token()?;
            let done = tok == Token::Eof;
            self.tokens.push(tok);
            if done {
                return Ok(self.tokens);
            }
        }
    }

    /// Whether the next `*` or operator-like name is an operator.
    fn in_operator_position(&self) -> bool {
        match self.tokens.last() {
            None => false,
            Some(prev) => {
                !(prev.is_operator()
                    || matches!(
                        prev,
                        Token::At | Token::DoubleColon | Token::LParen | Token::LBracket | Token::Comma
                    ))
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    /// Consume `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        if self.peek_char() == Some(ch) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Token, XPathError> {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.chars.next();
        }

        let Some(&(offset, ch)) = self.chars.peek() else {
            return Ok(Token::Eof);
        };

        let simple = match ch {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            '[' => Some(Token::LBracket),
            ']' => Some(Token::RBracket),
            '@' => Some(Token::At),
            ',' => Some(Token::Comma),
            '|' => Some(Token::Pipe),
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(tok) = simple {
            self.chars.next();
            return Ok(tok);
        }

        match ch {
            '/' => {
                self.chars.next();
                Ok(if self.eat('/') { Token::DoubleSlash } else { Token::Slash })
            }
            '<' => {
                self.chars.next();
                Ok(if self.eat('=') { Token::Le } else { Token::Lt })
            }
            '>' => {
                self.chars.next();
                Ok(if self.eat('=') { Token::Ge } else { Token::Gt })
            }
            '!' => {
                self.chars.next();
                if self.eat('=') {
                    Ok(Token::Ne)
                } else {
                    Err(XPathError::UnexpectedChar { ch, offset })
                }
            }
            ':' => {
                self.chars.next();
                if self.eat(':') {
                    Ok(Token::DoubleColon)
                } else {
                    Err(XPathError::UnexpectedChar { ch, offset })
                }
            }
            '*' => {
                self.chars.next();
                Ok(if self.in_operator_position() {
                    Token::Multiply
                } else {
                    Token::Star
                })
            }
            '.' => {
                if self.peek_second().is_some_and(|c| c.is_ascii_digit()) {
                    return Ok(self.read_number());
                }
                self.chars.next();
                Ok(if self.eat('.') { Token::DotDot } else { Token::Dot })
            }
            '"' | '\'' => self.read_literal(ch),
            '$' => Err(XPathError::Unsupported("variable references".to_owned())),
            c if c.is_ascii_digit() => Ok(self.read_number()),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_name()),
            _ => Err(XPathError::UnexpectedChar { ch, offset }),
        }
    }

    fn read_literal(&mut self, quote: char) -> Result<Token, XPathError> {
        self.chars.next();
        let mut value = String::new();
        for (_, c) in self.chars.by_ref() {
            if c == quote {
                return Ok(Token::Literal(value));
            }
            value.push(c);
        }
        Err(XPathError::UnterminatedLiteral)
    }

    fn read_number(&mut self) -> Token {
        let start = self.chars.peek().map_or(self.input.len(), |&(i, _)| i);
        let mut end = start;
        let mut seen_dot = false;
        while let Some(&(i, c)) = self.chars.peek() {
            if c.is_ascii_digit() || (c == '.' && !seen_dot) {
                seen_dot |= c == '.';
                end = i + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        Token::Number(self.input[start..end].parse().unwrap_or(f64::NAN))
    }

    fn read_name(&mut self) -> Token {
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            let qname_colon = c == ':'
                && self.peek_second().is_some_and(|n| n.is_alphabetic() || n == '_');
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') || qname_colon {
                name.push(c);
                self.chars.next();
            } else {
                break;
            }
        }

        if self.in_operator_position() {
            match name.as_str() {
                "and" => return Token::And,
                "or" => return Token::Or,
                "div" => return Token::Div,
                "mod" => return Token::Mod,
                _ => {}
            }
        }
        Token::Name(name)
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse a path query into an expression AST.
///
/// # Errors
///
/// Returns `XPathError` if the query is not valid in the supported grammar.
pub fn parse_xpath(input: &str) -> Result<Expr, XPathError> {
    let tokens = Lexer::new(input).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.parse_or()?;
    parser.expect(&Token::Eof, "end of expression")?;
    Ok(expr)
}

/// Maximum nesting of parenthesized groups, predicates, call arguments,
/// unary minus and chained operators.
const MAX_DEPTH: usize = 128;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: &Token, what: &str) -> Result<(), XPathError> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> XPathError {
        XPathError::UnexpectedToken {
            expected: expected.to_owned(),
            found: self.peek().to_string(),
        }
    }

    fn descend(&mut self) -> Result<(), XPathError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(XPathError::TooDeep { limit: MAX_DEPTH });
        }
        Ok(())
    }

    /// Entry point for every nested expression; chained operators below it
    /// count towards its depth until it returns.
    fn parse_or(&mut self) -> Result<Expr, XPathError> {
        let base = self.depth;
        self.descend()?;
        let expr = self.parse_or_chain();
        self.depth = base;
        expr
    }

    fn parse_or_chain(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_and()?;
        while *self.peek() == Token::Or {
            self.advance();
            self.descend()?;
            let right = self.parse_and()?;
            left = Expr::Logical {
                op: LogicalOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_equality()?;
        while *self.peek() == Token::And {
            self.advance();
            self.descend()?;
            let right = self.parse_equality()?;
            left = Expr::Logical {
                op: LogicalOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Token::Eq => CompareOp::Eq,
                Token::Ne => CompareOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            self.descend()?;
            let right = self.parse_relational()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Token::Lt => CompareOp::Lt,
                Token::Le => CompareOp::Le,
                Token::Gt => CompareOp::Gt,
                Token::Ge => CompareOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            self.descend()?;
            let right = self.parse_additive()?;
            left = Expr::Compare {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Token::Plus => ArithOp::Add,
                Token::Minus => ArithOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Token::Multiply => ArithOp::Mul,
                Token::Div => ArithOp::Div,
                Token::Mod => ArithOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            self.descend()?;
            let right = self.parse_unary()?;
            left = Expr::Arith {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, XPathError> {
        if *self.peek() == Token::Minus {
            self.advance();
            self.descend()?;
            let inner = self.parse_unary()?;
            return Ok(Expr::Negate(Box::new(inner)));
        }
        self.parse_union()
    }

    fn parse_union(&mut self) -> Result<Expr, XPathError> {
        let mut left = self.parse_path_expr()?;
        while *self.peek() == Token::Pipe {
            self.advance();
            self.descend()?;
            let right = self.parse_path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    /// Whether the upcoming tokens begin a location step.
    fn starts_step(&self) -> bool {
        match self.peek() {
            Token::Dot | Token::DotDot | Token::At | Token::Star => true,
            Token::Name(name) => match self.peek_at(1) {
                Token::LParen => matches!(name.as_str(), "text" | "node"),
                _ => true,
            },
            _ => false,
        }
    }

    fn parse_path_expr(&mut self) -> Result<Expr, XPathError> {
        match self.peek() {
            Token::Slash => {
                self.advance();
                let steps = if self.starts_step() {
                    self.parse_relative_steps()?
                } else {
                    Vec::new()
                };
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            Token::DoubleSlash => {
                self.advance();
                let mut steps = vec![descendant_or_self()];
                steps.extend(self.parse_relative_steps()?);
                Ok(Expr::Path(LocationPath {
                    absolute: true,
                    steps,
                }))
            }
            _ if self.starts_step() => Ok(Expr::Path(LocationPath {
                absolute: false,
                steps: self.parse_relative_steps()?,
            })),
            _ => self.parse_filter_expr(),
        }
    }

    fn parse_filter_expr(&mut self) -> Result<Expr, XPathError> {
        let primary = self.parse_primary()?;
        let predicates = self.parse_predicates()?;

        let mut steps = Vec::new();
        match self.peek() {
            Token::Slash => {
                self.advance();
                steps = self.parse_relative_steps()?;
            }
            Token::DoubleSlash => {
                self.advance();
                steps.push(descendant_or_self());
                steps.extend(self.parse_relative_steps()?);
            }
            _ => {}
        }

        if predicates.is_empty() && steps.is_empty() {
            return Ok(primary);
        }
        Ok(Expr::Filter {
            primary: Box::new(primary),
            predicates,
            steps,
        })
    }

    fn parse_relative_steps(&mut self) -> Result<Vec<Step>, XPathError> {
        let mut steps = vec![self.parse_step()?];
        loop {
            match self.peek() {
                Token::Slash => {
                    self.advance();
                    steps.push(self.parse_step()?);
                }
                Token::DoubleSlash => {
                    self.advance();
                    steps.push(descendant_or_self());
                    steps.push(self.parse_step()?);
                }
                _ => return Ok(steps),
            }
        }
    }

    fn parse_step(&mut self) -> Result<Step, XPathError> {
        match self.peek() {
            Token::Dot => {
                self.advance();
                return Ok(Step::new(Axis::SelfAxis, NodeTest::Node));
            }
            Token::DotDot => {
                self.advance();
                return Ok(Step::new(Axis::Parent, NodeTest::Node));
            }
            _ => {}
        }

        let explicit_axis = *self.peek_at(1) == Token::DoubleColon;
        let axis = match self.peek().clone() {
            Token::At => {
                self.advance();
                Axis::Attribute
            }
            Token::Name(name) if explicit_axis => {
                let axis = Axis::from_name(&name).ok_or(XPathError::UnknownAxis { name })?;
                self.advance();
                self.advance();
                axis
            }
            _ => Axis::Child,
        };

        let test = self.parse_node_test()?;
        let predicates = self.parse_predicates()?;
        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_node_test(&mut self) -> Result<NodeTest, XPathError> {
        match self.peek().clone() {
            Token::Star => {
                self.advance();
                Ok(NodeTest::Wildcard)
            }
            Token::Name(name) => {
                self.advance();
                if *self.peek() != Token::LParen {
                    return Ok(NodeTest::Name(name));
                }
                let test = match name.as_str() {
                    "text" => NodeTest::Text,
                    "node" => NodeTest::Node,
                    _ => return Err(XPathError::Unsupported(format!("node type test {name}()"))),
                };
                self.advance();
                self.expect(&Token::RParen, "')'")?;
                Ok(test)
            }
            _ => Err(self.unexpected("node test")),
        }
    }

    fn parse_predicates(&mut self) -> Result<Vec<Expr>, XPathError> {
        let mut predicates = Vec::new();
        while *self.peek() == Token::LBracket {
            self.advance();
            predicates.push(self.parse_or()?);
            self.expect(&Token::RBracket, "']'")?;
        }
        Ok(predicates)
    }

    fn parse_primary(&mut self) -> Result<Expr, XPathError> {
        match self.peek().clone() {
            Token::LParen => {
                self.advance();
                let expr = self.parse_or()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Literal(value) => {
                self.advance();
                Ok(Expr::Literal(value))
            }
            Token::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            Token::Name(name) if *self.peek_at(1) == Token::LParen => {
                self.advance();
                self.advance();
                self.parse_function_call(&name)
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Parse call arguments; the name and `(` are already consumed.
    fn parse_function_call(&mut self, name: &str) -> Result<Expr, XPathError> {
        let function = FunctionName::from_name(name).ok_or_else(|| XPathError::UnknownFunction {
            name: name.to_owned(),
        })?;

        let mut args = Vec::new();
        if *self.peek() != Token::RParen {
            loop {
                args.push(self.parse_or()?);
                if *self.peek() == Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;

        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            let expected = if max == usize::MAX {
                format!("at least {min}")
            } else if min == max {
                min.to_string()
            } else {
                format!("{min} to {max}")
            };
            return Err(XPathError::WrongArity {
                function: function.to_string(),
                expected,
                found: args.len(),
            });
        }

        Ok(Expr::Function {
            name: function,
            args,
        })
    }
}

fn descendant_or_self() -> Step {
    Step::new(Axis::DescendantOrSelf, NodeTest::Node)
}
