//! AST types for path queries.
//!
//! The AST is produced by the parser and consumed by the evaluator. `//` is
//! desugared at parse time into a `descendant-or-self::node()` step, and `.`
//! / `..` into `self::node()` / `parent::node()`.

use std::fmt;

/// Expression AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Logical combination: `left or right`, `left and right`.
    Logical {
        /// Logical operator.
        op: LogicalOp,
        /// Left-hand expression.
        left: Box<Expr>,
        /// Right-hand expression.
        right: Box<Expr>,
    },
    /// Comparison: `left op right`.
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Left-hand expression.
        left: Box<Expr>,
        /// Right-hand expression.
        right: Box<Expr>,
    },
    /// Arithmetic: `left op right`.
    Arith {
        /// Arithmetic operator.
        op: ArithOp,
        /// Left-hand expression.
        left: Box<Expr>,
        /// Right-hand expression.
        right: Box<Expr>,
    },
    /// Unary minus.
    Negate(Box<Expr>),
    /// Node-set union: `left | right`.
    Union(Box<Expr>, Box<Expr>),
    /// A location path.
    Path(LocationPath),
    /// A primary expression with predicates, optionally followed by more steps.
    Filter {
        /// The filtered expression.
        primary: Box<Expr>,
        /// Predicates applied to the primary result.
        predicates: Vec<Expr>,
        /// Steps applied after the predicates.
        steps: Vec<Step>,
    },
    /// String literal.
    Literal(String),
    /// Number literal.
    Number(f64),
    /// Function call.
    Function {
        /// Function name.
        name: FunctionName,
        /// Arguments.
        args: Vec<Expr>,
    },
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `or`
    Or,
    /// `and`
    And,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    /// The operator with its operands swapped (`a < b` is `b > a`).
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `div`
    Div,
    /// `mod`
    Mod,
}

/// A location path: optional leading `/` and a sequence of steps.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Whether the path starts at the document root.
    pub absolute: bool,
    /// Steps in order.
    pub steps: Vec<Step>,
}

/// One step of a location path.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Direction of travel.
    pub axis: Axis,
    /// Which nodes on the axis are kept.
    pub test: NodeTest,
    /// Filters applied in axis order.
    pub predicates: Vec<Expr>,
}

impl Step {
    /// A step with no predicates.
    #[must_use]
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }
}

/// Supported axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `child::`
    Child,
    /// `descendant::`
    Descendant,
    /// `descendant-or-self::`
    DescendantOrSelf,
    /// `self::`
    SelfAxis,
    /// `parent::`
    Parent,
    /// `ancestor::`
    Ancestor,
    /// `ancestor-or-self::`
    AncestorOrSelf,
    /// `attribute::` or `@`
    Attribute,
    /// `following-sibling::`
    FollowingSibling,
    /// `preceding-sibling::`
    PrecedingSibling,
}

impl Axis {
    /// Look up an axis by its name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "child" => Self::Child,
            "descendant" => Self::Descendant,
            "descendant-or-self" => Self::DescendantOrSelf,
            "self" => Self::SelfAxis,
            "parent" => Self::Parent,
            "ancestor" => Self::Ancestor,
            "ancestor-or-self" => Self::AncestorOrSelf,
            "attribute" => Self::Attribute,
            "following-sibling" => Self::FollowingSibling,
            "preceding-sibling" => Self::PrecedingSibling,
            _ => return None,
        })
    }

    /// Whether proximity positions count backwards from the context node.
    #[must_use]
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Self::Ancestor | Self::AncestorOrSelf | Self::PrecedingSibling | Self::Parent
        )
    }
}

/// Node tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A specific name.
    Name(String),
    /// `*`: any node of the axis' principal type.
    Wildcard,
    /// `text()`
    Text,
    /// `node()`
    Node,
}

/// Built-in functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    /// `string(object?)`
    String,
    /// `name(node-set?)`
    Name,
    /// `local-name(node-set?)`
    LocalName,
    /// `count(node-set)`
    Count,
    /// `concat(string, string, string*)`
    Concat,
    /// `normalize-space(string?)`
    NormalizeSpace,
    /// `contains(string, string)`
    Contains,
    /// `starts-with(string, string)`
    StartsWith,
    /// `substring(string, number, number?)`
    Substring,
    /// `substring-before(string, string)`
    SubstringBefore,
    /// `substring-after(string, string)`
    SubstringAfter,
    /// `string-length(string?)`
    StringLength,
    /// `translate(string, string, string)`
    Translate,
    /// `sum(node-set)`
    Sum,
    /// `number(object?)`
    Number,
    /// `boolean(object)`
    Boolean,
    /// `not(boolean)`
    Not,
    /// `true()`
    True,
    /// `false()`
    False,
    /// `position()`
    Position,
    /// `last()`
    Last,
    /// `floor(number)`
    Floor,
    /// `ceiling(number)`
    Ceiling,
    /// `round(number)`
    Round,
}

impl FunctionName {
    /// Look up a function by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => Self::String,
            "name" => Self::Name,
            "local-name" => Self::LocalName,
            "count" => Self::Count,
            "concat" => Self::Concat,
            "normalize-space" => Self::NormalizeSpace,
            "contains" => Self::Contains,
            "starts-with" => Self::StartsWith,
            "substring" => Self::Substring,
            "substring-before" => Self::SubstringBefore,
            "substring-after" => Self::SubstringAfter,
            "string-length" => Self::StringLength,
            "translate" => Self::Translate,
            "sum" => Self::Sum,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "not" => Self::Not,
            "true" => Self::True,
            "false" => Self::False,
            "position" => Self::Position,
            "last" => Self::Last,
            "floor" => Self::Floor,
            "ceiling" => Self::Ceiling,
            "round" => Self::Round,
            _ => return None,
        })
    }

    /// Accepted argument counts as an inclusive range (`usize::MAX` = unbounded).
    #[must_use]
    pub fn arity(self) -> (usize, usize) {
        match self {
            Self::True | Self::False | Self::Position | Self::Last => (0, 0),
            Self::String
            | Self::Name
            | Self::LocalName
            | Self::NormalizeSpace
            | Self::StringLength
            | Self::Number => (0, 1),
            Self::Count
            | Self::Sum
            | Self::Boolean
            | Self::Not
            | Self::Floor
            | Self::Ceiling
            | Self::Round => (1, 1),
            Self::Contains | Self::StartsWith | Self::SubstringBefore | Self::SubstringAfter => {
                (2, 2)
            }
            Self::Substring => (2, 3),
            Self::Translate => (3, 3),
            Self::Concat => (2, usize::MAX),
        }
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Name => "name",
            Self::LocalName => "local-name",
            Self::Count => "count",
            Self::Concat => "concat",
            Self::NormalizeSpace => "normalize-space",
            Self::Contains => "contains",
            Self::StartsWith => "starts-with",
            Self::Substring => "substring",
            Self::SubstringBefore => "substring-before",
            Self::SubstringAfter => "substring-after",
            Self::StringLength => "string-length",
            Self::Translate => "translate",
            Self::Sum => "sum",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Not => "not",
            Self::True => "true",
            Self::False => "false",
            Self::Position => "position",
            Self::Last => "last",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::Round => "round",
        };
        f.write_str(name)
    }
}
