//! Path-query evaluator.
//!
//! Walks the AST against a [`Document`], producing one of the four XPath value
//! types. Node-sets are always kept in document order without duplicates.

use crate::document::{Document, NodeId, NodeKind};

use super::ast::{ArithOp, Axis, CompareOp, Expr, FunctionName, LocationPath, LogicalOp, NodeTest, Step};
use super::parser::{XPathError, parse_xpath};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// Result of evaluating a path query.
#[derive(Debug, Clone, PartialEq)]
pub enum XValue {
    /// Nodes in document order.
    NodeSet(Vec<NodeId>),
    /// A string.
    String(String),
    /// A double-precision number.
    Number(f64),
    /// A boolean.
    Boolean(bool),
}

impl XValue {
    /// Convert to a string per the XPath `string()` rules.
    #[must_use]
    pub fn into_string(self, doc: &Document) -> String {
        match self {
            Self::NodeSet(nodes) => nodes.first().map(|&n| doc.string_value(n)).unwrap_or_default(),
            Self::String(s) => s,
            Self::Number(n) => format_number(n),
            Self::Boolean(b) => b.to_string(),
        }
    }

    /// Convert to a number per the XPath `number()` rules.
    #[must_use]
    pub fn to_number(&self, doc: &Document) -> f64 {
        match self {
            Self::NodeSet(_) => parse_number(&self.clone().into_string(doc)),
            Self::String(s) => parse_number(s),
            Self::Number(n) => *n,
            Self::Boolean(b) => f64::from(u8::from(*b)),
        }
    }

    /// Convert to a boolean per the XPath `boolean()` rules.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::NodeSet(nodes) => !nodes.is_empty(),
            Self::String(s) => !s.is_empty(),
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Boolean(b) => *b,
        }
    }
}

/// Format a number the way XPath `string()` does.
#[must_use]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    format!("{n}")
}

/// Parse a string the way XPath `number()` does: optional minus, digits, one dot.
#[must_use]
pub fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    let valid = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits.chars().any(|c| c.is_ascii_digit());
    if valid {
        s.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

// ---------------------------------------------------------------------------
// Evaluation context
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Context {
    node: NodeId,
    position: usize,
    size: usize,
}

impl Document {
    /// Evaluate a parsed expression with the document root as context node.
    ///
    /// # Errors
    ///
    /// Returns `XPathError::TypeMismatch` if a node-set is required where
    /// another value type was produced.
    pub fn evaluate(&self, expr: &Expr) -> Result<XValue, XPathError> {
        let ctx = Context {
            node: NodeId::ROOT,
            position: 1,
            size: 1,
        };
        Evaluator { doc: self }.eval(expr, ctx)
    }

    /// Parse and evaluate a query with the document root as context node.
    ///
    /// # Errors
    ///
    /// Returns `XPathError` if the query fails to parse or evaluate.
    pub fn evaluate_query(&self, query: &str) -> Result<XValue, XPathError> {
        let expr = parse_xpath(query)?;
        self.evaluate(&expr)
    }
}

struct Evaluator<'d> {
    doc: &'d Document,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr, ctx: Context) -> Result<XValue, XPathError> {
        match expr {
            Expr::Logical { op, left, right } => {
                let l = self.eval(left, ctx)?.to_boolean();
                let value = match op {
                    LogicalOp::Or => l || self.eval(right, ctx)?.to_boolean(),
                    LogicalOp::And => l && self.eval(right, ctx)?.to_boolean(),
                };
                Ok(XValue::Boolean(value))
            }
            Expr::Compare { op, left, right } => {
                let l = self.eval(left, ctx)?;
                let r = self.eval(right, ctx)?;
                Ok(XValue::Boolean(self.compare(*op, &l, &r)))
            }
            Expr::Arith { op, left, right } => {
                let l = self.eval(left, ctx)?.to_number(self.doc);
                let r = self.eval(right, ctx)?.to_number(self.doc);
                Ok(XValue::Number(match op {
                    ArithOp::Add => l + r,
                    ArithOp::Sub => l - r,
                    ArithOp::Mul => l * r,
                    ArithOp::Div => l / r,
                    ArithOp::Mod => l % r,
                }))
            }
            Expr::Negate(inner) => Ok(XValue::Number(-self.eval(inner, ctx)?.to_number(self.doc))),
            Expr::Union(left, right) => {
                let mut nodes = self.node_set(left, ctx, "|")?;
                nodes.extend(self.node_set(right, ctx, "|")?);
                Ok(XValue::NodeSet(document_order(nodes)))
            }
            Expr::Path(path) => Ok(XValue::NodeSet(self.eval_path(path, ctx)?)),
            Expr::Filter {
                primary,
                predicates,
                steps,
            } => {
                let mut nodes = self.node_set(primary, ctx, "a filter expression")?;
                for predicate in predicates {
                    nodes = self.apply_predicate(nodes, predicate)?;
                }
                Ok(XValue::NodeSet(self.eval_steps(nodes, steps)?))
            }
            Expr::Literal(s) => Ok(XValue::String(s.clone())),
            Expr::Number(n) => Ok(XValue::Number(*n)),
            Expr::Function { name, args } => self.call(*name, args, ctx),
        }
    }

    fn node_set(&self, expr: &Expr, ctx: Context, what: &str) -> Result<Vec<NodeId>, XPathError> {
        match self.eval(expr, ctx)? {
            XValue::NodeSet(nodes) => Ok(nodes),
            other => Err(XPathError::TypeMismatch {
                message: format!("{what} requires a node-set, got {other:?}"),
            }),
        }
    }

    fn string(&self, expr: &Expr, ctx: Context) -> Result<String, XPathError> {
        Ok(self.eval(expr, ctx)?.into_string(self.doc))
    }

    fn number(&self, expr: &Expr, ctx: Context) -> Result<f64, XPathError> {
        Ok(self.eval(expr, ctx)?.to_number(self.doc))
    }

    // -----------------------------------------------------------------------
    // Location paths
    // -----------------------------------------------------------------------

    fn eval_path(&self, path: &LocationPath, ctx: Context) -> Result<Vec<NodeId>, XPathError> {
        let start = if path.absolute { NodeId::ROOT } else { ctx.node };
        self.eval_steps(vec![start], &path.steps)
    }

    fn eval_steps(&self, mut nodes: Vec<NodeId>, steps: &[Step]) -> Result<Vec<NodeId>, XPathError> {
        for step in steps {
            let mut next = Vec::new();
            for &node in &nodes {
                let mut candidates: Vec<NodeId> = self
                    .axis_nodes(node, step.axis)
                    .into_iter()
                    .filter(|&n| self.matches_test(n, step.axis, &step.test))
                    .collect();
                for predicate in &step.predicates {
                    candidates = self.apply_predicate(candidates, predicate)?;
                }
                next.extend(candidates);
            }
            nodes = document_order(next);
        }
        Ok(nodes)
    }

    /// Keep the candidates (given in axis order) the predicate accepts.
    fn apply_predicate(&self, candidates: Vec<NodeId>, predicate: &Expr) -> Result<Vec<NodeId>, XPathError> {
        let size = candidates.len();
        let mut kept = Vec::with_capacity(size);
        for (i, node) in candidates.into_iter().enumerate() {
            let ctx = Context {
                node,
                position: i + 1,
                size,
            };
            let keep = match self.eval(predicate, ctx)? {
                #[allow(clippy::cast_precision_loss)]
                XValue::Number(n) => (n - ctx.position as f64).abs() < f64::EPSILON,
                other => other.to_boolean(),
            };
            if keep {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    fn axis_nodes(&self, node: NodeId, axis: Axis) -> Vec<NodeId> {
        let doc = self.doc;
        match axis {
            Axis::Child => doc.children(node).to_vec(),
            Axis::Descendant => doc.descendants(node),
            Axis::DescendantOrSelf => {
                let mut out = vec![node];
                out.extend(doc.descendants(node));
                out
            }
            Axis::SelfAxis => vec![node],
            Axis::Parent => doc.parent(node).into_iter().collect(),
            Axis::Ancestor => self.ancestors(node),
            Axis::AncestorOrSelf => {
                let mut out = vec![node];
                out.extend(self.ancestors(node));
                out
            }
            Axis::Attribute => doc.attributes(node).to_vec(),
            Axis::FollowingSibling | Axis::PrecedingSibling => {
                if matches!(doc.kind(node), NodeKind::Attribute { .. }) {
                    return Vec::new();
                }
                let Some(parent) = doc.parent(node) else {
                    return Vec::new();
                };
                let siblings = doc.children(parent);
                let Some(index) = siblings.iter().position(|&n| n == node) else {
                    return Vec::new();
                };
                if axis == Axis::FollowingSibling {
                    siblings[index + 1..].to_vec()
                } else {
                    siblings[..index].iter().rev().copied().collect()
                }
            }
        }
    }

    /// Ancestors nearest-first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.doc.parent(node);
        while let Some(parent) = current {
            out.push(parent);
            current = self.doc.parent(parent);
        }
        out
    }

    fn matches_test(&self, node: NodeId, axis: Axis, test: &NodeTest) -> bool {
        let kind = self.doc.kind(node);
        let principal = if axis == Axis::Attribute {
            matches!(kind, NodeKind::Attribute { .. })
        } else {
            matches!(kind, NodeKind::Element(_))
        };
        match test {
            NodeTest::Name(name) => principal && self.doc.name(node) == name,
            NodeTest::Wildcard => principal,
            NodeTest::Text => matches!(kind, NodeKind::Text(_)),
            NodeTest::Node => true,
        }
    }

    // -----------------------------------------------------------------------
    // Comparisons
    // -----------------------------------------------------------------------

    fn compare(&self, op: CompareOp, left: &XValue, right: &XValue) -> bool {
        let doc = self.doc;
        match (left, right) {
            (XValue::NodeSet(a), XValue::NodeSet(b)) => a.iter().any(|&x| {
                let sx = XValue::String(doc.string_value(x));
                b.iter()
                    .any(|&y| compare_atomic(op, &sx, &XValue::String(doc.string_value(y)), doc))
            }),
            (XValue::NodeSet(nodes), other) => self.compare_node_set(op, nodes, other),
            (other, XValue::NodeSet(nodes)) => self.compare_node_set(op.flip(), nodes, other),
            _ => compare_atomic(op, left, right, doc),
        }
    }

    fn compare_node_set(&self, op: CompareOp, nodes: &[NodeId], other: &XValue) -> bool {
        if matches!(other, XValue::Boolean(_)) {
            return compare_atomic(op, &XValue::Boolean(!nodes.is_empty()), other, self.doc);
        }
        nodes
            .iter()
            .any(|&n| compare_atomic(op, &XValue::String(self.doc.string_value(n)), other, self.doc))
    }

    // -----------------------------------------------------------------------
    // Functions
    // -----------------------------------------------------------------------

    fn call(&self, name: FunctionName, args: &[Expr], ctx: Context) -> Result<XValue, XPathError> {
        let doc = self.doc;
        let value = match name {
            FunctionName::String => XValue::String(match args.first() {
                Some(arg) => self.string(arg, ctx)?,
                None => doc.string_value(ctx.node),
            }),
            FunctionName::Name | FunctionName::LocalName => {
                let node = match args.first() {
                    Some(arg) => self.node_set(arg, ctx, "name()")?.first().copied(),
                    None => Some(ctx.node),
                };
                let full = node.map(|n| doc.name(n)).unwrap_or_default();
                let name = if name == FunctionName::LocalName {
                    full.rsplit(':').next().unwrap_or(full)
                } else {
                    full
                };
                XValue::String(name.to_owned())
            }
            #[allow(clippy::cast_precision_loss)]
            FunctionName::Count => XValue::Number(self.node_set(&args[0], ctx, "count()")?.len() as f64),
            FunctionName::Concat => {
                let mut out = String::new();
                for arg in args {
                    out.push_str(&self.string(arg, ctx)?);
                }
                XValue::String(out)
            }
            FunctionName::NormalizeSpace => {
                let s = match args.first() {
                    Some(arg) => self.string(arg, ctx)?,
                    None => doc.string_value(ctx.node),
                };
                XValue::String(s.split_whitespace().collect::<Vec<_>>().join(" "))
            }
            FunctionName::Contains => {
                let (haystack, needle) = (self.string(&args[0], ctx)?, self.string(&args[1], ctx)?);
                XValue::Boolean(haystack.contains(&needle))
            }
            FunctionName::StartsWith => {
                let (haystack, prefix) = (self.string(&args[0], ctx)?, self.string(&args[1], ctx)?);
                XValue::Boolean(haystack.starts_with(&prefix))
            }
            FunctionName::SubstringBefore => {
                let (haystack, needle) = (self.string(&args[0], ctx)?, self.string(&args[1], ctx)?);
                XValue::String(
                    haystack
                        .split_once(&needle)
                        .map(|(before, _)| before.to_owned())
                        .unwrap_or_default(),
                )
            }
            FunctionName::SubstringAfter => {
                let (haystack, needle) = (self.string(&args[0], ctx)?, self.string(&args[1], ctx)?);
                XValue::String(
                    haystack
                        .split_once(&needle)
                        .map(|(_, after)| after.to_owned())
                        .unwrap_or_default(),
                )
            }
            FunctionName::Substring => {
                let s = self.string(&args[0], ctx)?;
                let start = round(self.number(&args[1], ctx)?);
                let end = match args.get(2) {
                    Some(len) => start + round(self.number(len, ctx)?),
                    None => f64::INFINITY,
                };
                #[allow(clippy::cast_precision_loss)]
                let out = s
                    .chars()
                    .enumerate()
                    .filter(|&(i, _)| {
                        let pos = (i + 1) as f64;
                        pos >= start && pos < end
                    })
                    .map(|(_, c)| c)
                    .collect();
                XValue::String(out)
            }
            FunctionName::StringLength => {
                let s = match args.first() {
                    Some(arg) => self.string(arg, ctx)?,
                    None => doc.string_value(ctx.node),
                };
                #[allow(clippy::cast_precision_loss)]
                let length = s.chars().count() as f64;
                XValue::Number(length)
            }
            FunctionName::Translate => {
                let s = self.string(&args[0], ctx)?;
                let from: Vec<char> = self.string(&args[1], ctx)?.chars().collect();
                let to: Vec<char> = self.string(&args[2], ctx)?.chars().collect();
                let out = s
                    .chars()
                    .filter_map(|c| match from.iter().position(|&f| f == c) {
                        Some(i) => to.get(i).copied(),
                        None => Some(c),
                    })
                    .collect();
                XValue::String(out)
            }
            FunctionName::Sum => {
                let nodes = self.node_set(&args[0], ctx, "sum()")?;
                XValue::Number(nodes.iter().map(|&n| parse_number(&doc.string_value(n))).sum())
            }
            FunctionName::Number => XValue::Number(match args.first() {
                Some(arg) => self.number(arg, ctx)?,
                None => parse_number(&doc.string_value(ctx.node)),
            }),
            FunctionName::Boolean => XValue::Boolean(self.eval(&args[0], ctx)?.to_boolean()),
            FunctionName::Not => XValue::Boolean(!self.eval(&args[0], ctx)?.to_boolean()),
            FunctionName::True => XValue::Boolean(true),
            FunctionName::False => XValue::Boolean(false),
            #[allow(clippy::cast_precision_loss)]
            FunctionName::Position => XValue::Number(ctx.position as f64),
            #[allow(clippy::cast_precision_loss)]
            FunctionName::Last => XValue::Number(ctx.size as f64),
            FunctionName::Floor => XValue::Number(self.number(&args[0], ctx)?.floor()),
            FunctionName::Ceiling => XValue::Number(self.number(&args[0], ctx)?.ceil()),
            FunctionName::Round => XValue::Number(round(self.number(&args[0], ctx)?)),
        };
        Ok(value)
    }
}

/// Compare two values neither of which is a node-set.
#[allow(clippy::float_cmp)]
fn compare_atomic(op: CompareOp, left: &XValue, right: &XValue, doc: &Document) -> bool {
    match op {
        CompareOp::Eq | CompareOp::Ne => {
            let equal = if matches!(left, XValue::Boolean(_)) || matches!(right, XValue::Boolean(_)) {
                left.to_boolean() == right.to_boolean()
            } else if matches!(left, XValue::Number(_)) || matches!(right, XValue::Number(_)) {
                left.to_number(doc) == right.to_number(doc)
            } else {
                left.clone().into_string(doc) == right.clone().into_string(doc)
            };
            if op == CompareOp::Eq { equal } else { !equal }
        }
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let (l, r) = (left.to_number(doc), right.to_number(doc));
            match op {
                CompareOp::Lt => l < r,
                CompareOp::Le => l <= r,
                CompareOp::Gt => l > r,
                _ => l >= r,
            }
        }
    }
}

/// XPath `round()`: nearest integer, halves towards positive infinity.
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}

fn document_order(mut nodes: Vec<NodeId>) -> Vec<NodeId> {
    nodes.sort_unstable();
    nodes.dedup();
    nodes
}
