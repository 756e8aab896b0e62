#![forbid(unsafe_code)]

use std::f64::consts;

use serde::{Deserialize, Serialize};

/// A parsed arithmetic expression.
///
/// This enum is the entire language: numeric literals, named constants,
/// unary and binary operators, and calls to allow-listed functions. There
/// is no variant for assignment, attribute access, subscripts, collection
/// literals, or anything else — inputs using such syntax fail at the
/// parser and never produce a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    Number {
        value: f64,
    },
    Ident {
        name: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    /// Nesting depth of the tree, counting this node.
    ///
    /// Call arguments and operator operands both contribute; a bare
    /// literal has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Number { .. } | Self::Ident { .. } => 1,
            Self::Unary { operand, .. } => 1 + operand.depth(),
            Self::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
            Self::Call { args, .. } => {
                1 + args.iter().map(Expr::depth).max().unwrap_or(0)
            }
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Number { .. } | Self::Ident { .. } => 1,
            Self::Unary { operand, .. } => 1 + operand.node_count(),
            Self::Binary { left, right, .. } => 1 + left.node_count() + right.node_count(),
            Self::Call { args, .. } => 1 + args.iter().map(Expr::node_count).sum::<usize>(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
    Plus,
}

impl UnaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl BinaryOp {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
        }
    }
}

/// Named constants recognized in expressions.
pub const CONSTANT_NAMES: &[&str] = &["pi", "e", "tau"];

#[must_use]
pub fn constant_value(name: &str) -> Option<f64> {
    match name {
        "pi" => Some(consts::PI),
        "e" => Some(consts::E),
        "tau" => Some(consts::TAU),
        _ => None,
    }
}

/// The closed set of callable functions.
///
/// Resolution happens by name at evaluation time so that unknown names
/// surface as a distinct error rather than a parse failure; dispatch is a
/// `match` on this enum, so adding a function without handling it is a
/// compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Function {
    Sqrt,
    Abs,
    Round,
    Min,
    Max,
    Pow,
    Factorial,
}

pub const FUNCTION_NAMES: &[&str] = &["sqrt", "abs", "round", "min", "max", "pow", "factorial"];

impl Function {
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            "abs" => Some(Self::Abs),
            "round" => Some(Self::Round),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "pow" => Some(Self::Pow),
            "factorial" => Some(Self::Factorial),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Abs => "abs",
            Self::Round => "round",
            Self::Min => "min",
            Self::Max => "max",
            Self::Pow => "pow",
            Self::Factorial => "factorial",
        }
    }

    /// Inclusive argument-count bounds; `None` means unbounded above.
    #[must_use]
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Sqrt | Self::Abs | Self::Factorial => (1, Some(1)),
            Self::Round => (1, Some(2)),
            Self::Min | Self::Max => (1, None),
            Self::Pow => (2, Some(3)),
        }
    }

    #[must_use]
    pub fn accepts_arity(self, count: usize) -> bool {
        let (lo, hi) = self.arity();
        count >= lo && hi.is_none_or(|hi| count <= hi)
    }
}
