//! Operator kinds and document symbols.
//!
//! [`Operator`] is the canonical kind an operator token resolves to. Several
//! tokens may name the same operator (`ne` and `neq`); the alias table lives
//! in [`crate::registry`]. [`Symbol`] is the literal tag written into the
//! query document, and [`BoolOp`] tags composite nodes.

use std::fmt;

/// Canonical operator selected by a key's `__` suffix.
///
/// Operators are grouped by family:
/// - **Equality**: `Eq`, `Ne`
/// - **Range**: `Gt`, `Gte`, `Lt`, `Lte`
/// - **List**: `In`, `NotIn`
/// - **Existence**: `Exists`, `NotExists`
/// - **Null**: `IsNull`, `IsNotNull`
/// - **Pattern**: `Regex`, `Contains`, `StartsWith`, `EndsWith` and the
///   case-insensitive `I*` variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,

    Gt,
    Gte,
    Lt,
    Lte,

    In,
    NotIn,

    Exists,
    NotExists,

    IsNull,
    IsNotNull,

    Regex,
    Contains,
    IContains,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
}

/// Operator family, which decides how values are coerced and widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Equality,
    Range,
    List,
    Existence,
    Null,
    Pattern,
}

impl Operator {
    /// Every operator, in declaration order.
    pub const ALL: [Operator; 19] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::NotIn,
        Operator::Exists,
        Operator::NotExists,
        Operator::IsNull,
        Operator::IsNotNull,
        Operator::Regex,
        Operator::Contains,
        Operator::IContains,
        Operator::StartsWith,
        Operator::IStartsWith,
        Operator::EndsWith,
        Operator::IEndsWith,
    ];

    /// Returns the family this operator belongs to.
    pub fn family(self) -> Family {
        match self {
            Operator::Eq | Operator::Ne => Family::Equality,
            Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => Family::Range,
            Operator::In | Operator::NotIn => Family::List,
            Operator::Exists | Operator::NotExists => Family::Existence,
            Operator::IsNull | Operator::IsNotNull => Family::Null,
            Operator::Regex
            | Operator::Contains
            | Operator::IContains
            | Operator::StartsWith
            | Operator::IStartsWith
            | Operator::EndsWith
            | Operator::IEndsWith => Family::Pattern,
        }
    }

    /// Returns `true` for the case-folding pattern variants.
    pub fn is_case_insensitive(self) -> bool {
        matches!(
            self,
            Operator::IContains | Operator::IStartsWith | Operator::IEndsWith
        )
    }

    /// Returns the canonical token of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "nin",
            Operator::Exists => "exists",
            Operator::NotExists => "notexists",
            Operator::IsNull => "isnull",
            Operator::IsNotNull => "isnotnull",
            Operator::Regex => "regex",
            Operator::Contains => "contains",
            Operator::IContains => "icontains",
            Operator::StartsWith => "startswith",
            Operator::IStartsWith => "istartswith",
            Operator::EndsWith => "endswith",
            Operator::IEndsWith => "iendswith",
        }
    }

    /// Looks an operator up by its canonical token.
    pub fn from_canonical(token: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.as_str() == token)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Literal comparison tag of a leaf in the query document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Nin,
    Exists,
    Regex,
}

impl Symbol {
    /// Returns the tag as written in the query document.
    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::Eq => "$eq",
            Symbol::Ne => "$ne",
            Symbol::Gt => "$gt",
            Symbol::Gte => "$gte",
            Symbol::Lt => "$lt",
            Symbol::Lte => "$lte",
            Symbol::In => "$in",
            Symbol::Nin => "$nin",
            Symbol::Exists => "$exists",
            Symbol::Regex => "$regex",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean combinator of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    /// Returns the tag as written in the query document.
    pub fn as_str(self) -> &'static str {
        match self {
            BoolOp::And => "$and",
            BoolOp::Or => "$or",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
