//! Filter algebra: leaf predicates, boolean composites and the per-family
//! builders that widen a raw value into them.
//!
//! A [`Filter`] is one `field / symbol / operand` predicate. A [`Composite`]
//! combines child [`Node`]s under `$and` or `$or`. Realizing any node yields
//! the nested JSON mapping handed to the document store, and can be repeated
//! with identical output.
//!
//! Widening: the same logical field may hold `"42"` in one document and `42`
//! in another, so comparisons on numeric-looking values match both forms.

use serde_json::{Map, Value as Json};

use crate::coerce::{as_bool, as_list, as_list_with_numerics, as_number, as_pattern, Pattern};
use crate::error::CoercionError;
use crate::op::{BoolOp, Family, Operator, Symbol};
use crate::value::{Number, RawValue};

/// A realized predicate: one JSON object.
pub type Fragment = Map<String, Json>;

/// Right-hand side of a leaf predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Any JSON value: string, number, boolean, null or array.
    Value(Json),
    /// Compiled regular expression.
    Pattern(Pattern),
}

impl Operand {
    fn to_json(&self) -> Json {
        match self {
            Operand::Value(v) => v.clone(),
            Operand::Pattern(p) => Json::String(p.to_document_string()),
        }
    }
}

impl From<Json> for Operand {
    fn from(v: Json) -> Self {
        Operand::Value(v)
    }
}

impl From<&str> for Operand {
    fn from(s: &str) -> Self {
        Operand::Value(Json::String(s.to_string()))
    }
}

impl From<String> for Operand {
    fn from(s: String) -> Self {
        Operand::Value(Json::String(s))
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Value(n.into())
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Value(Json::from(n))
    }
}

impl From<f64> for Operand {
    fn from(n: f64) -> Self {
        Operand::Value(Json::from(n))
    }
}

impl From<bool> for Operand {
    fn from(b: bool) -> Self {
        Operand::Value(Json::Bool(b))
    }
}

impl From<Vec<Json>> for Operand {
    fn from(v: Vec<Json>) -> Self {
        Operand::Value(Json::Array(v))
    }
}

impl From<Pattern> for Operand {
    fn from(p: Pattern) -> Self {
        Operand::Pattern(p)
    }
}

/// A single field predicate.
///
/// # Example
///
/// ```
/// use instant_filter::{Filter, Symbol};
/// use serde_json::json;
///
/// let filter = Filter::new("age", Symbol::Gt, 30i64);
/// assert_eq!(json!(filter.realize()), json!({"age": {"$gt": 30}}));
///
/// let plain = Filter::matching("name", "bob");
/// assert_eq!(json!(plain.realize()), json!({"name": "bob"}));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    field: String,
    symbol: Option<Symbol>,
    operand: Operand,
}

impl Filter {
    /// Creates a `{field: {symbol: operand}}` predicate.
    pub fn new(field: impl Into<String>, symbol: Symbol, operand: impl Into<Operand>) -> Self {
        Filter {
            field: field.into(),
            symbol: Some(symbol),
            operand: operand.into(),
        }
    }

    /// Creates the identity predicate `{field: operand}`.
    pub fn matching(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Filter {
            field: field.into(),
            symbol: None,
            operand: operand.into(),
        }
    }

    /// Shorthand for an `$eq` predicate.
    pub fn eq(field: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Filter::new(field, Symbol::Eq, operand)
    }

    /// The field this predicate tests.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The comparison symbol, `None` for identity predicates.
    pub fn symbol(&self) -> Option<Symbol> {
        self.symbol
    }

    /// The right-hand side.
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    /// Realizes the predicate into its JSON mapping.
    pub fn realize(&self) -> Fragment {
        let value = match self.symbol {
            None => self.operand.to_json(),
            Some(symbol) => {
                let mut inner = Map::new();
                inner.insert(symbol.as_str().to_string(), self.operand.to_json());
                Json::Object(inner)
            }
        };

        let mut fragment = Map::new();
        fragment.insert(self.field.clone(), value);
        fragment
    }
}

/// Boolean combination of child nodes, realized as `{"$and"|"$or": [...]}`.
///
/// Children keep their insertion order so realized output is deterministic.
///
/// # Example
///
/// ```
/// use instant_filter::{Composite, Filter};
/// use serde_json::json;
///
/// let mut any = Composite::or();
/// any.push(Filter::eq("id", "42"));
/// any.push(Filter::eq("id", 42i64));
///
/// assert_eq!(
///     json!(any.realize()),
///     json!({"$or": [{"id": {"$eq": "42"}}, {"id": {"$eq": 42}}]})
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    op: BoolOp,
    children: Vec<Node>,
}

impl Composite {
    /// Creates an empty composite.
    pub fn new(op: BoolOp) -> Self {
        Composite {
            op,
            children: Vec::new(),
        }
    }

    /// Creates an empty `$and`.
    pub fn and() -> Self {
        Composite::new(BoolOp::And)
    }

    /// Creates an empty `$or`.
    pub fn or() -> Self {
        Composite::new(BoolOp::Or)
    }

    /// Appends a child.
    pub fn push(&mut self, child: impl Into<Node>) -> &mut Self {
        self.children.push(child.into());
        self
    }

    /// Appends a child, builder style.
    pub fn with(mut self, child: impl Into<Node>) -> Self {
        self.push(child);
        self
    }

    /// The boolean combinator.
    pub fn op(&self) -> BoolOp {
        self.op
    }

    /// Children in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns `true` if no child was appended.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Realizes the composite into its JSON mapping.
    pub fn realize(&self) -> Fragment {
        let children = self
            .children
            .iter()
            .map(|child| Json::Object(child.realize()))
            .collect();

        let mut fragment = Map::new();
        fragment.insert(self.op.as_str().to_string(), Json::Array(children));
        fragment
    }
}

/// Any node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Filter),
    Composite(Composite),
}

impl Node {
    /// Realizes the node into its JSON mapping.
    pub fn realize(&self) -> Fragment {
        match self {
            Node::Leaf(filter) => filter.realize(),
            Node::Composite(composite) => composite.realize(),
        }
    }
}

impl From<Filter> for Node {
    fn from(f: Filter) -> Self {
        Node::Leaf(f)
    }
}

impl From<Composite> for Node {
    fn from(c: Composite) -> Self {
        Node::Composite(c)
    }
}

// ============================================================================
// Family builders
// ============================================================================

/// Signature shared by every family builder.
pub type Builder = fn(Operator, &str, &RawValue) -> Result<Node, CoercionError>;

/// Returns the builder for an operator's family.
pub fn builder_for(op: Operator) -> Builder {
    match op.family() {
        Family::Equality => build_equality,
        Family::Range => build_range,
        Family::List => build_membership,
        Family::Existence => build_exists,
        Family::Null => build_null,
        Family::Pattern => build_pattern,
    }
}

/// Builds the node for `field__op=raw`.
pub fn build(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    builder_for(op)(op, field, raw)
}

/// Collapses alternatives: one alternative stands alone, more become `$or`.
fn any_of(mut alternatives: Vec<Node>) -> Node {
    if alternatives.len() == 1 {
        return alternatives.remove(0);
    }
    let mut or = Composite::or();
    for alternative in alternatives {
        or.push(alternative);
    }
    Node::Composite(or)
}

fn single(op: Operator, raw: &RawValue) -> Result<&str, CoercionError> {
    raw.as_single().ok_or(CoercionError::ExpectedScalar {
        operator: op.as_str(),
    })
}

/// `$in`/`$nin` over the raw tokens, plus the numerically coerced tokens when
/// at least one of them parses.
fn membership_alternatives(field: &str, raw: &RawValue, symbol: Symbol) -> Vec<Node> {
    let tokens: Vec<Json> = as_list(raw).into_iter().map(Json::String).collect();
    let numerics = as_list_with_numerics(raw);

    let mut alternatives = Vec::with_capacity(2);
    let widened = numerics != tokens;
    alternatives.push(Filter::new(field, symbol, tokens).into());
    if widened {
        alternatives.push(Filter::new(field, symbol, numerics).into());
    }
    alternatives
}

/// `eq`/`ne`: literal match, numeric match when the value parses, and list
/// membership when the value is a list or contains `,`.
fn build_equality(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    let (symbol, list_symbol) = match op {
        Operator::Ne => (Symbol::Ne, Symbol::Nin),
        _ => (Symbol::Eq, Symbol::In),
    };

    let mut alternatives = Vec::new();
    if let RawValue::Single(s) = raw {
        alternatives.push(Filter::new(field, symbol, s.as_str()).into());
        if let Some(n) = as_number(s) {
            alternatives.push(Filter::new(field, symbol, n).into());
        }
    }
    if raw.is_listable() {
        alternatives.extend(membership_alternatives(field, raw, list_symbol));
    }

    Ok(any_of(alternatives))
}

fn build_range(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    let symbol = match op {
        Operator::Gt => Symbol::Gt,
        Operator::Gte => Symbol::Gte,
        Operator::Lt => Symbol::Lt,
        _ => Symbol::Lte,
    };
    let value = single(op, raw)?;

    let mut alternatives = vec![Filter::new(field, symbol, value).into()];
    if let Some(n) = as_number(value) {
        alternatives.push(Filter::new(field, symbol, n).into());
    }
    Ok(any_of(alternatives))
}

fn build_membership(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    let symbol = match op {
        Operator::NotIn => Symbol::Nin,
        _ => Symbol::In,
    };
    Ok(any_of(membership_alternatives(field, raw, symbol)))
}

fn build_exists(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    let exists = as_bool(single(op, raw)?)?;
    let exists = match op {
        Operator::NotExists => !exists,
        _ => exists,
    };
    Ok(Filter::new(field, Symbol::Exists, exists).into())
}

/// `isnull=true` tests for null, `isnull=false` for not-null; `isnotnull`
/// is the inverse.
fn build_null(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    let flag = as_bool(single(op, raw)?)?;
    let is_null = match op {
        Operator::IsNotNull => !flag,
        _ => flag,
    };
    let symbol = if is_null { Symbol::Eq } else { Symbol::Ne };

    let node = Composite::and()
        .with(Filter::new(field, Symbol::Exists, true))
        .with(Filter::new(field, symbol, Json::Null));
    Ok(node.into())
}

fn build_pattern(op: Operator, field: &str, raw: &RawValue) -> Result<Node, CoercionError> {
    let value = single(op, raw)?;
    let source = match op {
        Operator::StartsWith | Operator::IStartsWith => format!("^{}", value),
        Operator::EndsWith | Operator::IEndsWith => format!("{}$", value),
        _ => value.to_string(),
    };
    let pattern = as_pattern(&source, op.is_case_insensitive())?;
    Ok(Filter::new(field, Symbol::Regex, pattern).into())
}
