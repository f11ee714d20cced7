//! Operator registry: the table from operator token to builder.
//!
//! The built-in table is declared statically in [`DEFAULT_ALIASES`] and
//! materialized once on first use. Registries are never mutated after
//! construction, so a shared reference can be read from any thread.
//!
//! A plain `eq` on a value containing `,` is read as list membership: it
//! matches the literal string or any of its tokens (see [`crate::filter`]).

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::{CoercionError, FilterError, Result};
use crate::filter::{builder_for, Builder, Node};
use crate::op::Operator;
use crate::value::RawValue;

/// Built-in operator tokens, in the order they are reported to callers.
pub const DEFAULT_ALIASES: &[(&str, Operator)] = &[
    ("eq", Operator::Eq),
    ("ne", Operator::Ne),
    ("neq", Operator::Ne),
    ("gt", Operator::Gt),
    ("ge", Operator::Gte),
    ("gte", Operator::Gte),
    ("lt", Operator::Lt),
    ("le", Operator::Lte),
    ("lte", Operator::Lte),
    ("in", Operator::In),
    ("nin", Operator::NotIn),
    ("notin", Operator::NotIn),
    ("exists", Operator::Exists),
    ("nexists", Operator::NotExists),
    ("notexists", Operator::NotExists),
    ("null", Operator::IsNull),
    ("isnull", Operator::IsNull),
    ("nnull", Operator::IsNotNull),
    ("notnull", Operator::IsNotNull),
    ("isnotnull", Operator::IsNotNull),
    ("re", Operator::Regex),
    ("regex", Operator::Regex),
    ("contains", Operator::Contains),
    ("icontains", Operator::IContains),
    ("starts", Operator::StartsWith),
    ("startswith", Operator::StartsWith),
    ("istarts", Operator::IStartsWith),
    ("istartswith", Operator::IStartsWith),
    ("ends", Operator::EndsWith),
    ("endswith", Operator::EndsWith),
    ("iends", Operator::IEndsWith),
    ("iendswith", Operator::IEndsWith),
];

static BUILTIN: Lazy<OperatorRegistry> =
    Lazy::new(|| OperatorRegistry::from_aliases(DEFAULT_ALIASES.iter().copied()));

/// One registered token.
#[derive(Clone)]
pub struct Entry {
    token: String,
    operator: Operator,
    builder: Builder,
}

impl Entry {
    /// The token as written after `__`.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The canonical operator the token resolves to.
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Builds the filter node for `field=raw`.
    pub fn build(&self, field: &str, raw: &RawValue) -> std::result::Result<Node, CoercionError> {
        (self.builder)(self.operator, field, raw)
    }
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entry")
            .field("token", &self.token)
            .field("operator", &self.operator)
            .finish()
    }
}

/// Immutable token → builder table.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    entries: IndexMap<String, Entry>,
}

impl OperatorRegistry {
    /// Returns the shared built-in registry.
    pub fn builtin() -> &'static OperatorRegistry {
        &BUILTIN
    }

    /// Builds a registry from `(token, operator)` pairs. A repeated token
    /// keeps its first position and its last operator.
    pub fn from_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (S, Operator)>,
        S: Into<String>,
    {
        let entries = aliases
            .into_iter()
            .map(|(token, operator)| {
                let token = token.into();
                let entry = Entry {
                    token: token.clone(),
                    operator,
                    builder: builder_for(operator),
                };
                (token, entry)
            })
            .collect();

        OperatorRegistry { entries }
    }

    /// Builds a registry from a token → canonical-token table, as found in
    /// configuration files.
    pub fn from_table(table: &IndexMap<String, String>) -> Result<Self> {
        if table.is_empty() {
            return Err(FilterError::config("operator table is empty"));
        }

        let mut aliases = Vec::with_capacity(table.len());
        for (token, canonical) in table {
            if token.is_empty() {
                return Err(FilterError::config("operator token must not be empty"));
            }
            let operator = Operator::from_canonical(canonical).ok_or_else(|| {
                FilterError::config(format!(
                    "token '{}' maps to unknown operator '{}'",
                    token, canonical
                ))
            })?;
            aliases.push((token.clone(), operator));
        }

        Ok(OperatorRegistry::from_aliases(aliases))
    }

    /// Resolves a token.
    pub fn resolve(&self, token: &str) -> Option<&Entry> {
        self.entries.get(token)
    }

    /// Every registered token, in registration order.
    pub fn tokens(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Iterates over the entries.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    /// Number of registered tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no token is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        OperatorRegistry::builtin().clone()
    }
}
