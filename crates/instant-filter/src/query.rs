//! Query compiler facade.
//!
//! [`QueryCompiler`] turns the filter entries of one request into a single
//! [`QueryDocument`], and builds the smart-id document for get/delete by id.

use std::borrow::Cow;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::document::QueryDocument;
use crate::error::{FilterError, Result};
use crate::filter::{Composite, Fragment};
use crate::identity::IdentityFields;
use crate::op::Operator;
use crate::params::{RawFilters, RESERVED_PREFIX};
use crate::registry::OperatorRegistry;
use crate::value::RawValue;

/// Separator between field name and operator token in a key.
pub const OPERATOR_SEPARATOR: &str = "__";

/// Operator token used when a key has no separator.
pub const DEFAULT_OPERATOR: &str = "eq";

static DEFAULT_COMPILER: Lazy<QueryCompiler> = Lazy::new(QueryCompiler::new);

/// Compiles filter entries into query documents.
///
/// Compilation is all-or-nothing: the first invalid entry aborts it and no
/// partial document is returned.
///
/// # Example
///
/// ```
/// use instant_filter::QueryCompiler;
/// use serde_json::json;
///
/// let compiler = QueryCompiler::new();
/// let doc = compiler
///     .compile([("age__gt", "30"), ("name__istartswith", "jo"), ("__limit", "10")])
///     .unwrap();
///
/// assert_eq!(
///     doc.into_value(),
///     json!({
///         "$or": [{"age": {"$gt": "30"}}, {"age": {"$gt": 30}}],
///         "name": {"$regex": "(?i)^jo"}
///     })
/// );
/// ```
#[derive(Debug, Clone)]
pub struct QueryCompiler {
    registry: Cow<'static, OperatorRegistry>,
    identity: IdentityFields,
    reserved_prefix: String,
}

impl QueryCompiler {
    /// Creates a compiler with the built-in registry and identity fields.
    pub fn new() -> Self {
        QueryCompiler {
            registry: Cow::Borrowed(OperatorRegistry::builtin()),
            identity: IdentityFields::default(),
            reserved_prefix: RESERVED_PREFIX.to_string(),
        }
    }

    /// Returns the shared default compiler.
    pub fn global() -> &'static QueryCompiler {
        &DEFAULT_COMPILER
    }

    /// Replaces the operator registry.
    pub fn with_registry(mut self, registry: OperatorRegistry) -> Self {
        self.registry = Cow::Owned(registry);
        self
    }

    /// Replaces the candidate identity fields.
    pub fn with_identity_fields(mut self, identity: IdentityFields) -> Self {
        self.identity = identity;
        self
    }

    /// Replaces the prefix of keys skipped as reserved.
    pub fn with_reserved_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.reserved_prefix = prefix.into();
        self
    }

    /// The operator registry in use.
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// The candidate identity fields in use.
    pub fn identity_fields(&self) -> &IdentityFields {
        &self.identity
    }

    /// Splits a key on its last separator into `(field, operator token)`.
    ///
    /// ```
    /// use instant_filter::QueryCompiler;
    ///
    /// assert_eq!(QueryCompiler::split_key("age__gt"), ("age", "gt"));
    /// assert_eq!(QueryCompiler::split_key("meta__tags__in"), ("meta__tags", "in"));
    /// assert_eq!(QueryCompiler::split_key("name"), ("name", "eq"));
    /// ```
    pub fn split_key(key: &str) -> (&str, &str) {
        key.rsplit_once(OPERATOR_SEPARATOR)
            .unwrap_or((key, DEFAULT_OPERATOR))
    }

    /// Returns `true` if `key` belongs to pagination and is never a filter.
    pub fn is_reserved(&self, key: &str) -> bool {
        !self.reserved_prefix.is_empty() && key.starts_with(&self.reserved_prefix)
    }

    /// Compiles filter entries into one query document.
    ///
    /// Entries for the same field and operator (aliases included) replace
    /// each other, last one wins. An empty input yields an empty document.
    pub fn compile<I, K, V>(&self, entries: I) -> Result<QueryDocument>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<RawValue>,
    {
        let mut fragments: IndexMap<(String, Operator), Fragment> = IndexMap::new();

        for (key, value) in entries {
            let key = key.as_ref();
            if self.is_reserved(key) {
                tracing::trace!(key, "skipping reserved key");
                continue;
            }

            let (field, token) = Self::split_key(key);
            let Some(entry) = self.registry.resolve(token) else {
                tracing::debug!(key, token, "unknown filter operator");
                return Err(FilterError::OperatorNotFound {
                    operator: token.to_string(),
                    allowed: self.registry.tokens(),
                });
            };

            let raw: RawValue = value.into();
            let node = match entry.build(field, &raw) {
                Ok(node) => node,
                Err(reason) => {
                    tracing::debug!(key, value = %raw, %reason, "invalid filter value");
                    return Err(FilterError::ValueInvalid {
                        field: field.to_string(),
                        value: raw,
                        reason,
                    });
                }
            };

            tracing::debug!(field, operator = %entry.operator(), "compiled filter entry");
            fragments.insert((field.to_string(), entry.operator()), node.realize());
        }

        let mut document = QueryDocument::new();
        for fragment in fragments.into_values() {
            document.merge(fragment);
        }
        Ok(document)
    }

    /// Compiles the filter entries of a decoded query string.
    pub fn compile_filters(&self, filters: &RawFilters) -> Result<QueryDocument> {
        self.compile(filters)
    }

    /// Compiles a raw `application/x-www-form-urlencoded` query string.
    pub fn compile_query_string(&self, query: &str) -> Result<QueryDocument> {
        self.compile_filters(&RawFilters::from_query_string(query))
    }

    /// Builds the predicate matching `id` on any candidate identity field.
    pub fn find_filter(&self, id: &str) -> Composite {
        self.identity.resolve(id)
    }

    /// Builds the smart-id query document for `id`.
    pub fn find(&self, id: &str) -> QueryDocument {
        let document = QueryDocument::from(self.find_filter(id).realize());
        tracing::debug!(id, fields = self.identity.as_slice().len(), "resolved smart id");
        document
    }
}

impl Default for QueryCompiler {
    fn default() -> Self {
        QueryCompiler::new()
    }
}

/// Compiles filter entries with the default compiler.
pub fn compile<I, K, V>(entries: I) -> Result<QueryDocument>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<RawValue>,
{
    QueryCompiler::global().compile(entries)
}

/// Builds the smart-id document with the default compiler.
pub fn find(id: &str) -> QueryDocument {
    QueryCompiler::global().find(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoercionError;
    use serde_json::json;

    #[test]
    fn empty_input_matches_everything() {
        let doc = compile(Vec::<(&str, &str)>::new()).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.into_value(), json!({}));
    }

    #[test]
    fn key_without_operator_is_eq() {
        let doc = compile([("name", "bob")]).unwrap();
        assert_eq!(doc.into_value(), json!({"name": {"$eq": "bob"}}));
    }

    #[test]
    fn splits_on_last_separator() {
        let doc = compile([("meta__owner__ne", "x")]).unwrap();
        assert_eq!(doc.into_value(), json!({"meta__owner": {"$ne": "x"}}));
    }

    #[test]
    fn reserved_keys_are_skipped() {
        let doc = compile([("__limit", "10"), ("__gt", "3"), ("a", "x")]).unwrap();
        assert_eq!(doc.into_value(), json!({"a": {"$eq": "x"}}));
    }

    #[test]
    fn custom_reserved_prefix() {
        let compiler = QueryCompiler::new().with_reserved_prefix("$");
        let doc = compiler.compile([("$limit", "10"), ("a", "x")]).unwrap();
        assert_eq!(doc.into_value(), json!({"a": {"$eq": "x"}}));

        // "__limit" is no longer reserved: empty field, unknown token "limit"
        let err = compiler.compile([("__limit", "10")]).unwrap_err();
        assert!(matches!(err, FilterError::OperatorNotFound { ref operator, .. } if operator == "limit"));
    }

    #[test]
    fn unknown_operator_lists_allowed_tokens() {
        let err = compile([("field__frobnicate", "x")]).unwrap_err();
        match err {
            FilterError::OperatorNotFound { operator, allowed } => {
                assert_eq!(operator, "frobnicate");
                assert_eq!(allowed, OperatorRegistry::builtin().tokens());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_value_reports_field_and_reason() {
        let err = compile([("deleted__exists", "perhaps")]).unwrap_err();
        match err {
            FilterError::ValueInvalid {
                field,
                value,
                reason,
            } => {
                assert_eq!(field, "deleted");
                assert_eq!(value, RawValue::from("perhaps"));
                assert!(matches!(reason, CoercionError::InvalidBooleanValue(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn first_error_aborts() {
        let err = compile([("a__bogus", "1"), ("b__exists", "nope")]).unwrap_err();
        assert!(matches!(err, FilterError::OperatorNotFound { .. }));
    }

    #[test]
    fn same_field_and_operator_last_wins() {
        let doc = compile([("name", "a"), ("age__ge", "x"), ("name__eq", "b"), ("age__gte", "y")])
            .unwrap();
        assert_eq!(
            doc.into_value(),
            json!({"name": {"$eq": "b"}, "age": {"$gte": "y"}})
        );
    }

    #[test]
    fn same_field_distinct_operators_combine() {
        let doc = compile([("name__gt", "a"), ("name__lt", "m")]).unwrap();
        assert_eq!(doc.into_value(), json!({"name": {"$gt": "a", "$lt": "m"}}));
    }

    #[test]
    fn widened_fragments_do_not_clobber_each_other() {
        let doc = compile([("age__gt", "30"), ("age__lt", "50")]).unwrap();
        assert_eq!(
            doc.into_value(),
            json!({
                "$or": [{"age": {"$gt": "30"}}, {"age": {"$gt": 30}}],
                "$and": [{"$or": [{"age": {"$lt": "50"}}, {"age": {"$lt": 50}}]}]
            })
        );
    }

    #[test]
    fn find_uses_identity_fields() {
        let compiler = QueryCompiler::new()
            .with_identity_fields(IdentityFields::new(["id", "slug"]).unwrap());
        assert_eq!(
            compiler.find("abc").into_value(),
            json!({"$or": [{"id": {"$eq": "abc"}}, {"slug": {"$eq": "abc"}}]})
        );
    }

    #[test]
    fn compile_query_string_groups_repeats() {
        let doc = QueryCompiler::new()
            .compile_query_string("tag=a&tag=b&__page=2")
            .unwrap();
        assert_eq!(doc.into_value(), json!({"tag": {"$in": ["a", "b"]}}));
    }
}
