//! Smart identifier resolution.
//!
//! Collections are schemaless, so nothing declares which field is the primary
//! key. An opaque identifier is matched against every candidate identity
//! field instead, in both its string and numeric forms.

use serde::{Deserialize, Serialize};

use crate::coerce::as_number;
use crate::error::{FilterError, Result};
use crate::filter::{Composite, Filter};

/// Candidate identity fields used when nothing else is configured.
pub const DEFAULT_IDENTITY_FIELDS: &[&str] =
    &["id", "uuid", "uid", "code", "pk", "username", "email", "vat"];

/// Ordered list of fields that may hold a record's identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityFields(Vec<String>);

impl IdentityFields {
    /// Creates a field list, rejecting an empty one.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(FilterError::config("identity field list is empty"));
        }
        if fields.iter().any(|f| f.is_empty()) {
            return Err(FilterError::config("identity field names must not be empty"));
        }
        Ok(IdentityFields(fields))
    }

    /// The fields, in match order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Builds the `$or` matching `id` on any candidate field.
    ///
    /// A numeric-looking identifier matches each field as string or number:
    ///
    /// ```
    /// use instant_filter::IdentityFields;
    /// use serde_json::json;
    ///
    /// let fields = IdentityFields::new(["id", "code"]).unwrap();
    /// assert_eq!(
    ///     json!(fields.resolve("42").realize()),
    ///     json!({"$or": [
    ///         {"$or": [{"id": {"$eq": "42"}}, {"id": {"$eq": 42}}]},
    ///         {"$or": [{"code": {"$eq": "42"}}, {"code": {"$eq": 42}}]}
    ///     ]})
    /// );
    /// ```
    pub fn resolve(&self, id: &str) -> Composite {
        let numeric = as_number(id);
        let mut any = Composite::or();

        for field in &self.0 {
            match numeric {
                Some(n) => {
                    any.push(
                        Composite::or()
                            .with(Filter::eq(field.as_str(), id))
                            .with(Filter::eq(field.as_str(), n)),
                    );
                }
                None => {
                    any.push(Filter::eq(field.as_str(), id));
                }
            }
        }

        any
    }
}

impl Default for IdentityFields {
    fn default() -> Self {
        IdentityFields(DEFAULT_IDENTITY_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_fields() {
        let fields = IdentityFields::default();
        assert_eq!(fields.as_slice().len(), 8);
        assert_eq!(fields.as_slice()[0], "id");
        assert_eq!(fields.as_slice()[7], "vat");
    }

    #[test]
    fn numeric_identifier_widens_each_field() {
        let any = IdentityFields::default().resolve("42");
        assert_eq!(any.len(), 8);
        let realized = json!(any.realize());
        let alternatives = realized["$or"].as_array().unwrap();
        for (alt, field) in alternatives.iter().zip(DEFAULT_IDENTITY_FIELDS) {
            assert_eq!(
                alt,
                &json!({"$or": [{*field: {"$eq": "42"}}, {*field: {"$eq": 42}}]})
            );
        }
    }

    #[test]
    fn opaque_identifier_matches_literally() {
        let fields = IdentityFields::new(["id", "email"]).unwrap();
        assert_eq!(
            json!(fields.resolve("bob@example.com").realize()),
            json!({"$or": [
                {"id": {"$eq": "bob@example.com"}},
                {"email": {"$eq": "bob@example.com"}}
            ]})
        );
    }

    #[test]
    fn rejects_empty_lists() {
        assert!(IdentityFields::new(Vec::<String>::new()).is_err());
        assert!(IdentityFields::new(["id", ""]).is_err());
    }

    #[test]
    fn deserializes_from_plain_list() {
        let fields: IdentityFields = serde_json::from_value(json!(["pk", "slug"])).unwrap();
        assert_eq!(fields.as_slice(), &["pk", "slug"]);
    }
}
