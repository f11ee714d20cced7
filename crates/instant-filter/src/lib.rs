//! Instant Filter - compiles HTTP query-string filters into document-store
//! query documents.
//!
//! Each query-string key names a field and, after a `__` separator, an
//! operator token. Values arrive untyped, so the compiler coerces them per
//! operator and widens comparisons to tolerate schemaless storage, where the
//! same field may hold `"42"` in one record and `42` in another.
//!
//! # Quick Start
//!
//! ```rust
//! use instant_filter::{compile, find, RawFilters};
//! use serde_json::json;
//!
//! let filters = RawFilters::from_query_string("age__gte=18&name__icontains=ann&__limit=20");
//! let doc = instant_filter::QueryCompiler::global().compile(&filters).unwrap();
//!
//! assert_eq!(
//!     doc.into_value(),
//!     json!({
//!         "$or": [{"age": {"$gte": "18"}}, {"age": {"$gte": 18}}],
//!         "name": {"$regex": "(?i)ann"}
//!     })
//! );
//!
//! // Unknown operators are rejected with the list of valid tokens
//! assert!(compile([("age__about", "18")]).is_err());
//!
//! // Get-by-id without a declared primary key
//! let by_id = find("42");
//! assert!(by_id.get("$or").is_some());
//! ```
//!
//! # Operators
//!
//! | Tokens | Document |
//! |--------|----------|
//! | `eq` (default) | `$eq`, numeric and `$in` widening |
//! | `ne`, `neq` | `$ne`, numeric and `$nin` widening |
//! | `gt`, `ge`/`gte`, `lt`, `le`/`lte` | `$gt`, `$gte`, `$lt`, `$lte`, numeric widening |
//! | `in`, `nin`/`notin` | `$in`, `$nin` over raw and numeric tokens |
//! | `exists`, `nexists`/`notexists` | `$exists` |
//! | `null`/`isnull`, `nnull`/`notnull`/`isnotnull` | `$and` of `$exists` and `$eq`/`$ne` null |
//! | `re`/`regex`, `contains`, `starts`/`startswith`, `ends`/`endswith` | `$regex` |
//! | `icontains`, `istarts`/`istartswith`, `iends`/`iendswith` | `$regex` with `(?i)` |
//!
//! Keys starting with `__` belong to pagination and are never compiled.

pub mod coerce;
mod config;
mod document;
mod error;
mod filter;
mod identity;
mod op;
mod params;
mod query;
mod registry;
mod value;

// Re-export public API
pub use coerce::Pattern;
pub use config::FilterConfig;
pub use document::QueryDocument;
pub use error::{CoercionError, ErrorBody, FilterError, Result};
pub use filter::{build, Builder, Composite, Filter, Fragment, Node, Operand};
pub use identity::{IdentityFields, DEFAULT_IDENTITY_FIELDS};
pub use op::{BoolOp, Family, Operator, Symbol};
pub use params::{RawFilters, RESERVED_PREFIX};
pub use query::{compile, find, QueryCompiler, DEFAULT_OPERATOR, OPERATOR_SEPARATOR};
pub use registry::{Entry, OperatorRegistry, DEFAULT_ALIASES};
pub use value::{Number, RawValue};
