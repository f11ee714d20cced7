//! End-to-end compilation scenarios.

use instant_filter::{
    compile, find, CoercionError, FilterConfig, FilterError, IdentityFields, OperatorRegistry,
    QueryCompiler, RawFilters, RawValue, DEFAULT_IDENTITY_FIELDS,
};
use serde_json::{json, Value};

fn compiled(query: &str) -> Value {
    QueryCompiler::global()
        .compile_query_string(query)
        .unwrap()
        .into_value()
}

// ============================================================================
// Documented properties
// ============================================================================

#[test]
fn numeric_eq_matches_string_and_number() {
    assert_eq!(
        compiled("count=7"),
        json!({"$or": [{"count": {"$eq": "7"}}, {"count": {"$eq": 7}}]})
    );
}

#[test]
fn in_from_string_and_repeated_key_agree() {
    assert_eq!(compiled("n__in=1,2,3"), compiled("n__in=1&n__in=2&n__in=3"));
    assert_eq!(
        compiled("n__in=1,2,3"),
        json!({"$or": [{"n": {"$in": ["1", "2", "3"]}}, {"n": {"$in": [1, 2, 3]}}]})
    );
}

#[test]
fn is_null_both_ways() {
    assert_eq!(
        compiled("deleted_at__isnull=true"),
        json!({"$and": [{"deleted_at": {"$exists": true}}, {"deleted_at": {"$eq": null}}]})
    );
    assert_eq!(
        compiled("deleted_at__isnull=false"),
        json!({"$and": [{"deleted_at": {"$exists": true}}, {"deleted_at": {"$ne": null}}]})
    );
}

#[test]
fn starts_with_is_anchored() {
    assert_eq!(compiled("name__startswith=ab"), json!({"name": {"$regex": "^ab"}}));
    assert_eq!(compiled("name__istartswith=ab"), json!({"name": {"$regex": "(?i)^ab"}}));
}

#[test]
fn unknown_operator() {
    let err = compile([("field__frobnicate", "x")]).unwrap_err();
    assert_eq!(err.kind(), "FilterOperatorNotFound");
    let FilterError::OperatorNotFound { operator, allowed } = err else {
        panic!("expected OperatorNotFound");
    };
    assert_eq!(operator, "frobnicate");
    assert_eq!(allowed, OperatorRegistry::builtin().tokens());
    assert!(allowed.iter().any(|t| t == "neq"));
}

#[test]
fn smart_id_for_numeric_identifier() {
    let doc = find("42").into_value();
    let alternatives = doc["$or"].as_array().unwrap();
    assert_eq!(alternatives.len(), DEFAULT_IDENTITY_FIELDS.len());
    for (alt, field) in alternatives.iter().zip(DEFAULT_IDENTITY_FIELDS) {
        assert_eq!(
            alt,
            &json!({"$or": [{*field: {"$eq": "42"}}, {*field: {"$eq": 42}}]})
        );
    }
}

#[test]
fn empty_query_matches_everything() {
    assert_eq!(compiled(""), json!({}));
    assert_eq!(compiled("__page=3&__limit=50"), json!({}));
}

#[test]
fn gt_on_numeric_value() {
    assert_eq!(
        compiled("age__gt=30"),
        json!({"$or": [{"age": {"$gt": "30"}}, {"age": {"$gt": 30}}]})
    );
}

// ============================================================================
// Realistic requests
// ============================================================================

#[test]
fn mixed_request() {
    let doc = compiled(
        "status=active&tags__nin=spam,junk&email__exists=1&name__iendswith=son&__limit=10",
    );
    assert_eq!(
        doc,
        json!({
            "status": {"$eq": "active"},
            "tags": {"$nin": ["spam", "junk"]},
            "email": {"$exists": true},
            "name": {"$regex": "(?i)son$"}
        })
    );
}

#[test]
fn range_on_same_field_is_conjunctive() {
    let doc = compiled("price__ge=a&price__lt=m");
    assert_eq!(doc, json!({"price": {"$gte": "a", "$lt": "m"}}));
}

#[test]
fn numeric_range_on_same_field_keeps_both_bounds() {
    let doc = compiled("age__ge=18&age__le=65");
    assert_eq!(
        doc,
        json!({
            "$or": [{"age": {"$gte": "18"}}, {"age": {"$gte": 18}}],
            "$and": [{"$or": [{"age": {"$lte": "65"}}, {"age": {"$lte": 65}}]}]
        })
    );
}

#[test]
fn null_checks_on_two_fields_are_both_kept() {
    let doc = compiled("a__isnull=1&b__notnull=1");
    assert_eq!(
        doc,
        json!({"$and": [
            {"a": {"$exists": true}},
            {"a": {"$eq": null}},
            {"b": {"$exists": true}},
            {"b": {"$ne": null}}
        ]})
    );
}

#[test]
fn comma_eq_widens_to_membership() {
    assert_eq!(
        compiled("code=a1,42"),
        json!({"$or": [
            {"code": {"$eq": "a1,42"}},
            {"code": {"$in": ["a1", "42"]}},
            {"code": {"$in": ["a1", 42]}}
        ]})
    );
}

#[test]
fn alias_tokens_share_a_slot() {
    assert_eq!(compiled("x__ne=a&x__neq=b"), json!({"x": {"$ne": "b"}}));
}

#[test]
fn pattern_operators_on_same_field_are_both_kept() {
    assert_eq!(
        compiled("name__contains=a&name__startswith=b&name__iendswith=c"),
        json!({
            "name": {"$regex": "a"},
            "$and": [
                {"name": {"$regex": "^b"}},
                {"name": {"$regex": "(?i)c$"}}
            ]
        })
    );
}

#[test]
fn exists_and_not_exists_are_both_kept() {
    assert_eq!(
        compiled("f__exists=1&f__nexists=1"),
        json!({"f": {"$exists": true}, "$and": [{"f": {"$exists": false}}]})
    );
}

#[test]
fn repeated_eq_and_in_are_both_kept() {
    assert_eq!(
        compiled("tag=a&tag=b&tag__in=c"),
        json!({"tag": {"$in": ["a", "b"]}, "$and": [{"tag": {"$in": ["c"]}}]})
    );
}

#[test]
fn dollar_and_field_is_kept_alongside_null_check() {
    assert_eq!(
        compiled("%24and=x&a__isnull=1"),
        json!({"$and": [
            {"$and": {"$eq": "x"}},
            {"a": {"$exists": true}},
            {"a": {"$eq": null}}
        ]})
    );
}

#[test]
fn numeric_values_read_as_booleans() {
    assert_eq!(compiled("f__exists=2"), json!({"f": {"$exists": true}}));
    assert_eq!(compiled("f__nexists=0.0"), json!({"f": {"$exists": true}}));
}

#[test]
fn invalid_boolean_value() {
    let err = QueryCompiler::new()
        .compile_query_string("archived__nexists=sometimes")
        .unwrap_err();
    let body = serde_json::to_value(err.to_body()).unwrap();
    assert_eq!(body["kind"], json!("FilterValueInvalid"));
    assert_eq!(body["field"], json!("archived"));
    assert_eq!(body["value"], json!("sometimes"));
    assert_eq!(body["reason"], json!("'sometimes' is not a valid boolean value"));
}

#[test]
fn invalid_regex_value() {
    let err = compile([("name__regex", "(")]).unwrap_err();
    assert!(matches!(
        err,
        FilterError::ValueInvalid {
            reason: CoercionError::InvalidPattern { .. },
            ..
        }
    ));
}

#[test]
fn list_value_for_scalar_operator() {
    let mut filters = RawFilters::new();
    filters.append("age__gt", "1");
    filters.append("age__gt", "2");
    let err = QueryCompiler::global().compile(&filters).unwrap_err();
    let FilterError::ValueInvalid { field, value, reason } = err else {
        panic!("expected ValueInvalid");
    };
    assert_eq!(field, "age");
    assert_eq!(value, RawValue::from(vec!["1", "2"]));
    assert!(matches!(reason, CoercionError::ExpectedScalar { operator: "gt" }));
}

#[test]
fn caller_input_is_untouched() {
    let filters = RawFilters::from_query_string("a=1&b__in=x,y");
    let before = filters.clone();
    let _ = QueryCompiler::global().compile(&filters).unwrap();
    assert_eq!(filters, before);
}

#[test]
fn compilation_is_deterministic() {
    let query = "b=2&a__in=1,x&c__icontains=q&d__isnull=0";
    let first = serde_json::to_string(&QueryCompiler::new().compile_query_string(query).unwrap())
        .unwrap();
    let second = serde_json::to_string(&QueryCompiler::new().compile_query_string(query).unwrap())
        .unwrap();
    assert_eq!(first, second);
    assert!(first.starts_with(r#"{"$or":[{"b""#));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn configured_compiler() {
    let compiler = FilterConfig::from_yaml_str(
        "operators:\n  eq: eq\n  above: gt\nidentity_fields: [slug]\nreserved_prefix: \"_\"\n",
    )
    .unwrap()
    .build()
    .unwrap();

    assert_eq!(
        compiler.compile_query_string("score__above=x&_page=2").unwrap().into_value(),
        json!({"score": {"$gt": "x"}})
    );
    assert_eq!(
        compiler.find("intro").into_value(),
        json!({"$or": [{"slug": {"$eq": "intro"}}]})
    );
    assert!(compiler.compile_query_string("score__gt=1").is_err());
}

#[test]
fn identity_fields_builder() {
    let compiler =
        QueryCompiler::new().with_identity_fields(IdentityFields::new(["uuid"]).unwrap());
    assert_eq!(
        compiler.find("7").into_value(),
        json!({"$or": [{"$or": [{"uuid": {"$eq": "7"}}, {"uuid": {"$eq": 7}}]}]})
    );
}
