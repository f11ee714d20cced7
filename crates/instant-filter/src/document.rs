//! The compiled query document.
//!
//! A [`QueryDocument`] is the ordered JSON object handed to the document
//! store's find/count/delete call. Distinct top-level keys are implicitly
//! AND-ed by the store.

use serde::Serialize;
use serde_json::{Map, Value as Json};

use crate::filter::Fragment;
use crate::op::BoolOp;

/// Ordered query document. An empty document matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryDocument(Map<String, Json>);

impl QueryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        QueryDocument::default()
    }

    /// Returns `true` if the document matches every record.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Looks up a top-level key.
    pub fn get(&self, key: &str) -> Option<&Json> {
        self.0.get(key)
    }

    /// Borrows the underlying object.
    pub fn as_map(&self) -> &Map<String, Json> {
        &self.0
    }

    /// Consumes the document into a JSON value.
    pub fn into_value(self) -> Json {
        Json::Object(self.0)
    }

    /// Merges a realized fragment by key union.
    ///
    /// - a new key is inserted as is;
    /// - a field already holding an operator mapping gains the fragment's
    ///   operators when none of their symbols is taken yet;
    /// - any other collision (a symbol already present, two `$or` fragments,
    ///   a literal next to an operator mapping) moves the later entry into a
    ///   top-level `$and`.
    ///
    /// Nothing merged earlier is ever replaced.
    pub fn merge(&mut self, fragment: Fragment) {
        for (key, value) in fragment {
            let Some(existing) = self.0.get_mut(&key) else {
                self.0.insert(key, value);
                continue;
            };

            if !is_bool_key(&key) {
                if let (Some(current), Some(incoming)) =
                    (operator_map_mut(existing), operator_map(&value))
                {
                    if incoming.keys().all(|symbol| !current.contains_key(symbol)) {
                        for (symbol, operand) in incoming {
                            current.insert(symbol.clone(), operand.clone());
                        }
                        continue;
                    }
                }
            }

            self.push_conjunct(key, value);
        }
    }

    fn push_conjunct(&mut self, key: String, value: Json) {
        let and_key = BoolOp::And.as_str();
        let conjuncts = match (key.as_str() == and_key, value) {
            (true, Json::Array(children)) => children,
            (_, value) => {
                let mut single = Map::new();
                single.insert(key, value);
                vec![Json::Object(single)]
            }
        };

        match self.0.get_mut(and_key) {
            Some(Json::Array(existing)) => existing.extend(conjuncts),
            // a field literally named `$and` keeps its predicate as the first conjunct
            Some(existing) => {
                let mut first = Map::new();
                first.insert(and_key.to_string(), existing.take());
                let mut all = vec![Json::Object(first)];
                all.extend(conjuncts);
                *existing = Json::Array(all);
            }
            None => {
                self.0.insert(and_key.to_string(), Json::Array(conjuncts));
            }
        }
    }
}

fn is_bool_key(key: &str) -> bool {
    key == BoolOp::And.as_str() || key == BoolOp::Or.as_str()
}

fn is_operator_object(map: &Map<String, Json>) -> bool {
    !map.is_empty() && map.keys().all(|k| k.starts_with('$'))
}

fn operator_map(value: &Json) -> Option<&Map<String, Json>> {
    match value {
        Json::Object(map) if is_operator_object(map) => Some(map),
        _ => None,
    }
}

fn operator_map_mut(value: &mut Json) -> Option<&mut Map<String, Json>> {
    match value {
        Json::Object(map) if is_operator_object(map) => Some(map),
        _ => None,
    }
}

impl From<QueryDocument> for Json {
    fn from(doc: QueryDocument) -> Self {
        doc.into_value()
    }
}

impl From<Fragment> for QueryDocument {
    fn from(fragment: Fragment) -> Self {
        QueryDocument(fragment)
    }
}
