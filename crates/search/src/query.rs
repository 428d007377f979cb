//! Boolean filter query builder
//!
//! Metric predicates are conjunctions of term-equality and field-existence
//! clauses; this builder produces the backend's bool query JSON for them.

use serde_json::{json, Value};

/// A conjunction of term / existence clauses
#[derive(Debug, Clone, Default)]
pub struct BoolQuery {
    must: Vec<Value>,
    must_not: Vec<Value>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal the given keyword value
    pub fn must_term(mut self, field: &str, value: &str) -> Self {
        self.must.push(json!({ "term": { field: value } }));
        self
    }

    /// Require `field` to equal the given boolean value
    pub fn must_bool(mut self, field: &str, value: bool) -> Self {
        self.must.push(json!({ "term": { field: value } }));
        self
    }

    /// Require `field` to equal the given numeric value
    pub fn must_count(mut self, field: &str, value: u64) -> Self {
        self.must.push(json!({ "term": { field: value } }));
        self
    }

    /// Require `field` to be present on the document
    pub fn must_exist(mut self, field: &str) -> Self {
        self.must.push(json!({ "exists": { "field": field } }));
        self
    }

    /// Require `field` to be absent from the document
    pub fn must_not_exist(mut self, field: &str) -> Self {
        self.must_not.push(json!({ "exists": { "field": field } }));
        self
    }

    /// Render the backend query JSON
    pub fn to_value(&self) -> Value {
        json!({
            "bool": {
                "must": self.must,
                "must_not": self.must_not,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_shape() {
        let q = BoolQuery::new().to_value();
        assert_eq!(q, json!({ "bool": { "must": [], "must_not": [] } }));
    }

    #[test]
    fn test_term_conjunction() {
        let q = BoolQuery::new()
            .must_term("repository.keyword", "OpenSearch")
            .must_term("state.keyword", "open")
            .to_value();
        assert_eq!(
            q,
            json!({
                "bool": {
                    "must": [
                        { "term": { "repository.keyword": "OpenSearch" } },
                        { "term": { "state.keyword": "open" } },
                    ],
                    "must_not": [],
                }
            })
        );
    }

    #[test]
    fn test_count_and_exists() {
        let q = BoolQuery::new()
            .must_count("comment_count", 0)
            .must_exist("reactions_plus")
            .to_value();
        assert_eq!(
            q,
            json!({
                "bool": {
                    "must": [
                        { "term": { "comment_count": 0 } },
                        { "exists": { "field": "reactions_plus" } },
                    ],
                    "must_not": [],
                }
            })
        );
    }

    #[test]
    fn test_bool_and_not_exists() {
        let q = BoolQuery::new()
            .must_bool("merged", true)
            .must_not_exist("pull_labels.keyword")
            .to_value();
        assert_eq!(
            q,
            json!({
                "bool": {
                    "must": [{ "term": { "merged": true } }],
                    "must_not": [{ "exists": { "field": "pull_labels.keyword" } }],
                }
            })
        );
    }
}
