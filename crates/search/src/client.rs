//! HTTP client for the search backend

use std::collections::BTreeMap;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::query::BoolQuery;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Backend returned {status} for {operation}: {message}")]
    Status {
        operation: String,
        status: u16,
        message: String,
    },
    #[error("Malformed backend response: {0}")]
    Malformed(String),
}

/// Client for an OpenSearch-compatible cluster
pub struct SearchClient {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl SearchClient {
    pub fn new(base_url: &str, username: Option<String>, password: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username,
            password,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(ref user) = self.username {
            req = req.basic_auth(user, self.password.as_deref());
        }
        req
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, SearchError> {
        debug!("POST {}/{}", self.base_url, path);
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                operation: path.to_string(),
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }

    /// Count documents in `index` matching the boolean filter
    pub async fn count(&self, index: &str, query: &BoolQuery) -> Result<u64, SearchError> {
        let body = json!({ "query": query.to_value() });
        let resp = self.post_json(&format!("{}/_count", index), &body).await?;
        resp.get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| SearchError::Malformed("count response missing count".to_string()))
    }

    /// Distinct values of `field` with their document counts, most frequent
    /// first, bounded to `size` buckets
    pub async fn terms_counts(
        &self,
        index: &str,
        field: &str,
        size: u32,
    ) -> Result<Vec<(String, u64)>, SearchError> {
        let body = json!({
            "size": 0,
            "aggregations": {
                "counts": { "terms": { "field": field, "size": size } }
            }
        });
        let resp = self.post_json(&format!("{}/_search", index), &body).await?;
        parse_terms_buckets(&resp, "counts")
    }

    /// Like [`terms_counts`](Self::terms_counts) but restricted to documents
    /// matching the boolean filter
    pub async fn filtered_terms_counts(
        &self,
        index: &str,
        query: &BoolQuery,
        field: &str,
        size: u32,
    ) -> Result<Vec<(String, u64)>, SearchError> {
        let body = json!({
            "size": 0,
            "query": query.to_value(),
            "aggregations": {
                "counts": { "terms": { "field": field, "size": size } }
            }
        });
        let resp = self.post_json(&format!("{}/_search", index), &body).await?;
        parse_terms_buckets(&resp, "counts")
    }

    /// Document counts of the single most and least frequent values of
    /// `field`, as (most, least)
    pub async fn extreme_bucket_counts(
        &self,
        index: &str,
        field: &str,
    ) -> Result<(u64, u64), SearchError> {
        let body = json!({
            "size": 0,
            "aggregations": {
                "most": {
                    "terms": { "field": field, "size": 1, "order": { "_count": "desc" } }
                },
                "least": {
                    "terms": { "field": field, "size": 1, "order": { "_count": "asc" } }
                }
            }
        });
        let resp = self.post_json(&format!("{}/_search", index), &body).await?;
        let most = parse_terms_buckets(&resp, "most")?;
        let least = parse_terms_buckets(&resp, "least")?;
        match (most.first(), least.first()) {
            (Some((_, most_count)), Some((_, least_count))) => Ok((*most_count, *least_count)),
            _ => Err(SearchError::Malformed(
                "no buckets for extreme counts".to_string(),
            )),
        }
    }

    /// The most recent document matching the filter, by `sort_field`
    /// descending, if any
    pub async fn top_hit(
        &self,
        index: &str,
        query: &BoolQuery,
        sort_field: &str,
    ) -> Result<Option<Value>, SearchError> {
        let body = json!({
            "size": 0,
            "query": query.to_value(),
            "aggregations": {
                "latest": {
                    "top_hits": {
                        "size": 1,
                        "sort": [{ sort_field: { "order": "desc" } }]
                    }
                }
            }
        });
        let resp = self.post_json(&format!("{}/_search", index), &body).await?;
        Ok(parse_top_hit(&resp, "latest"))
    }

    /// Create `index` if it does not already exist
    pub async fn ensure_index(&self, index: &str) -> Result<(), SearchError> {
        let resp = self.request(reqwest::Method::HEAD, index).send().await?;
        if resp.status().is_success() {
            return Ok(());
        }
        if resp.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(SearchError::Status {
                operation: index.to_string(),
                status: resp.status().as_u16(),
                message: String::new(),
            });
        }
        info!("Creating index {}", index);
        let resp = self.request(reqwest::Method::PUT, index).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                operation: index.to_string(),
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    /// Upsert serialized records by ID; a full-document overwrite, never a
    /// partial update
    pub async fn bulk_upsert(
        &self,
        index: &str,
        records: &BTreeMap<String, String>,
    ) -> Result<(), SearchError> {
        if records.is_empty() {
            debug!("No records to upsert into {}", index);
            return Ok(());
        }
        let body = bulk_body(index, records);
        info!("Bulk upsert of {} records into {}", records.len(), index);
        let resp = self
            .request(reqwest::Method::POST, "_bulk")
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                operation: "_bulk".to_string(),
                status: status.as_u16(),
                message,
            });
        }
        let result: Value = resp.json().await?;
        if result.get("errors").and_then(Value::as_bool) == Some(true) {
            return Err(SearchError::Malformed(format!(
                "bulk upsert into {} reported item errors",
                index
            )));
        }
        Ok(())
    }
}

/// NDJSON body for a bulk index request: one action line and one source line
/// per record
fn bulk_body(index: &str, records: &BTreeMap<String, String>) -> String {
    let mut body = String::new();
    for (id, source) in records {
        let action = json!({ "index": { "_index": index, "_id": id } });
        body.push_str(&action.to_string());
        body.push('\n');
        body.push_str(source);
        body.push('\n');
    }
    body
}

fn parse_terms_buckets(resp: &Value, agg: &str) -> Result<Vec<(String, u64)>, SearchError> {
    let buckets = resp
        .pointer(&format!("/aggregations/{}/buckets", agg))
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::Malformed(format!("missing {} aggregation buckets", agg)))?;
    buckets
        .iter()
        .map(|bucket| {
            let key = bucket
                .get("key")
                .and_then(Value::as_str)
                .ok_or_else(|| SearchError::Malformed("bucket without string key".to_string()))?;
            let count = bucket
                .get("doc_count")
                .and_then(Value::as_u64)
                .ok_or_else(|| SearchError::Malformed("bucket without doc_count".to_string()))?;
            Ok((key.to_string(), count))
        })
        .collect()
}

fn parse_top_hit(resp: &Value, agg: &str) -> Option<Value> {
    resp.pointer(&format!("/aggregations/{}/hits/hits/0/_source", agg))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_strips_trailing_slash() {
        let client = SearchClient::new("http://localhost:9200/", None, None);
        assert_eq!(client.base_url, "http://localhost:9200");
    }

    #[test]
    fn test_parse_terms_buckets() {
        let resp = json!({
            "aggregations": {
                "counts": {
                    "buckets": [
                        { "key": "PullRequestEvent", "doc_count": 42 },
                        { "key": "IssuesEvent", "doc_count": 7 },
                    ]
                }
            }
        });
        let buckets = parse_terms_buckets(&resp, "counts").unwrap();
        assert_eq!(
            buckets,
            vec![
                ("PullRequestEvent".to_string(), 42),
                ("IssuesEvent".to_string(), 7),
            ]
        );
    }

    #[test]
    fn test_parse_terms_buckets_missing_agg() {
        let resp = json!({ "aggregations": {} });
        assert!(parse_terms_buckets(&resp, "counts").is_err());
    }

    #[test]
    fn test_parse_top_hit_present_and_absent() {
        let resp = json!({
            "aggregations": {
                "latest": {
                    "hits": { "hits": [{ "_source": { "action": "opened" } }] }
                }
            }
        });
        assert_eq!(
            parse_top_hit(&resp, "latest"),
            Some(json!({ "action": "opened" }))
        );

        let empty = json!({
            "aggregations": { "latest": { "hits": { "hits": [] } } }
        });
        assert_eq!(parse_top_hit(&empty, "latest"), None);
    }

    #[test]
    fn test_bulk_body_shape() {
        let mut records = BTreeMap::new();
        records.insert("id-1".to_string(), r#"{"a":1}"#.to_string());
        let body = bulk_body("github_general_metrics", &records);
        let mut lines = body.lines();
        let action: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(
            action,
            json!({ "index": { "_index": "github_general_metrics", "_id": "id-1" } })
        );
        assert_eq!(lines.next(), Some(r#"{"a":1}"#));
        assert_eq!(lines.next(), None);
    }
}
