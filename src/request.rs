//! The outbound request description produced by the dispatcher.
//!
//! A [`RequestSpec`] is everything the transport needs to issue one call:
//! method, path relative to the base endpoint, headers, query pairs, and an
//! optional JSON body. Each spec is built fresh for exactly one item and is
//! wholly owned by its producing call — nothing in it borrows from the item.

use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;

/// Header carrying the resolved flow identifier on scan requests.
pub const FLOW_ID_HEADER: &str = "base64ai-flow-id";

/// A fully-formed outbound request, independent of any transport.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path relative to the base endpoint, always starting with `/`.
    pub path: String,
    /// Header map. `BTreeMap` keeps iteration deterministic for logs and
    /// assertions.
    pub headers: BTreeMap<String, String>,
    /// Query pairs in emission order. Absent filters are omitted entirely,
    /// never sent as empty strings.
    pub query: Vec<(String, String)>,
    /// JSON body for POST operations.
    pub body: Option<Value>,
}

impl RequestSpec {
    /// A spec with the standard JSON headers and no query or body.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            method,
            path: path.into(),
            headers,
            query: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Append a query pair.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Look up a query value by name (test and logging convenience).
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
