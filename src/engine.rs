use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{Result, SifterError};
use crate::node::NodeStore;

/// Alias the archived topics are searched under.
pub const TOPIC_INDEX: &str = "topic";
pub const TOPIC_TYPE: &str = "topic";

/// Collection holding the category reference data.
pub const NODE_INDEX: &str = "node";
pub const NODE_TYPE: &str = "node";

/// Analyzer used both for keyword cost estimation and full-text matching.
pub const KEYWORD_ANALYZER: &str = "ik_smart";

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
const NODE_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// One mapped engine hit, in the stable response shape.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_score")]
    pub score: Option<f64>,
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub sort: Vec<serde_json::Value>,
    #[serde(default)]
    pub highlight: HashMap<String, Vec<String>>,
    /// Stored document source, passed through opaquely.
    #[serde(rename = "_source")]
    pub source: Option<Box<RawValue>>,
}

/// Mapped search response: always a concrete hits sequence, never null.
#[derive(Debug, Serialize)]
pub struct SearchOutcome {
    pub took: i64,
    pub total: i64,
    pub hits: Vec<SearchHit>,
    pub timed_out: bool,
}

/// Narrow capability surface consumed from the full-text engine.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Submits a compiled query document against the topic index.
    async fn search(&self, body: &serde_json::Value) -> Result<SearchOutcome>;

    /// Tokenizes `text` with the keyword analyzer and returns the clause
    /// count, used as a query-cost proxy.
    async fn analyze(&self, text: &str) -> Result<usize>;
}

/// Elasticsearch 5.x client speaking the REST API via reqwest.
pub struct EsClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct EsSearchResponse {
    took: i64,
    #[serde(default)]
    timed_out: bool,
    hits: EsHits,
}

#[derive(Deserialize)]
struct EsHits {
    total: i64,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct EsAnalyzeResponse {
    #[serde(default)]
    tokens: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct NodeSource {
    id: i64,
}

impl EsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .map_err(|e| SifterError::Internal(format!("engine client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| SifterError::EngineUnavailable(format!("{url}: {e}")))?;
        if !response.status().is_success() {
            return Err(SifterError::EngineUnavailable(format!(
                "{url}: status {}",
                response.status()
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl SearchEngine for EsClient {
    async fn search(&self, body: &serde_json::Value) -> Result<SearchOutcome> {
        let path = format!("{TOPIC_INDEX}/{TOPIC_TYPE}/_search");
        let response = self.post_json(&path, body, SEARCH_TIMEOUT).await?;
        let parsed: EsSearchResponse = response
            .json()
            .await
            .map_err(|e| SifterError::Internal(format!("decode search response: {e}")))?;
        Ok(SearchOutcome {
            took: parsed.took,
            total: parsed.hits.total,
            hits: parsed.hits.hits,
            timed_out: parsed.timed_out,
        })
    }

    async fn analyze(&self, text: &str) -> Result<usize> {
        let path = format!("{TOPIC_INDEX}/_analyze");
        let body = serde_json::json!({
            "analyzer": KEYWORD_ANALYZER,
            "text": text,
        });
        let response = self.post_json(&path, &body, SEARCH_TIMEOUT).await?;
        let parsed: EsAnalyzeResponse = response
            .json()
            .await
            .map_err(|e| SifterError::Internal(format!("decode analyze response: {e}")))?;
        Ok(parsed.tokens.len())
    }
}

#[async_trait]
impl NodeStore for EsClient {
    /// Matches an alias against the category collection's name, title, or
    /// alternate title; the store's first match wins.
    async fn find_node_id(&self, alias: &str) -> Result<Option<i64>> {
        let alias = alias.trim();
        if alias.is_empty() {
            return Ok(None);
        }
        let path = format!("{NODE_INDEX}/{NODE_TYPE}/_search");
        let body = serde_json::json!({
            "size": 1,
            "query": {
                "bool": {
                    "should": [
                        { "term": { "name": alias } },
                        { "term": { "title": alias } },
                        { "term": { "title_alternative": alias } },
                    ],
                    "minimum_should_match": 1,
                }
            }
        });
        let response = self.post_json(&path, &body, NODE_LOOKUP_TIMEOUT).await?;
        let parsed: EsSearchResponse = response
            .json()
            .await
            .map_err(|e| SifterError::Internal(format!("decode node lookup: {e}")))?;
        let Some(hit) = parsed.hits.hits.first() else {
            return Ok(None);
        };
        let Some(source) = &hit.source else {
            return Ok(None);
        };
        let node: NodeSource = serde_json::from_str(source.get())
            .map_err(|e| SifterError::Internal(format!("decode node source: {e}")))?;
        Ok(Some(node.id))
    }
}
