//! Arweave read access: documents over the HTTP gateway, metadata tags over
//! the gateway's GraphQL endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{BlobStore, Tag, TransportError};

/// Default Arweave gateway.
pub const DEFAULT_GATEWAY_URL: &str = "https://arweave.net";

const TAGS_QUERY: &str = "query($ids: [ID!]) {\
    transactions(ids: $ids, first: 1) {\
        edges { node { id tags { name value } } }\
    }\
}";

/// Configuration for [`ArweaveGateway`].
#[derive(Debug, Clone)]
pub struct ArweaveConfig {
    /// Gateway base URL, e.g. `https://arweave.net`.
    pub gateway_url: String,
    /// GraphQL endpoint; defaults to `{gateway_url}/graphql`.
    pub graphql_url: Option<String>,
}

impl Default for ArweaveConfig {
    fn default() -> Self {
        ArweaveConfig {
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            graphql_url: None,
        }
    }
}

/// [`BlobStore`] backed by an Arweave gateway.
///
/// Calls are single-shot; timeout and retry are layered on by the caller
/// through [`crate::RetryPolicy`].
pub struct ArweaveGateway {
    client: Client,
    config: ArweaveConfig,
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<GraphqlData>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphqlData {
    transactions: GraphqlConnection,
}

#[derive(Debug, Deserialize)]
struct GraphqlConnection {
    edges: Vec<GraphqlEdge>,
}

#[derive(Debug, Deserialize)]
struct GraphqlEdge {
    node: GraphqlNode,
}

#[derive(Debug, Deserialize)]
struct GraphqlNode {
    #[serde(default)]
    tags: Vec<Tag>,
}

impl ArweaveGateway {
    pub fn new(config: ArweaveConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn gateway_base(&self) -> &str {
        self.config.gateway_url.trim_end_matches('/')
    }

    fn graphql_url(&self) -> String {
        self.config
            .graphql_url
            .clone()
            .unwrap_or_else(|| format!("{}/graphql", self.gateway_base()))
    }
}

#[async_trait]
impl BlobStore for ArweaveGateway {
    async fn get_document(&self, id: &str) -> Result<Value, TransportError> {
        debug!(id, "fetching arweave document");
        let url = format!("{}/{id}", self.gateway_base());
        let resp = self.client.get(&url).send().await?;
        match resp.status().as_u16() {
            404 | 410 => Err(TransportError::NotFound),
            status if !resp.status().is_success() => Err(TransportError::Http(status)),
            _ => resp
                .json::<Value>()
                .await
                .map_err(|e| TransportError::BadResponse(format!("document is not JSON: {e}"))),
        }
    }

    async fn get_document_tags(&self, id: &str) -> Result<Vec<Tag>, TransportError> {
        debug!(id, "querying arweave tags");
        let url = self.graphql_url();
        let body = json!({
            "query": TAGS_QUERY,
            "variables": { "ids": [id] },
        });
        let resp = self.client.post(&url).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(TransportError::Http(resp.status().as_u16()));
        }
        let parsed: GraphqlResponse = resp.json().await?;

        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(TransportError::Rpc(message));
        }
        let mut edges = parsed
            .data
            .ok_or_else(|| TransportError::BadResponse("missing data in GraphQL response".into()))?
            .transactions
            .edges;
        if edges.is_empty() {
            return Err(TransportError::NotFound);
        }
        Ok(edges.swap_remove(0).node.tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graphql_url_defaults_to_gateway() {
        let gw = ArweaveGateway::new(ArweaveConfig {
            gateway_url: "https://arweave.net/".to_string(),
            ..ArweaveConfig::default()
        });
        assert_eq!(gw.graphql_url(), "https://arweave.net/graphql");
    }

    #[test]
    fn test_graphql_url_override() {
        let gw = ArweaveGateway::new(ArweaveConfig {
            graphql_url: Some("https://example.org/graphql".to_string()),
            ..ArweaveConfig::default()
        });
        assert_eq!(gw.graphql_url(), "https://example.org/graphql");
    }

    #[test]
    fn test_graphql_response_shape() {
        let parsed: GraphqlResponse = serde_json::from_value(json!({
            "data": {
                "transactions": {
                    "edges": [
                        { "node": { "id": "x", "tags": [
                            { "name": "ChainRoute-Genesis", "value": "ab" }
                        ]}}
                    ]
                }
            }
        }))
        .unwrap();
        let tags = &parsed.data.unwrap().transactions.edges[0].node.tags;
        assert_eq!(tags[0].name, "ChainRoute-Genesis");
    }
}
