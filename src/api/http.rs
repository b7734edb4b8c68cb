use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::traits::PropertyBackend;
use crate::api::types::{RecommendationRequest, SearchQuery, SimilarPropertiesQuery};
use crate::config::Config;
use crate::models::{
    CandidateProperty, MarketStats, PriceEstimateResponse, PropertyDescriptor, SearchResponse,
    SimilarPropertiesResponse,
};

/// reqwest-backed client for the property API.
#[derive(Debug, Clone)]
pub struct HttpPropertyApi {
    client: Client,
    base_url: String,
}

impl HttpPropertyApi {
    /// Create a client against the configured base URL
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a JSON body and parse the response body. Non-success statuses
    /// surface the server's `error` field when one is present.
    async fn post_json<T>(&self, path: &str, body: &T) -> Result<Value>
    where
        T: Serialize + Sync,
    {
        let url = self.endpoint(path);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("error")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("Server error: {status}"));
            warn!("{url} returned {status}: {detail}");
            anyhow::bail!("{detail}");
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {url}"))
    }

    /// Direct property search. The caller's `bedrooms` goes out as `beds`,
    /// and the client layers its embedding flags onto the body. Transport
    /// failures degrade to an empty result set; this surface never errors.
    pub async fn search(&self, query: &SearchQuery) -> Vec<CandidateProperty> {
        #[derive(Serialize)]
        struct Envelope<'a> {
            #[serde(flatten)]
            query: &'a SearchQuery,
            use_embeddings: bool,
            similarity_threshold: f64,
            version: &'static str,
        }

        let body = Envelope {
            query,
            use_embeddings: true,
            similarity_threshold: 0.7,
            version: "1.0",
        };

        let outcome = self.post_json("property-search", &body).await.and_then(|value| {
            serde_json::from_value::<SearchResponse>(value).context("Malformed search response")
        });

        match outcome {
            Ok(response) => response.results,
            Err(err) => {
                warn!("Property search failed: {err:#}");
                Vec::new()
            }
        }
    }

    /// Aggregate market statistics for a location
    pub async fn market_analysis(&self, location: &str) -> Result<MarketStats> {
        let url = self.endpoint("market-analysis");
        debug!("GET {url}?location={location}");

        let response = self
            .client
            .get(&url)
            .query(&[("location", location)])
            .send()
            .await
            .with_context(|| format!("Failed to reach {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Market analysis request failed: {status}");
        }

        response
            .json()
            .await
            .context("Malformed market analysis response")
    }
}

#[async_trait]
impl PropertyBackend for HttpPropertyApi {
    async fn recommendations(&self, request: &RecommendationRequest) -> Result<Value> {
        self.post_json("get-recommendations", request).await
    }

    async fn predict_price(
        &self,
        subject: &PropertyDescriptor,
    ) -> Result<Option<PriceEstimateResponse>> {
        let mut body = self.post_json("predict-price", subject).await?;

        // The endpoint wraps its result in a {status, prediction} envelope;
        // older deployments return the prediction bare.
        let payload = if body.get("prediction").is_some() {
            body["prediction"].take()
        } else {
            body
        };
        if payload.is_null() {
            return Ok(None);
        }

        let estimate = serde_json::from_value(payload).context("Malformed price prediction")?;
        Ok(Some(estimate))
    }

    async fn similar_properties(
        &self,
        query: &SimilarPropertiesQuery,
    ) -> Result<SimilarPropertiesResponse> {
        let body = self.post_json("similar-properties", query).await?;
        serde_json::from_value(body).context("Malformed similar-properties response")
    }

    fn backend_name(&self) -> &'static str {
        "property-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn endpoint_joins_base_and_path() {
        let config = Config {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_secs(5),
        };
        let api = HttpPropertyApi::new(&config).unwrap();

        assert_eq!(
            api.endpoint("get-recommendations"),
            "http://localhost:5000/api/get-recommendations"
        );
    }
}
