use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::api::types::{RecommendationRequest, SimilarPropertiesQuery};
use crate::models::{PriceEstimateResponse, PropertyDescriptor, SimilarPropertiesResponse};

/// Transport seam for the remote property API.
///
/// The policy layer depends on this trait, not on a concrete client, so
/// tests can script responses. `recommendations` hands back the raw JSON
/// payload on purpose: its shape drives the resolver's retry decision, so
/// validation belongs to the resolver rather than the transport.
#[async_trait]
pub trait PropertyBackend: Send + Sync {
    /// POST the recommendation endpoint and return its body unvalidated.
    async fn recommendations(&self, request: &RecommendationRequest) -> Result<Value>;

    /// Ask for a direct price prediction. `Ok(None)` means the backend had
    /// no direct estimate for this property.
    async fn predict_price(
        &self,
        subject: &PropertyDescriptor,
    ) -> Result<Option<PriceEstimateResponse>>;

    /// Fetch comparable listings for the valuation fallback path.
    async fn similar_properties(
        &self,
        query: &SimilarPropertiesQuery,
    ) -> Result<SimilarPropertiesResponse>;

    /// Name of the backend, for diagnostics
    fn backend_name(&self) -> &'static str;
}
