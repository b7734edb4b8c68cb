use thiserror::Error;
use tracing::{info, warn};

use crate::api::traits::PropertyBackend;
use crate::api::types::SimilarPropertiesQuery;
use crate::models::{
    CandidateProperty, PriceEstimateResponse, PriceRange, PropertyDescriptor, ValuationEstimate,
};

/// Confidence assumed when a direct estimate arrives without one
const DEFAULT_DIRECT_CONFIDENCE: f64 = 0.8;
/// Confidence assigned to estimates averaged from comparables
const FALLBACK_CONFIDENCE: f64 = 0.7;
/// Similarity floor used when hunting for comparables
const FALLBACK_SIMILARITY_THRESHOLD: f64 = 0.6;

/// Valuation failed in a way the caller must surface. The display text is
/// the user-facing message; the source differentiates for operators.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Failed to get property valuation. Please try again later.")]
    Backend(#[source] anyhow::Error),
    #[error("Failed to get property valuation. Please try again later.")]
    NoComparables,
}

/// Produces a bounded-confidence price estimate for a property.
pub struct ValuationService<B> {
    backend: B,
}

impl<B: PropertyBackend> ValuationService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Estimate the price of a property.
    ///
    /// Tries a direct prediction first. When none is available, or the
    /// prediction call fails, the estimate is the arithmetic mean of
    /// comparable listings fetched with a relaxed similarity floor. The
    /// direct path carries a ±10% range, the averaged path ±15% and a
    /// lower confidence. Unlike recommendations, a valuation cannot be
    /// synthesized from nothing, so both paths failing is an error.
    pub async fn estimate(
        &self,
        subject: &PropertyDescriptor,
    ) -> Result<ValuationEstimate, ValuationError> {
        match self.backend.predict_price(subject).await {
            Ok(Some(direct)) => Ok(direct_estimate(direct)),
            Ok(None) => {
                info!("No direct estimate available, averaging comparable listings");
                self.estimate_from_comparables(subject).await
            }
            Err(err) => {
                warn!("Price prediction failed ({err:#}), averaging comparable listings");
                self.estimate_from_comparables(subject).await
            }
        }
    }

    async fn estimate_from_comparables(
        &self,
        subject: &PropertyDescriptor,
    ) -> Result<ValuationEstimate, ValuationError> {
        let query = SimilarPropertiesQuery {
            subject: subject.clone(),
            similarity_threshold: FALLBACK_SIMILARITY_THRESHOLD,
            include_pending: true,
        };

        let response = self
            .backend
            .similar_properties(&query)
            .await
            .map_err(ValuationError::Backend)?;

        let comparables = response.similar_properties;
        if comparables.is_empty() {
            return Err(ValuationError::NoComparables);
        }

        let average = average_price(&comparables);
        Ok(ValuationEstimate {
            estimated_price: average,
            confidence_score: FALLBACK_CONFIDENCE,
            price_range: PriceRange {
                min: average * 0.85,
                max: average * 1.15,
            },
            similar_properties: Some(comparables),
        })
    }
}

fn direct_estimate(response: PriceEstimateResponse) -> ValuationEstimate {
    ValuationEstimate {
        estimated_price: response.estimated_price,
        confidence_score: response
            .confidence_score
            .unwrap_or(DEFAULT_DIRECT_CONFIDENCE),
        price_range: PriceRange {
            min: response.estimated_price * 0.9,
            max: response.estimated_price * 1.1,
        },
        similar_properties: response.similar_properties,
    }
}

/// Mean asking price across comparables; a listing without a price counts
/// as zero.
fn average_price(properties: &[CandidateProperty]) -> f64 {
    let total: f64 = properties
        .iter()
        .map(|p| p.price_amount().unwrap_or(0.0))
        .sum();
    total / properties.len() as f64
}
