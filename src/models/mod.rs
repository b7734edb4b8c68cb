use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// One backend-returned property considered a match for a query.
///
/// Only `id`, `title` and `location` are required; everything else the
/// backend sends is kept verbatim in `details` so an odd optional field can
/// never invalidate a batch, and so nothing is lost between wire and caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProperty {
    pub id: i64,
    pub title: String,
    pub location: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CandidateProperty {
    /// Asking price, if the backend sent one. Numeric strings count.
    pub fn price_amount(&self) -> Option<f64> {
        match self.details.get("price") {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Similarity score reported by the backend; missing or non-numeric
    /// scores read as 0.
    pub fn similarity_score(&self) -> f64 {
        self.details
            .get("similarity_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Repair the fields the backend is sloppy about: a numeric-string
    /// `price` becomes a number (anything else is left as given), and a
    /// missing or non-numeric `similarity_score` becomes 0.
    pub fn normalize(&mut self) {
        if let Some(Value::String(raw)) = self.details.get("price") {
            let parsed = raw.trim().parse::<f64>().ok().and_then(Number::from_f64);
            if let Some(price) = parsed {
                self.details.insert("price".to_string(), Value::Number(price));
            }
        }

        let score = self.details.get("similarity_score");
        if score.and_then(Value::as_f64).is_none() {
            self.details
                .insert("similarity_score".to_string(), Value::from(0));
        }
    }
}

/// A recommendation payload that passed shape validation.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationResponse {
    pub properties: Vec<CandidateProperty>,
    /// Optional backend diagnostics (total_count, similarity_scores,
    /// vector_search_used). Not part of the validity predicate, so any
    /// shape is accepted here.
    #[serde(default)]
    pub metadata: Value,
}

impl RecommendationResponse {
    /// Validate a raw payload against the required candidate shape.
    ///
    /// The payload must be an object carrying a `properties` array, and
    /// every element must have a numeric `id`, a string `title` and a
    /// string `location`. One malformed element rejects the whole batch;
    /// wire data is never trusted without passing through here.
    pub fn from_value(value: Value) -> Result<Self, ShapeError> {
        serde_json::from_value(value).map_err(ShapeError::from)
    }
}

/// A backend payload that does not match the expected recommendation shape.
#[derive(Debug, Error)]
#[error("payload does not match the recommendation shape: {0}")]
pub struct ShapeError(#[from] serde_json::Error);

/// Inclusive price band around an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// The property a caller wants valued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub location: String,
    pub total_area: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub property_type: String,
    pub amenities: Vec<String>,
}

impl PropertyDescriptor {
    /// Check the descriptor is complete enough to value, reporting every
    /// problem at once so a form can surface them together.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.location.trim().is_empty() {
            errors.push("Location is required".to_string());
        }
        if self.total_area <= 0.0 {
            errors.push("Valid total area is required".to_string());
        }
        if self.bedrooms == 0 {
            errors.push("Valid number of bedrooms is required".to_string());
        }
        if self.bathrooms == 0 {
            errors.push("Valid number of bathrooms is required".to_string());
        }
        if self.property_type.trim().is_empty() {
            errors.push("Property type is required".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Direct price prediction as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct PriceEstimateResponse {
    pub estimated_price: f64,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub similar_properties: Option<Vec<CandidateProperty>>,
}

/// Comparable listings returned by the similar-properties endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SimilarPropertiesResponse {
    #[serde(default)]
    pub similar_properties: Vec<CandidateProperty>,
}

/// Final valuation handed to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationEstimate {
    pub estimated_price: f64,
    pub confidence_score: f64,
    pub price_range: PriceRange,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similar_properties: Option<Vec<CandidateProperty>>,
}

/// Result set of a direct property search.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<CandidateProperty>,
}

/// Aggregate market statistics for a location.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketStats {
    #[serde(rename = "averagePrice")]
    pub average_price: f64,
    #[serde(rename = "priceRange")]
    pub price_range: PriceRange,
    #[serde(rename = "popularLocations")]
    pub popular_locations: Vec<String>,
    #[serde(rename = "propertyTypes")]
    pub property_types: Vec<PropertyTypeCount>,
}

/// Listing count per property type.
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyTypeCount {
    #[serde(rename = "type")]
    pub property_type: String,
    pub count: u64,
}

/// Ranked recommendation results as persisted to disk by the runner.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationReport {
    pub generated_at: DateTime<Utc>,
    /// The filter request as submitted by the caller
    pub query: Value,
    pub properties: Vec<CandidateProperty>,
}

impl RecommendationReport {
    pub fn new(query: Value, properties: Vec<CandidateProperty>) -> Self {
        Self {
            generated_at: Utc::now(),
            query,
            properties,
        }
    }
}
