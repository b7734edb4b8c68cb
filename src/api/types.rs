use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::PropertyDescriptor;

/// Recommendation filters as they arrive from a caller (a form, a query
/// string, a config file). Values are raw JSON and untrusted until
/// [`FilterRequest::validate`] has passed them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub location: Value,
    #[serde(default, rename = "propertyType")]
    pub property_type: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<Value>,
}

impl FilterRequest {
    pub fn new(location: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            location: Value::String(location.into()),
            property_type: Value::String(property_type.into()),
            price: None,
            bedrooms: None,
        }
    }

    /// Price ceiling
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(Value::from(price));
        self
    }

    pub fn with_bedrooms(mut self, bedrooms: u32) -> Self {
        self.bedrooms = Some(Value::from(bedrooms));
        self
    }

    /// Check the request is well-formed: `location` and `propertyType`
    /// must be strings (possibly empty), `price` and `bedrooms` numbers
    /// when present. Malformed requests never reach the backend.
    pub fn validate(&self) -> Result<ValidatedFilters, FilterError> {
        let location = self
            .location
            .as_str()
            .ok_or(FilterError::Location)?
            .to_string();
        let property_type = self
            .property_type
            .as_str()
            .ok_or(FilterError::PropertyType)?
            .to_string();
        let price = match &self.price {
            Some(value) => Some(value.as_f64().ok_or(FilterError::Price)?),
            None => None,
        };
        let bedrooms = match &self.bedrooms {
            Some(value) => Some(value.as_f64().ok_or(FilterError::Bedrooms)?),
            None => None,
        };

        Ok(ValidatedFilters {
            location,
            property_type,
            price,
            bedrooms,
        })
    }
}

/// Why a [`FilterRequest`] was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("location must be a string")]
    Location,
    #[error("property type must be a string")]
    PropertyType,
    #[error("price must be a number")]
    Price,
    #[error("bedrooms must be a number")]
    Bedrooms,
}

/// A filter request that passed validation, in its wire form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedFilters {
    pub location: String,
    #[serde(rename = "propertyType")]
    pub property_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<f64>,
}

/// Embedding space the backend should search in. Resolution always uses
/// the combined space; the narrower ones are accepted by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[allow(dead_code)]
pub enum EmbeddingType {
    Text,
    Location,
    Combined,
}

/// Tuning knobs layered onto a filter request before transmission.
///
/// Two tiers exist. The fallback tier is strictly more permissive than the
/// primary one (lower similarity floor, wider price and geographic
/// tolerance, larger candidate pool); a retry never tightens constraints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionParams {
    #[serde(rename = "useFaiss")]
    pub use_faiss: bool,
    #[serde(rename = "useEmbeddings")]
    pub use_embeddings: bool,
    #[serde(rename = "embeddingType")]
    pub embedding_type: EmbeddingType,
    pub similarity_threshold: f64,
    pub vector_search: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_nearby: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range_buffer: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_search_top_k: Option<u32>,
}

impl ResolutionParams {
    /// First-attempt parameters: exact matching, no widening.
    pub fn primary() -> Self {
        Self {
            use_faiss: true,
            use_embeddings: true,
            embedding_type: EmbeddingType::Combined,
            similarity_threshold: 0.7,
            vector_search: true,
            include_nearby: None,
            price_range_buffer: None,
            vector_search_top_k: None,
        }
    }

    /// Relaxed parameters for the single retry after an invalid primary
    /// response: looser similarity floor, nearby areas included, ±20%
    /// price tolerance, wider candidate pool.
    pub fn fallback() -> Self {
        Self {
            similarity_threshold: 0.5,
            include_nearby: Some(true),
            price_range_buffer: Some(0.2),
            vector_search_top_k: Some(50),
            ..Self::primary()
        }
    }
}

/// Wire body of a recommendation query: validated filters and resolution
/// parameters flattened into one flat key/value map. Keys the backend does
/// not recognize are its job to ignore.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationRequest {
    #[serde(flatten)]
    pub filters: ValidatedFilters,
    #[serde(flatten)]
    pub params: ResolutionParams,
}

/// Wire body of the similar-properties query used by the valuation
/// fallback path.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarPropertiesQuery {
    #[serde(flatten)]
    pub subject: PropertyDescriptor,
    pub similarity_threshold: f64,
    pub include_pending: bool,
}

/// Caller-facing parameters for a direct property search.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    /// The backend calls this field `beds`
    #[serde(rename = "beds", skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<u32>,
    #[serde(rename = "baths", skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_balcony: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_empty_strings_and_numeric_extras() {
        let request = FilterRequest::new("", "");
        let validated = request.validate().unwrap();
        assert_eq!(validated.location, "");
        assert_eq!(validated.price, None);

        let request = FilterRequest::new("Mumbai", "Apartment")
            .with_price(9_000_000.0)
            .with_bedrooms(3);
        let validated = request.validate().unwrap();
        assert_eq!(validated.price, Some(9_000_000.0));
        assert_eq!(validated.bedrooms, Some(3.0));
    }

    #[test]
    fn rejects_malformed_requests() {
        let missing_location = FilterRequest {
            location: Value::Null,
            ..FilterRequest::new("", "Apartment")
        };
        assert_eq!(missing_location.validate(), Err(FilterError::Location));

        let numeric_location = FilterRequest {
            location: json!(42),
            ..FilterRequest::new("", "Apartment")
        };
        assert_eq!(numeric_location.validate(), Err(FilterError::Location));

        let bad_type = FilterRequest {
            property_type: json!(["Apartment"]),
            ..FilterRequest::new("Mumbai", "")
        };
        assert_eq!(bad_type.validate(), Err(FilterError::PropertyType));

        let bad_price = FilterRequest {
            price: Some(json!("cheap")),
            ..FilterRequest::new("Mumbai", "Apartment")
        };
        assert_eq!(bad_price.validate(), Err(FilterError::Price));

        let bad_bedrooms = FilterRequest {
            bedrooms: Some(Value::Null),
            ..FilterRequest::new("Mumbai", "Apartment")
        };
        assert_eq!(bad_bedrooms.validate(), Err(FilterError::Bedrooms));
    }

    #[test]
    fn fallback_tier_is_strictly_more_permissive() {
        let primary = ResolutionParams::primary();
        let fallback = ResolutionParams::fallback();

        assert!(fallback.similarity_threshold < primary.similarity_threshold);
        assert_eq!(fallback.include_nearby, Some(true));
        assert_eq!(fallback.price_range_buffer, Some(0.2));
        assert_eq!(fallback.vector_search_top_k, Some(50));
        assert!(primary.include_nearby.is_none());
        assert!(primary.price_range_buffer.is_none());
        assert!(primary.vector_search_top_k.is_none());
    }

    #[test]
    fn recommendation_request_serializes_to_one_flat_map() {
        let request = RecommendationRequest {
            filters: FilterRequest::new("Mumbai", "Apartment")
                .with_bedrooms(2)
                .validate()
                .unwrap(),
            params: ResolutionParams::primary(),
        };

        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            json!({
                "location": "Mumbai",
                "propertyType": "Apartment",
                "bedrooms": 2.0,
                "useFaiss": true,
                "useEmbeddings": true,
                "embeddingType": "combined",
                "similarity_threshold": 0.7,
                "vector_search": true
            })
        );
    }

    #[test]
    fn search_query_renames_bedrooms_to_beds() {
        let query = SearchQuery {
            location: Some("Pune".to_string()),
            bedrooms: Some(2),
            ..SearchQuery::default()
        };

        let wire = serde_json::to_value(&query).unwrap();
        assert_eq!(wire, json!({"location": "Pune", "beds": 2}));
    }

    #[test]
    fn similar_properties_query_carries_relaxed_knobs() {
        let query = SimilarPropertiesQuery {
            subject: PropertyDescriptor {
                location: "Mumbai".to_string(),
                total_area: 950.0,
                bedrooms: 2,
                bathrooms: 1,
                property_type: "Apartment".to_string(),
                amenities: vec![],
            },
            similarity_threshold: 0.6,
            include_pending: true,
        };

        let wire = serde_json::to_value(&query).unwrap();
        assert_eq!(wire["similarity_threshold"], json!(0.6));
        assert_eq!(wire["include_pending"], json!(true));
        assert_eq!(wire["location"], json!("Mumbai"));
    }
}
