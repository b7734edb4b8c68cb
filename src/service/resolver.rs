use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::traits::PropertyBackend;
use crate::api::types::{FilterRequest, RecommendationRequest, ResolutionParams};
use crate::models::{CandidateProperty, RecommendationResponse, ShapeError};

/// Why a single query attempt produced no usable candidates. Internal to
/// the resolver; callers only ever see the empty result.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("transport failure: {0:#}")]
    Transport(anyhow::Error),
    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Turns a loose, partially-specified property query into a ranked,
/// validated candidate list, tolerating an unreliable backend.
pub struct RecommendationResolver<B> {
    backend: B,
}

impl<B: PropertyBackend> RecommendationResolver<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Resolve a filter request into a ranked candidate list.
    ///
    /// Never errors at the caller. A malformed request short-circuits
    /// before any backend call; an invalid primary response earns exactly
    /// one retry with relaxed parameters; a second invalid response is
    /// terminal. All of those converge on an empty vec, differentiated
    /// only in the logs. The result is built fresh per call and owned by
    /// the caller.
    pub async fn resolve(&self, filters: &FilterRequest) -> Vec<CandidateProperty> {
        let validated = match filters.validate() {
            Ok(validated) => validated,
            Err(err) => {
                warn!("Rejecting recommendation request: {err}");
                return Vec::new();
            }
        };

        let primary = RecommendationRequest {
            filters: validated.clone(),
            params: ResolutionParams::primary(),
        };

        match self.attempt(&primary).await {
            Ok(properties) => normalize_and_rank(properties),
            Err(err) => {
                info!("No usable primary response ({err}), retrying with relaxed parameters");

                let fallback = RecommendationRequest {
                    filters: validated,
                    params: ResolutionParams::fallback(),
                };
                match self.attempt(&fallback).await {
                    Ok(properties) => normalize_and_rank(properties),
                    Err(err) => {
                        warn!(
                            "{} produced no usable response after fallback: {err}",
                            self.backend.backend_name()
                        );
                        Vec::new()
                    }
                }
            }
        }
    }

    /// One query against the backend: transport, then shape validation.
    async fn attempt(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<CandidateProperty>, AttemptError> {
        let payload = self
            .backend
            .recommendations(request)
            .await
            .map_err(AttemptError::Transport)?;
        let response = RecommendationResponse::from_value(payload)?;

        debug!("Accepted {} candidates", response.properties.len());
        if let Some(total) = response.metadata.get("total_count").and_then(Value::as_u64) {
            debug!("Backend reports {total} total matches");
        }
        Ok(response.properties)
    }
}

/// Normalize accepted candidates and order them by similarity score,
/// highest first. The sort is stable: equal scores keep the backend's
/// relative order.
fn normalize_and_rank(mut properties: Vec<CandidateProperty>) -> Vec<CandidateProperty> {
    for property in &mut properties {
        property.normalize();
    }
    properties.sort_by(|a, b| b.similarity_score().total_cmp(&a.similarity_score()));
    properties
}
