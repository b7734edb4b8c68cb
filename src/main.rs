mod api;
mod config;
mod models;
mod service;

use api::types::{FilterRequest, SearchQuery};
use api::HttpPropertyApi;
use config::Config;
use models::{PropertyDescriptor, RecommendationReport};
use service::{format_price, RecommendationResolver, ValuationService};
use tracing::{info, warn, Level};
use tracing_subscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("🏠 Estate Scout - Property API Client");
    info!("======================================");
    info!("");

    // Resolve configuration once, then inject it
    let config = Config::from_env();
    info!("Using property API at {}", config.api_base_url);

    let api = HttpPropertyApi::new(&config)?;
    let resolver = RecommendationResolver::new(api.clone());
    let valuations = ValuationService::new(api.clone());

    // Resolve recommendations for a sample query
    let filters = FilterRequest::new("Mumbai", "Apartment")
        .with_price(9_000_000.0)
        .with_bedrooms(2);

    info!("Resolving recommendations for 2BHK apartments in Mumbai...");
    let properties = resolver.resolve(&filters).await;

    if properties.is_empty() {
        info!("No matching properties found");
    } else {
        info!("\n✅ Resolved {} recommended properties\n", properties.len());

        for (i, property) in properties.iter().enumerate() {
            let price = property
                .price_amount()
                .map(format_price)
                .unwrap_or_else(|| "price on request".to_string());
            println!("{}. {} ({})", i + 1, property.title, price);
            println!("   {}", property.location);
            println!("   ID: {}", property.id);
            println!("   Similarity: {:.2}", property.similarity_score());
            println!();
        }
    }

    // Save ranked results
    let report = RecommendationReport::new(serde_json::to_value(&filters)?, properties);
    let json = serde_json::to_string_pretty(&report)?;
    tokio::fs::write("recommendations.json", json).await?;
    info!("💾 Saved ranked recommendations to recommendations.json");

    // Direct search against the same backend
    let query = SearchQuery {
        location: Some("Mumbai".to_string()),
        max_price: Some(9_000_000.0),
        bedrooms: Some(2),
        ..SearchQuery::default()
    };
    let search_results = api.search(&query).await;
    info!("🔍 Direct search returned {} listings", search_results.len());

    // Valuation demo
    let subject = PropertyDescriptor {
        location: "Mumbai".to_string(),
        total_area: 1200.0,
        bedrooms: 2,
        bathrooms: 2,
        property_type: "Apartment".to_string(),
        amenities: vec!["Balcony".to_string(), "Parking".to_string()],
    };

    if let Err(problems) = subject.validate() {
        warn!("Valuation subject incomplete: {}", problems.join(", "));
    } else {
        info!("Valuing a 1200 sqft 2BHK in Mumbai...");
        match valuations.estimate(&subject).await {
            Ok(estimate) => {
                info!(
                    "💰 Estimated at {} (confidence {:.0}%)",
                    format_price(estimate.estimated_price),
                    estimate.confidence_score * 100.0
                );
                info!(
                    "   Range: {} - {}",
                    format_price(estimate.price_range.min),
                    format_price(estimate.price_range.max)
                );
            }
            Err(err) => warn!("{err}"),
        }
    }

    // Market snapshot for the same location
    match api.market_analysis("Mumbai").await {
        Ok(stats) => {
            info!(
                "📊 Mumbai market: average {} (range {} - {})",
                format_price(stats.average_price),
                format_price(stats.price_range.min),
                format_price(stats.price_range.max)
            );
            info!("   In demand: {}", stats.popular_locations.join(", "));
            for entry in &stats.property_types {
                info!("   {}: {} listings", entry.property_type, entry.count);
            }
        }
        Err(err) => warn!("Market analysis unavailable: {err:#}"),
    }

    Ok(())
}
