// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Pricing ---
        handlers::pricing::get_price_comparison,
        handlers::pricing::get_smart_price,
        handlers::pricing::recalculate_abc,
        handlers::pricing::recalculate_elasticity,
        handlers::pricing::recalculate_recommendations,
        handlers::pricing::list_recommendations,
        handlers::pricing::update_recommendation_status,
    ),
    components(
        schemas(
            // --- Settings ---
            models::settings::PricingSettings,
            models::settings::UpdatePricingSettingsRequest,

            // --- Pricing ---
            models::pricing::AbcCategory,
            models::pricing::RecommendationStatus,
            models::pricing::PriceAction,
            models::pricing::Confidence,
            models::pricing::SensitivityLabel,
            models::pricing::PricePosition,
            models::pricing::Product,
            models::pricing::CompetitorPriceObservation,
            models::pricing::PriceElasticityRecord,
            models::pricing::PricingRecommendation,
            models::pricing::PriceComparison,
            models::pricing::Recommendation,
            models::pricing::ProductPriceInsight,
            models::pricing::SmartPriceConstraints,
            models::pricing::SmartPriceResult,
            models::pricing::AbcRunSummary,
            models::pricing::RecommendationRunSummary,
            models::pricing::ElasticityRunSummary,

            // --- Payloads ---
            handlers::pricing::UpdateRecommendationStatusPayload,
            handlers::pricing::RecalculateElasticityPayload,
        )
    ),
    tags(
        (name = "Settings", description = "Regras de preço da Loja"),
        (name = "Pricing", description = "Comparação com concorrentes, curva ABC, elasticidade e recomendações")
    ),
    modifiers(&TenantHeaderAddon)
)]
pub struct ApiDoc;

struct TenantHeaderAddon;

impl utoipa::Modify for TenantHeaderAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "tenant_header",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-tenant-id"))),
        );
    }
}
