// src/handlers/pricing.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{
        db_utils::get_tenant_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{i18n::Locale, tenancy::TenantContext},
    models::pricing::{
        AbcRunSummary, ElasticityRunSummary, PricingRecommendation, ProductPriceInsight,
        RecommendationRunSummary, RecommendationStatus, SmartPriceResult,
    },
};

// ---
// Payloads
// ---
fn validate_final_status(status: &RecommendationStatus) -> Result<(), ValidationError> {
    if *status == RecommendationStatus::New {
        let mut err = ValidationError::new("InvalidStatus");
        err.message = Some("O status deve ser 'applied' ou 'dismissed'.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecommendationStatusPayload {
    #[validate(custom(function = "validate_final_status"))]
    pub status: RecommendationStatus,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecalculateElasticityPayload {
    /// Sem produto, recalcula o catálogo inteiro
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecommendationsQuery {
    /// Filtra por status (new, applied, dismissed)
    pub status: Option<RecommendationStatus>,
}

// ---
// Análise de um produto
// ---

// GET /api/pricing/products/{id}/comparison
#[utoipa::path(
    get,
    path = "/api/pricing/products/{id}/comparison",
    tag = "Pricing",
    responses(
        (status = 200, description = "Comparação com concorrentes e recomendação", body = ProductPriceInsight),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do produto")
    )
)]
pub async fn get_price_comparison(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let insight = app_state.pricing_service
        .get_price_insight(&mut *conn, tenant.0, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(insight)))
}

// GET /api/pricing/products/{id}/smart-price
#[utoipa::path(
    get,
    path = "/api/pricing/products/{id}/smart-price",
    tag = "Pricing",
    responses(
        (status = 200, description = "Preço promocional sugerido", body = SmartPriceResult),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID do produto")
    )
)]
pub async fn get_smart_price(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let result = app_state.pricing_service
        .get_smart_price(&mut *conn, tenant.0, product_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(result)))
}

// ---
// Jobs de recálculo
// ---

// POST /api/pricing/abc/recalculate
#[utoipa::path(
    post,
    path = "/api/pricing/abc/recalculate",
    tag = "Pricing",
    responses(
        (status = 200, description = "Curva ABC recalculada", body = AbcRunSummary)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn recalculate_abc(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let summary = app_state.pricing_service
        .recalculate_abc(&mut *conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/pricing/elasticity/recalculate
#[utoipa::path(
    post,
    path = "/api/pricing/elasticity/recalculate",
    tag = "Pricing",
    request_body(content = RecalculateElasticityPayload, description = "Opcional: limita a um produto"),
    responses(
        (status = 200, description = "Elasticidade recalculada", body = ElasticityRunSummary),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn recalculate_elasticity(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    payload: Option<Json<RecalculateElasticityPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.unwrap_or_default();

    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let summary = app_state.pricing_service
        .recalculate_elasticity(&mut *conn, tenant.0, payload.product_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/pricing/recommendations/recalculate
#[utoipa::path(
    post,
    path = "/api/pricing/recommendations/recalculate",
    tag = "Pricing",
    responses(
        (status = 200, description = "Recomendações regeradas", body = RecommendationRunSummary)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn recalculate_recommendations(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let summary = app_state.pricing_service
        .recalculate_recommendations(&mut *conn, tenant.0)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(summary)))
}

// ---
// Recomendações
// ---

// GET /api/pricing/recommendations
#[utoipa::path(
    get,
    path = "/api/pricing/recommendations",
    tag = "Pricing",
    responses(
        (status = 200, description = "Lista de recomendações", body = Vec<PricingRecommendation>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ListRecommendationsQuery
    )
)]
pub async fn list_recommendations(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Query(query): Query<ListRecommendationsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let recommendations = app_state.pricing_service
        .list_recommendations(&mut *conn, tenant.0, query.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(recommendations)))
}

// PATCH /api/pricing/recommendations/{id}
#[utoipa::path(
    patch,
    path = "/api/pricing/recommendations/{id}",
    tag = "Pricing",
    request_body = UpdateRecommendationStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = PricingRecommendation),
        (status = 400, description = "Status inválido"),
        (status = 404, description = "Recomendação não encontrada"),
        (status = 409, description = "Recomendação já processada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja"),
        ("id" = Uuid, Path, description = "ID da recomendação")
    )
)]
pub async fn update_recommendation_status(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Path(recommendation_id): Path<Uuid>,
    Json(payload): Json<UpdateRecommendationStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let updated = app_state.pricing_service
        .update_recommendation_status(&mut *conn, tenant.0, recommendation_id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(updated)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pricing_handlers_are_routable() {
        let _router: axum::Router<AppState> = axum::Router::new()
            .route("/recommendations", axum::routing::get(list_recommendations))
            .route("/recommendations/{id}", axum::routing::patch(update_recommendation_status))
            .route("/products/{id}/comparison", axum::routing::get(get_price_comparison));
    }

    #[test]
    fn status_payload_rejects_new() {
        let payload: UpdateRecommendationStatusPayload =
            serde_json::from_str(r#"{"status":"new"}"#).unwrap();
        assert!(payload.validate().is_err());

        let payload: UpdateRecommendationStatusPayload =
            serde_json::from_str(r#"{"status":"applied"}"#).unwrap();
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn elasticity_payload_product_is_optional() {
        let payload: RecalculateElasticityPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.product_id.is_none());

        let id = Uuid::new_v4();
        let payload: RecalculateElasticityPayload =
            serde_json::from_str(&format!(r#"{{"productId":"{id}"}}"#)).unwrap();
        assert_eq!(payload.product_id, Some(id));
    }
}
