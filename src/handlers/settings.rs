// src/handlers/settings.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{
        db_utils::get_tenant_connection,
        error::ApiError,
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        tenancy::TenantContext,
    },
    models::settings::{PricingSettings, UpdatePricingSettingsRequest},
};

// GET /api/pricing/settings
#[utoipa::path(
    get,
    path = "/api/pricing/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Configurações de preço da loja (ou os padrões)", body = PricingSettings)
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {

    // Obtém conexão segura com RLS
    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let settings = app_state.settings_service
        .get_settings(&mut *conn, tenant.0)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(settings)))
}

// PUT /api/pricing/settings
#[utoipa::path(
    put,
    path = "/api/pricing/settings",
    tag = "Settings",
    request_body = UpdatePricingSettingsRequest,
    responses(
        (status = 200, description = "Configurações salvas", body = PricingSettings),
        (status = 400, description = "Valores inválidos")
    ),
    params(
        ("x-tenant-id" = uuid::Uuid, Header, description = "ID da Loja")
    )
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    tenant: TenantContext,
    Json(payload): Json<UpdatePricingSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {

    let mut conn = get_tenant_connection(&app_state, &tenant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let updated = app_state.settings_service
        .update_settings(&mut *conn, tenant.0, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(updated)))
}
