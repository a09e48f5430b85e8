// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;

use crate::common::error::ApiError;

// O nome do nosso cabeçalho HTTP customizado
const TENANT_ID_HEADER: &str = "x-tenant-id";

// A loja (tenant) dona dos dados da requisição
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

impl TenantContext {
    fn parse(value: Option<&str>) -> Result<Self, ApiError> {
        let value = value.ok_or_else(|| {
            ApiError::new(StatusCode::BAD_REQUEST, "O cabeçalho X-Tenant-ID é obrigatório.")
        })?;

        Uuid::parse_str(value.trim())
            .map(TenantContext)
            .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Cabeçalho X-Tenant-ID inválido (não é um UUID)."))
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = match parts.headers.get(TENANT_ID_HEADER) {
            Some(value) => Some(value.to_str().map_err(|_| {
                ApiError::new(StatusCode::BAD_REQUEST, "Cabeçalho X-Tenant-ID contém caracteres inválidos.")
            })?),
            None => None,
        };

        TenantContext::parse(header_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_header_is_bad_request() {
        let err = TenantContext::parse(None).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_uuid_is_bad_request() {
        let err = TenantContext::parse(Some("loja-1")).unwrap_err();
        assert!(err.error.contains("UUID"));
    }

    #[test]
    fn valid_uuid_is_accepted() {
        let id = Uuid::new_v4();
        let ctx = TenantContext::parse(Some(&id.to_string())).unwrap();
        assert_eq!(ctx.0, id);
    }
}
