// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::middleware::i18n::Locale;

// Erros de domínio/infraestrutura. Os handlers convertem para ApiError.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Produto {0} não encontrado")]
    ProductNotFound(Uuid),

    #[error("Recomendação {0} não encontrada")]
    RecommendationNotFound(Uuid),

    #[error("Recomendação {0} já foi processada")]
    RecommendationAlreadyProcessed(Uuid),

    #[error("Status de recomendação inválido para esta operação")]
    InvalidRecommendationStatus,

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// O erro que de fato vai para o cliente (status + mensagem traduzida)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidRecommendationStatus => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound(_) | AppError::RecommendationNotFound(_) => StatusCode::NOT_FOUND,
            AppError::RecommendationAlreadyProcessed(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self, locale: &Locale) -> String {
        match (self, locale) {
            (AppError::ValidationError(_), Locale::Pt) => "Um ou mais campos são inválidos.".into(),
            (AppError::ValidationError(_), Locale::En) => "One or more fields are invalid.".into(),
            (AppError::ProductNotFound(id), Locale::Pt) => format!("Produto {} não encontrado.", id),
            (AppError::ProductNotFound(id), Locale::En) => format!("Product {} not found.", id),
            (AppError::RecommendationNotFound(id), Locale::Pt) => format!("Recomendação {} não encontrada.", id),
            (AppError::RecommendationNotFound(id), Locale::En) => format!("Recommendation {} not found.", id),
            (AppError::RecommendationAlreadyProcessed(_), Locale::Pt) => {
                "Só recomendações novas podem ser aplicadas ou descartadas.".into()
            }
            (AppError::RecommendationAlreadyProcessed(_), Locale::En) => {
                "Only new recommendations can be applied or dismissed.".into()
            }
            (AppError::InvalidRecommendationStatus, Locale::Pt) => {
                "O status deve ser 'applied' ou 'dismissed'.".into()
            }
            (AppError::InvalidRecommendationStatus, Locale::En) => "Status must be 'applied' or 'dismissed'.".into(),
            (_, Locale::Pt) => "Ocorreu um erro inesperado.".into(),
            (_, Locale::En) => "An unexpected error occurred.".into(),
        }
    }

    /// Converte para a resposta HTTP no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .map(Value::String)
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error: self.message(locale), details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn not_found_maps_to_404_with_translated_message() {
        let id = Uuid::nil();
        let api = AppError::ProductNotFound(id).to_api_error(&Locale::En);
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.error, format!("Product {} not found.", id));

        let api = AppError::ProductNotFound(id).to_api_error(&Locale::Pt);
        assert!(api.error.starts_with("Produto"));
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("fora da faixa".into());
        errors.add("thresholdAPercent", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale::Pt);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["thresholdAPercent"][0], "fora da faixa");
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo")).to_api_error(&Locale::En);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }

    #[test]
    fn processed_recommendation_is_a_conflict() {
        let api = AppError::RecommendationAlreadyProcessed(Uuid::nil()).to_api_error(&Locale::Pt);
        assert_eq!(api.status, StatusCode::CONFLICT);
    }
}
