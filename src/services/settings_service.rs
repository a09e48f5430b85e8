// src/services/settings_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::settings::{PricingSettings, UpdatePricingSettingsRequest},
};

#[derive(Clone)]
pub struct SettingsService {
    settings_repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(settings_repo: SettingsRepository) -> Self {
        Self { settings_repo }
    }

    pub async fn get_settings<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<PricingSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.settings_repo.get_settings(executor, tenant_id).await
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: UpdatePricingSettingsRequest,
    ) -> Result<PricingSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        validate_request(&payload)?;

        let settings = self.settings_repo.upsert_settings(executor, tenant_id, &payload).await?;

        tracing::info!("⚙️ Configurações de preço atualizadas para a loja {}", tenant_id);
        Ok(settings)
    }
}

// Validação por campo + regra entre campos, tudo no mesmo ValidationErrors
fn validate_request(payload: &UpdatePricingSettingsRequest) -> Result<(), AppError> {
    let mut errors = match payload.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    if let Err(err) = payload.validate_consistency() {
        errors.add("threshold_b_percent", err);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> UpdatePricingSettingsRequest {
        let d = PricingSettings::defaults(Uuid::nil());
        UpdatePricingSettingsRequest {
            global_min_margin_percent: d.global_min_margin_percent,
            abc_a_max_discount_percent: d.abc_a_max_discount_percent,
            abc_b_max_discount_percent: d.abc_b_max_discount_percent,
            abc_c_max_discount_percent: d.abc_c_max_discount_percent,
            match_competitor_promo: d.match_competitor_promo,
            never_below_competitor_min: d.never_below_competitor_min,
            analysis_period_days: d.analysis_period_days,
            threshold_a_percent: d.threshold_a_percent,
            threshold_b_percent: d.threshold_b_percent,
            target_margin_percent: d.target_margin_percent,
            private_label_min_margin_percent: d.private_label_min_margin_percent,
        }
    }

    #[test]
    fn defaults_are_accepted() {
        assert!(validate_request(&request()).is_ok());
    }

    #[test]
    fn field_and_cross_field_errors_are_reported_together() {
        let mut req = request();
        req.global_min_margin_percent = dec!(100);
        req.threshold_a_percent = dec!(90);
        req.threshold_b_percent = dec!(20);

        let Err(AppError::ValidationError(errors)) = validate_request(&req) else {
            panic!("esperava erro de validação");
        };
        let fields = errors.field_errors();
        assert!(fields.contains_key("global_min_margin_percent"));
        assert!(fields.contains_key("threshold_b_percent"));
    }
}
