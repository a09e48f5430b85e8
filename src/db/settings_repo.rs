// src/db/settings_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::settings::{PricingSettings, UpdatePricingSettingsRequest},
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<PricingSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Loja sem configuração salva usa os valores padrão
        let settings = sqlx::query_as::<_, PricingSettings>(
            "SELECT * FROM pricing_settings WHERE tenant_id = $1",
        )
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(settings.unwrap_or_else(|| PricingSettings::defaults(tenant_id)))
    }

    pub async fn upsert_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &UpdatePricingSettingsRequest,
    ) -> Result<PricingSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, PricingSettings>(
            r#"
            INSERT INTO pricing_settings (
                tenant_id, global_min_margin_percent,
                abc_a_max_discount_percent, abc_b_max_discount_percent, abc_c_max_discount_percent,
                match_competitor_promo, never_below_competitor_min, analysis_period_days,
                threshold_a_percent, threshold_b_percent,
                target_margin_percent, private_label_min_margin_percent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (tenant_id)
            DO UPDATE SET
                global_min_margin_percent = EXCLUDED.global_min_margin_percent,
                abc_a_max_discount_percent = EXCLUDED.abc_a_max_discount_percent,
                abc_b_max_discount_percent = EXCLUDED.abc_b_max_discount_percent,
                abc_c_max_discount_percent = EXCLUDED.abc_c_max_discount_percent,
                match_competitor_promo = EXCLUDED.match_competitor_promo,
                never_below_competitor_min = EXCLUDED.never_below_competitor_min,
                analysis_period_days = EXCLUDED.analysis_period_days,
                threshold_a_percent = EXCLUDED.threshold_a_percent,
                threshold_b_percent = EXCLUDED.threshold_b_percent,
                target_margin_percent = EXCLUDED.target_margin_percent,
                private_label_min_margin_percent = EXCLUDED.private_label_min_margin_percent,
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(tenant_id)
            .bind(input.global_min_margin_percent)
            .bind(input.abc_a_max_discount_percent)
            .bind(input.abc_b_max_discount_percent)
            .bind(input.abc_c_max_discount_percent)
            .bind(input.match_competitor_promo)
            .bind(input.never_below_competitor_min)
            .bind(input.analysis_period_days)
            .bind(input.threshold_a_percent)
            .bind(input.threshold_b_percent)
            .bind(input.target_margin_percent)
            .bind(input.private_label_min_margin_percent)
            .fetch_one(executor)
            .await?;

        Ok(settings)
    }
}
