// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::engine::abc::AbcThresholds;

// Configuração de precificação por loja (tabela 'pricing_settings')
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricingSettings {
    #[schema(ignore)] // O contexto (Header) já define a loja
    pub tenant_id: Uuid,

    #[schema(example = "15")]
    pub global_min_margin_percent: Decimal,

    #[schema(example = "10")]
    pub abc_a_max_discount_percent: Decimal,
    #[schema(example = "20")]
    pub abc_b_max_discount_percent: Decimal,
    #[schema(example = "30")]
    pub abc_c_max_discount_percent: Decimal,

    pub match_competitor_promo: bool,
    pub never_below_competitor_min: bool,

    #[schema(example = 90)]
    pub analysis_period_days: i32,

    #[schema(example = "80")]
    pub threshold_a_percent: Decimal,
    #[schema(example = "15")]
    pub threshold_b_percent: Decimal,

    #[schema(example = "25")]
    pub target_margin_percent: Decimal,
    #[schema(example = "35")]
    pub private_label_min_margin_percent: Decimal,

    pub updated_at: Option<DateTime<Utc>>,
}

impl PricingSettings {
    /// Valores usados quando a loja ainda não salvou nenhuma configuração.
    pub fn defaults(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            global_min_margin_percent: dec!(15),
            abc_a_max_discount_percent: dec!(10),
            abc_b_max_discount_percent: dec!(20),
            abc_c_max_discount_percent: dec!(30),
            match_competitor_promo: false,
            never_below_competitor_min: true,
            analysis_period_days: 90,
            threshold_a_percent: dec!(80),
            threshold_b_percent: dec!(15),
            target_margin_percent: dec!(25),
            private_label_min_margin_percent: dec!(35),
            updated_at: None,
        }
    }

    pub fn abc_thresholds(&self) -> AbcThresholds {
        AbcThresholds {
            a_percent: self.threshold_a_percent,
            b_percent: self.threshold_b_percent,
        }
    }
}

// ---
// Validação Customizada
// ---
fn validate_percent(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > dec!(100) {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.add_param("max".into(), &100.0);
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_margin(val: &Decimal) -> Result<(), ValidationError> {
    // Margem de 100% exigiria preço infinito
    if val.is_sign_negative() || *val >= dec!(100) {
        let mut err = ValidationError::new("range");
        err.message = Some("A margem deve ser maior ou igual a 0 e menor que 100.".into());
        return Err(err);
    }
    Ok(())
}

// Campo omitido no PUT mantém a trava ligada, como nos padrões
fn default_never_below_competitor_min() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePricingSettingsRequest {
    #[validate(custom(function = "validate_margin"))]
    #[schema(example = "15")]
    pub global_min_margin_percent: Decimal,

    #[validate(custom(function = "validate_percent"))]
    pub abc_a_max_discount_percent: Decimal,
    #[validate(custom(function = "validate_percent"))]
    pub abc_b_max_discount_percent: Decimal,
    #[validate(custom(function = "validate_percent"))]
    pub abc_c_max_discount_percent: Decimal,

    #[serde(default)]
    pub match_competitor_promo: bool,
    #[serde(default = "default_never_below_competitor_min")]
    pub never_below_competitor_min: bool,

    #[validate(range(min = 1, max = 730, message = "O período de análise deve ter entre 1 e 730 dias."))]
    #[schema(example = 90)]
    pub analysis_period_days: i32,

    #[validate(custom(function = "validate_percent"))]
    pub threshold_a_percent: Decimal,
    #[validate(custom(function = "validate_percent"))]
    pub threshold_b_percent: Decimal,

    #[validate(custom(function = "validate_margin"))]
    pub target_margin_percent: Decimal,
    #[validate(custom(function = "validate_margin"))]
    pub private_label_min_margin_percent: Decimal,
}

impl UpdatePricingSettingsRequest {
    // Regra: as faixas A + B não podem passar de 100% da receita.
    pub fn validate_consistency(&self) -> Result<(), ValidationError> {
        if self.threshold_a_percent + self.threshold_b_percent > dec!(100) {
            let mut err = ValidationError::new("ThresholdsExceed100");
            err.message = Some("A soma das faixas A e B não pode passar de 100%.".into());
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> UpdatePricingSettingsRequest {
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
    fn defaults_pass_validation() {
        let req = valid_request();
        assert!(req.validate().is_ok());
        assert!(req.validate_consistency().is_ok());
    }

    #[test]
    fn margin_of_one_hundred_is_rejected() {
        let mut req = valid_request();
        req.global_min_margin_percent = dec!(100);
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("global_min_margin_percent"));
    }

    #[test]
    fn negative_discount_is_rejected() {
        let mut req = valid_request();
        req.abc_b_max_discount_percent = dec!(-5);
        assert!(req.validate().is_err());
    }

    #[test]
    fn analysis_period_out_of_range_is_rejected() {
        let mut req = valid_request();
        req.analysis_period_days = 0;
        assert!(req.validate().is_err());
    }

    #[test]
    fn thresholds_summing_over_100_fail_consistency() {
        let mut req = valid_request();
        req.threshold_a_percent = dec!(90);
        req.threshold_b_percent = dec!(15);
        assert!(req.validate().is_ok());
        assert!(req.validate_consistency().is_err());
    }

    #[test]
    fn default_thresholds_map_to_abc_thresholds() {
        let t = PricingSettings::defaults(Uuid::nil()).abc_thresholds();
        assert_eq!(t.a_percent, dec!(80));
        assert_eq!(t.b_percent, dec!(15));
    }

    #[test]
    fn omitted_competitor_min_flag_keeps_the_guard_on() {
        let json = r#"{
            "globalMinMarginPercent": 15,
            "abcAMaxDiscountPercent": 10,
            "abcBMaxDiscountPercent": 20,
            "abcCMaxDiscountPercent": 30,
            "analysisPeriodDays": 90,
            "thresholdAPercent": 80,
            "thresholdBPercent": 15,
            "targetMarginPercent": 25,
            "privateLabelMinMarginPercent": 35
        }"#;
        let req: UpdatePricingSettingsRequest = serde_json::from_str(json).unwrap();
        assert!(req.never_below_competitor_min);
        assert_eq!(req.never_below_competitor_min, PricingSettings::defaults(Uuid::nil()).never_below_competitor_min);
        assert!(!req.match_competitor_promo);
    }
}
