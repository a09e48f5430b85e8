// src/engine/smart_price.rs

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::{
    engine::{margin_percent, price_for_margin, round2},
    models::{
        pricing::{AbcCategory, Product, SmartPriceConstraints, SmartPriceResult},
        settings::PricingSettings,
    },
};

/// Sem elasticidade calculada, cada 1% de desconto vira 2% de volume.
const FALLBACK_UPLIFT_FACTOR: Decimal = dec!(2);

#[derive(Debug, Clone, Copy, Default)]
pub struct CompetitorPrices {
    pub min: Option<Decimal>,
    pub avg: Option<Decimal>,
}

fn max_discount_for(settings: &PricingSettings, class: Option<AbcCategory>) -> Decimal {
    match class {
        Some(AbcCategory::A) => settings.abc_a_max_discount_percent,
        Some(AbcCategory::B) => settings.abc_b_max_discount_percent,
        // Produto sem classe recebe a regra da cauda longa
        Some(AbcCategory::C) | None => settings.abc_c_max_discount_percent,
    }
}

/// Calcula o preço promocional respeitando, nesta ordem de precedência:
/// desconto máximo da classe ABC, piso de margem, preço médio do concorrente
/// (opcional) e preço mínimo do concorrente (opcional, prevalece por último).
///
/// O preço final é arredondado para cima no centavo, então nenhum piso é furado.
pub fn compute(
    product: &Product,
    settings: &PricingSettings,
    competitors: CompetitorPrices,
    elasticity_coefficient: Option<f64>,
) -> SmartPriceResult {
    let current_price = product.current_price;
    let max_discount_pct = max_discount_for(settings, product.abc_category);

    let min_margin_price = price_for_margin(product.cost_price, settings.global_min_margin_percent);
    let max_discount_price = current_price * (Decimal::ONE - max_discount_pct / dec!(100));

    let mut promo_price = min_margin_price.max(max_discount_price);

    if settings.match_competitor_promo {
        if let Some(avg) = competitors.avg {
            promo_price = min_margin_price.max(promo_price.min(avg));
        }
    }

    if settings.never_below_competitor_min {
        if let Some(min) = competitors.min {
            promo_price = promo_price.max(min);
        }
    }

    let promo_price = promo_price.round_dp_with_strategy(2, RoundingStrategy::ToPositiveInfinity);

    let promo_margin = margin_percent(promo_price, product.cost_price);
    let (discount_percent, price_change_percent) = if current_price.is_zero() {
        (Decimal::ZERO, Decimal::ZERO)
    } else {
        let change = (promo_price - current_price) / current_price * dec!(100);
        (-change, change)
    };

    let expected_uplift = elasticity_coefficient
        .and_then(Decimal::from_f64)
        .map(|coefficient| (coefficient * price_change_percent).abs())
        .unwrap_or_else(|| price_change_percent.abs() * FALLBACK_UPLIFT_FACTOR);

    let constraints_met = SmartPriceConstraints {
        min_margin: promo_margin >= settings.global_min_margin_percent,
        max_discount: discount_percent <= max_discount_pct,
        above_competitor_min: competitors.min.is_none_or(|min| promo_price >= min),
    };

    SmartPriceResult {
        current_price,
        promo_price,
        promo_margin: round2(promo_margin),
        discount_percent: round2(discount_percent),
        expected_uplift_percent: round2(expected_uplift),
        constraints_met,
    }
}
