// src/engine/recommendation.rs

//! Recomendações de preço.
//!
//! As regras ficam numa tabela ordenada; a primeira que casar vence. Regras
//! de classe (A, B, C) vêm antes das gerais. As marcadas como `Batch` só
//! valem no recálculo do catálogo inteiro, que conhece custo, volume vendido
//! e marca própria.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::{
    engine::{price_for_margin, round2},
    models::pricing::{
        AbcCategory, Confidence, PriceAction, PriceComparison, PricePosition, Recommendation,
        SalesRecord, SalesTrend,
    },
};

/// Abaixo disso (unidades na janela) a venda é considerada fraca.
const WEAK_SALES_UNITS: Decimal = dec!(10);
/// Folga (pontos percentuais) abaixo da margem alvo tolerada para produtos B.
const B_CLASS_MARGIN_SLACK: Decimal = dec!(5);
/// Variação entre as metades da janela para considerar tendência.
const TREND_THRESHOLD: Decimal = dec!(0.10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleScope {
    Always,
    Batch,
}

/// Tudo o que as regras podem olhar sobre um produto.
#[derive(Debug, Clone)]
pub struct RuleContext<'a> {
    pub our_price: Decimal,
    pub comparison: Option<&'a PriceComparison>,
    /// Margens em %
    pub current_margin: Decimal,
    pub target_margin: Decimal,
    pub abc_class: Option<AbcCategory>,
    pub sales_trend: SalesTrend,
    /// Só preenchidos no modo catálogo
    pub units_sold: Option<Decimal>,
    pub is_private_label: bool,
    pub private_label_min_margin: Decimal,
}

impl RuleContext<'_> {
    fn position(&self) -> PricePosition {
        self.comparison
            .map(|c| c.price_position)
            .unwrap_or(PricePosition::NoCompetitorData)
    }

    fn competitor_avg(&self) -> Option<Decimal> {
        self.comparison.map(|c| c.competitor_avg_price)
    }

    fn below_target(&self) -> bool {
        self.current_margin < self.target_margin
    }

    // Custo implícito a partir do preço e da margem atual
    fn implied_cost(&self) -> Decimal {
        self.our_price * (Decimal::ONE - self.current_margin / dec!(100))
    }
}

struct PricingRule {
    name: &'static str,
    class: Option<AbcCategory>,
    scope: RuleScope,
    condition: fn(&RuleContext) -> bool,
    // None quando falta algum dado para montar o preço; a avaliação segue adiante
    action: fn(&RuleContext) -> Option<Recommendation>,
}

fn increase(price: Decimal, reason: &str, confidence: Confidence) -> Recommendation {
    Recommendation {
        action: PriceAction::Increase,
        suggested_price: Some(round2(price)),
        reason: reason.to_string(),
        confidence,
    }
}

fn decrease(price: Decimal, reason: &str, confidence: Confidence) -> Recommendation {
    Recommendation {
        action: PriceAction::Decrease,
        suggested_price: Some(round2(price)),
        reason: reason.to_string(),
        confidence,
    }
}

fn maintain() -> Recommendation {
    Recommendation {
        action: PriceAction::Maintain,
        suggested_price: None,
        reason: "Preço competitivo e margem adequada; manter o preço atual.".to_string(),
        confidence: Confidence::Medium,
    }
}

const RULES: &[PricingRule] = &[
    // --- Classe A ---
    PricingRule {
        name: "a_cheapest_growing_below_target",
        class: Some(AbcCategory::A),
        scope: RuleScope::Always,
        condition: |ctx| {
            ctx.position() == PricePosition::CheaperThanAll
                && ctx.sales_trend == SalesTrend::Growing
                && ctx.below_target()
        },
        action: |ctx| {
            let avg = ctx.competitor_avg()?;
            let target = round2((ctx.our_price * dec!(1.03)).min(avg * dec!(0.95)));
            // Perto da média o teto de 95% fica abaixo do preço atual: não é aumento
            (target > ctx.our_price).then(|| {
                increase(
                    target,
                    "Produto A mais barato que todos os concorrentes, com vendas em alta e margem abaixo do alvo.",
                    Confidence::High,
                )
            })
        },
    },
    PricingRule {
        name: "a_most_expensive_declining",
        class: Some(AbcCategory::A),
        scope: RuleScope::Always,
        condition: |ctx| {
            ctx.position() == PricePosition::MoreExpensiveThanAll
                && ctx.sales_trend == SalesTrend::Declining
        },
        action: |ctx| {
            Some(decrease(
                ctx.competitor_avg()?,
                "Produto A mais caro que todos os concorrentes e com vendas em queda.",
                Confidence::High,
            ))
        },
    },
    // --- Classe B (só no lote) ---
    PricingRule {
        name: "b_margin_well_below_target",
        class: Some(AbcCategory::B),
        scope: RuleScope::Batch,
        condition: |ctx| ctx.current_margin < ctx.target_margin - B_CLASS_MARGIN_SLACK,
        action: |ctx| {
            Some(increase(
                price_for_margin(ctx.implied_cost(), ctx.target_margin),
                "Produto B com margem bem abaixo do alvo; subir até a margem alvo.",
                Confidence::Medium,
            ))
        },
    },
    PricingRule {
        name: "b_above_max_weak_sales",
        class: Some(AbcCategory::B),
        scope: RuleScope::Batch,
        condition: |ctx| {
            ctx.position() == PricePosition::MoreExpensiveThanAll
                && ctx.units_sold.is_some_and(|units| units < WEAK_SALES_UNITS)
        },
        action: |ctx| {
            Some(decrease(
                ctx.competitor_avg()?,
                "Produto B acima do preço máximo dos concorrentes e com vendas fracas.",
                Confidence::Medium,
            ))
        },
    },
    // --- Classe C ---
    PricingRule {
        name: "c_above_avg_not_growing",
        class: Some(AbcCategory::C),
        scope: RuleScope::Always,
        condition: |ctx| {
            ctx.position() == PricePosition::MoreExpensiveThanAvg
                && ctx.sales_trend != SalesTrend::Growing
        },
        action: |ctx| {
            Some(decrease(
                ctx.competitor_avg()? * dec!(0.95),
                "Produto C acima da média dos concorrentes sem crescimento de vendas.",
                Confidence::Medium,
            ))
        },
    },
    // --- Regras gerais ---
    PricingRule {
        name: "cheapest_far_below_avg_below_target",
        class: None,
        scope: RuleScope::Always,
        condition: |ctx| {
            ctx.position() == PricePosition::CheaperThanAll
                && ctx.below_target()
                && ctx
                    .comparison
                    .is_some_and(|c| c.price_difference_vs_avg < dec!(-10))
        },
        action: |ctx| {
            let avg = ctx.competitor_avg()?;
            Some(increase(
                (ctx.our_price * dec!(1.05)).min(avg * dec!(0.9)),
                "Mais barato que todos os concorrentes (mais de 10% abaixo da média) com margem abaixo do alvo.",
                Confidence::High,
            ))
        },
    },
    PricingRule {
        name: "most_expensive_declining",
        class: None,
        scope: RuleScope::Always,
        condition: |ctx| {
            ctx.position() == PricePosition::MoreExpensiveThanAll
                && ctx.sales_trend == SalesTrend::Declining
        },
        action: |ctx| {
            Some(decrease(
                ctx.competitor_avg()?,
                "Mais caro que todos os concorrentes e com vendas em queda.",
                Confidence::High,
            ))
        },
    },
    PricingRule {
        name: "around_avg_below_target",
        class: None,
        scope: RuleScope::Always,
        condition: |ctx| ctx.below_target() && ctx.position() == PricePosition::AroundAvg,
        action: |ctx| {
            Some(increase(
                ctx.our_price * dec!(1.02),
                "Preço na média do mercado com margem abaixo do alvo; ajuste leve de 2%.",
                Confidence::Medium,
            ))
        },
    },
    PricingRule {
        name: "private_label_min_margin",
        class: None,
        scope: RuleScope::Batch,
        condition: |ctx| ctx.is_private_label && ctx.current_margin < ctx.private_label_min_margin,
        action: |ctx| {
            Some(increase(
                price_for_margin(ctx.implied_cost(), ctx.private_label_min_margin),
                "Marca própria abaixo da margem mínima exigida.",
                Confidence::Medium,
            ))
        },
    },
];

fn evaluate(ctx: &RuleContext, include_batch: bool) -> Recommendation {
    RULES
        .iter()
        .filter(|rule| include_batch || rule.scope == RuleScope::Always)
        .filter(|rule| rule.class.is_none() || rule.class == ctx.abc_class)
        .filter(|rule| (rule.condition)(ctx))
        .find_map(|rule| {
            let recommendation = (rule.action)(ctx);
            if recommendation.is_some() {
                tracing::debug!(rule = rule.name, "regra de preço aplicada");
            }
            recommendation
        })
        .unwrap_or_else(maintain)
}

/// Recomendação para um produto a partir da comparação com concorrentes.
///
/// Margens em %. Só as regras de classe A, C e as gerais participam aqui.
pub fn recommend(
    comparison: &PriceComparison,
    current_margin: Decimal,
    target_margin: Decimal,
    abc_class: Option<AbcCategory>,
    sales_trend: SalesTrend,
) -> Recommendation {
    let ctx = RuleContext {
        our_price: comparison.our_price,
        comparison: Some(comparison),
        current_margin,
        target_margin,
        abc_class,
        sales_trend,
        units_sold: None,
        is_private_label: false,
        private_label_min_margin: Decimal::ZERO,
    };
    evaluate(&ctx, false)
}

/// Variante do recálculo em lote: inclui as regras de classe B e de marca própria.
pub fn recommend_for_catalog(ctx: &RuleContext) -> Recommendation {
    evaluate(ctx, true)
}

/// Tendência de vendas comparando a segunda metade da janela com a primeira.
pub fn sales_trend(sales: &[SalesRecord], period_start: NaiveDate, period_days: i64) -> SalesTrend {
    let midpoint = period_start + Duration::days(period_days / 2);
    let (first_half, second_half) = sales
        .iter()
        .filter(|s| s.sale_date >= period_start)
        .fold((Decimal::ZERO, Decimal::ZERO), |(first, second), s| {
            if s.sale_date < midpoint {
                (first + s.units_sold, second)
            } else {
                (first, second + s.units_sold)
            }
        });

    if first_half.is_zero() {
        // Sem base de comparação: tudo que vendeu é crescimento, nada vendido é estável
        return if second_half > Decimal::ZERO { SalesTrend::Growing } else { SalesTrend::Stable };
    }

    let change = (second_half - first_half) / first_half;
    if change > TREND_THRESHOLD {
        SalesTrend::Growing
    } else if change < -TREND_THRESHOLD {
        SalesTrend::Declining
    } else {
        SalesTrend::Stable
    }
}
