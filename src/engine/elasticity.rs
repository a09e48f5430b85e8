// src/engine/elasticity.rs

//! Estimativa de elasticidade-preço por média de elasticidades pontuais.
//!
//! Não é regressão: cada par consecutivo de vendas com mudança de preço
//! acima de 1% gera uma amostra `Δq% / Δp%`, e o coeficiente é a média.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;

use crate::models::pricing::{PriceHistoryEntry, SalesRecord, SensitivityLabel};

pub const MIN_SALES_POINTS: usize = 10;
pub const MIN_MATCHED_POINTS: usize = 5;
pub const MIN_ELASTICITY_SAMPLES: usize = 3;
/// Mudanças de preço menores que isso (fração) são ruído.
const MIN_PRICE_CHANGE: f64 = 0.01;
/// Amostras necessárias para confiança 1.0.
const FULL_CONFIDENCE_SAMPLES: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticityEstimate {
    pub coefficient: f64,
    /// Entre 0 e 1
    pub confidence: f64,
    pub sensitivity: SensitivityLabel,
    /// Amostras válidas usadas na média
    pub data_points: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsufficientData {
    TooFewSales { found: usize },
    TooFewPricedSales { found: usize },
    TooFewPriceChanges { found: usize },
}

/// "Não calculável" é diferente de um coeficiente calculado.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElasticityOutcome {
    Unavailable(InsufficientData),
    Computed(ElasticityEstimate),
}

#[cfg(test)]
impl ElasticityOutcome {
    pub fn computed(self) -> Option<ElasticityEstimate> {
        match self {
            ElasticityOutcome::Computed(estimate) => Some(estimate),
            ElasticityOutcome::Unavailable(_) => None,
        }
    }
}

pub fn sensitivity_label(coefficient: f64) -> SensitivityLabel {
    if coefficient > -0.8 {
        SensitivityLabel::Inelastic
    } else if coefficient > -1.5 {
        SensitivityLabel::Normal
    } else {
        SensitivityLabel::HighlyElastic
    }
}

/// Preço vigente na data: o último `valid_from <= date`.
/// `prices` precisa estar ordenado por `valid_from`.
fn price_as_of(prices: &[(NaiveDate, f64)], date: NaiveDate) -> Option<f64> {
    let idx = prices.partition_point(|(valid_from, _)| *valid_from <= date);
    idx.checked_sub(1).map(|i| prices[i].1)
}

pub fn estimate(sales_history: &[SalesRecord], price_history: &[PriceHistoryEntry]) -> ElasticityOutcome {
    if sales_history.len() < MIN_SALES_POINTS {
        return ElasticityOutcome::Unavailable(InsufficientData::TooFewSales { found: sales_history.len() });
    }

    let mut prices: Vec<(NaiveDate, f64)> = price_history
        .iter()
        .filter_map(|p| Some((p.valid_from, p.regular_price.to_f64()?)))
        .collect();
    prices.sort_by_key(|(valid_from, _)| *valid_from);

    let mut sales: Vec<&SalesRecord> = sales_history.iter().collect();
    sales.sort_by_key(|s| s.sale_date);

    // Pares (preço, quantidade) na ordem cronológica
    let matched: Vec<(f64, f64)> = sales
        .iter()
        .filter_map(|sale| {
            let quantity = sale.units_sold.to_f64()?;
            let price = price_as_of(&prices, sale.sale_date)?;
            (price > 0.0 && quantity > 0.0).then_some((price, quantity))
        })
        .collect();

    if matched.len() < MIN_MATCHED_POINTS {
        return ElasticityOutcome::Unavailable(InsufficientData::TooFewPricedSales { found: matched.len() });
    }

    let samples: Vec<f64> = matched
        .windows(2)
        .filter_map(|pair| {
            let (p1, q1) = pair[0];
            let (p2, q2) = pair[1];
            let price_change = (p2 - p1) / p1;
            if price_change.abs() <= MIN_PRICE_CHANGE {
                return None;
            }
            let quantity_change = (q2 - q1) / q1;
            let elasticity = quantity_change / price_change;
            elasticity.is_finite().then_some(elasticity)
        })
        .collect();

    if samples.len() < MIN_ELASTICITY_SAMPLES {
        return ElasticityOutcome::Unavailable(InsufficientData::TooFewPriceChanges { found: samples.len() });
    }

    let coefficient = samples.iter().sum::<f64>() / samples.len() as f64;
    ElasticityOutcome::Computed(ElasticityEstimate {
        coefficient,
        confidence: (samples.len() as f64 / FULL_CONFIDENCE_SAMPLES).min(1.0),
        sensitivity: sensitivity_label(coefficient),
        data_points: samples.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal::Decimal;
    use rust_decimal::prelude::FromPrimitive;
    use uuid::Uuid;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    fn series(points: &[(f64, f64)]) -> (Vec<SalesRecord>, Vec<PriceHistoryEntry>) {
        let sales = points
            .iter()
            .enumerate()
            .map(|(i, (_, q))| SalesRecord {
                product_id: Uuid::nil(),
                sale_date: day(i as i64),
                units_sold: Decimal::from_f64(*q).unwrap(),
                selling_price: Decimal::ZERO,
                purchase_price: Decimal::ZERO,
            })
            .collect();
        let prices = points
            .iter()
            .enumerate()
            .map(|(i, (p, _))| PriceHistoryEntry {
                product_id: Uuid::nil(),
                valid_from: day(i as i64),
                regular_price: Decimal::from_f64(*p).unwrap(),
            })
            .collect();
        (sales, prices)
    }

    #[test]
    fn fewer_than_ten_sales_is_unavailable() {
        let (sales, prices) = series(&[(10.0, 100.0); 9]);
        assert_eq!(
            estimate(&sales, &prices),
            ElasticityOutcome::Unavailable(InsufficientData::TooFewSales { found: 9 })
        );
    }

    #[test]
    fn constant_price_has_no_samples() {
        let (sales, prices) = series(&[(10.0, 100.0); 12]);
        assert_eq!(
            estimate(&sales, &prices),
            ElasticityOutcome::Unavailable(InsufficientData::TooFewPriceChanges { found: 0 })
        );
    }

    #[test]
    fn sales_before_first_price_are_discarded() {
        let (sales, mut prices) = series(&[(10.0, 100.0); 12]);
        // Só os 3 últimos dias têm preço vigente
        prices.retain(|p| p.valid_from >= day(9));
        assert_eq!(
            estimate(&sales, &prices),
            ElasticityOutcome::Unavailable(InsufficientData::TooFewPricedSales { found: 3 })
        );
    }

    #[test]
    fn ten_percent_up_ten_percent_down_gives_unit_elasticity() {
        // Preço sobe 10% e a quantidade cai 10% a cada passo
        let points: Vec<(f64, f64)> = (0..12)
            .map(|i| (10.0 * 1.1f64.powi(i), 1000.0 * 0.9f64.powi(i)))
            .collect();
        let (sales, prices) = series(&points);
        let result = estimate(&sales, &prices).computed().unwrap();

        assert!((result.coefficient + 1.0).abs() < 1e-6, "{}", result.coefficient);
        assert_eq!(result.sensitivity, SensitivityLabel::Normal);
        assert_eq!(result.data_points, 11);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn alternating_double_and_half_is_normal() {
        // Preço dobra -> quantidade cai pela metade (e vice-versa):
        // 5 subidas (-0.5) e 4 descidas (-2.0): média -10.5 / 9
        let points: Vec<(f64, f64)> = (0..10)
            .map(|i| if i % 2 == 0 { (10.0, 100.0) } else { (20.0, 50.0) })
            .collect();
        let (sales, prices) = series(&points);
        let result = estimate(&sales, &prices).computed().unwrap();

        assert!((result.coefficient + 10.5 / 9.0).abs() < 1e-9);
        assert_eq!(result.sensitivity, SensitivityLabel::Normal);
        assert_eq!(result.data_points, 9);
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn confidence_scales_with_sample_count() {
        // Quatro mudanças de preço (10 -> 12 -> 10 -> 12 -> 10), resto constante
        let mut points = vec![(10.0, 100.0); 12];
        for i in [3, 4, 7, 8] {
            points[i] = (12.0, 80.0);
        }
        let (sales, prices) = series(&points);
        let result = estimate(&sales, &prices).computed().unwrap();

        // subida: -0.2 / 0.2 = -1.0 ; descida: 0.25 / -0.1667 = -1.5
        assert_eq!(result.data_points, 4);
        assert!((result.confidence - 0.4).abs() < 1e-9);
        assert!((result.coefficient + 1.25).abs() < 1e-9);
    }

    #[test]
    fn zero_unit_sales_are_ignored() {
        let mut points: Vec<(f64, f64)> = (0..12)
            .map(|i| (10.0 * 1.1f64.powi(i), 1000.0 * 0.9f64.powi(i)))
            .collect();
        points[5].1 = 0.0;
        let (sales, prices) = series(&points);
        let result = estimate(&sales, &prices).computed().unwrap();
        // O par que pula o dia 5 tem variação de preço de 21%
        assert_eq!(result.data_points, 10);
    }

    #[test]
    fn labels_follow_thresholds() {
        assert_eq!(sensitivity_label(-0.5), SensitivityLabel::Inelastic);
        assert_eq!(sensitivity_label(0.3), SensitivityLabel::Inelastic);
        assert_eq!(sensitivity_label(-0.8), SensitivityLabel::Normal);
        assert_eq!(sensitivity_label(-1.49), SensitivityLabel::Normal);
        assert_eq!(sensitivity_label(-1.5), SensitivityLabel::HighlyElastic);
        assert_eq!(sensitivity_label(-3.0), SensitivityLabel::HighlyElastic);
    }
}
