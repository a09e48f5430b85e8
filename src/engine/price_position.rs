// src/engine/price_position.rs

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::pricing::PricePosition;

/// Faixa (em fração) em torno da média considerada "na média".
const AROUND_AVG_TOLERANCE: Decimal = dec!(0.05);

/// Classifica nosso preço contra a lista de preços dos concorrentes.
///
/// Ordem das regras: sem dados, abaixo do mínimo, acima do máximo e, no
/// meio, distância até a média (±5% = na média).
pub fn classify(our_price: Decimal, competitor_prices: &[Decimal]) -> PricePosition {
    let Some((min, max, sum)) = competitor_prices.iter().fold(None, |acc, &p| match acc {
        None => Some((p, p, p)),
        Some((min, max, sum)) => Some((min.min(p), max.max(p), sum + p)),
    }) else {
        return PricePosition::NoCompetitorData;
    };

    if our_price < min {
        return PricePosition::CheaperThanAll;
    }
    if our_price > max {
        return PricePosition::MoreExpensiveThanAll;
    }

    let avg = sum / Decimal::from(competitor_prices.len());
    // Média zero só acontece com preços zerados; tratamos como "na média"
    if avg.is_zero() {
        return PricePosition::AroundAvg;
    }

    let diff = (our_price - avg) / avg;
    if diff.abs() <= AROUND_AVG_TOLERANCE {
        PricePosition::AroundAvg
    } else if diff < Decimal::ZERO {
        PricePosition::CheaperThanAvg
    } else {
        PricePosition::MoreExpensiveThanAvg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_competitor_list_has_no_data() {
        assert_eq!(classify(dec!(10), &[]), PricePosition::NoCompetitorData);
        assert_eq!(classify(dec!(0.01), &[]), PricePosition::NoCompetitorData);
    }

    #[test]
    fn below_every_competitor_is_cheaper_than_all() {
        let prices = [dec!(10), dec!(10.5), dec!(11)];
        assert_eq!(classify(dec!(9.99), &prices), PricePosition::CheaperThanAll);
    }

    #[test]
    fn above_every_competitor_is_more_expensive_than_all() {
        let prices = [dec!(10), dec!(10.5), dec!(11)];
        assert_eq!(classify(dec!(11.01), &prices), PricePosition::MoreExpensiveThanAll);
    }

    #[test]
    fn equal_to_min_is_not_cheaper_than_all() {
        // 10 vs média 10.5 = -4.76% -> dentro da faixa
        let prices = [dec!(10), dec!(10.5), dec!(11)];
        assert_eq!(classify(dec!(10), &prices), PricePosition::AroundAvg);
    }

    #[test]
    fn nine_and_a_half_percent_below_avg_is_cheaper_than_avg() {
        let prices = [dec!(9), dec!(10.5), dec!(12)];
        // média 10.5, 9.5 fica ~9.5% abaixo
        assert_eq!(classify(dec!(9.5), &prices), PricePosition::CheaperThanAvg);
    }

    #[test]
    fn exactly_five_percent_counts_as_around_avg() {
        let prices = [dec!(50), dec!(150)];
        assert_eq!(classify(dec!(105), &prices), PricePosition::AroundAvg);
        assert_eq!(classify(dec!(95), &prices), PricePosition::AroundAvg);
        assert_eq!(classify(dec!(105.01), &prices), PricePosition::MoreExpensiveThanAvg);
    }

    #[test]
    fn single_competitor_equal_price_is_around_avg() {
        assert_eq!(classify(dec!(7), &[dec!(7)]), PricePosition::AroundAvg);
    }

    #[test]
    fn zero_priced_competitors_do_not_divide_by_zero() {
        assert_eq!(classify(Decimal::ZERO, &[Decimal::ZERO, Decimal::ZERO]), PricePosition::AroundAvg);
    }

    #[test]
    fn position_is_consistent_with_thresholds_across_generated_sets() {
        // Varredura determinística (tipo property-test) sobre vários conjuntos
        for seed in 1u32..200 {
            let n = (seed % 5 + 1) as usize;
            let prices: Vec<Decimal> = (0..n)
                .map(|i| Decimal::from((seed * 7 + i as u32 * 13) % 50 + 5))
                .collect();
            let our = Decimal::from((seed * 11) % 60 + 1);

            let min = *prices.iter().min().unwrap();
            let max = *prices.iter().max().unwrap();
            let avg = prices.iter().sum::<Decimal>() / Decimal::from(n);
            let diff = (our - avg) / avg;

            let expected = if our < min {
                PricePosition::CheaperThanAll
            } else if our > max {
                PricePosition::MoreExpensiveThanAll
            } else if diff.abs() <= dec!(0.05) {
                PricePosition::AroundAvg
            } else if diff < Decimal::ZERO {
                PricePosition::CheaperThanAvg
            } else {
                PricePosition::MoreExpensiveThanAvg
            };
            assert_eq!(classify(our, &prices), expected, "seed {seed}");
            assert_ne!(classify(our, &prices), PricePosition::NoCompetitorData);
        }
    }
}
