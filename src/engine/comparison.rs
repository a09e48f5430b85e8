// src/engine/comparison.rs

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::{
    engine::{percent_difference, price_position, round2},
    models::pricing::{CompetitorPriceObservation, PriceComparison},
};

/// Resume as observações dos concorrentes contra o nosso preço.
///
/// Sem observações não existe comparação (`None`). Min/média/máx usam só o
/// preço regular; promoções ativas entram separadas no menor preço promocional.
pub fn compare(our_price: Decimal, observations: &[CompetitorPriceObservation]) -> Option<PriceComparison> {
    if observations.is_empty() {
        return None;
    }

    let regular_prices: Vec<Decimal> = observations.iter().map(|o| o.price).collect();
    let min = regular_prices.iter().copied().min()?;
    let max = regular_prices.iter().copied().max()?;
    let avg = regular_prices.iter().copied().sum::<Decimal>() / Decimal::from(regular_prices.len());

    let active_promos: Vec<Decimal> = observations
        .iter()
        .filter(|o| o.is_on_promo)
        .filter_map(|o| o.promo_price)
        .collect();

    Some(PriceComparison {
        our_price,
        competitor_min_price: min,
        competitor_avg_price: round2(avg),
        competitor_max_price: max,
        competitor_discount_price: active_promos.iter().copied().min(),
        price_position: price_position::classify(our_price, &regular_prices),
        price_difference_vs_avg: percent_difference(our_price, avg),
        price_difference_vs_min: percent_difference(our_price, min),
        total_competitors: observations.len(),
        competitors_with_promo: active_promos.len(),
    })
}

/// Mantém só a observação mais recente de cada concorrente.
///
/// Empates na mesma data ficam com o maior `id`, independente da ordem de chegada.
pub fn latest_per_competitor(observations: &[CompetitorPriceObservation]) -> Vec<CompetitorPriceObservation> {
    let latest = observations.iter().fold(
        HashMap::<&str, &CompetitorPriceObservation>::new(),
        |mut acc, obs| {
            match acc.get(obs.competitor_name.as_str()) {
                Some(current) if (current.observed_on, current.id) >= (obs.observed_on, obs.id) => {}
                _ => {
                    acc.insert(obs.competitor_name.as_str(), obs);
                }
            }
            acc
        },
    );

    let mut result: Vec<CompetitorPriceObservation> = latest.into_values().cloned().collect();
    result.sort_by(|a, b| a.competitor_name.cmp(&b.competitor_name));
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::pricing::PricePosition;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn obs(name: &str, price: Decimal, promo: Option<Decimal>, day: u32) -> CompetitorPriceObservation {
        CompetitorPriceObservation {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            product_id: Uuid::nil(),
            competitor_name: name.to_string(),
            price,
            promo_price: promo,
            is_on_promo: promo.is_some(),
            observed_on: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        }
    }

    #[test]
    fn empty_observations_produce_no_comparison() {
        assert!(compare(dec!(10), &[]).is_none());
    }

    #[test]
    fn summarizes_regular_prices_and_differences() {
        let observations = vec![
            obs("Alfa", dec!(10), None, 1),
            obs("Beta", dec!(10.5), None, 1),
            obs("Gama", dec!(11), None, 1),
        ];
        let cmp = compare(dec!(9.5), &observations).unwrap();

        assert_eq!(cmp.competitor_min_price, dec!(10));
        assert_eq!(cmp.competitor_max_price, dec!(11));
        assert_eq!(cmp.competitor_avg_price, dec!(10.5));
        assert_eq!(cmp.price_difference_vs_avg, dec!(-9.52));
        assert_eq!(cmp.price_difference_vs_min, dec!(-5));
        // 9.5 fica abaixo do mínimo (10): a regra de "mais barato que todos" vem antes da média
        assert_eq!(cmp.price_position, PricePosition::CheaperThanAll);
        assert_eq!(cmp.total_competitors, 3);
        assert_eq!(cmp.competitors_with_promo, 0);
        assert_eq!(cmp.competitor_discount_price, None);
    }

    #[test]
    fn promo_prices_do_not_affect_regular_stats() {
        let observations = vec![
            obs("Alfa", dec!(20), Some(dec!(15)), 1),
            obs("Beta", dec!(22), Some(dec!(17)), 1),
            obs("Gama", dec!(24), None, 1),
        ];
        let cmp = compare(dec!(21), &observations).unwrap();

        assert_eq!(cmp.competitor_min_price, dec!(20));
        assert_eq!(cmp.competitor_avg_price, dec!(22));
        assert_eq!(cmp.competitor_discount_price, Some(dec!(15)));
        assert_eq!(cmp.competitors_with_promo, 2);
        assert_eq!(cmp.price_position, PricePosition::AroundAvg);
    }

    #[test]
    fn promo_price_without_active_flag_is_ignored() {
        let mut inactive = obs("Alfa", dec!(20), Some(dec!(12)), 1);
        inactive.is_on_promo = false;
        let cmp = compare(dec!(20), &[inactive]).unwrap();
        assert_eq!(cmp.competitor_discount_price, None);
        assert_eq!(cmp.competitors_with_promo, 0);
    }

    #[test]
    fn total_competitors_counts_observations_not_names() {
        let observations = vec![obs("Alfa", dec!(10), None, 1), obs("Alfa", dec!(11), None, 2)];
        let cmp = compare(dec!(10.5), &observations).unwrap();
        assert_eq!(cmp.total_competitors, 2);
    }

    #[test]
    fn latest_observation_per_competitor_wins() {
        let observations = vec![
            obs("Alfa", dec!(10), None, 1),
            obs("Alfa", dec!(12), None, 5),
            obs("Beta", dec!(9), None, 3),
            obs("Alfa", dec!(11), None, 2),
        ];
        let latest = latest_per_competitor(&observations);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].competitor_name, "Alfa");
        assert_eq!(latest[0].price, dec!(12));
        assert_eq!(latest[1].price, dec!(9));
    }

    #[test]
    fn same_day_observations_resolve_by_id_regardless_of_order() {
        let mut first = obs("Alfa", dec!(10), None, 4);
        let mut second = obs("Alfa", dec!(13), None, 4);
        first.id = Uuid::from_u128(1);
        second.id = Uuid::from_u128(2);

        let forward = latest_per_competitor(&[first.clone(), second.clone()]);
        let backward = latest_per_competitor(&[second, first]);
        assert_eq!(forward.len(), 1);
        assert_eq!(forward[0].price, dec!(13));
        assert_eq!(backward[0].price, dec!(13));
    }
}
