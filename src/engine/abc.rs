// src/engine/abc.rs

//! Curva ABC (Pareto) por receita acumulada.

use std::collections::HashMap;
use std::hash::Hash;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::models::pricing::{AbcCategory, SalesRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbcThresholds {
    /// Receita acumulada (%) que ainda cai em A
    pub a_percent: Decimal,
    /// Faixa (%) somada a `a_percent` para B
    pub b_percent: Decimal,
}

impl Default for AbcThresholds {
    fn default() -> Self {
        Self { a_percent: dec!(80), b_percent: dec!(15) }
    }
}

/// Soma a receita de cada produto numa passada só.
pub fn aggregate_revenue(sales: &[SalesRecord]) -> HashMap<Uuid, Decimal> {
    sales.iter().fold(HashMap::new(), |mut acc, sale| {
        *acc.entry(sale.product_id).or_insert(Decimal::ZERO) += sale.revenue();
        acc
    })
}

/// Classifica os produtos por participação acumulada na receita.
///
/// Ordena por receita decrescente (empate: menor id primeiro) e acumula:
/// A enquanto `acumulado% <= a`, B enquanto `<= a + b`, depois C. Produtos
/// sem receita positiva ficam em C. Receita total zero coloca todos em C.
pub fn classify<K>(revenue_by_product: &HashMap<K, Decimal>, thresholds: AbcThresholds) -> HashMap<K, AbcCategory>
where
    K: Clone + Eq + Hash + Ord,
{
    let mut ranked: Vec<(&K, Decimal)> = revenue_by_product
        .iter()
        .filter(|(_, revenue)| **revenue > Decimal::ZERO)
        .map(|(id, revenue)| (id, *revenue))
        .collect();
    ranked.sort_by(|(id_a, rev_a), (id_b, rev_b)| rev_b.cmp(rev_a).then_with(|| id_a.cmp(id_b)));

    let total: Decimal = ranked.iter().map(|(_, revenue)| *revenue).sum();

    let mut categories: HashMap<K, AbcCategory> = revenue_by_product
        .keys()
        .map(|id| (id.clone(), AbcCategory::C))
        .collect();

    if total <= Decimal::ZERO {
        return categories;
    }

    let b_limit = thresholds.a_percent + thresholds.b_percent;
    let mut cumulative = Decimal::ZERO;
    for (id, revenue) in ranked {
        cumulative += revenue;
        let cumulative_percent = cumulative / total * dec!(100);
        let category = if cumulative_percent <= thresholds.a_percent {
            AbcCategory::A
        } else if cumulative_percent <= b_limit {
            AbcCategory::B
        } else {
            AbcCategory::C
        };
        categories.insert(id.clone(), category);
    }

    categories
}

/// Quantidade de produtos em cada categoria (A, B, C).
pub fn category_counts<K>(categories: &HashMap<K, AbcCategory>) -> (usize, usize, usize) {
    categories.values().fold((0, 0, 0), |(a, b, c), category| match category {
        AbcCategory::A => (a + 1, b, c),
        AbcCategory::B => (a, b + 1, c),
        AbcCategory::C => (a, b, c + 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn revenues(values: &[(&'static str, Decimal)]) -> HashMap<&'static str, Decimal> {
        values.iter().copied().collect()
    }

    #[test]
    fn pareto_split_of_four_products() {
        let map = revenues(&[("p1", dec!(100)), ("p2", dec!(50)), ("p3", dec!(30)), ("p4", dec!(20))]);
        let result = classify(&map, AbcThresholds::default());
        // acumulado: 50%, 75%, 90%, 100%
        assert_eq!(result["p1"], AbcCategory::A);
        assert_eq!(result["p2"], AbcCategory::A);
        assert_eq!(result["p3"], AbcCategory::B);
        assert_eq!(result["p4"], AbcCategory::C);
    }

    #[test]
    fn exact_threshold_boundary_stays_in_a() {
        let map = revenues(&[("p1", dec!(80)), ("p2", dec!(15)), ("p3", dec!(5))]);
        let result = classify(&map, AbcThresholds::default());
        assert_eq!(result["p1"], AbcCategory::A);
        assert_eq!(result["p2"], AbcCategory::B);
        assert_eq!(result["p3"], AbcCategory::C);
    }

    #[test]
    fn products_without_revenue_are_c() {
        let map = revenues(&[("p1", dec!(100)), ("p2", Decimal::ZERO), ("p3", dec!(-10))]);
        let result = classify(&map, AbcThresholds::default());
        assert_eq!(result.len(), 3);
        assert_eq!(result["p2"], AbcCategory::C);
        assert_eq!(result["p3"], AbcCategory::C);
    }

    #[test]
    fn single_product_with_all_revenue_lands_in_b_or_c() {
        // 100% acumulado já passa de 80%; com 80 + 15 = 95 vai para C
        let map = revenues(&[("p1", dec!(500))]);
        assert_eq!(classify(&map, AbcThresholds::default())["p1"], AbcCategory::C);
        let wide = AbcThresholds { a_percent: dec!(80), b_percent: dec!(20) };
        assert_eq!(classify(&map, wide)["p1"], AbcCategory::B);
    }

    #[test]
    fn zero_total_revenue_makes_everything_c() {
        let map = revenues(&[("p1", Decimal::ZERO), ("p2", Decimal::ZERO)]);
        let result = classify(&map, AbcThresholds::default());
        assert!(result.values().all(|c| *c == AbcCategory::C));
    }

    #[test]
    fn ties_are_broken_by_id() {
        let map = revenues(&[("b", dec!(50)), ("a", dec!(50)), ("c", dec!(10))]);
        let t = AbcThresholds { a_percent: dec!(50), b_percent: dec!(45) };
        let result = classify(&map, t);
        // total 110: "a" = 45.45% (A), "b" = 90.91% (B), "c" = 100% (C)
        assert_eq!(result["a"], AbcCategory::A);
        assert_eq!(result["b"], AbcCategory::B);
        assert_eq!(result["c"], AbcCategory::C);
    }

    #[test]
    fn categories_partition_every_product_and_respect_a_share() {
        for seed in 1u64..60 {
            let map: HashMap<u64, Decimal> = (0..(seed % 17 + 1))
                .map(|i| (i, Decimal::from((seed * 31 + i * 17) % 97)))
                .collect();
            let result = classify(&map, AbcThresholds::default());

            let (a, b, c) = category_counts(&result);
            assert_eq!(a + b + c, map.len(), "seed {seed}");

            let total: Decimal = map.values().filter(|r| **r > Decimal::ZERO).sum();
            if total > Decimal::ZERO {
                let a_revenue: Decimal = result
                    .iter()
                    .filter(|(_, cat)| **cat == AbcCategory::A)
                    .map(|(id, _)| map[id])
                    .sum();
                assert!(a_revenue / total * dec!(100) <= dec!(80), "seed {seed}");
            }
        }
    }

    #[test]
    fn aggregate_revenue_sums_margin_times_units() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let sale = |product_id, units| SalesRecord {
            product_id,
            sale_date: day,
            units_sold: units,
            selling_price: dec!(10),
            purchase_price: dec!(7),
        };
        let totals = aggregate_revenue(&[sale(p1, dec!(2)), sale(p1, dec!(3)), sale(p2, dec!(1))]);
        assert_eq!(totals[&p1], dec!(15));
        assert_eq!(totals[&p2], dec!(3));
    }
}
