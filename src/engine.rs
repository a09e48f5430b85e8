// src/engine.rs

//! Motor de decisão de preços.
//!
//! Funções puras e determinísticas: recebem dados em memória e devolvem
//! valores. Nada aqui acessa banco ou rede.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

pub mod abc;
pub mod comparison;
pub mod elasticity;
pub mod price_position;
pub mod recommendation;
pub mod smart_price;

/// Arredonda para centavos (meio para longe do zero).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Margem em % sobre o preço de venda. Preço zero devolve margem zero.
pub fn margin_percent(price: Decimal, cost: Decimal) -> Decimal {
    if price.is_zero() {
        return Decimal::ZERO;
    }
    (price - cost) / price * dec!(100)
}

/// Diferença percentual de `value` contra `reference`, com 2 casas.
/// Referência zero devolve 0%.
pub fn percent_difference(value: Decimal, reference: Decimal) -> Decimal {
    if reference.is_zero() {
        return Decimal::ZERO;
    }
    round2((value - reference) / reference * dec!(100))
}

/// Preço que entrega exatamente a margem pedida: custo / (1 - margem/100).
pub fn price_for_margin(cost: Decimal, margin_percent: Decimal) -> Decimal {
    let divisor = Decimal::ONE - margin_percent / dec!(100);
    if divisor <= Decimal::ZERO {
        return cost;
    }
    cost / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-9.5238)), dec!(-9.52));
    }

    #[test]
    fn margin_on_zero_price_is_zero() {
        assert_eq!(margin_percent(Decimal::ZERO, dec!(5)), Decimal::ZERO);
        assert_eq!(margin_percent(dec!(20), dec!(15)), dec!(25));
    }

    #[test]
    fn percent_difference_guards_zero_reference() {
        assert_eq!(percent_difference(dec!(10), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percent_difference(dec!(9.5), dec!(10.5)), dec!(-9.52));
    }

    #[test]
    fn price_for_margin_inverts_margin_formula() {
        let price = price_for_margin(dec!(65), dec!(35));
        assert_eq!(round2(price), dec!(100));
        assert_eq!(round2(margin_percent(price, dec!(65))), dec!(35));
    }
}
