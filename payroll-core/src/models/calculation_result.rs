use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Final figures of one calculation, each produced by exactly one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub social_total: Decimal,
    pub health: Decimal,
    pub tax_deductible_costs: Decimal,
    pub pit_base: Decimal,
    pub pit: Decimal,
    pub net: Decimal,
}

impl CalculationResult {
    /// A result with every figure at zero.
    pub fn zero() -> Self {
        Self {
            social_total: Decimal::ZERO,
            health: Decimal::ZERO,
            tax_deductible_costs: Decimal::ZERO,
            pit_base: Decimal::ZERO,
            pit: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }
}
