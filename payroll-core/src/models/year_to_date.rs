use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::CalculationBreakdown;
use crate::calculations::common::non_negative;

/// Running annual totals for one employee, owned by the caller across calls.
///
/// Only the annual caps consult it: the capped social components use the
/// contribution base still below the annual cap, and creative-work costs use
/// whatever is left of the creative ceiling. Brackets and the tax-free
/// amount stay per call.
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::{CalculationInput, ContractType, PayrollEngine, YearToDateAccumulator};
///
/// let engine = PayrollEngine::builtin();
/// let mut ytd = YearToDateAccumulator::default();
///
/// for _ in 0..2 {
///     let input = CalculationInput {
///         year_to_date: Some(ytd.clone()),
///         ..CalculationInput::new(dec!(150000.00), ContractType::Employment)
///     };
///     let calculation = engine.calculate_detailed(&input).unwrap();
///     ytd.record(&calculation.breakdown);
/// }
///
/// assert_eq!(ytd.contribution_base, dec!(260190.00));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearToDateAccumulator {
    /// Base already charged to the capped social components.
    pub contribution_base: Decimal,
    /// Creative-work costs already deducted.
    pub creative_costs: Decimal,
}

impl YearToDateAccumulator {
    pub fn new(
        contribution_base: Decimal,
        creative_costs: Decimal,
    ) -> Self {
        Self {
            contribution_base,
            creative_costs,
        }
    }

    /// Portion of `annual_cap` not yet used by capped contributions.
    pub fn remaining_contribution_cap(
        &self,
        annual_cap: Decimal,
    ) -> Decimal {
        non_negative(annual_cap - self.contribution_base)
    }

    /// Portion of `annual_cap` not yet used by creative-work costs.
    pub fn remaining_creative_cap(
        &self,
        annual_cap: Decimal,
    ) -> Decimal {
        non_negative(annual_cap - self.creative_costs)
    }

    /// Adds the amounts a finished calculation counted against the caps.
    pub fn record(
        &mut self,
        breakdown: &CalculationBreakdown,
    ) {
        self.contribution_base += breakdown.capped_contribution_base;
        self.creative_costs += breakdown.creative_costs;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn remaining_contribution_cap_subtracts_used_base() {
        let ytd = YearToDateAccumulator::new(dec!(250000.00), dec!(0));

        assert_eq!(
            ytd.remaining_contribution_cap(dec!(260190.00)),
            dec!(10190.00)
        );
    }

    #[test]
    fn remaining_contribution_cap_never_goes_negative() {
        let ytd = YearToDateAccumulator::new(dec!(300000.00), dec!(0));

        assert_eq!(ytd.remaining_contribution_cap(dec!(260190.00)), dec!(0));
    }

    #[test]
    fn remaining_creative_cap_subtracts_used_costs() {
        let ytd = YearToDateAccumulator::new(dec!(0), dec!(100000.00));

        assert_eq!(ytd.remaining_creative_cap(dec!(120000.00)), dec!(20000.00));
    }

    #[test]
    fn default_accumulator_leaves_full_headroom() {
        let ytd = YearToDateAccumulator::default();

        assert_eq!(ytd.remaining_contribution_cap(dec!(260190.00)), dec!(260190.00));
        assert_eq!(ytd.remaining_creative_cap(dec!(120000.00)), dec!(120000.00));
    }
}
