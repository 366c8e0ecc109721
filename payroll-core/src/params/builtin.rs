//! Parameter tables compiled into the crate.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal_macros::dec;

use crate::models::{
    ContractRules, ContractType, ContributionRate, DefaultCosts, HealthBase, PitBracket,
    SocialComponent, TaxParameters, TaxPeriod,
};

/// Tax year covered by the newest built-in table.
pub const LATEST_BUILTIN_YEAR: i32 = 2025;

/// Every built-in table, oldest first.
pub fn all() -> Vec<TaxParameters> {
    vec![poland_2025()]
}

/// Polish payroll rules for 2025, simplified to a single-call model: caps,
/// brackets and the tax-free amount apply to the one gross amount passed in.
pub fn poland_2025() -> TaxParameters {
    let all_components = BTreeSet::from([
        SocialComponent::Pension,
        SocialComponent::Disability,
        SocialComponent::Sickness,
    ]);

    let contracts = BTreeMap::from([
        (
            ContractType::Employment,
            ContractRules {
                insured_components: all_components.clone(),
                health_rate: dec!(0.09),
                default_costs: DefaultCosts::Fixed(dec!(250.00)),
                insurance_optional: false,
                student_exempt_insurance: false,
                student_exempt_pit: false,
            },
        ),
        (
            ContractType::Mandate,
            ContractRules {
                insured_components: all_components,
                health_rate: dec!(0.09),
                default_costs: DefaultCosts::Rate(dec!(0.20)),
                insurance_optional: true,
                student_exempt_insurance: true,
                student_exempt_pit: true,
            },
        ),
        (
            ContractType::Work,
            ContractRules {
                insured_components: BTreeSet::new(),
                health_rate: dec!(0),
                default_costs: DefaultCosts::Rate(dec!(0.20)),
                insurance_optional: false,
                student_exempt_insurance: false,
                student_exempt_pit: false,
            },
        ),
    ]);

    TaxParameters {
        period: TaxPeriod::new(2025),
        version: "PL-2025.1".to_string(),
        contribution_rates: vec![
            ContributionRate {
                component: SocialComponent::Pension,
                rate: dec!(0.0976),
                capped: true,
            },
            ContributionRate {
                component: SocialComponent::Disability,
                rate: dec!(0.015),
                capped: true,
            },
            ContributionRate {
                component: SocialComponent::Sickness,
                rate: dec!(0.0245),
                capped: false,
            },
        ],
        annual_contribution_cap: dec!(260190.00),
        health_base: HealthBase::GrossLessSocial,
        creative_cost_rate: dec!(0.50),
        creative_cost_cap: dec!(120000.00),
        tax_free_amount: dec!(0),
        pit_brackets: vec![
            PitBracket {
                lower: dec!(0),
                upper: Some(dec!(120000)),
                rate: dec!(0.12),
            },
            PitBracket {
                lower: dec!(120000),
                upper: None,
                rate: dec!(0.32),
            },
        ],
        youth_relief_age_ceiling: 26,
        student_age_ceiling: 26,
        contracts,
    }
}
