#![deny(warnings)]

//! Core domain models and invariants for the tour sales forecast.
//!
//! This crate defines the serializable input and output types shared by the
//! forecast engine, the CSV export layer and the CLI, together with
//! validation helpers for the invariants the input collector must uphold.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of days in one forecast week.
pub const DAYS_PER_WEEK: i64 = 7;

/// Scalar inputs for a single forecast run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastInput {
    /// Date of the show.
    pub show_date: NaiveDate,
    /// Date tickets go on sale (first day of week 1).
    pub announce_date: NaiveDate,
    /// Average ticket price (>= 0).
    pub avg_ticket_price: Decimal,
    /// Total marketing budget, spent evenly over the horizon (>= 0).
    pub marketing_budget: Decimal,
    /// Other fixed costs (>= 0).
    pub other_costs: Decimal,
    /// Total tickets available to sell.
    pub target_capacity: u64,
}

impl ForecastInput {
    /// Whole weeks between announcement and show, floor-divided.
    ///
    /// Negative when the show precedes the announcement.
    pub fn weeks_to_show(&self) -> i64 {
        self.show_date
            .signed_duration_since(self.announce_date)
            .num_days()
            .div_euclid(DAYS_PER_WEEK)
    }

    /// Calendar days between announcement and show.
    pub fn days_to_show(&self) -> i64 {
        self.show_date
            .signed_duration_since(self.announce_date)
            .num_days()
    }
}

/// One week of the forecast; all quantities are cumulative up to this week.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRow {
    /// 1-based week index.
    pub week: u32,
    /// `announce_date + (week - 1) * 7` days.
    pub week_start_date: NaiveDate,
    /// Tickets sold to date. Integral under integer allocation.
    pub cumulative_tickets: Decimal,
    /// Gross revenue to date.
    pub cumulative_gross_revenue: Decimal,
    /// Net profit or loss to date; may be negative.
    pub cumulative_net: Decimal,
}

/// How capacity is spread across the forecast weeks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// Equal fractional share every week, no rounding.
    Continuous,
    /// Whole tickets per week, remainder sold in the final week; money rounded to cents.
    #[default]
    #[serde(alias = "integer")]
    IntegerRemainderAbsorbed,
}

impl AllocationPolicy {
    /// The other-costs treatment historically paired with this policy.
    pub fn default_other_costs(self) -> OtherCostsTreatment {
        match self {
            AllocationPolicy::Continuous => OtherCostsTreatment::Amortized,
            AllocationPolicy::IntegerRemainderAbsorbed => OtherCostsTreatment::Upfront,
        }
    }

    /// Whether monetary values are rounded to cents.
    pub fn rounds_money(self) -> bool {
        matches!(self, AllocationPolicy::IntegerRemainderAbsorbed)
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationPolicy::Continuous => f.write_str("continuous"),
            AllocationPolicy::IntegerRemainderAbsorbed => f.write_str("integer"),
        }
    }
}

impl FromStr for AllocationPolicy {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continuous" | "fractional" => Ok(AllocationPolicy::Continuous),
            "integer" | "integer_remainder_absorbed" | "integer-remainder-absorbed" => {
                Ok(AllocationPolicy::IntegerRemainderAbsorbed)
            }
            _ => Err(ParseOptionError::UnknownPolicy(s.to_string())),
        }
    }
}

/// How `other_costs` is charged against net profit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherCostsTreatment {
    /// Spread evenly over the horizon, like the marketing budget.
    Amortized,
    /// Deducted in full from week 1 onward.
    Upfront,
}

impl fmt::Display for OtherCostsTreatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OtherCostsTreatment::Amortized => f.write_str("amortized"),
            OtherCostsTreatment::Upfront => f.write_str("upfront"),
        }
    }
}

impl FromStr for OtherCostsTreatment {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amortized" | "amortised" => Ok(OtherCostsTreatment::Amortized),
            "upfront" => Ok(OtherCostsTreatment::Upfront),
            _ => Err(ParseOptionError::UnknownCostsTreatment(s.to_string())),
        }
    }
}

/// Engine options: allocation policy plus cost treatment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Ticket allocation policy.
    pub policy: AllocationPolicy,
    /// How other costs are charged against net profit.
    pub other_costs: OtherCostsTreatment,
}

impl ForecastOptions {
    /// Options with the cost treatment that matches `policy`.
    pub fn for_policy(policy: AllocationPolicy) -> Self {
        Self {
            policy,
            other_costs: policy.default_other_costs(),
        }
    }

    /// Override the other-costs treatment.
    pub fn with_other_costs(mut self, treatment: OtherCostsTreatment) -> Self {
        self.other_costs = treatment;
        self
    }
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self::for_policy(AllocationPolicy::default())
    }
}

/// Validation errors for forecast inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Show date is less than one whole week after the announcement.
    #[error("show date must be at least one week after the announcement date ({days} days apart)")]
    InvalidTimeframe { days: i64 },
    /// Price or cost must be non-negative.
    #[error("{0} must not be negative")]
    NegativeMoney(&'static str),
    /// Totals over the horizon exceed what a decimal can hold.
    #[error("{0} is too large to forecast")]
    AmountTooLarge(&'static str),
}

/// Unrecognized option names.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseOptionError {
    #[error("unknown allocation policy: {0} (expected continuous or integer)")]
    UnknownPolicy(String),
    #[error("unknown other-costs treatment: {0} (expected amortized or upfront)")]
    UnknownCostsTreatment(String),
}

/// Check the forecast horizon, returning the number of whole weeks.
pub fn validate_timeframe(input: &ForecastInput) -> Result<u32, ValidationError> {
    let weeks = input.weeks_to_show();
    if weeks < 1 {
        return Err(ValidationError::InvalidTimeframe {
            days: input.days_to_show(),
        });
    }
    u32::try_from(weeks).map_err(|_| ValidationError::InvalidTimeframe {
        days: input.days_to_show(),
    })
}

/// Validate the monetary fields the input collector is responsible for.
pub fn validate_amounts(input: &ForecastInput) -> Result<(), ValidationError> {
    if input.avg_ticket_price < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("average ticket price"));
    }
    if input.marketing_budget < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("marketing budget"));
    }
    if input.other_costs < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney("other costs"));
    }

    // Every cumulative value stays within `amount * weeks`.
    let weeks = Decimal::from(input.weeks_to_show().max(1));
    let gross = Decimal::from(input.target_capacity)
        .checked_mul(input.avg_ticket_price)
        .and_then(|g| g.checked_mul(weeks))
        .ok_or(ValidationError::AmountTooLarge("gross revenue"))?;
    let marketing = input
        .marketing_budget
        .checked_mul(weeks)
        .ok_or(ValidationError::AmountTooLarge("marketing budget"))?;
    let other = input
        .other_costs
        .checked_mul(weeks)
        .ok_or(ValidationError::AmountTooLarge("other costs"))?;
    gross
        .checked_add(marketing)
        .and_then(|t| t.checked_add(other))
        .ok_or(ValidationError::AmountTooLarge("net profit/loss"))?;
    Ok(())
}

/// Validate everything: amounts first, then the timeframe.
pub fn validate_input(input: &ForecastInput) -> Result<u32, ValidationError> {
    validate_amounts(input)?;
    validate_timeframe(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn input(announce: NaiveDate, show: NaiveDate) -> ForecastInput {
        ForecastInput {
            show_date: show,
            announce_date: announce,
            avg_ticket_price: Decimal::new(5000, 2),
            marketing_budget: Decimal::new(1000, 0),
            other_costs: Decimal::new(500, 0),
            target_capacity: 500,
        }
    }

    #[test]
    fn weeks_floor_divide() {
        let i = input(date(2024, 1, 1), date(2024, 1, 22));
        assert_eq!(i.weeks_to_show(), 3);
        let i = input(date(2024, 1, 1), date(2024, 1, 28));
        assert_eq!(i.weeks_to_show(), 3);
        let i = input(date(2024, 1, 1), date(2024, 1, 29));
        assert_eq!(i.weeks_to_show(), 4);
    }

    #[test]
    fn show_before_announce_is_negative() {
        let i = input(date(2024, 1, 10), date(2024, 1, 1));
        assert_eq!(i.weeks_to_show(), -2);
        assert_eq!(
            validate_timeframe(&i),
            Err(ValidationError::InvalidTimeframe { days: -9 })
        );
    }

    #[test]
    fn short_timeframe_rejected() {
        let i = input(date(2024, 1, 10), date(2024, 1, 12));
        assert_eq!(
            validate_timeframe(&i),
            Err(ValidationError::InvalidTimeframe { days: 2 })
        );
        let same_day = input(date(2024, 1, 10), date(2024, 1, 10));
        assert!(validate_timeframe(&same_day).is_err());
    }

    #[test]
    fn exactly_one_week_accepted() {
        let i = input(date(2024, 1, 10), date(2024, 1, 17));
        assert_eq!(validate_timeframe(&i), Ok(1));
    }

    #[test]
    fn negative_amounts_rejected() {
        let mut i = input(date(2024, 1, 1), date(2024, 2, 1));
        i.marketing_budget = Decimal::new(-1, 0);
        assert_eq!(
            validate_amounts(&i),
            Err(ValidationError::NegativeMoney("marketing budget"))
        );
        i.marketing_budget = Decimal::ZERO;
        i.avg_ticket_price = Decimal::new(-1, 2);
        assert!(validate_input(&i).is_err());
    }

    #[test]
    fn oversized_amounts_rejected() {
        let mut i = input(date(2024, 1, 1), date(2024, 1, 22));
        i.target_capacity = u64::MAX;
        i.avg_ticket_price = Decimal::new(10_000_000_000, 0);
        assert_eq!(
            validate_amounts(&i),
            Err(ValidationError::AmountTooLarge("gross revenue"))
        );

        let mut i = input(date(2024, 1, 1), date(2024, 1, 22));
        i.marketing_budget = Decimal::MAX;
        assert_eq!(
            validate_input(&i),
            Err(ValidationError::AmountTooLarge("marketing budget"))
        );

        let mut i = input(date(2024, 1, 1), date(2024, 1, 22));
        i.marketing_budget = Decimal::MAX / Decimal::from(4);
        i.other_costs = Decimal::MAX / Decimal::from(4);
        assert_eq!(
            validate_amounts(&i),
            Err(ValidationError::AmountTooLarge("net profit/loss"))
        );

        let mut i = input(date(2024, 1, 1), date(2024, 1, 22));
        i.target_capacity = u64::MAX;
        i.avg_ticket_price = Decimal::new(1000, 0);
        assert_eq!(validate_input(&i), Ok(3));
    }

    #[test]
    fn policy_names_parse() {
        assert_eq!(
            "continuous".parse::<AllocationPolicy>(),
            Ok(AllocationPolicy::Continuous)
        );
        assert_eq!(
            "Integer".parse::<AllocationPolicy>(),
            Ok(AllocationPolicy::IntegerRemainderAbsorbed)
        );
        assert!("weekly".parse::<AllocationPolicy>().is_err());
        assert_eq!(
            "upfront".parse::<OtherCostsTreatment>(),
            Ok(OtherCostsTreatment::Upfront)
        );
    }

    #[test]
    fn options_follow_policy_defaults() {
        let o = ForecastOptions::for_policy(AllocationPolicy::Continuous);
        assert_eq!(o.other_costs, OtherCostsTreatment::Amortized);
        let o = ForecastOptions::default();
        assert_eq!(o.policy, AllocationPolicy::IntegerRemainderAbsorbed);
        assert_eq!(o.other_costs, OtherCostsTreatment::Upfront);
        let o = o.with_other_costs(OtherCostsTreatment::Amortized);
        assert_eq!(o.other_costs, OtherCostsTreatment::Amortized);
    }

    #[test]
    fn serde_roundtrip_input() {
        let i = input(date(2024, 1, 1), date(2024, 1, 22));
        let s = serde_json::to_string(&i).unwrap();
        assert!(s.contains("\"2024-01-22\""));
        let back: ForecastInput = serde_json::from_str(&s).unwrap();
        assert_eq!(back, i);
        let p: AllocationPolicy = serde_json::from_str("\"integer\"").unwrap();
        assert_eq!(p, AllocationPolicy::IntegerRemainderAbsorbed);
    }

    proptest! {
        #[test]
        fn weeks_match_day_count(days in 0i64..5_000) {
            let a = date(2020, 1, 1);
            let i = input(a, a + chrono::Duration::days(days));
            prop_assert_eq!(i.weeks_to_show(), days / 7);
            prop_assert_eq!(validate_timeframe(&i).is_ok(), days >= 7);
        }
    }
}
