#![deny(warnings)]

//! Forecast engine: weekly ticket sales, gross revenue and net profit.
//!
//! This crate turns a validated [`ForecastInput`] into an ordered schedule of
//! [`ForecastRow`]s under one of two allocation policies:
//! - Continuous: an equal fractional share of capacity every week
//! - Integer with remainder absorption: whole tickets per week, leftover
//!   tickets sold in the final week, money rounded to cents at every step

use chrono::Days;
use rust_decimal::Decimal;
use tour_core::{
    validate_timeframe, AllocationPolicy, ForecastInput, ForecastOptions, ForecastRow,
    OtherCostsTreatment, ValidationError,
};
use tracing::debug;

/// Decimal places kept for money under integer allocation.
pub const CENTS_DP: u32 = 2;

/// Compute the forecast with the cost treatment that matches `policy`.
///
/// Example:
/// let rows = compute(&input, AllocationPolicy::IntegerRemainderAbsorbed)?;
/// assert_eq!(rows.last().unwrap().cumulative_tickets, Decimal::from(input.target_capacity));
pub fn compute(
    input: &ForecastInput,
    policy: AllocationPolicy,
) -> Result<Vec<ForecastRow>, ValidationError> {
    compute_with(input, ForecastOptions::for_policy(policy))
}

/// Compute the forecast with explicit options.
///
/// Fails with [`ValidationError::InvalidTimeframe`] when the show is less than
/// one whole week after the announcement; no other input is checked here.
/// Amounts are expected to have passed [`tour_core::validate_amounts`].
pub fn compute_with(
    input: &ForecastInput,
    options: ForecastOptions,
) -> Result<Vec<ForecastRow>, ValidationError> {
    let weeks = validate_timeframe(input)?;
    let rows = match options.policy {
        AllocationPolicy::Continuous => continuous(input, weeks, options.other_costs),
        AllocationPolicy::IntegerRemainderAbsorbed => {
            integer_remainder(input, weeks, options.other_costs)
        }
    };
    debug!(
        weeks,
        policy = %options.policy,
        other_costs = %options.other_costs,
        "computed forecast"
    );
    Ok(rows)
}

/// Start date of a 1-based week.
///
/// `week` must be within the validated horizon, so the result precedes the
/// show date.
pub fn week_start(announce: chrono::NaiveDate, week: u32) -> chrono::NaiveDate {
    announce + Days::new(u64::from(week.saturating_sub(1)) * 7)
}

/// `total * elapsed / weeks`, exact when `elapsed == weeks`.
fn pro_rata(total: Decimal, elapsed: u32, weeks: u32) -> Decimal {
    total * Decimal::from(elapsed) / Decimal::from(weeks)
}

fn continuous(
    input: &ForecastInput,
    weeks: u32,
    treatment: OtherCostsTreatment,
) -> Vec<ForecastRow> {
    let capacity = Decimal::from(input.target_capacity);
    let gross_total = capacity * input.avg_ticket_price;
    (1..=weeks)
        .map(|week| {
            let gross = pro_rata(gross_total, week, weeks);
            let other = match treatment {
                OtherCostsTreatment::Amortized => pro_rata(input.other_costs, week, weeks),
                OtherCostsTreatment::Upfront => input.other_costs,
            };
            let marketing = pro_rata(input.marketing_budget, week, weeks);
            ForecastRow {
                week,
                week_start_date: week_start(input.announce_date, week),
                cumulative_tickets: pro_rata(capacity, week, weeks),
                cumulative_gross_revenue: gross,
                cumulative_net: gross - marketing - other,
            }
        })
        .collect()
}

fn integer_remainder(
    input: &ForecastInput,
    weeks: u32,
    treatment: OtherCostsTreatment,
) -> Vec<ForecastRow> {
    let span = u64::from(weeks);
    let per_week = input.target_capacity / span;
    let final_week = input.target_capacity - per_week * (span - 1);
    let weekly_budget = input.marketing_budget / Decimal::from(weeks);
    let weekly_other = input.other_costs / Decimal::from(weeks);

    let mut sold = 0u64;
    let mut gross = Decimal::ZERO;
    let mut rows = Vec::with_capacity(weeks as usize);
    for week in 1..=weeks {
        let tickets = if week == weeks { final_week } else { per_week };
        sold += tickets;
        let revenue = (Decimal::from(tickets) * input.avg_ticket_price).round_dp(CENTS_DP);
        gross = (gross + revenue).round_dp(CENTS_DP);
        let elapsed = Decimal::from(week);
        let other = match treatment {
            OtherCostsTreatment::Upfront => input.other_costs,
            OtherCostsTreatment::Amortized => weekly_other * elapsed,
        };
        let net = (gross - weekly_budget * elapsed - other).round_dp(CENTS_DP);
        rows.push(ForecastRow {
            week,
            week_start_date: week_start(input.announce_date, week),
            cumulative_tickets: Decimal::from(sold),
            cumulative_gross_revenue: gross,
            cumulative_net: net,
        });
    }
    rows
}
