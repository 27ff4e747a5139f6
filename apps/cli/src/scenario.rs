//! Scenario inputs: a YAML file and command-line flags share one shape.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tour_core::{AllocationPolicy, ForecastInput, ForecastOptions, OtherCostsTreatment};

/// Partially specified forecast inputs. Missing fields fall back to defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub show_date: Option<NaiveDate>,
    pub announce_date: Option<NaiveDate>,
    pub avg_ticket_price: Option<Decimal>,
    pub marketing_budget: Option<Decimal>,
    pub other_costs: Option<Decimal>,
    pub target_capacity: Option<u64>,
    pub policy: Option<AllocationPolicy>,
    pub other_costs_treatment: Option<OtherCostsTreatment>,
    pub currency: Option<String>,
}

/// Fully resolved run parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub input: ForecastInput,
    pub options: ForecastOptions,
    pub currency: Option<String>,
}

impl Scenario {
    /// Load a scenario from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Fields set in `over` replace ours.
    pub fn overlay(self, over: Scenario) -> Scenario {
        Scenario {
            show_date: over.show_date.or(self.show_date),
            announce_date: over.announce_date.or(self.announce_date),
            avg_ticket_price: over.avg_ticket_price.or(self.avg_ticket_price),
            marketing_budget: over.marketing_budget.or(self.marketing_budget),
            other_costs: over.other_costs.or(self.other_costs),
            target_capacity: over.target_capacity.or(self.target_capacity),
            policy: over.policy.or(self.policy),
            other_costs_treatment: over.other_costs_treatment.or(self.other_costs_treatment),
            currency: over.currency.or(self.currency),
        }
    }

    /// Fill defaults and build the engine input. `today` stands in for a
    /// missing announcement date.
    pub fn resolve(self, today: NaiveDate) -> Result<Resolved> {
        let Some(show_date) = self.show_date else {
            bail!("missing show date: pass --show YYYY-MM-DD or set show_date in the scenario");
        };
        let input = ForecastInput {
            show_date,
            announce_date: self.announce_date.unwrap_or(today),
            avg_ticket_price: self.avg_ticket_price.unwrap_or(Decimal::new(50, 0)),
            marketing_budget: self.marketing_budget.unwrap_or(Decimal::new(1000, 0)),
            other_costs: self.other_costs.unwrap_or(Decimal::new(500, 0)),
            target_capacity: self.target_capacity.unwrap_or(500),
        };
        let policy = self.policy.unwrap_or_default();
        let mut options = ForecastOptions::for_policy(policy);
        if let Some(t) = self.other_costs_treatment {
            options = options.with_other_costs(t);
        }
        Ok(Resolved {
            input,
            options,
            currency: self.currency,
        })
    }
}
