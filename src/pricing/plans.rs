use std::str::FromStr;

use chrono::{Days, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionPlan {
    Basic,
    Classic,
}

impl SubscriptionPlan {
    pub const ALL: [SubscriptionPlan; 2] = [SubscriptionPlan::Basic, SubscriptionPlan::Classic];

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionPlan::Basic => "BASIC",
            SubscriptionPlan::Classic => "CLASSIC",
        }
    }

    /// Upper bound offered by the channel picker for this plan.
    pub fn max_channel_count(self) -> u32 {
        match self {
            SubscriptionPlan::Basic => 250,
            SubscriptionPlan::Classic => 500,
        }
    }
}

impl FromStr for SubscriptionPlan {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BASIC" => Ok(SubscriptionPlan::Basic),
            "CLASSIC" => Ok(SubscriptionPlan::Classic),
            _ => Err(PricingError::UnknownPlan(s.to_string())),
        }
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    pub const ALL: [TimeUnit; 4] = [TimeUnit::Days, TimeUnit::Weeks, TimeUnit::Months, TimeUnit::Years];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Days => "DAYS",
            TimeUnit::Weeks => "WEEKS",
            TimeUnit::Months => "MONTHS",
            TimeUnit::Years => "YEARS",
        }
    }

    /// Longest duration the subscription forms accept for this unit.
    pub fn max_duration(self) -> u32 {
        match self {
            TimeUnit::Days => 365,
            TimeUnit::Weeks => 52,
            TimeUnit::Months => 12,
            TimeUnit::Years => 1,
        }
    }

    /// Moves `start` forward by `amount` units. Months and years are calendar
    /// based, so Jan 31 + 1 month lands on the last day of February.
    pub fn advance(self, start: NaiveDateTime, amount: u32) -> Option<NaiveDateTime> {
        match self {
            TimeUnit::Days => start.checked_add_days(Days::new(u64::from(amount))),
            TimeUnit::Weeks => start.checked_add_days(Days::new(u64::from(amount) * 7)),
            TimeUnit::Months => start.checked_add_months(Months::new(amount)),
            TimeUnit::Years => start.checked_add_months(Months::new(amount.checked_mul(12)?)),
        }
    }
}

impl FromStr for TimeUnit {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAYS" => Ok(TimeUnit::Days),
            "WEEKS" => Ok(TimeUnit::Weeks),
            "MONTHS" => Ok(TimeUnit::Months),
            "YEARS" => Ok(TimeUnit::Years),
            _ => Err(PricingError::UnsupportedTimeUnit(s.to_string())),
        }
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanConfig {
    pub base_price: f64,
    pub base_channel_count: u32,
    pub extra_channel_rate: f64,
}

static PLAN_CONFIGS: [(SubscriptionPlan, PlanConfig); 2] = [
    (
        SubscriptionPlan::Basic,
        PlanConfig {
            base_price: 30000.0,
            base_channel_count: 250,
            extra_channel_rate: 1.2,
        },
    ),
    (
        SubscriptionPlan::Classic,
        PlanConfig {
            base_price: 50000.0,
            base_channel_count: 500,
            extra_channel_rate: 1.5,
        },
    ),
];

pub fn plan_config(plan: SubscriptionPlan) -> Result<&'static PlanConfig, PricingError> {
    PLAN_CONFIGS
        .iter()
        .find(|(p, _)| *p == plan)
        .map(|(_, cfg)| cfg)
        .ok_or_else(|| PricingError::UnknownPlan(plan.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn every_plan_has_a_config() {
        for plan in SubscriptionPlan::ALL {
            let cfg = plan_config(plan).unwrap();
            assert!(cfg.base_price > 0.0);
            assert_eq!(cfg.base_channel_count, plan.max_channel_count());
        }
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!("classic".parse::<SubscriptionPlan>().unwrap(), SubscriptionPlan::Classic);
        assert_eq!(" Weeks ".parse::<TimeUnit>().unwrap(), TimeUnit::Weeks);
        assert_eq!(
            "PREMIUM".parse::<SubscriptionPlan>(),
            Err(PricingError::UnknownPlan("PREMIUM".into()))
        );
        assert_eq!(
            "HOURS".parse::<TimeUnit>(),
            Err(PricingError::UnsupportedTimeUnit("HOURS".into()))
        );
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&(SubscriptionPlan::Basic, TimeUnit::Years)).unwrap();
        assert_eq!(json, r#"["BASIC","YEARS"]"#);
    }

    #[test]
    fn advance_is_calendar_aware() {
        assert_eq!(TimeUnit::Days.advance(at(2025, 1, 1), 30), Some(at(2025, 1, 31)));
        assert_eq!(TimeUnit::Weeks.advance(at(2025, 1, 1), 2), Some(at(2025, 1, 15)));
        assert_eq!(TimeUnit::Months.advance(at(2025, 1, 31), 1), Some(at(2025, 2, 28)));
        assert_eq!(TimeUnit::Years.advance(at(2024, 2, 29), 1), Some(at(2025, 2, 28)));
    }
}
