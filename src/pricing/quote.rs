use serde::{Deserialize, Serialize};

use super::PricingError;
use super::plans::{SubscriptionPlan, TimeUnit};
use super::subscription_calculator::SubscriptionCalculator;
use crate::error::{ConsoleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRequest {
    pub plan: SubscriptionPlan,
    pub duration: u32,
    pub unit: TimeUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_channel_count: Option<u32>,
}

impl PricingRequest {
    pub fn new(plan: SubscriptionPlan, duration: u32, unit: TimeUnit) -> Self {
        Self {
            plan,
            duration,
            unit,
            requested_channel_count: None,
        }
    }

    pub fn with_channels(mut self, count: u32) -> Self {
        self.requested_channel_count = Some(count);
        self
    }

    /// Form-level checks the calculator relies on.
    pub fn validate(&self) -> Result<()> {
        if self.duration < 1 {
            return Err(ConsoleError::Validation(
                "The duration must be at least 1.".into(),
            ));
        }
        let max = self.unit.max_duration();
        if self.duration > max {
            return Err(ConsoleError::Validation(format!(
                "The duration must be at most {} {}.",
                max,
                self.unit.as_str().to_ascii_lowercase()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResult {
    pub channel_count: u32,
    pub time_based_price: f64,
    pub total_price: f64,
}

pub fn quote(request: &PricingRequest) -> std::result::Result<PricingResult, PricingError> {
    SubscriptionCalculator::new(request)?.quote()
}

/// Raw values as they come out of a subscription form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingForm {
    #[serde(default)]
    pub subscription_type: String,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub time_unit: String,
    #[serde(default)]
    pub channel_count: Option<i64>,
}

impl PricingForm {
    /// Parses and validates the form, then prices it.
    pub fn quote(&self) -> Result<PricingResult> {
        let request = PricingRequest::try_from(self)?;
        Ok(quote(&request)?)
    }
}

impl TryFrom<&PricingForm> for PricingRequest {
    type Error = ConsoleError;

    fn try_from(form: &PricingForm) -> Result<Self> {
        if form.subscription_type.trim().is_empty() {
            return Err(ConsoleError::Validation(
                "The subscription type is required.".into(),
            ));
        }
        if form.time_unit.trim().is_empty() {
            return Err(ConsoleError::Validation("The time unit is required.".into()));
        }
        let plan: SubscriptionPlan = form.subscription_type.parse()?;
        let unit: TimeUnit = form.time_unit.parse()?;
        let duration = u32::try_from(form.duration)
            .map_err(|_| ConsoleError::Validation("The duration must be at least 1.".into()))?;
        let requested_channel_count = match form.channel_count {
            None => None,
            Some(n) => Some(u32::try_from(n).map_err(|_| {
                ConsoleError::Validation("The channel count cannot be negative.".into())
            })?),
        };
        let request = PricingRequest {
            plan,
            duration,
            unit,
            requested_channel_count,
        };
        request.validate()?;
        Ok(request)
    }
}
