//! Subscription pricing.
//!
//! Everything in here is synchronous and free of shared state: a quote is
//! recomputed from scratch whenever plan, duration or channel inputs change.

pub mod channel_calculator;
pub mod plans;
pub mod price_calculator;
pub mod quote;
pub mod renewal;
pub mod subscription_calculator;

pub use channel_calculator::ChannelCalculator;
pub use plans::{PlanConfig, SubscriptionPlan, TimeUnit, plan_config};
pub use price_calculator::{PriceCalculator, round2};
pub use quote::{PricingForm, PricingRequest, PricingResult, quote};
pub use renewal::{RenewalPreview, RenewalRequest};
pub use subscription_calculator::SubscriptionCalculator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    UnknownPlan(String),
    UnsupportedTimeUnit(String),
    InvalidDivisor,
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::UnknownPlan(plan) => write!(f, "Unknown subscription plan: {}", plan),
            PricingError::UnsupportedTimeUnit(unit) => write!(f, "Unsupported time unit: {}", unit),
            PricingError::InvalidDivisor => write!(f, "Price divisor must be a non-zero number"),
        }
    }
}

impl std::error::Error for PricingError {}
