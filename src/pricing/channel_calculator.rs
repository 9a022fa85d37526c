use super::PricingError;
use super::plans::{SubscriptionPlan, plan_config};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCalculator {
    plan: SubscriptionPlan,
    requested: Option<u32>,
}

impl ChannelCalculator {
    pub fn new(plan: SubscriptionPlan, requested: Option<u32>) -> Self {
        Self { plan, requested }
    }

    pub fn base_channel_count(&self) -> Result<u32, PricingError> {
        Ok(plan_config(self.plan)?.base_channel_count)
    }

    /// The requested count when one was given and is non-zero, the plan's base
    /// allotment otherwise.
    pub fn effective_channel_count(&self) -> Result<u32, PricingError> {
        match self.requested {
            Some(n) if n > 0 => Ok(n),
            _ => self.base_channel_count(),
        }
    }

    /// Surcharge for channels above the base allotment. Not rounded here.
    pub fn extra_channel_surcharge(&self) -> Result<f64, PricingError> {
        let config = plan_config(self.plan)?;
        let effective = self.effective_channel_count()?;
        if effective <= config.base_channel_count {
            return Ok(0.0);
        }
        let extra = effective - config.base_channel_count;
        Ok(f64::from(extra) * config.extra_channel_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_surcharge_at_base_count() {
        let calc = ChannelCalculator::new(SubscriptionPlan::Basic, Some(250));
        assert_eq!(calc.extra_channel_surcharge().unwrap(), 0.0);
    }

    #[test]
    fn surcharge_above_base_count() {
        let calc = ChannelCalculator::new(SubscriptionPlan::Basic, Some(300));
        assert!((calc.extra_channel_surcharge().unwrap() - 60.0).abs() < 1e-9);

        let calc = ChannelCalculator::new(SubscriptionPlan::Classic, Some(510));
        assert!((calc.extra_channel_surcharge().unwrap() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn below_base_count_is_free_but_still_requested() {
        let calc = ChannelCalculator::new(SubscriptionPlan::Classic, Some(100));
        assert_eq!(calc.effective_channel_count().unwrap(), 100);
        assert_eq!(calc.extra_channel_surcharge().unwrap(), 0.0);
    }

    #[test]
    fn missing_or_zero_request_falls_back_to_base() {
        for requested in [None, Some(0)] {
            let calc = ChannelCalculator::new(SubscriptionPlan::Classic, requested);
            assert_eq!(calc.effective_channel_count().unwrap(), 500);
            assert_eq!(calc.extra_channel_surcharge().unwrap(), 0.0);
        }
    }
}
