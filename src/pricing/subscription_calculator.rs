use super::PricingError;
use super::channel_calculator::ChannelCalculator;
use super::plans::{PlanConfig, TimeUnit, plan_config};
use super::price_calculator::PriceCalculator;
use super::quote::{PricingRequest, PricingResult};

/// Price of a plan over a duration, plus extra channels.
///
/// Every method starts again from the plan's base price; calls never
/// compound.
#[derive(Debug, Clone, Copy)]
pub struct SubscriptionCalculator {
    config: &'static PlanConfig,
    duration: u32,
    unit: TimeUnit,
    channels: ChannelCalculator,
}

impl SubscriptionCalculator {
    pub fn new(request: &PricingRequest) -> Result<Self, PricingError> {
        Ok(Self {
            config: plan_config(request.plan)?,
            duration: request.duration,
            unit: request.unit,
            channels: ChannelCalculator::new(request.plan, request.requested_channel_count),
        })
    }

    pub fn time_based_price(&self) -> Result<f64, PricingError> {
        let base = PriceCalculator::new(self.config.base_price);
        let duration = f64::from(self.duration);
        let price = match self.unit {
            TimeUnit::Days => base.divide(30.0)?.multiply(duration),
            TimeUnit::Weeks => base.divide(4.0)?.multiply(duration),
            TimeUnit::Months => base.multiply(duration),
            TimeUnit::Years => base.multiply(duration * 12.0),
        };
        Ok(price.value())
    }

    pub fn total_price(&self) -> Result<f64, PricingError> {
        Ok(self.time_based_price()? + self.channels.extra_channel_surcharge()?)
    }

    pub fn channel_count(&self) -> Result<u32, PricingError> {
        self.channels.effective_channel_count()
    }

    pub fn quote(&self) -> Result<PricingResult, PricingError> {
        let time_based_price = self.time_based_price()?;
        Ok(PricingResult {
            channel_count: self.channel_count()?,
            time_based_price,
            total_price: time_based_price + self.channels.extra_channel_surcharge()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::SubscriptionPlan;

    fn calc(plan: SubscriptionPlan, duration: u32, unit: TimeUnit) -> SubscriptionCalculator {
        SubscriptionCalculator::new(&PricingRequest::new(plan, duration, unit)).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn one_month_basic_is_base_price() {
        let price = calc(SubscriptionPlan::Basic, 1, TimeUnit::Months)
            .time_based_price()
            .unwrap();
        assert!(close(price, 30000.0));
    }

    #[test]
    fn twelve_months_classic() {
        let price = calc(SubscriptionPlan::Classic, 12, TimeUnit::Months)
            .time_based_price()
            .unwrap();
        assert!(close(price, 600000.0));
    }

    #[test]
    fn thirty_days_basic_matches_one_month() {
        let price = calc(SubscriptionPlan::Basic, 30, TimeUnit::Days)
            .time_based_price()
            .unwrap();
        assert!(close(price, 30000.0));
    }

    #[test]
    fn weeks_and_years() {
        let weeks = calc(SubscriptionPlan::Classic, 3, TimeUnit::Weeks)
            .time_based_price()
            .unwrap();
        assert!(close(weeks, 37500.0));

        let years = calc(SubscriptionPlan::Basic, 1, TimeUnit::Years)
            .time_based_price()
            .unwrap();
        assert!(close(years, 360000.0));
    }

    #[test]
    fn days_round_the_daily_rate_first() {
        // 50000 / 30 = 1666.67 after rounding, then * 7
        let price = calc(SubscriptionPlan::Classic, 7, TimeUnit::Days)
            .time_based_price()
            .unwrap();
        assert!(close(price, 11666.69));
    }

    #[test]
    fn time_based_price_is_monotonic_in_duration() {
        for plan in SubscriptionPlan::ALL {
            for unit in TimeUnit::ALL {
                let mut previous = 0.0;
                for duration in 1..=unit.max_duration().max(24) {
                    let price = calc(plan, duration, unit).time_based_price().unwrap();
                    assert!(
                        price >= previous,
                        "{plan} {unit}: {duration} -> {price} < {previous}"
                    );
                    previous = price;
                }
            }
        }
    }

    #[test]
    fn total_adds_surcharge_and_is_repeatable() {
        let request =
            PricingRequest::new(SubscriptionPlan::Basic, 2, TimeUnit::Months).with_channels(300);
        let calc = SubscriptionCalculator::new(&request).unwrap();
        let first = calc.total_price().unwrap();
        let second = calc.total_price().unwrap();
        assert!(close(first, 60060.0));
        assert!(close(first, second));
        assert!(close(calc.time_based_price().unwrap(), 60000.0));
        assert_eq!(calc.channel_count().unwrap(), 300);
    }

    #[test]
    fn quote_collects_all_figures() {
        let request =
            PricingRequest::new(SubscriptionPlan::Classic, 1, TimeUnit::Months).with_channels(520);
        let result = SubscriptionCalculator::new(&request).unwrap().quote().unwrap();
        assert_eq!(result.channel_count, 520);
        assert!(close(result.time_based_price, 50000.0));
        assert!(close(result.total_price, 50030.0));
    }
}
