use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::plans::{SubscriptionPlan, TimeUnit};
use super::quote::PricingRequest;
use super::subscription_calculator::SubscriptionCalculator;
use crate::error::{ConsoleError, Result};

/// Body of the renew endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalRequest {
    pub renewal_period: u32,
    pub unit: TimeUnit,
    pub new_type: SubscriptionPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<u32>,
}

impl RenewalRequest {
    pub fn pricing_request(&self) -> PricingRequest {
        PricingRequest {
            plan: self.new_type,
            duration: self.renewal_period,
            unit: self.unit,
            requested_channel_count: self.channel_count,
        }
    }
}

/// What a renewal will produce, computed before it is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct RenewalPreview {
    pub plan: SubscriptionPlan,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub channel_count: u32,
    pub price: f64,
}

impl RenewalPreview {
    /// A renewal extends from the current end date, or from `now` when the
    /// subscription has already lapsed (or never had an end date).
    pub fn compute(
        current_end: Option<NaiveDateTime>,
        now: NaiveDateTime,
        request: &RenewalRequest,
    ) -> Result<Self> {
        let pricing = request.pricing_request();
        pricing.validate()?;

        let start = match current_end {
            Some(end) if end > now => end,
            _ => now,
        };
        let end = request
            .unit
            .advance(start, request.renewal_period)
            .ok_or_else(|| ConsoleError::Validation("Renewal end date is out of range.".into()))?;

        let calculator = SubscriptionCalculator::new(&pricing)?;
        Ok(Self {
            plan: request.new_type,
            start,
            end,
            channel_count: calculator.channel_count()?,
            price: calculator.total_price()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn request(period: u32, unit: TimeUnit) -> RenewalRequest {
        RenewalRequest {
            renewal_period: period,
            unit,
            new_type: SubscriptionPlan::Classic,
            channel_count: None,
        }
    }

    #[test]
    fn active_subscription_extends_from_its_end() {
        let preview = RenewalPreview::compute(
            Some(at(2025, 3, 10)),
            at(2025, 3, 1),
            &request(2, TimeUnit::Months),
        )
        .unwrap();
        assert_eq!(preview.start, at(2025, 3, 10));
        assert_eq!(preview.end, at(2025, 5, 10));
        assert_eq!(preview.channel_count, 500);
        assert!((preview.price - 100000.0).abs() < 1e-9);
    }

    #[test]
    fn lapsed_subscription_restarts_now() {
        let preview = RenewalPreview::compute(
            Some(at(2025, 1, 1)),
            at(2025, 3, 1),
            &request(2, TimeUnit::Weeks),
        )
        .unwrap();
        assert_eq!(preview.start, at(2025, 3, 1));
        assert_eq!(preview.end, at(2025, 3, 15));

        let fresh = RenewalPreview::compute(None, at(2025, 3, 1), &request(1, TimeUnit::Years))
            .unwrap();
        assert_eq!(fresh.end, at(2026, 3, 1));
    }

    #[test]
    fn renewal_prices_extra_channels() {
        let mut req = request(1, TimeUnit::Months);
        req.new_type = SubscriptionPlan::Basic;
        req.channel_count = Some(260);
        let preview = RenewalPreview::compute(None, at(2025, 3, 1), &req).unwrap();
        assert_eq!(preview.channel_count, 260);
        assert!((preview.price - 30012.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_period_is_rejected() {
        let err = RenewalPreview::compute(None, at(2025, 3, 1), &request(0, TimeUnit::Days))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
    }

    #[test]
    fn wire_format_matches_the_renew_endpoint() {
        let json = serde_json::to_value(request(3, TimeUnit::Days)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"renewalPeriod": 3, "unit": "DAYS", "newType": "CLASSIC"})
        );
    }
}
