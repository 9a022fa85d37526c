use super::PricingError;

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Scales a price step by step.
///
/// Every step rounds to two decimals on its own, so `divide(30).multiply(7)`
/// is not the same as `multiply(7).divide(30)`. Displayed prices depend on the
/// exact order used by the callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceCalculator {
    value: f64,
}

impl PriceCalculator {
    pub fn new(value: f64) -> Self {
        Self { value }
    }

    pub fn divide(self, divisor: f64) -> Result<Self, PricingError> {
        if divisor == 0.0 || !divisor.is_finite() {
            return Err(PricingError::InvalidDivisor);
        }
        let value = round2(self.value / divisor);
        if !value.is_finite() {
            return Err(PricingError::InvalidDivisor);
        }
        Ok(Self { value })
    }

    pub fn multiply(self, multiplier: f64) -> Self {
        Self {
            value: round2(self.value * multiplier),
        }
    }

    pub fn value(self) -> f64 {
        self.value
    }
}
